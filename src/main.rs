use anyhow::Result;
use clap::Parser;
use log::{info, LevelFilter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use mirsal::config::GenerationConfig;
use mirsal::pipeline::{ChatPipeline, HttpGenerator, RateLimiter};
use mirsal::server::{self, AppState};
use mirsal::utils;

/// Command line arguments for the Mirsal chat server
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Mirsal: the AI chat backend of a bilingual assistant product.",
    long_about = "Mirsal serves the conversational AI endpoint used by the chat UI.\n\n\
    Configuration comes from the environment (a .env file is honored):\n\
    GENERATION_API_KEY      credential for the text-generation provider\n\
    GENERATION_ENDPOINT     chat-completions endpoint (OpenAI-compatible)\n\
    GENERATION_MODEL        model name"
)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8787)]
    port: u16,

    /// Write logs to this file instead of stdout
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first so logging configuration can come from it too
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }

    let args = Args::parse();
    utils::setup_logging(args.log_file.as_deref(), args.log_level)?;

    let config = GenerationConfig::from_env();
    info!(
        "Using generation endpoint {} (model {})",
        config.endpoint, config.model
    );

    let generator = HttpGenerator::new(&config)?;
    let state = Arc::new(AppState {
        pipeline: ChatPipeline::new(config.api_key.clone(), Arc::new(generator)),
        limiter: RateLimiter::default(),
    });

    let app = server::router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting chat server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        res = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        ) => {
            if let Err(e) = res {
                info!("Server stopped with error: {}", e);
            }
        }
    }

    Ok(())
}

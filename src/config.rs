// Server configuration
// Everything comes from environment variables (with .env support), the
// generation credential first among them. Nothing here is persisted.

use std::env;

use log::info;

/// Configuration for the text-generation capability.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// API key for the provider. None means the pipeline rejects every
    /// request with a configuration error until an operator sets it.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
}

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

impl GenerationConfig {
    /// Load from the environment. `GENERATION_API_KEY` is the credential;
    /// `GENERATION_ENDPOINT` and `GENERATION_MODEL` override the defaults.
    pub fn from_env() -> Self {
        let api_key = env::var("GENERATION_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        if api_key.is_none() {
            info!("GENERATION_API_KEY is not set; chat requests will be rejected");
        }

        GenerationConfig {
            api_key,
            endpoint: env::var("GENERATION_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            model: env::var("GENERATION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        }
    }
}

// HTTP surface for the chat pipeline
// One POST route. The rate limiter is checked here, keyed by the client's
// source address, before the pipeline does any work. Every response carries
// no-cache headers: replies are unique and must never be served stale.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Json, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use log::{info, warn};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::models::{ChatRequest, ChatResponse};
use crate::pipeline::{ChatPipeline, PipelineError, RateLimiter};
use crate::pipeline::prompt::localized_error;

pub struct AppState {
    pub pipeline: ChatPipeline,
    pub limiter: RateLimiter,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

fn no_store_headers() -> [(HeaderName, &'static str); 2] {
    [
        (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
        (header::PRAGMA, "no-cache"),
    ]
}

fn status_for(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        PipelineError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        PipelineError::MissingCredential | PipelineError::Provider(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let language = request.language;

    if !state.limiter.check(&addr.ip().to_string()) {
        warn!("Rate limit hit for {}", addr.ip());
        let error = PipelineError::RateLimited;
        return (
            status_for(&error),
            no_store_headers(),
            Json(json!({ "error": localized_error(language, &error) })),
        )
            .into_response();
    }

    match state.pipeline.handle(&request).await {
        Ok(reply) => {
            info!(
                "Chat turn answered ({} suggestion(s))",
                reply.suggestions.as_ref().map_or(0, Vec::len)
            );
            (
                StatusCode::OK,
                no_store_headers(),
                Json(ChatResponse {
                    message: reply.message,
                    suggestions: reply.suggestions,
                    error: None,
                }),
            )
                .into_response()
        }
        Err(error) => {
            warn!("Chat turn rejected: {}", error);
            (
                status_for(&error),
                no_store_headers(),
                Json(json!({ "error": localized_error(language, &error) })),
            )
                .into_response()
        }
    }
}

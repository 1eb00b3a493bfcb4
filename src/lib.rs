// Re-export needed modules for testing
pub mod config;
pub mod models;
pub mod pipeline; // AI request pipeline
pub mod server;
pub mod session; // Conversation state machine
pub mod utils;

// Re-export main types for convenience
pub use models::*;
pub use pipeline::{ChatPipeline, PipelineError, RateLimiter};
pub use session::ConversationSession;

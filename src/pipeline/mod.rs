// AI request pipeline
// Turns a ChatRequest into a reply: validate, assemble the grounded prompt,
// call the text generator once, parse the raw reply into a message plus
// quick-reply suggestions. The rate limiter lives here too but is wired to
// the request path by the HTTP layer.

use std::sync::Arc;

use log::{debug, error};
use thiserror::Error;

use crate::models::{ChatRequest, ChatRole};

pub mod generator;
pub mod parse;
pub mod prompt;
pub mod rate_limit;

pub use generator::{HttpGenerator, TextGenerator};
pub use rate_limit::RateLimiter;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// No generation credential configured; an operator problem, not retried.
    #[error("generation credential is not configured")]
    MissingCredential,
    /// Malformed request, reported synchronously and never retried.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Too many requests from one client inside the current window.
    #[error("rate limit exceeded")]
    RateLimited,
    /// The generation call failed. Detail is logged; callers only ever see a
    /// generic localized message.
    #[error("text generation failed")]
    Provider(anyhow::Error),
}

/// A successful pipeline result, before it is wrapped for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub message: String,
    pub suggestions: Option<Vec<String>>,
}

pub struct ChatPipeline {
    credential: Option<String>,
    generator: Arc<dyn TextGenerator>,
}

impl ChatPipeline {
    pub fn new(credential: Option<String>, generator: Arc<dyn TextGenerator>) -> Self {
        ChatPipeline {
            credential,
            generator,
        }
    }

    /// Run one chat turn end to end.
    ///
    /// Validation happens before anything else: no generation call is made
    /// for an unconfigured server, an empty history or a history that does
    /// not end with a user turn. The generation capability is invoked at
    /// most once per request.
    pub async fn handle(&self, request: &ChatRequest) -> Result<ChatReply, PipelineError> {
        if self.credential.as_deref().map_or(true, str::is_empty) {
            return Err(PipelineError::MissingCredential);
        }

        if request.messages.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "message history is empty".to_string(),
            ));
        }

        match request.messages.last() {
            Some(turn) if turn.role == ChatRole::User => {}
            _ => {
                return Err(PipelineError::InvalidRequest(
                    "last message must have role user".to_string(),
                ));
            }
        }

        let full_prompt = prompt::build_prompt(request);
        debug!(
            "Dispatching prompt of {} chars ({} turns)",
            full_prompt.len(),
            request.messages.len()
        );

        let raw = self.generator.generate(&full_prompt).await.map_err(|e| {
            error!("Text generation failed: {:#}", e);
            PipelineError::Provider(e)
        })?;

        let parsed = parse::parse_reply(&raw);
        Ok(ChatReply {
            message: parsed.message,
            suggestions: parsed.suggestions,
        })
    }
}

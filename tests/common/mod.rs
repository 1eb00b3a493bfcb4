// Common test utilities for integration tests
// This module contains shared code for all integration tests

// Standard library imports
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

// External crate imports
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::LevelFilter;

// Import the crate functionality
use mirsal::models::{ChatRequest, ChatTurn, Language};
use mirsal::pipeline::{ChatPipeline, TextGenerator};

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// Generator stub returning a canned reply and counting invocations.
pub struct StubGenerator {
    reply: String,
    calls: Arc<AtomicUsize>,
}

impl StubGenerator {
    pub fn new(reply: &str) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let stub = Arc::new(StubGenerator {
            reply: reply.to_string(),
            calls: calls.clone(),
        });
        (stub, calls)
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Generator stub that always fails, for provider-error paths.
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("simulated provider outage (HTTP 503)"))
    }
}

/// Pipeline wired to a canned-reply stub. Returns the call counter so tests
/// can assert whether generation was invoked at all.
pub fn stub_pipeline(reply: &str) -> (ChatPipeline, Arc<AtomicUsize>) {
    let (stub, calls) = StubGenerator::new(reply);
    (ChatPipeline::new(Some("test-key".to_string()), stub), calls)
}

/// A minimal valid request: one user turn in the given language.
pub fn user_request(content: &str, language: Language) -> ChatRequest {
    ChatRequest {
        messages: vec![ChatTurn::user(content)],
        language,
        context: None,
    }
}

// Text generation seam
// The pipeline only needs "prompt in, raw text out". The trait keeps tests
// provider-free; HttpGenerator talks to an OpenAI-compatible chat
// completions endpoint.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use serde_json::json;
use std::time::Duration;

use crate::config::GenerationConfig;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate raw reply text from a fully assembled prompt. Exactly one
    /// round-trip; retries are the caller's decision, and the pipeline makes
    /// none.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl HttpGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(HttpGenerator {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl TextGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Requesting completion from {}", self.endpoint);

        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("provider returned {}: {}", status, detail));
        }

        let payload: serde_json::Value = response.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("provider response had no message content"))
    }
}

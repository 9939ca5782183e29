use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{LlmProvider, Message};
use crate::services::http;

pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(url: String, model: String, timeout: Duration) -> Self {
        Self {
            url,
            model,
            client: http::client(timeout),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let mut ollama_messages = vec![json!({
            "role": "system",
            "content": system_prompt,
        })];
        ollama_messages.extend(messages.iter().map(|msg| {
            json!({
                "role": msg.role,
                "content": msg.content,
            })
        }));

        let body = json!({
            "model": self.model,
            "messages": ollama_messages,
            "stream": false,
            "options": { "temperature": 0.2 },
        });

        let request = self
            .client
            .post(format!("{}/api/chat", self.url.trim_end_matches('/')))
            .json(&body);

        let resp = http::send_with_retry(request)
            .await
            .context("failed to call Ollama API")?
            .error_for_status()
            .context("Ollama API returned error")?;

        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Ollama response")?;

        data["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing content in Ollama response"))
    }
}

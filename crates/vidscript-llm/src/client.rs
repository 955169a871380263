//! Non-streaming chat-completion client for OpenAI-compatible endpoints.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use vidscript_core::{Error, Result};

use crate::config::LLMConfig;

/// A chat message sent to the completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Sampling and transport options for one completion call.
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    pub fn new(
        http: Client,
        api_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a client from config; `None` when no API key is configured.
    pub fn from_config(config: &LLMConfig) -> Option<Self> {
        let api_key = config.api_key()?;
        Some(Self::new(
            Client::new(),
            config.api_url.clone(),
            config.model.clone(),
            api_key,
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one chat completion and return `choices[0].message.content`.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "temperature": options.temperature,
        });
        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        debug!("Requesting completion from {} with model {}", self.api_url, self.model);

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(options.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("API error {}: {}", status, text)));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("Invalid response body: {}", e)))?;

        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| Error::Llm("Response has no message content".into()))
    }
}

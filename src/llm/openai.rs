// src/llm/openai.rs

//! Client for OpenAI-compatible `/chat/completions` endpoints.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{ChatFuture, ChatModel, ChatRequest};
use crate::config::model::ModelSection;

/// Chat model reached over HTTP.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleModel {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
}

impl OpenAiCompatibleModel {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        temperature: Option<f32>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .context("building HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        debug!(%base_url, %model, "initialised chat model client");

        Ok(Self {
            client,
            base_url,
            model,
            api_key,
            temperature,
        })
    }

    /// Build a client from the `model:` section, reading the API key from
    /// the environment variable it names. A missing key is allowed (local
    /// servers often need none).
    pub fn from_section(section: &ModelSection) -> Result<Self> {
        let api_key = std::env::var(&section.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        if api_key.is_none() {
            debug!(
                env = %section.api_key_env,
                "no API key in environment; sending unauthenticated requests"
            );
        }

        Self::new(
            section.base_url.clone(),
            section.model.clone(),
            api_key,
            section.temperature,
        )
    }

    fn request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut messages = Vec::new();
        if let Some(ref system) = request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(t) = self.temperature {
            body["temperature"] = json!(t);
        }
        body
    }

    async fn send(&self, request: ChatRequest) -> Result<String> {
        let body = self.request_body(&request);

        let mut http = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(ref key) = self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http
            .send()
            .await
            .with_context(|| format!("sending chat request to {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("chat API error {}: {}", status, error_text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("parsing chat completion response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion response contained no content"))
    }
}

impl ChatModel for OpenAiCompatibleModel {
    fn complete(&self, request: ChatRequest) -> ChatFuture<'_> {
        Box::pin(self.send(request))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

// src/llm/mod.rs

//! Language model capability injected into the built-in agents.
//!
//! The engine never talks to a model itself. Agents receive an
//! `Arc<dyn ChatModel>`; production wires in [`OpenAiCompatibleModel`],
//! tests substitute deterministic fakes.

use std::future::Future;
use std::pin::Pin;
use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde_json::Value;

pub mod openai;

pub use openai::OpenAiCompatibleModel;

/// One single-turn request to a chat model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Optional system instruction.
    pub system: Option<String>,
    pub prompt: String,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Text-in, text-out chat completion.
pub trait ChatModel: Send + Sync {
    fn complete(&self, request: ChatRequest) -> ChatFuture<'_>;
}

/// Run `request` and parse the first JSON object in the reply.
pub async fn complete_json(model: &dyn ChatModel, request: ChatRequest) -> Result<Value> {
    let reply = model.complete(request).await?;
    extract_json(&reply)
}

fn fenced_block() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").ok())
        .as_ref()
}

/// Extract a JSON object from a model reply.
///
/// Accepts a bare object, an object inside a fenced code block, or an
/// object surrounded by prose (first `{` to last `}`).
pub fn extract_json(reply: &str) -> Result<Value> {
    let trimmed = reply.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Ok(value);
        }
    }

    if let Some(caps) = fenced_block().and_then(|re| re.captures(trimmed)) {
        if let Some(inner) = caps.get(1) {
            if let Ok(value) = serde_json::from_str::<Value>(inner.as_str().trim()) {
                return Ok(value);
            }
        }
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => serde_json::from_str::<Value>(&trimmed[s..=e])
            .context("model reply contains a malformed JSON object"),
        _ => Err(anyhow!("model reply contains no JSON object")),
    }
}

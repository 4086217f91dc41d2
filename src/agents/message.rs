// src/agents/message.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unit passed to and returned from a worker.
///
/// `content` is opaque to the engine: its shape is a contract between the
/// producing and consuming tasks. `metadata` carries classification tags
/// (e.g. an entity type) between stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub content: Value,
    pub sender: String,
    pub recipient: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Envelope {
    pub fn new(content: Value, sender: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            content,
            sender: sender.into(),
            recipient: recipient.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }

    /// Answer this envelope: the recipient becomes the sender and the
    /// metadata is carried over.
    pub fn reply(&self, content: Value) -> Self {
        Self {
            content,
            sender: self.recipient.clone(),
            recipient: self.sender.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

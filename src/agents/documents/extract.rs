// src/agents/documents/extract.rs

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, info};

use super::{read_list, ExtractedItem, KeyInfo, PreprocessedDoc};
use crate::agents::{Envelope, Worker, WorkerFuture};
use crate::llm::{complete_json, ChatModel, ChatRequest};

const SYSTEM: &str =
    "You extract key information from documents and answer with a single valid JSON object.";

/// Extracts characters, themes and plot points per document.
///
/// Input: `{"preprocessed_docs": [...]}`. Output:
/// `{"extracted_items": [{id, key_info: [{characters, themes, plot_points}]}]}`.
/// Any model failure fails the task.
pub struct ExtractAgent {
    name: String,
    model: Arc<dyn ChatModel>,
}

impl ExtractAgent {
    pub fn new(name: impl Into<String>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }

    async fn handle(&self, message: Envelope) -> Result<Envelope> {
        let docs: Vec<PreprocessedDoc> = read_list(&message.content, "preprocessed_docs")?;
        info!(agent = %self.name, count = docs.len(), "extracting key information");

        let mut items = Vec::with_capacity(docs.len());
        for doc in docs {
            let key_info = self.extract(&doc).await.with_context(|| {
                format!("extracting key information from '{}' ({})", doc.title, doc.id)
            })?;
            items.push(ExtractedItem {
                id: doc.id,
                key_info: vec![key_info],
            });
        }

        Ok(message.reply(json!({ "extracted_items": items })))
    }

    async fn extract(&self, doc: &PreprocessedDoc) -> Result<KeyInfo> {
        let prompt = format!(
            "Analyse the document below and identify:\n\
             - the main characters (names only)\n\
             - the core themes\n\
             - the plot points essential to the story\n\n\
             Answer with one JSON object with the keys \"characters\", \"themes\" \
             and \"plot_points\", each an array of strings, and nothing else. \
             Example: {{\"characters\": [\"Name1\"], \"themes\": [\"Theme1\"], \
             \"plot_points\": [\"Point1\"]}}\n\n\
             Document id: {}\n\
             Document title: {}\n\
             Document content:\n{}",
            doc.id, doc.title, doc.content
        );

        debug!(doc = %doc.id, "requesting key information");
        let value = complete_json(
            self.model.as_ref(),
            ChatRequest::new(prompt).with_system(SYSTEM),
        )
        .await?;

        serde_json::from_value(value).context("model reply does not match the key information shape")
    }
}

impl Worker for ExtractAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, message: Envelope) -> WorkerFuture<'_> {
        Box::pin(self.handle(message))
    }
}

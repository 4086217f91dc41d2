// src/agents/documents/preprocess.rs

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tracing::{info, warn};

use super::{read_list, CollectedDoc, PreprocessedDoc};
use crate::agents::{Envelope, Worker, WorkerFuture};
use crate::llm::{ChatModel, ChatRequest};

/// Cleans up each collected document (OCR noise, stray formatting).
///
/// Input: `{"docs": [...]}`. Output: `{"preprocessed_docs": [...]}`.
/// When the model fails for a document its raw content is kept.
pub struct PreprocessAgent {
    name: String,
    model: Arc<dyn ChatModel>,
}

impl PreprocessAgent {
    pub fn new(name: impl Into<String>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }

    async fn handle(&self, message: Envelope) -> Result<Envelope> {
        let docs: Vec<CollectedDoc> = read_list(&message.content, "docs")?;
        info!(agent = %self.name, count = docs.len(), "preprocessing documents");

        let mut cleaned = Vec::with_capacity(docs.len());
        for doc in docs {
            let content = self.clean(&doc).await;
            cleaned.push(PreprocessedDoc {
                id: doc.id,
                title: doc.title,
                content,
            });
        }

        Ok(message.reply(json!({ "preprocessed_docs": cleaned })))
    }

    async fn clean(&self, doc: &CollectedDoc) -> String {
        let prompt = format!(
            "Clean up and normalise the raw document below: remove redundant \
             formatting, fix OCR errors and improve readability without changing \
             its meaning. Reply with the cleaned text only.\n\n\
             Title: {}\n\
             Raw content:\n{}",
            doc.title, doc.content
        );

        match self.model.complete(ChatRequest::new(prompt)).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(doc = %doc.id, "model returned empty text; keeping raw content");
                doc.content.clone()
            }
            Err(err) => {
                warn!(doc = %doc.id, error = %err, "cleaning failed; keeping raw content");
                doc.content.clone()
            }
        }
    }
}

impl Worker for PreprocessAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, message: Envelope) -> WorkerFuture<'_> {
        Box::pin(self.handle(message))
    }
}

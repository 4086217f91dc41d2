// src/agents/documents/summarize.rs

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde_json::json;
use tracing::info;

use super::{read_list, DocSummary, PreprocessedDoc};
use crate::agents::{Envelope, Worker, WorkerFuture};
use crate::llm::{complete_json, ChatModel, ChatRequest};

const SYSTEM: &str = "You summarise documents and answer with a single valid JSON object.";

/// Two-sentence summary per document.
///
/// Input: `{"preprocessed_docs": [...]}`. Output:
/// `{"summaries": [{doc_name, summary}]}` where `doc_name` is the doc id.
pub struct SummarizeAgent {
    name: String,
    model: Arc<dyn ChatModel>,
}

impl SummarizeAgent {
    pub fn new(name: impl Into<String>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }

    async fn handle(&self, message: Envelope) -> Result<Envelope> {
        let docs: Vec<PreprocessedDoc> = read_list(&message.content, "preprocessed_docs")?;
        info!(agent = %self.name, count = docs.len(), "summarising documents");

        let mut summaries = Vec::with_capacity(docs.len());
        for doc in docs {
            let summary = self
                .summarize(&doc)
                .await
                .with_context(|| format!("summarising '{}' ({})", doc.title, doc.id))?;
            summaries.push(DocSummary {
                doc_name: doc.id,
                summary,
            });
        }

        Ok(message.reply(json!({ "summaries": summaries })))
    }

    async fn summarize(&self, doc: &PreprocessedDoc) -> Result<String> {
        let prompt = format!(
            "Write a concise summary of the document below covering its main plot, \
             characters and themes, in at most two sentences. Answer with one JSON \
             object with the key \"summary\" and nothing else.\n\n\
             Document title: {}\n\
             Document content:\n{}",
            doc.title, doc.content
        );

        let value = complete_json(
            self.model.as_ref(),
            ChatRequest::new(prompt).with_system(SYSTEM),
        )
        .await?;

        value
            .get("summary")
            .and_then(|s| s.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| anyhow!("model reply has no string 'summary' field"))
    }
}

impl Worker for SummarizeAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, message: Envelope) -> WorkerFuture<'_> {
        Box::pin(self.handle(message))
    }
}

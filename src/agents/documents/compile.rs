// src/agents/documents/compile.rs

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use tracing::info;

use super::{read_list, DocSummary, ExtractedItem, KeyInfo};
use crate::agents::{Envelope, Worker, WorkerFuture};
use crate::llm::{ChatModel, ChatRequest};

const SYSTEM: &str = "You compile clear, well-structured markdown reports from the facts provided.";

/// Compiles the final markdown report.
///
/// The input is usually keyed by dependency id (`{task3: {...}, task4: {...}}`);
/// `extracted_items` and `summaries` are looked up either at the top level
/// or one level down. Output: `{"report": "<sections joined by a blank line>"}`.
pub struct CompileAgent {
    name: String,
    model: Arc<dyn ChatModel>,
}

impl CompileAgent {
    pub fn new(name: impl Into<String>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }

    async fn handle(&self, message: Envelope) -> Result<Envelope> {
        let items: Vec<ExtractedItem> = read_list(
            find_section(&message.content, "extracted_items")?,
            "extracted_items",
        )?;
        let summaries: Vec<DocSummary> =
            read_list(find_section(&message.content, "summaries")?, "summaries")?;

        info!(agent = %self.name, documents = items.len(), "compiling report");

        let mut sections = Vec::with_capacity(items.len());
        for item in items.iter() {
            let section = self
                .compile_section(item, &summaries)
                .await
                .with_context(|| format!("compiling report section for '{}'", item.id))?;
            if !section.is_empty() {
                sections.push(section);
            }
        }

        Ok(message.reply(json!({ "report": sections.join("\n\n") })))
    }

    async fn compile_section(&self, item: &ExtractedItem, summaries: &[DocSummary]) -> Result<String> {
        let summary = summaries
            .iter()
            .find(|s| s.doc_name == item.id)
            .ok_or_else(|| anyhow!("no summary found for document '{}'", item.id))?;

        let info = item.key_info.first().cloned().unwrap_or_default();
        let KeyInfo {
            characters,
            themes,
            plot_points,
        } = info;

        let prompt = format!(
            "Write a well-formatted report section for one document. Include:\n\
             - the document id as the heading\n\
             - the summary\n\
             - the main characters with a short description\n\
             - the main themes with a short explanation\n\
             - the key plot points as narrative\n\n\
             Use markdown headings and lists.\n\n\
             Document id: {}\n\
             Summary:\n{}\n\n\
             Characters:\n{}\n\n\
             Themes:\n{}\n\n\
             Plot points:\n- {}",
            item.id,
            summary.summary,
            characters.join(", "),
            themes.join(", "),
            plot_points.join(" ")
        );

        let section = self
            .model
            .complete(ChatRequest::new(prompt).with_system(SYSTEM))
            .await?;
        Ok(section.trim().to_string())
    }
}

/// The object holding `key`: the input itself, or one of its values.
fn find_section<'a>(input: &'a Value, key: &str) -> Result<&'a Value> {
    if input.get(key).is_some() {
        return Ok(input);
    }
    input
        .as_object()
        .and_then(|map| map.values().find(|v| v.get(key).is_some()))
        .ok_or_else(|| anyhow!("compile input contains no '{key}'"))
}

impl Worker for CompileAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, message: Envelope) -> WorkerFuture<'_> {
        Box::pin(self.handle(message))
    }
}

// src/agents/documents/collect.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use serde_json::json;
use tracing::{debug, info, warn};

use super::CollectedDoc;
use crate::agents::{Envelope, Worker, WorkerFuture};
use crate::config::DocumentsSection;
use crate::fs::FileSystem;
use crate::llm::{ChatModel, ChatRequest};

/// Reads the document folder and titles each document.
///
/// Input is ignored. Output: `{"docs": [CollectedDoc, ...]}` with ids
/// `doc1`, `doc2`, ... in file name order.
pub struct CollectAgent {
    name: String,
    model: Arc<dyn ChatModel>,
    fs: Arc<dyn FileSystem>,
    documents: DocumentsSection,
}

impl CollectAgent {
    pub fn new(
        name: impl Into<String>,
        model: Arc<dyn ChatModel>,
        fs: Arc<dyn FileSystem>,
        documents: DocumentsSection,
    ) -> Self {
        Self {
            name: name.into(),
            model,
            fs,
            documents,
        }
    }

    async fn handle(&self, message: Envelope) -> Result<Envelope> {
        info!(agent = %self.name, dir = ?self.documents.dir, "collecting documents");

        let matcher = Glob::new(&self.documents.pattern)
            .with_context(|| format!("invalid document pattern '{}'", self.documents.pattern))?
            .compile_matcher();

        let fs = Arc::clone(&self.fs);
        let dir = self.documents.dir.clone();
        let files = tokio::task::spawn_blocking(move || read_documents(fs.as_ref(), &dir, &matcher))
            .await
            .context("document reader task failed")??;

        let mut docs = Vec::with_capacity(files.len());
        for (idx, (path, content)) in files.into_iter().enumerate() {
            let fallback = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("doc{}", idx + 1));
            let title = self.extract_title(&content).await.unwrap_or(fallback);

            docs.push(CollectedDoc {
                id: format!("doc{}", idx + 1),
                title,
                content,
                filepath: path.to_string_lossy().into_owned(),
            });
        }

        info!(agent = %self.name, count = docs.len(), "documents collected");
        Ok(message.reply(json!({ "docs": docs })))
    }

    /// Ask the model for a title; `None` when it fails or answers empty.
    async fn extract_title(&self, content: &str) -> Option<String> {
        let prompt = format!(
            "The following text is a document that needs a precise, descriptive title:\n\n\
             {content}\n\n\
             Analyse the content and produce one concise, professional, short title \
             that reflects its core subject. Return only the title."
        );

        match self.model.complete(ChatRequest::new(prompt)).await {
            Ok(reply) => {
                let title = reply.trim().trim_matches('"').trim().to_string();
                (!title.is_empty()).then_some(title)
            }
            Err(err) => {
                warn!(agent = %self.name, error = %err, "title extraction failed; using file name");
                None
            }
        }
    }
}

/// Files in `dir` whose names match `matcher`, sorted by path, with their
/// contents. A missing directory yields no documents.
fn read_documents(
    fs: &dyn FileSystem,
    dir: &Path,
    matcher: &GlobMatcher,
) -> Result<Vec<(PathBuf, String)>> {
    if !fs.is_dir(dir) {
        warn!(dir = ?dir, "documents directory not found; nothing to collect");
        return Ok(Vec::new());
    }

    let mut paths: Vec<PathBuf> = fs
        .read_dir(dir)?
        .into_iter()
        .filter(|p| !fs.is_dir(p))
        .filter(|p| p.file_name().is_some_and(|name| matcher.is_match(name)))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            debug!(path = ?path, "reading document");
            let content = fs.read_to_string(&path)?;
            Ok((path, content))
        })
        .collect()
}

impl Worker for CollectAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, message: Envelope) -> WorkerFuture<'_> {
        Box::pin(self.handle(message))
    }
}

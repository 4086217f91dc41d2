// src/agents/documents/mod.rs

//! Built-in document pipeline agents.
//!
//! The pipeline turns a folder of text documents into a markdown report:
//!
//! ```text
//! CollectAgent -> PreprocessAgent -> ExtractAgent   -> CompileAgent
//!                                 \-> SummarizeAgent -/
//! ```
//!
//! Every agent talks to the language model through the injected
//! [`ChatModel`]; the collector reads files through the [`FileSystem`]
//! seam so tests can run against [`MockFileSystem`](crate::fs::mock::MockFileSystem).

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agents::{AgentRegistry, Worker};
use crate::config::DocumentsSection;
use crate::fs::FileSystem;
use crate::llm::ChatModel;

pub mod collect;
pub mod compile;
pub mod extract;
pub mod preprocess;
pub mod summarize;

pub use collect::CollectAgent;
pub use compile::CompileAgent;
pub use extract::ExtractAgent;
pub use preprocess::PreprocessAgent;
pub use summarize::SummarizeAgent;

pub const COLLECT_AGENT: &str = "CollectAgent";
pub const PREPROCESS_AGENT: &str = "PreprocessAgent";
pub const EXTRACT_AGENT: &str = "ExtractAgent";
pub const SUMMARIZE_AGENT: &str = "SummarizeAgent";
pub const COMPILE_AGENT: &str = "CompileAgent";

/// Collaborators shared by the built-in agents.
#[derive(Clone)]
pub struct DocumentAgentDeps {
    pub model: Arc<dyn ChatModel>,
    pub fs: Arc<dyn FileSystem>,
    pub documents: DocumentsSection,
}

/// Register all five document agents under their kind names.
pub fn register_document_agents(registry: &mut AgentRegistry, deps: DocumentAgentDeps) {
    let DocumentAgentDeps {
        model,
        fs,
        documents,
    } = deps;

    {
        let model = Arc::clone(&model);
        registry.register(COLLECT_AGENT, move |name: &str| -> Box<dyn Worker> {
            Box::new(CollectAgent::new(
                name,
                Arc::clone(&model),
                Arc::clone(&fs),
                documents.clone(),
            ))
        });
    }
    {
        let model = Arc::clone(&model);
        registry.register(PREPROCESS_AGENT, move |name: &str| -> Box<dyn Worker> {
            Box::new(PreprocessAgent::new(name, Arc::clone(&model)))
        });
    }
    {
        let model = Arc::clone(&model);
        registry.register(EXTRACT_AGENT, move |name: &str| -> Box<dyn Worker> {
            Box::new(ExtractAgent::new(name, Arc::clone(&model)))
        });
    }
    {
        let model = Arc::clone(&model);
        registry.register(SUMMARIZE_AGENT, move |name: &str| -> Box<dyn Worker> {
            Box::new(SummarizeAgent::new(name, Arc::clone(&model)))
        });
    }
    registry.register(COMPILE_AGENT, move |name: &str| -> Box<dyn Worker> {
        Box::new(CompileAgent::new(name, Arc::clone(&model)))
    });
}

/// A document as produced by [`CollectAgent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedDoc {
    pub id: String,
    pub title: String,
    pub content: String,
    pub filepath: String,
}

/// A cleaned document as produced by [`PreprocessAgent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessedDoc {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// Key facts extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub plot_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub id: String,
    pub key_info: Vec<KeyInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSummary {
    pub doc_name: String,
    pub summary: String,
}

/// Read the list stored under `key` in `content`.
///
/// A missing key yields an empty list; a present but malformed one is an
/// error.
pub(crate) fn read_list<T>(content: &Value, key: &str) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    match content.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(list) => serde_json::from_value(list.clone())
            .with_context(|| format!("input field '{key}' has an unexpected shape")),
    }
}

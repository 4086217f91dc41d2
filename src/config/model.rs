// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::OutputFormat;

/// Graph definition as read from a YAML, TOML or JSON document.
///
/// ```yaml
/// config:
///   output: data/final_report.md
///   output_field: report
///
/// tasks:
///   - id: task1
///     agent: CollectAgent
///     name: DocumentCollector
///     dependencies: []
///     description: Collect the source documents
///   - id: task2
///     agent: PreprocessAgent
///     name: DocumentPreprocessor
///     dependencies: [task1]
///     description: Clean up the collected documents
/// ```
///
/// Every section except `tasks` is optional. No semantic checks happen
/// here; see [`GraphDefinition`] for the validated form.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGraphDefinition {
    /// Run behaviour from `config:`.
    #[serde(default)]
    pub config: RunSection,

    /// Chat model settings used by the built-in agents.
    #[serde(default)]
    pub model: ModelSection,

    /// Document source used by `CollectAgent`.
    #[serde(default)]
    pub documents: DocumentsSection,

    /// Task records, in definition order.
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// Validated graph definition.
///
/// Construct via `GraphDefinition::try_from(raw)` (see `config::validate`)
/// or [`crate::config::load_and_validate`]. Holding one of these means:
/// task ids are unique, every dependency exists, and the dependency
/// relation is acyclic.
#[derive(Debug, Clone)]
pub struct GraphDefinition {
    pub config: RunSection,
    pub model: ModelSection,
    pub documents: DocumentsSection,
    pub tasks: Vec<TaskRecord>,
}

impl GraphDefinition {
    pub(crate) fn new_unchecked(raw: RawGraphDefinition) -> Self {
        Self {
            config: raw.config,
            model: raw.model,
            documents: raw.documents,
            tasks: raw.tasks,
        }
    }
}

/// One task record. All fields are required; `dependencies` may be empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskRecord {
    /// Unique task id, referenced by other tasks' `dependencies`.
    pub id: String,

    /// Worker implementation that handles this task (`agent` is accepted
    /// as an alias).
    #[serde(alias = "agent")]
    pub agent_kind: String,

    /// Address given to the worker instance (`name` is accepted as an
    /// alias).
    #[serde(alias = "name")]
    pub display_name: String,

    /// Ids of the tasks whose results this task consumes.
    pub dependencies: Vec<String>,

    /// Human-readable description, only used for logs and reports.
    pub description: String,
}

/// `config:` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSection {
    /// Where the terminal payload is written. Printed to stdout if unset.
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Top-level field of the terminal payload to write instead of the
    /// whole payload (e.g. `report`).
    #[serde(default)]
    pub output_field: Option<String>,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Per-task timeout as a duration string (`"90s"`, `"5m"`).
    #[serde(default)]
    pub task_timeout: Option<String>,

    /// Treat a stalled run or an unregistered agent kind as a hard error.
    #[serde(default)]
    pub strict: bool,
}

/// `model:` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSection {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable that holds the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: None,
        }
    }
}

/// `documents:` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsSection {
    #[serde(default = "default_docs_dir")]
    pub dir: PathBuf,

    /// Glob matched against file names inside `dir`.
    #[serde(default = "default_docs_pattern")]
    pub pattern: String,
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("data/docs")
}

fn default_docs_pattern() -> String {
    "*.txt".to_string()
}

impl Default for DocumentsSection {
    fn default() -> Self {
        Self {
            dir: default_docs_dir(),
            pattern: default_docs_pattern(),
        }
    }
}

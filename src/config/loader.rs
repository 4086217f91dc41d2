// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{GraphDefinition, RawGraphDefinition};
use crate::errors::{AgentDagError, Result};

/// Serialization format of a graph definition document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Toml,
    Json,
}

impl DefinitionFormat {
    /// Pick a format from the file extension. Unknown or missing
    /// extensions are read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => DefinitionFormat::Toml,
            Some("json") => DefinitionFormat::Json,
            _ => DefinitionFormat::Yaml,
        }
    }
}

/// Deserialize a graph definition document without semantic validation.
///
/// Missing required task fields are reported as
/// [`AgentDagError::GraphDefinition`].
pub fn parse_definition(contents: &str, format: DefinitionFormat) -> Result<RawGraphDefinition> {
    let parsed = match format {
        DefinitionFormat::Yaml => {
            serde_yaml::from_str::<RawGraphDefinition>(contents).map_err(|e| e.to_string())
        }
        DefinitionFormat::Toml => {
            toml::from_str::<RawGraphDefinition>(contents).map_err(|e| e.to_string())
        }
        DefinitionFormat::Json => {
            serde_json::from_str::<RawGraphDefinition>(contents).map_err(|e| e.to_string())
        }
    };

    parsed.map_err(|e| AgentDagError::GraphDefinition(format!("{format:?} parse error: {e}")))
}

/// Load a graph definition from a given path and return the raw
/// [`RawGraphDefinition`].
///
/// This only performs deserialization; it does **not** check ids,
/// dependencies or acyclicity. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawGraphDefinition> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_definition(&contents, DefinitionFormat::from_path(path))
}

/// Load a graph definition from path and validate it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads YAML / TOML / JSON depending on the extension.
/// - Applies section defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - duplicate or empty task ids,
///   - unknown or self-referencing dependencies,
///   - dependency cycles,
///   - malformed `config` values.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<GraphDefinition> {
    let raw = load_from_path(&path)?;
    GraphDefinition::try_from(raw)
}

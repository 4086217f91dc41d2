// src/sink/mod.rs

//! Result sink: persists the terminal task's payload.
//!
//! A sink failure is reported to the caller but never changes the run's
//! outcome; the scheduler state is already final when a sink runs.

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::info;

use crate::fs::FileSystem;
use crate::types::OutputFormat;

/// How a payload is turned into an artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Write only this top-level field of an object payload.
    pub field: Option<String>,
}

/// Render `payload` as the text that gets persisted.
///
/// - With `field`, the payload must be an object containing that key.
/// - `Text` writes strings verbatim and everything else as pretty JSON.
/// - `Json` always writes pretty JSON.
pub fn render_payload(payload: &Value, options: &RenderOptions) -> Result<String> {
    let selected = match options.field.as_deref() {
        Some(field) => payload
            .get(field)
            .ok_or_else(|| anyhow!("terminal payload has no field '{field}'"))?,
        None => payload,
    };

    match (options.format, selected) {
        (OutputFormat::Text, Value::String(s)) => Ok(s.clone()),
        _ => serde_json::to_string_pretty(selected).context("encoding payload as JSON"),
    }
}

/// Destination for the run's final payload.
pub trait ResultSink: Send + Sync + Debug {
    fn persist(&self, payload: &Value) -> Result<()>;
}

/// Writes the rendered payload to a file.
#[derive(Debug, Clone)]
pub struct FileSink {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    options: RenderOptions,
}

impl FileSink {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>, options: RenderOptions) -> Self {
        Self {
            fs,
            path: path.into(),
            options,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ResultSink for FileSink {
    fn persist(&self, payload: &Value) -> Result<()> {
        let rendered = render_payload(payload, &self.options)?;
        self.fs
            .write(&self.path, rendered.as_bytes())
            .with_context(|| format!("writing final output to {:?}", self.path))?;
        info!(path = ?self.path, bytes = rendered.len(), "final output saved");
        Ok(())
    }
}

/// Prints the rendered payload to stdout.
#[derive(Debug, Clone, Default)]
pub struct StdoutSink {
    options: RenderOptions,
}

impl StdoutSink {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl ResultSink for StdoutSink {
    fn persist(&self, payload: &Value) -> Result<()> {
        let rendered = render_payload(payload, &self.options)?;
        println!("{rendered}");
        Ok(())
    }
}

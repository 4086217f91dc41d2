// src/config/mod.rs

//! Graph definition loading and validation.
//!
//! Responsibilities:
//! - Define the serde-backed data model (`model.rs`).
//! - Load a definition from disk in YAML, TOML or JSON (`loader.rs`).
//! - Validate structural invariants: unique ids, known dependencies,
//!   acyclicity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_definition, DefinitionFormat};
pub use model::{
    DocumentsSection, GraphDefinition, ModelSection, RawGraphDefinition, RunSection, TaskRecord,
};

// src/agents/registry.rs

//! Agent dispatch resolver: maps an agent kind to a worker factory.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::worker::Worker;
use crate::dag::TaskGraph;
use crate::errors::{AgentDagError, Result};

/// Builds a worker for a given display name.
pub type WorkerFactory = Arc<dyn Fn(&str) -> Box<dyn Worker> + Send + Sync>;

/// Init-time registration table from agent kind to worker factory.
///
/// Kinds are matched exactly (`"CollectAgent"` and `"collectagent"` are
/// different kinds).
#[derive(Clone, Default)]
pub struct AgentRegistry {
    factories: BTreeMap<String, WorkerFactory>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&str) -> Box<dyn Worker> + Send + Sync + 'static,
    {
        let kind = kind.into();
        debug!(kind = %kind, "registering agent kind");
        self.factories.insert(kind, Arc::new(factory));
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|k| k.as_str())
    }

    /// Construct a worker for `task`.
    ///
    /// Fails with [`AgentDagError::UnknownAgentKind`] when `kind` is not
    /// registered.
    pub fn create(&self, task: &str, kind: &str, display_name: &str) -> Result<Box<dyn Worker>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| AgentDagError::UnknownAgentKind {
                task: task.to_string(),
                kind: kind.to_string(),
            })?;
        Ok(factory(display_name))
    }

    /// `(task id, kind)` for every task whose kind is not registered.
    pub fn unknown_kinds<'g>(&self, graph: &'g TaskGraph) -> Vec<(&'g str, &'g str)> {
        graph
            .nodes()
            .filter(|node| !self.contains(&node.agent_kind))
            .map(|node| (node.id.as_str(), node.agent_kind.as_str()))
            .collect()
    }
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

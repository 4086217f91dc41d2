// src/dag/graph.rs

use std::collections::HashMap;

use crate::config::model::{GraphDefinition, RawGraphDefinition, TaskRecord};
use crate::engine::TaskId;
use crate::errors::{AgentDagError, Result};

/// Static definition of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub id: TaskId,
    /// Worker implementation that handles this task.
    pub agent_kind: String,
    /// Address given to the worker instance.
    pub display_name: String,
    /// Direct dependencies, in definition order.
    pub dependencies: Vec<TaskId>,
    pub description: String,
}

impl From<&TaskRecord> for TaskNode {
    fn from(record: &TaskRecord) -> Self {
        Self {
            id: record.id.clone(),
            agent_kind: record.agent_kind.clone(),
            display_name: record.display_name.clone(),
            dependencies: record.dependencies.clone(),
            description: record.description.clone(),
        }
    }
}

/// Internal node structure: the task plus its immediate dependents.
#[derive(Debug, Clone)]
struct GraphEntry {
    node: TaskNode,
    /// Direct dependents: tasks that list this one in `dependencies`.
    dependents: Vec<TaskId>,
}

/// In-memory task graph keyed by task id.
///
/// Acyclicity and referential integrity are checked in `config::validate`,
/// so this type only keeps adjacency information for scheduling and
/// diagnostics. It is immutable once built and is shared read-only
/// (behind an `Arc`) while a run is in progress.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: HashMap<TaskId, GraphEntry>,
    /// Task ids in definition order; all iteration goes through this so
    /// scheduling order is deterministic.
    order: Vec<TaskId>,
}

impl TaskGraph {
    /// Build a graph from a validated [`GraphDefinition`].
    pub fn from_definition(def: &GraphDefinition) -> Self {
        let mut nodes: HashMap<TaskId, GraphEntry> = HashMap::new();
        let mut order = Vec::with_capacity(def.tasks.len());

        // First pass: create nodes with their dependency lists.
        for record in def.tasks.iter() {
            order.push(record.id.clone());
            nodes.insert(
                record.id.clone(),
                GraphEntry {
                    node: TaskNode::from(record),
                    dependents: Vec::new(),
                },
            );
        }

        // Second pass: populate dependents, in definition order.
        for id in order.iter() {
            let deps = nodes
                .get(id)
                .map(|e| e.node.dependencies.clone())
                .unwrap_or_default();

            for dep in deps {
                if let Some(dep_entry) = nodes.get_mut(&dep) {
                    dep_entry.dependents.push(id.clone());
                }
            }
        }

        Self { nodes, order }
    }

    /// Parse and validate a list of task records.
    ///
    /// Fails with [`AgentDagError::GraphDefinition`] on empty input,
    /// duplicate ids, unknown or self dependencies, and cycles.
    pub fn load(records: Vec<TaskRecord>) -> Result<Self> {
        let raw = RawGraphDefinition {
            config: Default::default(),
            model: Default::default(),
            documents: Default::default(),
            tasks: records,
        };
        let def = GraphDefinition::try_from(raw)?;
        Ok(Self::from_definition(&def))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&TaskNode> {
        self.nodes.get(id).map(|e| &e.node)
    }

    /// All task ids, in definition order.
    pub fn all_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// All task definitions, in definition order.
    pub fn nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|e| &e.node))
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|e| e.node.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list it as a dependency).
    pub fn dependents_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|e| e.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Tasks with no dependencies.
    pub fn roots(&self) -> Vec<&str> {
        self.all_ids()
            .filter(|id| self.dependencies_of(id).is_empty())
            .collect()
    }

    /// Tasks no other task depends on.
    pub fn sinks(&self) -> Vec<&str> {
        self.all_ids()
            .filter(|id| self.dependents_of(id).is_empty())
            .collect()
    }

    /// The single sink whose result is the run's final output.
    ///
    /// Fails with [`AgentDagError::NoTerminalTask`] when the graph has
    /// zero sinks or more than one.
    pub fn terminal_task(&self) -> Result<&str> {
        let sinks = self.sinks();
        match sinks.as_slice() {
            [only] => Ok(*only),
            [] => Err(AgentDagError::NoTerminalTask(
                "graph has no task without dependents".to_string(),
            )),
            many => Err(AgentDagError::NoTerminalTask(format!(
                "final output is ambiguous; {} tasks have no dependents: {:?}",
                many.len(),
                many
            ))),
        }
    }

    /// Wave partition of a fully successful run: each inner vector holds
    /// the tasks whose dependencies all sit in earlier waves.
    pub fn planned_waves(&self) -> Vec<Vec<&str>> {
        let mut depth: HashMap<&str, usize> = HashMap::new();
        let mut remaining: Vec<&str> = self.all_ids().collect();
        let mut waves: Vec<Vec<&str>> = Vec::new();

        while !remaining.is_empty() {
            let wave_idx = waves.len();
            let (ready, blocked): (Vec<&str>, Vec<&str>) =
                remaining.into_iter().partition(|id| {
                    self.dependencies_of(id)
                        .iter()
                        .all(|dep| depth.get(dep.as_str()).is_some_and(|d| *d < wave_idx))
                });

            if ready.is_empty() {
                // Only reachable for unvalidated graphs with cycles.
                break;
            }

            for id in ready.iter() {
                depth.insert(*id, wave_idx);
            }
            waves.push(ready);
            remaining = blocked;
        }

        waves
    }
}

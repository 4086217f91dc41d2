// src/dag/task_info.rs

//! Per-run task state and the dispatch description handed to executors.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::dag::graph::TaskNode;
use crate::engine::TaskId;

/// Per-run state of a task.
///
/// Every task starts `Pending`, moves to `Running` when dispatched, and
/// ends in exactly one of `Completed` / `Failed`. States never revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Waiting for dependencies (or blocked forever by a failed one).
    Pending,
    /// Dispatched to the executor; worker in flight.
    Running,
    /// Worker returned a result, stored in the result store.
    Completed,
    /// Worker failed, timed out, panicked, or could not be constructed.
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Description of a task that the scheduler wants the executor to run now.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub agent_kind: String,
    pub display_name: String,
    /// Aggregated outputs of the task's dependencies.
    pub input: Value,
    /// 1-based wave number; all tasks of one wave share it.
    pub wave: u32,
}

impl ScheduledTask {
    pub fn from_node(node: &TaskNode, input: Value, wave: u32) -> Self {
        Self {
            id: node.id.clone(),
            agent_kind: node.agent_kind.clone(),
            display_name: node.display_name.clone(),
            input,
            wave,
        }
    }
}

// src/engine/report.rs

//! Structured summary of a coordinator run.

use std::fmt;

use serde::Serialize;

use crate::engine::{FailureKind, TaskFailure, TaskId};
use crate::errors::AgentDagError;

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every task completed.
    Complete,
    /// Some tasks failed; every task still pending sits below a failure.
    Partial,
    /// Some pending task can never run and is not blocked by a failure.
    Deadlocked,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Complete => "complete",
            RunStatus::Partial => "partial",
            RunStatus::Deadlocked => "deadlocked",
        };
        f.write_str(s)
    }
}

/// A task that ended in `Failed`, with the recorded reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTask {
    pub id: TaskId,
    pub kind: FailureKind,
    pub message: String,
}

impl FailedTask {
    pub fn new(id: TaskId, failure: Option<TaskFailure>) -> Self {
        match failure {
            Some(f) => Self {
                id,
                kind: f.kind,
                message: f.message,
            },
            None => Self {
                id,
                kind: FailureKind::Worker,
                message: "no failure details recorded".to_string(),
            },
        }
    }

    /// The failure as a crate error, for logging at the run boundary.
    pub fn to_error(&self) -> AgentDagError {
        AgentDagError::WorkerExecution {
            task: self.id.clone(),
            message: format!("{} ({})", self.message, self.kind),
        }
    }
}

/// `{status, waves, completed, failed, pending}` snapshot of a run.
///
/// Task lists follow graph definition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    /// Number of waves dispatched.
    pub waves: u32,
    pub completed: Vec<TaskId>,
    pub failed: Vec<FailedTask>,
    pub pending: Vec<TaskId>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.id.as_str()).collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} wave(s): {} completed, {} failed, {} pending",
            self.status,
            self.waves,
            self.completed.len(),
            self.failed.len(),
            self.pending.len()
        )
    }
}

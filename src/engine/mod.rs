// src/engine/mod.rs

//! Orchestration engine for agentdag.
//!
//! This module ties together:
//! - the pure per-run scheduler (`crate::dag::Scheduler`)
//! - the executor backend that actually runs workers (`crate::exec`)
//! - the wave loop that drives both until the run is finished or stalled
//!
//! The wave loop lives in [`runtime`]; the structured run summary in
//! [`report`].

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Canonical task identifier type used throughout the engine.
pub type TaskId = String;

/// Why a task ended up `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The task's agent kind is not registered.
    UnknownAgentKind,
    /// The worker's `process` returned an error.
    Worker,
    /// The worker did not answer within the configured task timeout.
    Timeout,
    /// The worker panicked.
    Panicked,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::UnknownAgentKind => "unknown_agent_kind",
            FailureKind::Worker => "worker",
            FailureKind::Timeout => "timeout",
            FailureKind::Panicked => "panicked",
        };
        f.write_str(s)
    }
}

/// Failure details recorded for a `Failed` task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TaskFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of a single dispatched task, as reported back to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// The worker returned; the payload is the reply envelope's content.
    Success(Value),
    Failed(TaskFailure),
}

/// Options for a single coordinator run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Return [`crate::errors::AgentDagError::Deadlock`] when the run
    /// stalls with pending tasks, instead of a partial report.
    pub strict: bool,
}

pub mod report;
pub mod runtime;

pub use report::{FailedTask, RunReport, RunStatus};
pub use runtime::{Coordinator, RunOutput};

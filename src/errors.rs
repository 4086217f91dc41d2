// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only structural problems surface as errors from a run. Failures of
//! individual workers are contained by the scheduler and show up as
//! `Failed` task states in the [`RunReport`](crate::engine::RunReport).

use thiserror::Error;

use crate::engine::{RunReport, TaskId};

#[derive(Error, Debug)]
pub enum AgentDagError {
    #[error("Graph definition error: {0}")]
    GraphDefinition(String),

    #[error("Unknown agent kind '{kind}' for task '{task}'")]
    UnknownAgentKind { task: TaskId, kind: String },

    #[error("Task '{task}' failed: {message}")]
    WorkerExecution { task: TaskId, message: String },

    #[error("Deadlock: no runnable tasks while {} remain pending: {stuck:?}", stuck.len())]
    Deadlock { stuck: Vec<TaskId> },

    #[error("No terminal task: {0}")]
    NoTerminalTask(String),

    #[error("Incomplete run: terminal task '{terminal}' did not complete (status: {})", report.status)]
    IncompleteRun {
        terminal: TaskId,
        report: Box<RunReport>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, AgentDagError>;

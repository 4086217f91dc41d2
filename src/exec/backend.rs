// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The coordinator hands each wave to an `ExecutorBackend` and waits for
//! every outcome before asking the scheduler for the next wave. This makes
//! it easy to swap in a scripted executor in tests while keeping the
//! production worker dispatch in [`AgentBackend`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, error};

use crate::agents::AgentRegistry;
use crate::dag::ScheduledTask;
use crate::engine::{FailureKind, TaskFailure, TaskId, TaskOutcome};

use super::task_runner::run_task;

/// Boxed future returned by [`ExecutorBackend::dispatch_wave`].
pub type WaveFuture<'a> = Pin<Box<dyn Future<Output = Vec<(TaskId, TaskOutcome)>> + Send + 'a>>;

/// Trait abstracting how a wave of scheduled tasks is executed.
///
/// Implementations must return exactly one outcome per dispatched task.
/// The coordinator fails any dispatched task missing from the returned
/// list.
pub trait ExecutorBackend: Send {
    fn dispatch_wave(&mut self, tasks: Vec<ScheduledTask>) -> WaveFuture<'_>;
}

/// Production backend: resolves one worker per task through the
/// [`AgentRegistry`] and runs the whole wave concurrently.
///
/// Each task gets its own tokio task, so a panicking worker only fails
/// its own node.
#[derive(Debug, Clone)]
pub struct AgentBackend {
    registry: Arc<AgentRegistry>,
    /// Name used as the envelope sender.
    sender: String,
    task_timeout: Option<Duration>,
}

impl AgentBackend {
    pub fn new(registry: Arc<AgentRegistry>, sender: impl Into<String>) -> Self {
        Self {
            registry,
            sender: sender.into(),
            task_timeout: None,
        }
    }

    pub fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }
}

impl ExecutorBackend for AgentBackend {
    fn dispatch_wave(&mut self, tasks: Vec<ScheduledTask>) -> WaveFuture<'_> {
        Box::pin(async move {
            let ids: Vec<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();
            debug!(tasks = ?ids, "spawning wave workers");

            let handles: Vec<_> = tasks
                .into_iter()
                .map(|task| {
                    let registry = Arc::clone(&self.registry);
                    let sender = self.sender.clone();
                    let timeout = self.task_timeout;
                    tokio::spawn(async move { run_task(task, &registry, &sender, timeout).await })
                })
                .collect();

            join_all(handles)
                .await
                .into_iter()
                .zip(ids)
                .map(|(joined, id)| match joined {
                    Ok(outcome) => (id, outcome),
                    Err(join_err) => {
                        let message = if join_err.is_panic() {
                            "worker panicked".to_string()
                        } else {
                            format!("worker task aborted: {join_err}")
                        };
                        error!(task = %id, error = %join_err, "worker did not return");
                        let failure = TaskFailure::new(FailureKind::Panicked, message);
                        (id, TaskOutcome::Failed(failure))
                    }
                })
                .collect()
        })
    }
}

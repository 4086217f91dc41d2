// src/exec/task_runner.rs

//! Single task execution: resolve the worker, send one envelope, wait.

use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::agents::{AgentRegistry, Envelope};
use crate::dag::ScheduledTask;
use crate::engine::{FailureKind, TaskFailure, TaskOutcome};

/// Run one scheduled task to an outcome.
///
/// Never returns an error: an unknown agent kind, a worker error and a
/// timeout all become [`TaskOutcome::Failed`] with the matching
/// [`FailureKind`].
pub async fn run_task(
    task: ScheduledTask,
    registry: &AgentRegistry,
    sender: &str,
    timeout: Option<Duration>,
) -> TaskOutcome {
    let worker = match registry.create(&task.id, &task.agent_kind, &task.display_name) {
        Ok(worker) => worker,
        Err(err) => {
            error!(
                task = %task.id,
                kind = %task.agent_kind,
                "cannot construct worker"
            );
            return TaskOutcome::Failed(TaskFailure::new(
                FailureKind::UnknownAgentKind,
                err.to_string(),
            ));
        }
    };

    info!(
        task = %task.id,
        wave = task.wave,
        agent = %worker.name(),
        kind = %task.agent_kind,
        "starting task"
    );

    let envelope = Envelope::new(task.input, sender, task.display_name.as_str());
    let started = Instant::now();

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, worker.process(envelope)).await {
            Ok(res) => res,
            Err(_) => {
                error!(task = %task.id, timeout = ?limit, "task timed out");
                return TaskOutcome::Failed(TaskFailure::new(
                    FailureKind::Timeout,
                    format!("no reply within {limit:?}"),
                ));
            }
        },
        None => worker.process(envelope).await,
    };

    match result {
        Ok(reply) => {
            info!(
                task = %task.id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "task completed"
            );
            TaskOutcome::Success(reply.content)
        }
        Err(err) => {
            error!(task = %task.id, error = %format!("{err:#}"), "task failed");
            TaskOutcome::Failed(TaskFailure::new(FailureKind::Worker, format!("{err:#}")))
        }
    }
}

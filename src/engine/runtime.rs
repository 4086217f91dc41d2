// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::agents::AgentRegistry;
use crate::dag::{ScheduledTask, Scheduler, SchedulerStep, TaskGraph};
use crate::errors::{AgentDagError, Result};
use crate::exec::{AgentBackend, ExecutorBackend};

use super::{FailureKind, RunOptions, RunReport, TaskFailure, TaskId, TaskOutcome};

/// Final output of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    /// Id of the single sink task.
    pub terminal: TaskId,
    /// The terminal task's result.
    pub payload: Value,
    pub report: RunReport,
}

/// Drives the DAG scheduler wave by wave and delegates worker execution
/// to an `ExecutorBackend`.
///
/// This is the async shell around `Scheduler`, which contains all the
/// scheduling semantics. The coordinator only moves tasks from the
/// scheduler to the executor and outcomes back, one wave at a time.
pub struct Coordinator<E: ExecutorBackend> {
    name: String,
    scheduler: Scheduler,
    executor: E,
    options: RunOptions,
}

impl<E: ExecutorBackend> fmt::Debug for Coordinator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("name", &self.name)
            .field("scheduler", &self.scheduler)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Coordinator<AgentBackend> {
    /// Coordinator backed by the production [`AgentBackend`].
    pub fn with_registry(
        name: impl Into<String>,
        graph: Arc<TaskGraph>,
        registry: Arc<AgentRegistry>,
        options: RunOptions,
    ) -> Self {
        let name = name.into();
        let executor = AgentBackend::new(registry, name.clone());
        Self::new(name, graph, executor, options)
    }
}

impl<E: ExecutorBackend> Coordinator<E> {
    pub fn new(name: impl Into<String>, graph: Arc<TaskGraph>, executor: E, options: RunOptions) -> Self {
        Self {
            name: name.into(),
            scheduler: Scheduler::new(graph),
            executor,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read access to the per-run state, for inspection after a run.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Run waves until nothing is pending or no progress is possible.
    ///
    /// Worker failures never surface here; they are recorded in the
    /// returned report. In strict mode a stall is an error.
    pub async fn execute(&mut self) -> Result<RunReport> {
        info!(
            coordinator = %self.name,
            tasks = self.scheduler.graph().len(),
            strict = self.options.strict,
            "run started"
        );

        loop {
            match self.scheduler.next_wave() {
                SchedulerStep::Finished => break,
                SchedulerStep::Stalled { pending } => {
                    if self.options.strict {
                        error!(stuck = ?pending, "run deadlocked");
                        return Err(AgentDagError::Deadlock { stuck: pending });
                    }
                    warn!(
                        pending = ?pending,
                        "stopping run; remaining tasks can never become ready"
                    );
                    break;
                }
                SchedulerStep::WaveInFlight { running } => {
                    error!(?running, "wave outcomes were not all recorded");
                    return Err(AgentDagError::Other(anyhow::anyhow!(
                        "scheduler still has running tasks: {running:?}"
                    )));
                }
                SchedulerStep::Dispatch { wave, tasks } => {
                    self.run_wave(wave, tasks).await;
                }
            }
        }

        let report = self.scheduler.report();
        info!(
            status = %report.status,
            waves = report.waves,
            completed = report.completed.len(),
            failed = report.failed.len(),
            pending = report.pending.len(),
            "run finished"
        );
        Ok(report)
    }

    /// Execute the graph and return the terminal task's result.
    ///
    /// The terminal task is resolved before anything is dispatched, so an
    /// ambiguous graph never spends a worker call.
    pub async fn run(&mut self) -> Result<RunOutput> {
        let terminal = self.scheduler.graph().terminal_task()?.to_string();
        debug!(terminal = %terminal, "resolved terminal task");

        let report = self.execute().await?;

        match self.scheduler.result_of(&terminal) {
            Some(payload) => Ok(RunOutput {
                payload: payload.clone(),
                terminal,
                report,
            }),
            None => {
                error!(
                    terminal = %terminal,
                    status = %report.status,
                    "terminal task did not complete"
                );
                Err(AgentDagError::IncompleteRun {
                    terminal,
                    report: Box::new(report),
                })
            }
        }
    }

    async fn run_wave(&mut self, wave: u32, tasks: Vec<ScheduledTask>) {
        let dispatched: Vec<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();
        debug!(wave, tasks = ?dispatched, "awaiting wave");

        let outcomes = self.executor.dispatch_wave(tasks).await;

        let mut answered: Vec<TaskId> = Vec::with_capacity(outcomes.len());
        for (id, outcome) in outcomes {
            answered.push(id.clone());
            self.scheduler.handle_completion(&id, outcome);
        }

        // Every dispatched task must end the wave Completed or Failed.
        for id in dispatched.iter().filter(|id| !answered.contains(id)) {
            error!(task = %id, wave, "executor returned no outcome for task");
            self.scheduler.handle_completion(
                id,
                TaskOutcome::Failed(TaskFailure::new(
                    FailureKind::Worker,
                    "executor returned no outcome",
                )),
            );
        }

        debug!(wave, "wave joined");
    }
}

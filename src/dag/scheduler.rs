// src/dag/scheduler.rs

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::inputs::collect_inputs;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::{StateManager, StateView};
use crate::dag::task_info::{ScheduledTask, TaskState};
use crate::engine::report::{FailedTask, RunReport, RunStatus};
use crate::engine::{TaskFailure, TaskId, TaskOutcome};

/// Scheduler holds the immutable graph plus mutable per-run state.
///
/// It is a pure, synchronous state machine: no Tokio, no workers, no IO.
/// It is responsible for:
/// - deciding which pending tasks are ready (all dependencies completed)
/// - building each ready task's input from the result store
/// - recording outcomes (result on success, failure details otherwise)
/// - recognising when the run is finished or stalled
///
/// It owns the task states and the result store exclusively; the async
/// shell (`engine::Coordinator`) only talks to it between waves.
#[derive(Debug)]
pub struct Scheduler {
    graph: Arc<TaskGraph>,
    states: HashMap<TaskId, TaskState>,
    results: HashMap<TaskId, Value>,
    failures: HashMap<TaskId, TaskFailure>,
    /// Number of waves dispatched so far.
    waves: u32,
}

impl Scheduler {
    /// Create a scheduler with every task `Pending`.
    pub fn new(graph: Arc<TaskGraph>) -> Self {
        let states = graph
            .all_ids()
            .map(|id| (id.to_string(), TaskState::Pending))
            .collect();

        Self {
            graph,
            states,
            results: HashMap::new(),
            failures: HashMap::new(),
            waves: 0,
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn waves(&self) -> u32 {
        self.waves
    }

    pub fn state_of(&self, id: &str) -> Option<TaskState> {
        self.states.get(id).copied()
    }

    pub fn result_of(&self, id: &str) -> Option<&Value> {
        self.results.get(id)
    }

    pub fn failure_of(&self, id: &str) -> Option<&TaskFailure> {
        self.failures.get(id)
    }

    /// The result store: one entry per completed task.
    pub fn results(&self) -> &HashMap<TaskId, Value> {
        &self.results
    }

    /// Whether all dependencies of `id` are `Completed`.
    ///
    /// Returns `None` if the task is unknown.
    pub fn deps_satisfied(&self, id: &str) -> Option<bool> {
        if !self.graph.contains(id) {
            return None;
        }
        Some(self.view().deps_satisfied(id))
    }

    /// `true` once no task is `Pending` or `Running`.
    pub fn is_finished(&self) -> bool {
        let view = self.view();
        !view.has_pending() && !view.has_running()
    }

    /// Compute the next wave.
    ///
    /// Ready tasks are marked `Running` and returned with their inputs.
    /// While a previous wave is still in flight this dispatches nothing and
    /// returns `WaveInFlight` with the running ids.
    pub fn next_wave(&mut self) -> SchedulerStep {
        let view = self.view();
        if view.has_running() {
            let running = view.ids_in(TaskState::Running);
            warn!(?running, "next_wave called while tasks are still running");
            return SchedulerStep::WaveInFlight { running };
        }
        if !view.has_pending() {
            return SchedulerStep::Finished;
        }

        let ready = StateManager::new(&self.graph, &mut self.states).take_ready_tasks();

        if ready.is_empty() {
            let pending = self.view().ids_in(TaskState::Pending);
            warn!(
                ?pending,
                "no runnable tasks; remaining tasks have unsatisfied dependencies"
            );
            return SchedulerStep::Stalled { pending };
        }

        self.waves += 1;
        let wave = self.waves;

        let tasks: Vec<ScheduledTask> = ready
            .iter()
            .filter_map(|id| self.graph.get(id))
            .map(|node| {
                let input = collect_inputs(&node.dependencies, &self.results);
                ScheduledTask::from_node(node, input, wave)
            })
            .collect();

        info!(
            wave,
            tasks = ?ready,
            "dispatching wave"
        );

        SchedulerStep::Dispatch { wave, tasks }
    }

    /// Record the outcome of a `Running` task.
    ///
    /// Outcomes for unknown tasks or tasks that are not `Running` are
    /// logged and ignored.
    pub fn handle_completion(&mut self, id: &str, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Success(payload) => {
                if StateManager::new(&self.graph, &mut self.states).finish(id, TaskState::Completed)
                {
                    debug!(task = %id, "task completed");
                    self.results.insert(id.to_string(), payload);
                }
            }
            TaskOutcome::Failed(failure) => {
                if StateManager::new(&self.graph, &mut self.states).finish(id, TaskState::Failed) {
                    let pruned = self.view().transitive_dependents(id);
                    warn!(
                        task = %id,
                        kind = %failure.kind,
                        error = %failure.message,
                        ?pruned,
                        "task failed; dependents can no longer run"
                    );
                    self.failures.insert(id.to_string(), failure);
                }
            }
        }
    }

    /// Structured summary of the run so far.
    pub fn report(&self) -> RunReport {
        let view = self.view();
        let completed = view.ids_in(TaskState::Completed);
        let pending = view.ids_in(TaskState::Pending);
        let failed: Vec<FailedTask> = view
            .ids_in(TaskState::Failed)
            .into_iter()
            .map(|id| {
                let failure = self.failures.get(&id).cloned();
                FailedTask::new(id, failure)
            })
            .collect();

        let status = if pending.is_empty() && failed.is_empty() {
            RunStatus::Complete
        } else if pending.iter().all(|id| view.blocked_by_failure(id)) {
            RunStatus::Partial
        } else {
            RunStatus::Deadlocked
        };

        RunReport {
            status,
            waves: self.waves,
            completed,
            failed,
            pending,
        }
    }

    fn view(&self) -> StateView<'_> {
        StateView::new(&self.graph, &self.states)
    }
}

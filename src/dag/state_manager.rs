// src/dag/state_manager.rs

//! Per-run state transitions and readiness checks.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::dag::task_info::TaskState;
use crate::dag::TaskGraph;
use crate::engine::TaskId;

/// Mutating view over the per-run task states.
pub struct StateManager<'a> {
    graph: &'a TaskGraph,
    states: &'a mut HashMap<TaskId, TaskState>,
}

impl<'a> StateManager<'a> {
    pub fn new(graph: &'a TaskGraph, states: &'a mut HashMap<TaskId, TaskState>) -> Self {
        Self { graph, states }
    }

    /// Collect tasks that are `Pending` and whose dependencies are all
    /// `Completed`, mark them `Running`, and return their ids in definition
    /// order.
    pub fn take_ready_tasks(&mut self) -> Vec<TaskId> {
        // Decide first, then mutate to avoid borrowing issues.
        let ready: Vec<TaskId> = {
            let view = StateView::new(self.graph, self.states);
            view.ready_tasks()
        };

        for id in ready.iter() {
            if let Some(state) = self.states.get_mut(id) {
                debug!(task = %id, "dependencies completed; marking Running");
                *state = TaskState::Running;
            }
        }

        ready
    }

    /// Move a `Running` task to a terminal state.
    ///
    /// Returns `false` (and leaves the state untouched) if the task is
    /// unknown or was not `Running`.
    pub fn finish(&mut self, id: &str, terminal: TaskState) -> bool {
        debug_assert!(terminal.is_terminal());

        match self.states.get_mut(id) {
            Some(state) if *state == TaskState::Running => {
                *state = terminal;
                true
            }
            Some(state) => {
                warn!(
                    task = %id,
                    current = %state,
                    "ignoring completion for task that is not Running"
                );
                false
            }
            None => {
                warn!(task = %id, "completion for unknown task; ignoring");
                false
            }
        }
    }
}

/// Read-only view over the per-run task states.
///
/// Used wherever only shared access is available (reports, diagnostics,
/// `Scheduler::deps_satisfied`).
pub struct StateView<'a> {
    graph: &'a TaskGraph,
    states: &'a HashMap<TaskId, TaskState>,
}

impl<'a> StateView<'a> {
    pub fn new(graph: &'a TaskGraph, states: &'a HashMap<TaskId, TaskState>) -> Self {
        Self { graph, states }
    }

    pub fn state_of(&self, id: &str) -> Option<TaskState> {
        self.states.get(id).copied()
    }

    /// Whether every dependency of `id` is `Completed`.
    ///
    /// A `Failed` dependency never satisfies this, which is what prunes the
    /// subtree below a failure.
    pub fn deps_satisfied(&self, id: &str) -> bool {
        self.graph
            .dependencies_of(id)
            .iter()
            .all(|dep| matches!(self.states.get(dep), Some(TaskState::Completed)))
    }

    /// Pending tasks whose dependencies are all completed, in definition
    /// order.
    pub fn ready_tasks(&self) -> Vec<TaskId> {
        self.graph
            .all_ids()
            .filter(|id| matches!(self.states.get(*id), Some(TaskState::Pending)))
            .filter(|id| self.deps_satisfied(id))
            .map(|id| id.to_string())
            .collect()
    }

    /// All ids currently in `state`, in definition order.
    pub fn ids_in(&self, state: TaskState) -> Vec<TaskId> {
        self.graph
            .all_ids()
            .filter(|id| self.states.get(*id) == Some(&state))
            .map(|id| id.to_string())
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        self.states.values().any(|s| *s == TaskState::Pending)
    }

    pub fn has_running(&self) -> bool {
        self.states.values().any(|s| *s == TaskState::Running)
    }

    /// Whether `id` has a `Failed` task among its transitive dependencies.
    pub fn blocked_by_failure(&self, id: &str) -> bool {
        let mut stack: Vec<&str> = self
            .graph
            .dependencies_of(id)
            .iter()
            .map(|s| s.as_str())
            .collect();
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(dep) = stack.pop() {
            if !visited.insert(dep) {
                continue;
            }
            if self.states.get(dep) == Some(&TaskState::Failed) {
                return true;
            }
            stack.extend(self.graph.dependencies_of(dep).iter().map(|s| s.as_str()));
        }

        false
    }

    /// Transitive dependents of `id` (tasks that can no longer run if `id`
    /// fails), in discovery order.
    pub fn transitive_dependents(&self, id: &str) -> Vec<TaskId> {
        let mut stack: Vec<&str> = self
            .graph
            .dependents_of(id)
            .iter()
            .map(|s| s.as_str())
            .collect();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut out = Vec::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name) {
                continue;
            }
            out.push(name.to_string());
            stack.extend(self.graph.dependents_of(name).iter().map(|s| s.as_str()));
        }

        out
    }
}

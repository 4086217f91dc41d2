use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use agentdag::dag::ScheduledTask;
use agentdag::engine::{FailureKind, TaskFailure, TaskOutcome};
use agentdag::exec::{ExecutorBackend, WaveFuture};

/// A fake executor that:
/// - records every dispatched wave
/// - answers each task immediately, without constructing a worker
///
/// By default a task succeeds with `{"task": <id>, "input": <its input>}`,
/// so tests can assert on what each task received. Individual tasks can be
/// scripted to fail, to return a specific value, or to get no answer.
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    scripted: HashMap<String, TaskOutcome>,
    silent: HashSet<String>,
    waves: Arc<Mutex<Vec<Vec<ScheduledTask>>>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeed_with(mut self, task: &str, payload: Value) -> Self {
        self.scripted
            .insert(task.to_string(), TaskOutcome::Success(payload));
        self
    }

    pub fn fail(mut self, task: &str, message: &str) -> Self {
        self.scripted.insert(
            task.to_string(),
            TaskOutcome::Failed(TaskFailure::new(FailureKind::Worker, message)),
        );
        self
    }

    /// Leave `task` out of the wave's outcomes entirely.
    pub fn no_outcome_for(mut self, task: &str) -> Self {
        self.silent.insert(task.to_string());
        self
    }

    /// Shared handle to the recorded waves.
    pub fn recorded(&self) -> Arc<Mutex<Vec<Vec<ScheduledTask>>>> {
        Arc::clone(&self.waves)
    }

    /// Task ids per dispatched wave.
    pub fn wave_ids(&self) -> Vec<Vec<String>> {
        self.waves
            .lock()
            .unwrap()
            .iter()
            .map(|wave| wave.iter().map(|t| t.id.clone()).collect())
            .collect()
    }

    /// The input a task was dispatched with, if it was dispatched.
    pub fn input_of(&self, task: &str) -> Option<Value> {
        self.waves
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .find(|t| t.id == task)
            .map(|t| t.input.clone())
    }
}

impl ExecutorBackend for FakeExecutor {
    fn dispatch_wave(&mut self, tasks: Vec<ScheduledTask>) -> WaveFuture<'_> {
        Box::pin(async move {
            self.waves.lock().unwrap().push(tasks.clone());

            tasks
                .into_iter()
                .filter(|t| !self.silent.contains(&t.id))
                .map(|t| {
                    let outcome = self.scripted.get(&t.id).cloned().unwrap_or_else(|| {
                        TaskOutcome::Success(json!({ "task": t.id, "input": t.input }))
                    });
                    (t.id, outcome)
                })
                .collect()
        })
    }
}

// tests/property_waves.rs

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;

use agentdag::dag::{Scheduler, SchedulerStep, TaskGraph, TaskState};
use agentdag::engine::{FailureKind, TaskFailure, TaskOutcome};
use agentdag_test_utils::builders::GraphBuilder;

// Strategy to generate a valid DAG.
// Acyclicity is ensured by only letting task N depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Arc<TaskGraph>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..4),
            num_tasks,
        )
        .prop_map(|raw_deps| {
            let mut builder = GraphBuilder::new();
            for (i, potential) in raw_deps.into_iter().enumerate() {
                let deps: BTreeSet<String> = if i == 0 {
                    BTreeSet::new()
                } else {
                    potential.into_iter().map(|d| format!("t{}", d % i)).collect()
                };
                let deps: Vec<&str> = deps.iter().map(|s| s.as_str()).collect();
                builder = builder.task(&format!("t{i}"), "Echo", &deps);
            }
            builder.build()
        })
    })
}

proptest! {
    #[test]
    fn runs_finish_within_n_waves_and_respect_dependencies(
        graph in dag_strategy(12),
        failing in proptest::collection::hash_set(0..12usize, 0..4),
    ) {
        let n = graph.len();
        let failing: HashSet<String> = failing.into_iter().map(|i| format!("t{i}")).collect();
        let mut scheduler = Scheduler::new(Arc::clone(&graph));
        let mut dispatched: HashSet<String> = HashSet::new();

        loop {
            match scheduler.next_wave() {
                SchedulerStep::Dispatch { tasks, .. } => {
                    prop_assert!(!tasks.is_empty());
                    for task in tasks.iter() {
                        // Never dispatched before every dependency completed.
                        for dep in graph.dependencies_of(&task.id) {
                            prop_assert_eq!(scheduler.state_of(dep), Some(TaskState::Completed));
                        }
                        prop_assert!(dispatched.insert(task.id.clone()), "dispatched twice");
                    }
                    for task in tasks {
                        let outcome = if failing.contains(&task.id) {
                            TaskOutcome::Failed(TaskFailure::new(FailureKind::Worker, "scripted"))
                        } else {
                            TaskOutcome::Success(json!(task.id))
                        };
                        scheduler.handle_completion(&task.id, outcome);
                    }
                }
                SchedulerStep::Stalled { pending } => {
                    // Only failures can stall an acyclic graph.
                    for id in pending.iter() {
                        prop_assert_eq!(scheduler.state_of(id), Some(TaskState::Pending));
                    }
                    prop_assert!(!failing.is_empty());
                    break;
                }
                SchedulerStep::Finished => break,
                SchedulerStep::WaveInFlight { running } => {
                    prop_assert!(false, "wave left running: {:?}", running);
                }
            }
            prop_assert!(scheduler.waves() as usize <= n);
        }

        prop_assert!(scheduler.waves() as usize <= n);

        // Dependents of failed tasks never left Pending.
        for id in graph.all_ids() {
            let blocked = graph
                .dependencies_of(id)
                .iter()
                .any(|dep| scheduler.state_of(dep) == Some(TaskState::Failed));
            if blocked {
                prop_assert_eq!(scheduler.state_of(id), Some(TaskState::Pending));
            }
        }

        // Without failures every task completes, in planned_waves() many waves.
        let report = scheduler.report();
        if report.failed.is_empty() {
            prop_assert_eq!(report.completed.len(), n);
            prop_assert_eq!(scheduler.waves() as usize, graph.planned_waves().len());
        }
    }
}

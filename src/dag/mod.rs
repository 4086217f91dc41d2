// src/dag/mod.rs

//! DAG representation and scheduling.
//!
//! - [`graph`] holds the immutable task graph built from a validated
//!   definition.
//! - [`scheduler`] contains the per-run state machine that decides
//!   which tasks are ready, builds their inputs and records outcomes.
//! - [`inputs`] implements the dependency-arity input aggregation.
//! - [`task_info`] provides per-run task state and scheduled task types.
//! - [`scheduler_step`] defines the result type for scheduler steps.
//! - [`state_manager`] manages per-run state transitions.

pub mod graph;
pub mod inputs;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_info;

pub use graph::{TaskGraph, TaskNode};
pub use inputs::collect_inputs;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task_info::{ScheduledTask, TaskState};

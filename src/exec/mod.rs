// src/exec/mod.rs

//! Worker execution layer.
//!
//! This module is responsible for actually running the workers behind the
//! scheduled tasks and reporting one outcome per task back to the
//! coordinator.
//!
//! - [`task_runner`] handles a single task: worker construction, envelope,
//!   optional timeout.
//! - [`backend`] provides the `ExecutorBackend` trait and the concrete
//!   `AgentBackend` that the coordinator uses in production, and which
//!   tests can replace with a scripted implementation.

pub mod backend;
pub mod task_runner;

pub use backend::{AgentBackend, ExecutorBackend, WaveFuture};
pub use task_runner::run_task;

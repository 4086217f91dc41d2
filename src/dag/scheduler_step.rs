// src/dag/scheduler_step.rs

//! Result type for a single scheduling iteration.

use crate::dag::task_info::ScheduledTask;
use crate::engine::TaskId;

/// What the scheduler decided when asked for the next wave.
///
/// Tests use this to step a run manually and assert on each transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerStep {
    /// Dispatch these tasks concurrently; they are now `Running`.
    Dispatch { wave: u32, tasks: Vec<ScheduledTask> },
    /// Tasks remain `Pending` but none of them can become ready.
    Stalled { pending: Vec<TaskId> },
    /// Every task reached `Completed` or `Failed`.
    Finished,
    /// The previous wave has not been fully reported yet; nothing was
    /// dispatched.
    WaveInFlight { running: Vec<TaskId> },
}

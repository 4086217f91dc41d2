// src/agents/worker.rs

//! Uniform worker contract.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;

use super::message::Envelope;

/// Boxed future returned by [`Worker::process`].
pub type WorkerFuture<'a> = Pin<Box<dyn Future<Output = Result<Envelope>> + Send + 'a>>;

/// A unit of task-specific processing.
///
/// The executor constructs one worker per dispatched task (through the
/// [`AgentRegistry`](super::AgentRegistry)) and calls `process` exactly
/// once. Any error is recorded as a task failure; it never aborts the run.
///
/// Workers doing blocking IO must offload it themselves (e.g.
/// `tokio::task::spawn_blocking`) so siblings in the same wave keep going.
pub trait Worker: Send + Sync {
    /// Address of this worker instance (the task's `display_name`).
    fn name(&self) -> &str;

    fn process(&self, message: Envelope) -> WorkerFuture<'_>;
}

type ProcessFn = dyn Fn(Envelope) -> WorkerFuture<'static> + Send + Sync;

/// Worker backed by an async closure.
///
/// ```
/// use agentdag::agents::{Envelope, FnWorker, Worker};
///
/// let worker = FnWorker::new("Echo", |msg: Envelope| async move {
///     Ok::<_, agentdag::errors::Error>(msg.reply(msg.content.clone()))
/// });
/// assert_eq!(worker.name(), "Echo");
/// ```
#[derive(Clone)]
pub struct FnWorker {
    name: String,
    func: Arc<ProcessFn>,
}

impl FnWorker {
    pub fn new<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Envelope) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Envelope>> + Send + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(move |msg| Box::pin(func(msg))),
        }
    }
}

impl fmt::Debug for FnWorker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnWorker")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Worker for FnWorker {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, message: Envelope) -> WorkerFuture<'_> {
        (self.func)(message)
    }
}

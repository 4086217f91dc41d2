// src/agents/mod.rs

//! Workers and the agent dispatch resolver.
//!
//! - [`message`] defines the `Envelope` exchanged with workers.
//! - [`worker`] defines the uniform `Worker` contract.
//! - [`registry`] maps agent kinds to worker factories.
//! - [`documents`] contains the built-in document pipeline agents.

pub mod documents;
pub mod message;
pub mod registry;
pub mod worker;

pub use message::Envelope;
pub use registry::{AgentRegistry, WorkerFactory};
pub use worker::{FnWorker, Worker, WorkerFuture};

//! Fake workers and a scripted chat model.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use serde_json::Value;

use agentdag::agents::{AgentRegistry, Envelope, FnWorker, Worker};
use agentdag::llm::{ChatFuture, ChatModel, ChatRequest};

/// Worker that always answers with `payload`.
pub fn fixed_worker(name: &str, payload: Value) -> FnWorker {
    FnWorker::new(name, move |msg: Envelope| {
        let payload = payload.clone();
        async move { Ok::<_, anyhow::Error>(msg.reply(payload)) }
    })
}

/// Worker that answers with its input unchanged.
pub fn echo_worker(name: &str) -> FnWorker {
    FnWorker::new(name, |msg: Envelope| async move {
        let content = msg.content.clone();
        Ok::<_, anyhow::Error>(msg.reply(content))
    })
}

/// Worker whose `process` always errors.
pub fn failing_worker(name: &str, message: &str) -> FnWorker {
    let message = message.to_string();
    FnWorker::new(name, move |_msg: Envelope| {
        let message = message.clone();
        async move { Err::<Envelope, _>(anyhow!(message)) }
    })
}

/// Worker that sleeps before answering with `payload`.
pub fn slow_worker(name: &str, delay: Duration, payload: Value) -> FnWorker {
    FnWorker::new(name, move |msg: Envelope| {
        let payload = payload.clone();
        async move {
            tokio::time::sleep(delay).await;
            Ok::<_, anyhow::Error>(msg.reply(payload))
        }
    })
}

async fn explode(_msg: Envelope) -> anyhow::Result<Envelope> {
    panic!("worker exploded")
}

/// Worker that panics inside `process`.
pub fn panicking_worker(name: &str) -> FnWorker {
    FnWorker::new(name, explode)
}

/// Register a factory that clones `worker` under `kind`.
pub fn register_fn(registry: &mut AgentRegistry, kind: &str, worker: FnWorker) {
    registry.register(kind, move |_name: &str| -> Box<dyn Worker> {
        Box::new(worker.clone())
    });
}

/// Records every envelope received by workers built from it.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeLog {
    received: Arc<Mutex<Vec<Envelope>>>,
}

impl EnvelopeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo worker that records its envelope first.
    pub fn worker(&self, name: &str) -> FnWorker {
        let received = Arc::clone(&self.received);
        FnWorker::new(name, move |msg: Envelope| {
            received.lock().unwrap().push(msg.clone());
            async move {
                let content = msg.content.clone();
                Ok::<_, anyhow::Error>(msg.reply(content))
            }
        })
    }

    pub fn received(&self) -> Vec<Envelope> {
        self.received.lock().unwrap().clone()
    }
}

/// Tracks how many workers built from it run at the same time.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyProbe {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Worker that holds for `hold` while counted as running, then echoes.
    pub fn worker(&self, name: &str, hold: Duration) -> FnWorker {
        let current = Arc::clone(&self.current);
        let peak = Arc::clone(&self.peak);
        FnWorker::new(name, move |msg: Envelope| {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(hold).await;
                current.fetch_sub(1, Ordering::SeqCst);
                let content = msg.content.clone();
                Ok::<_, anyhow::Error>(msg.reply(content))
            }
        })
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Scripted chat model.
///
/// Replies come from the first rule whose needle occurs in the prompt,
/// else from the default reply. Without a default, unmatched prompts
/// fail. Every request is recorded.
#[derive(Debug, Clone, Default)]
pub struct FakeChatModel {
    rules: Vec<(String, Result<String, String>)>,
    default_reply: Option<String>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl FakeChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(reply: &str) -> Self {
        Self::new().with_default(reply)
    }

    pub fn with_default(mut self, reply: &str) -> Self {
        self.default_reply = Some(reply.to_string());
        self
    }

    pub fn on(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), Ok(reply.to_string())));
        self
    }

    pub fn fail_on(mut self, needle: &str, error: &str) -> Self {
        self.rules.push((needle.to_string(), Err(error.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, request: &ChatRequest) -> anyhow::Result<String> {
        let rule = self
            .rules
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()));
        match (rule, &self.default_reply) {
            (Some((_, Ok(reply))), _) => Ok(reply.clone()),
            (Some((_, Err(error))), _) => Err(anyhow!(error.clone())),
            (None, Some(reply)) => Ok(reply.clone()),
            (None, None) => Err(anyhow!("no scripted reply for prompt")),
        }
    }
}

impl ChatModel for FakeChatModel {
    fn complete(&self, request: ChatRequest) -> ChatFuture<'_> {
        self.requests.lock().unwrap().push(request.clone());
        let answer = self.answer(&request);
        Box::pin(async move { answer })
    }
}

//! Mock providers and head sources.

use async_trait::async_trait;
use kiln_core::{
    chain::HeadState,
    engine::{Flow, Provider, ProviderError},
    sync::{HeadFetchError, HeadSource},
    types::{Block, JsonRpcRequest},
};
use parking_lot::Mutex;
use serde_json::json;
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

/// What a [`CountingProvider`] does with a request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with the request's method name.
    Echo,
    /// Pass to the next provider.
    Pass,
    /// Abort with an internal error carrying the message.
    Fail(&'static str),
}

/// Provider that counts calls, remembers the methods it saw, and replies per [`Reply`].
///
/// A per-method delay can be set to control completion order in batch tests.
pub struct CountingProvider {
    name: &'static str,
    reply: Reply,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    delays: Mutex<Vec<(String, Duration)>>,
}

impl CountingProvider {
    #[must_use]
    pub fn new(name: &'static str, reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            delays: Mutex::new(Vec::new()),
        })
    }

    /// Delays handling of `method` by `delay`.
    pub fn delay(&self, method: &str, delay: Duration) {
        self.delays.lock().push((method.to_string(), delay));
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Provider for CountingProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, request: &JsonRpcRequest) -> Flow {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().iter().find(|(m, _)| *m == request.method).map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.seen.lock().push(request.method.clone());

        match &self.reply {
            Reply::Echo => Flow::Respond(json!(request.method)),
            Reply::Pass => Flow::Next,
            Reply::Fail(message) => Flow::Abort(ProviderError::Internal((*message).to_string())),
        }
    }
}

/// Answers every request with the current head number.
pub struct HeadReader {
    head: Arc<HeadState>,
}

impl HeadReader {
    #[must_use]
    pub fn new(head: Arc<HeadState>) -> Arc<Self> {
        Arc::new(Self { head })
    }
}

#[async_trait]
impl Provider for HeadReader {
    fn name(&self) -> &'static str {
        "head-reader"
    }

    async fn handle(&self, _request: &JsonRpcRequest) -> Flow {
        Flow::Respond(json!(self.head.current_number()))
    }
}

/// Head source that returns queued results in order, then `Missing`.
pub struct ScriptedHeadSource {
    results: Mutex<VecDeque<Result<Block, HeadFetchError>>>,
    fetches: AtomicUsize,
}

impl ScriptedHeadSource {
    #[must_use]
    pub fn new(results: Vec<Result<Block, HeadFetchError>>) -> Arc<Self> {
        Arc::new(Self { results: Mutex::new(results.into()), fetches: AtomicUsize::new(0) })
    }

    /// A source that reports `block` for the next `times` fetches.
    #[must_use]
    pub fn repeating(block: Block, times: usize) -> Arc<Self> {
        Self::new(vec![Ok(block); times])
    }

    #[must_use]
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HeadSource for ScriptedHeadSource {
    async fn fetch_latest_head(&self) -> Result<Block, HeadFetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.results.lock().pop_front().unwrap_or(Err(HeadFetchError::Missing))
    }
}

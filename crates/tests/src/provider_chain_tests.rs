//! Provider Chain Ordering and Unwinding Tests
//!
//! These tests validate how the engine walks the provider chain:
//! 1. Providers run in registration order, identically on every request
//! 2. An abort prevents every later provider from running
//! 3. Interceptors unwind innermost first and see aborts too
//! 4. Batch elements each get their own cursor

use crate::mock_infrastructure::{engine_of, request, CountingProvider, Reply};
use async_trait::async_trait;
use kiln_core::{
    engine::{Flow, Provider, ProviderError},
    types::JsonRpcRequest,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

type Trace = Arc<Mutex<Vec<String>>>;

/// Logs `name` on the way down and `name'` on the way back up.
struct Tracer {
    name: &'static str,
    trace: Trace,
}

impl Tracer {
    fn new(name: &'static str, trace: &Trace) -> Arc<dyn Provider> {
        Arc::new(Self { name, trace: trace.clone() })
    }
}

#[async_trait]
impl Provider for Tracer {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, _request: &JsonRpcRequest) -> Flow {
        self.trace.lock().push(self.name.to_string());
        let trace = self.trace.clone();
        let name = self.name;
        Flow::next_with(move |outcome| async move {
            trace.lock().push(format!("{name}'"));
            outcome
        })
    }
}

#[tokio::test]
async fn test_ordering_is_stable_across_requests() {
    let trace: Trace = Arc::new(Mutex::new(Vec::new()));
    let leaf = CountingProvider::new("leaf", Reply::Echo);
    let engine = engine_of(&[
        Tracer::new("a", &trace),
        Tracer::new("b", &trace),
        Tracer::new("c", &trace),
        leaf.clone(),
    ]);

    for id in 0..5 {
        trace.lock().clear();
        let response = engine.dispatch(&request("eth_chainId", id)).await.unwrap();

        assert_eq!(response.result, Some(json!("eth_chainId")));
        assert_eq!(*trace.lock(), vec!["a", "b", "c", "c'", "b'", "a'"]);
    }
    assert_eq!(leaf.calls(), 5);
}

#[tokio::test]
async fn test_abort_short_circuits() {
    let first = CountingProvider::new("first", Reply::Pass);
    let failing = CountingProvider::new("failing", Reply::Fail("nope"));
    let later = CountingProvider::new("later", Reply::Echo);
    let last = CountingProvider::new("last", Reply::Echo);
    let engine = engine_of(&[
        first.clone() as Arc<dyn Provider>,
        failing.clone(),
        later.clone(),
        last.clone(),
    ]);

    for id in 0..3 {
        let error = engine.dispatch(&request("eth_call", id)).await.unwrap_err();
        assert!(matches!(error, ProviderError::Internal(ref m) if m == "nope"));
    }

    assert_eq!(first.calls(), 3);
    assert_eq!(failing.calls(), 3);
    assert_eq!(later.calls(), 0);
    assert_eq!(last.calls(), 0);
}

#[tokio::test]
async fn test_interceptors_unwind_on_abort() {
    let trace: Trace = Arc::new(Mutex::new(Vec::new()));
    let engine = engine_of(&[
        Tracer::new("outer", &trace),
        Tracer::new("inner", &trace),
        CountingProvider::new("failing", Reply::Fail("late")),
    ]);

    let error = engine.dispatch(&request("eth_call", 1)).await.unwrap_err();

    assert!(matches!(error, ProviderError::Internal(_)));
    assert_eq!(*trace.lock(), vec!["outer", "inner", "inner'", "outer'"]);
}

#[tokio::test]
async fn test_unhandled_method_reaches_every_provider() {
    let a = CountingProvider::new("a", Reply::Pass);
    let b = CountingProvider::new("b", Reply::Pass);
    let engine = engine_of(&[a.clone() as Arc<dyn Provider>, b.clone()]);

    let error = engine.dispatch(&request("eth_unknown", 1)).await.unwrap_err();

    assert!(matches!(error, ProviderError::MethodNotHandled(ref m) if m == "eth_unknown"));
    assert_eq!(error.code(), -32601);
    assert_eq!((a.calls(), b.calls()), (1, 1));
}

#[tokio::test]
async fn test_interceptor_can_replace_success_with_error() {
    let veto: Arc<dyn Provider> = {
        struct Veto;

        #[async_trait]
        impl Provider for Veto {
            fn name(&self) -> &'static str {
                "veto"
            }

            async fn handle(&self, _request: &JsonRpcRequest) -> Flow {
                Flow::next_with(|outcome| async move {
                    outcome.and(Err(ProviderError::Internal("vetoed".into())))
                })
            }
        }

        Arc::new(Veto)
    };
    let leaf = CountingProvider::new("leaf", Reply::Echo);
    let engine = engine_of(&[veto, leaf.clone()]);

    let error = engine.dispatch(&request("eth_chainId", 1)).await.unwrap_err();

    assert!(matches!(error, ProviderError::Internal(ref m) if m == "vetoed"));
    assert_eq!(leaf.calls(), 1, "downstream still ran");
}

#[tokio::test]
async fn test_batch_elements_have_independent_cursors() {
    let trace: Trace = Arc::new(Mutex::new(Vec::new()));
    let leaf = CountingProvider::new("leaf", Reply::Echo);
    let engine = engine_of(&[Tracer::new("t", &trace), leaf.clone()]);

    let responses = engine
        .dispatch_batch(vec![request("one", 1), request("two", 2), request("three", 3)])
        .await;

    assert_eq!(responses.len(), 3);
    for (response, expected) in responses.iter().zip(["one", "two", "three"]) {
        assert_eq!(response.result, Some(json!(expected)));
    }
    let trace = trace.lock();
    assert_eq!(trace.iter().filter(|e| *e == "t").count(), 3);
    assert_eq!(trace.iter().filter(|e| *e == "t'").count(), 3);
    assert_eq!(leaf.calls(), 3);
}

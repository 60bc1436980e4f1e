//! Provider chain engine.
//!
//! The engine owns an ordered list of [`Provider`]s and drives each request
//! through them. Every provider returns a [`Flow`]:
//!
//! | Flow | Effect |
//! |------|--------|
//! | `Respond(v)` | chain ends with `Ok(v)` |
//! | `Next` | next provider runs |
//! | `NextWith(i)` | `i` is stacked, next provider runs |
//! | `Abort(e)` | chain ends with `Err(e)` |
//!
//! Falling off the end of the chain is a [`ProviderError::MethodNotHandled`].
//!
//! # Unwind
//!
//! Once the chain has produced its terminal outcome, the interceptors stacked on the
//! forward pass run in reverse order of registration:
//!
//! ```text
//!   forward:   P0 ──NextWith(a)──► P1 ──NextWith(b)──► P2 ──Respond(v)
//!   unwind:    a(b(Ok(v)))
//! ```
//!
//! Interceptors also run when the terminal outcome is an error.
//!
//! # Batches
//!
//! [`ProviderEngine::dispatch_batch`] drives every element through its own cursor
//! concurrently. Side effects across elements are unordered; the returned
//! responses follow input order.

mod cursor;
pub mod errors;
pub mod provider;

pub use errors::ProviderError;
pub use provider::{Flow, Interceptor, Outcome, Provider};

use crate::types::{JsonRpcRequest, JsonRpcResponse};
use cursor::ChainCursor;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered provider chain.
///
/// The order is fixed at construction; the engine is shared as `Arc<ProviderEngine>`
/// by the transport and never mutated afterwards.
pub struct ProviderEngine {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderEngine {
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        debug!(
            providers = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            "provider engine constructed"
        );
        Self { providers }
    }

    /// Names of the registered providers, in chain order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Drives one request through the chain.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidRequest`] for an empty method name, otherwise
    /// whatever error the chain (after unwinding) terminated with.
    pub async fn dispatch(
        &self,
        request: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, ProviderError> {
        if request.method.trim().is_empty() {
            return Err(ProviderError::InvalidRequest("method must be a non-empty string".into()));
        }

        let mut cursor = ChainCursor::new(&self.providers);
        let outcome = loop {
            let Some(provider) = cursor.advance() else {
                warn!(method = %request.method, "no provider handled request");
                break Err(ProviderError::MethodNotHandled(request.method.clone()));
            };

            match provider.handle(request).await {
                Flow::Respond(value) => break Ok(value),
                Flow::Next => {}
                Flow::NextWith(interceptor) => cursor.push_interceptor(interceptor),
                Flow::Abort(error) => {
                    debug!(
                        method = %request.method,
                        provider = provider.name(),
                        error = %error,
                        "provider aborted request"
                    );
                    break Err(error);
                }
            }
        };

        let visited = cursor.visited();
        let outcome = cursor.unwind(outcome).await;
        debug!(method = %request.method, visited, ok = outcome.is_ok(), "request dispatched");

        outcome.map(|result| JsonRpcResponse::success(result, Arc::clone(&request.id)))
    }

    /// Dispatches every request concurrently and returns their responses in input order.
    ///
    /// Errors are embedded per element as JSON-RPC error objects.
    pub async fn dispatch_batch(&self, requests: Vec<JsonRpcRequest>) -> Vec<JsonRpcResponse> {
        let futures = requests.iter().map(|request| async move {
            match self.dispatch(request).await {
                Ok(response) => response,
                Err(error) => error.into_response(Arc::clone(&request.id)),
            }
        });

        futures::future::join_all(futures).await
    }
}

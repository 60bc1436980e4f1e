//! The provider contract.
//!
//! A provider inspects a request and returns a [`Flow`] telling the engine what to
//! do next. Passing downstream "with an interceptor" hands the engine a deferred
//! transform that runs on the way back up, after the rest of the chain settles.

use super::errors::ProviderError;
use crate::types::JsonRpcRequest;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;

/// Result of a request's trip through (part of) the chain.
pub type Outcome = Result<Value, ProviderError>;

/// A provider's decision for one request.
pub enum Flow {
    /// Fully answer the request; no later provider runs.
    Respond(Value),

    /// Pass the request to the next provider unchanged.
    Next,

    /// Pass the request on, and run the interceptor on the eventual outcome.
    NextWith(Box<dyn Interceptor>),

    /// Terminate the chain with an error; no later provider runs.
    Abort(ProviderError),
}

impl Flow {
    /// Builds a [`Flow::NextWith`] from an async closure over the downstream outcome.
    ///
    /// ```
    /// use kiln_core::engine::Flow;
    ///
    /// let flow = Flow::next_with(|outcome| async move {
    ///     outcome.map(|value| serde_json::json!({ "wrapped": value }))
    /// });
    /// assert!(matches!(flow, Flow::NextWith(_)));
    /// ```
    pub fn next_with<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Outcome) -> Fut + Send + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        Self::NextWith(Box::new(FnInterceptor(f)))
    }
}

impl std::fmt::Debug for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Respond(value) => f.debug_tuple("Respond").field(value).finish(),
            Self::Next => f.write_str("Next"),
            Self::NextWith(_) => f.write_str("NextWith(..)"),
            Self::Abort(error) => f.debug_tuple("Abort").field(error).finish(),
        }
    }
}

/// A participant in the provider chain.
///
/// Implementations hold their own state (behind `Arc`s or interior mutability)
/// and are shared by every in-flight request.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short name used in traces.
    fn name(&self) -> &'static str;

    async fn handle(&self, request: &JsonRpcRequest) -> Flow;
}

/// A deferred transform registered on the forward pass.
///
/// Receives the outcome produced by everything downstream of the provider that
/// registered it and returns the outcome to hand further up. It may replace a
/// success with an error or the other way round.
#[async_trait]
pub trait Interceptor: Send {
    async fn intercept(self: Box<Self>, outcome: Outcome) -> Outcome;
}

struct FnInterceptor<F>(F);

#[async_trait]
impl<F, Fut> Interceptor for FnInterceptor<F>
where
    F: FnOnce(Outcome) -> Fut + Send + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    async fn intercept(self: Box<Self>, outcome: Outcome) -> Outcome {
        (self.0)(outcome).await
    }
}

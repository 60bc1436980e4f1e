//! Per-request traversal state.

use super::provider::{Interceptor, Outcome, Provider};
use std::sync::Arc;

/// Tracks which provider runs next and the interceptors registered so far.
///
/// Owned by exactly one in-flight request and dropped when it completes. The
/// interceptor stack is an explicit `Vec` rather than nested call frames, so the
/// unwind order is visible: last registered runs first.
pub(crate) struct ChainCursor<'a> {
    providers: &'a [Arc<dyn Provider>],
    next: usize,
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl<'a> ChainCursor<'a> {
    pub(crate) fn new(providers: &'a [Arc<dyn Provider>]) -> Self {
        Self { providers, next: 0, interceptors: Vec::new() }
    }

    /// Returns the next provider and moves past it, or `None` at the end of the chain.
    pub(crate) fn advance(&mut self) -> Option<&'a Arc<dyn Provider>> {
        let provider = self.providers.get(self.next)?;
        self.next += 1;
        Some(provider)
    }

    pub(crate) fn push_interceptor(&mut self, interceptor: Box<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Number of providers that have been handed the request.
    pub(crate) fn visited(&self) -> usize {
        self.next
    }

    /// Runs the registered interceptors innermost-first over `outcome`.
    pub(crate) async fn unwind(self, outcome: Outcome) -> Outcome {
        let mut outcome = outcome;
        for interceptor in self.interceptors.into_iter().rev() {
            outcome = interceptor.intercept(outcome).await;
        }
        outcome
    }
}

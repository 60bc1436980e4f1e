//! Core component container for the Kiln runtime.

use crate::{
    backend::{AccountManager, MemoryChain},
    chain::HeadState,
    engine::ProviderEngine,
};
use std::sync::Arc;

/// Container for all initialized Kiln core components.
///
/// All components are wrapped in `Arc` for sharing across tasks. The engine holds
/// its own references to the same instances through its providers.
#[derive(Clone)]
pub struct KilnComponents {
    head_state: Arc<HeadState>,
    chain: Arc<MemoryChain>,
    accounts: Arc<AccountManager>,
    engine: Arc<ProviderEngine>,
}

impl KilnComponents {
    /// Creates a new components container.
    ///
    /// Called by `KilnRuntimeBuilder` during initialization.
    #[must_use]
    pub fn new(
        head_state: Arc<HeadState>,
        chain: Arc<MemoryChain>,
        accounts: Arc<AccountManager>,
        engine: Arc<ProviderEngine>,
    ) -> Self {
        Self { head_state, chain, accounts, engine }
    }

    #[must_use]
    pub fn head_state(&self) -> &Arc<HeadState> {
        &self.head_state
    }

    #[must_use]
    pub fn chain(&self) -> &Arc<MemoryChain> {
        &self.chain
    }

    #[must_use]
    pub fn accounts(&self) -> &Arc<AccountManager> {
        &self.accounts
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<ProviderEngine> {
        &self.engine
    }
}

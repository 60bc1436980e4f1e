//! Runtime container and startup sequencing.

use crate::{
    backend::{AccountManager, AccountSet, MemoryChain},
    chain::HeadState,
    config::AppConfig,
    engine::ProviderEngine,
    gate::InitError,
};
use std::sync::Arc;

use super::{builder::KilnRuntimeBuilder, KilnComponents};

/// Owns the initialized components and the configuration they were built from.
pub struct KilnRuntime {
    components: KilnComponents,
    config: AppConfig,
}

impl KilnRuntime {
    /// Creates a new builder for constructing a `KilnRuntime`.
    #[must_use]
    pub fn builder() -> KilnRuntimeBuilder {
        KilnRuntimeBuilder::new()
    }

    pub(super) fn new(components: KilnComponents, config: AppConfig) -> Self {
        Self { components, config }
    }

    #[must_use]
    pub fn components(&self) -> &KilnComponents {
        &self.components
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Convenience accessor for the provider engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<ProviderEngine> {
        self.components.engine()
    }

    #[must_use]
    pub fn head_state(&self) -> &Arc<HeadState> {
        self.components.head_state()
    }

    #[must_use]
    pub fn chain(&self) -> &Arc<MemoryChain> {
        self.components.chain()
    }

    #[must_use]
    pub fn accounts(&self) -> &Arc<AccountManager> {
        self.components.accounts()
    }

    /// Waits for the account manager's startup gate.
    ///
    /// # Errors
    ///
    /// Returns the [`InitError`] account initialization failed with.
    pub async fn wait_for_initialization(&self) -> Result<AccountSet, InitError> {
        self.components.accounts().wait_for_initialization().await
    }
}

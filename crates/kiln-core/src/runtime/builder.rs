//! Builder pattern for initializing the Kiln runtime.

use crate::{
    backend::{AccountManager, ExecutionProvider, FilterProvider, MemoryChain},
    chain::HeadState,
    config::AppConfig,
    engine::{Provider, ProviderEngine},
    sync::HeadSyncProvider,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::{lifecycle::KilnRuntime, KilnComponents};

/// Errors that can occur during runtime initialization.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Generic initialization error
    #[error("Runtime initialization failed: {0}")]
    Initialization(String),
}

/// Builder for constructing a [`KilnRuntime`].
///
/// Without [`with_providers`](Self::with_providers) the chain is, in order:
/// head-sync, filters, execution, accounts.
///
/// # Examples
///
/// ```no_run
/// # use kiln_core::{config::AppConfig, runtime::KilnRuntimeBuilder};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let runtime = KilnRuntimeBuilder::new().with_config(AppConfig::default()).build()?;
/// # Ok(())
/// # }
/// ```
pub struct KilnRuntimeBuilder {
    config: Option<AppConfig>,
    providers: Option<Vec<Arc<dyn Provider>>>,
}

impl KilnRuntimeBuilder {
    /// Creates a new runtime builder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self { config: None, providers: None }
    }

    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the default chain with an explicit provider list.
    ///
    /// The account manager is still created and initialized so that the startup
    /// gate settles, but it only answers requests if it is part of `providers`.
    #[must_use]
    pub fn with_providers(mut self, providers: Vec<Arc<dyn Provider>>) -> Self {
        self.providers = Some(providers);
        self
    }

    /// Builds the runtime and starts account initialization.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError` if configuration is missing or invalid, or if no tokio
    /// runtime is available to run initialization on.
    pub fn build(self) -> Result<KilnRuntime, RuntimeError> {
        let config = self.config.ok_or_else(|| {
            RuntimeError::ConfigValidation("No configuration provided".to_string())
        })?;

        config.validate().map_err(RuntimeError::ConfigValidation)?;

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(RuntimeError::Initialization(
                "account initialization requires a tokio runtime".to_string(),
            ));
        }

        info!(
            accounts = config.accounts.count,
            network_id = config.chain.network_id,
            sync_policies = config.head_sync.policies.len(),
            custom_chain = self.providers.is_some(),
            "Initializing Kiln runtime"
        );

        let chain = Arc::new(MemoryChain::new());
        // Head starts at genesis; only head sync moves it afterwards.
        let head_state = Arc::new(HeadState::new(chain.latest()));
        debug!(genesis = %chain.genesis().hash, "Chain initialized");

        let accounts = AccountManager::new(config.account_options());

        let providers = match self.providers {
            Some(providers) => providers,
            None => {
                let policies = config
                    .sync_policies()
                    .map_err(|e| RuntimeError::ConfigValidation(e.to_string()))?;
                vec![
                    Arc::new(HeadSyncProvider::new(policies, chain.clone(), head_state.clone()))
                        as Arc<dyn Provider>,
                    Arc::new(FilterProvider::new(chain.clone(), head_state.clone())),
                    Arc::new(ExecutionProvider::new(chain.clone(), head_state.clone())),
                    accounts.clone(),
                ]
            }
        };
        let engine = Arc::new(ProviderEngine::new(providers));
        debug!(providers = ?engine.provider_names(), "Provider engine initialized");

        accounts.initialize();
        debug!("Account initialization started");

        let components = KilnComponents::new(head_state, chain, accounts, engine);
        let runtime = KilnRuntime::new(components, config);

        info!("Kiln runtime initialization complete");

        Ok(runtime)
    }
}

impl Default for KilnRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

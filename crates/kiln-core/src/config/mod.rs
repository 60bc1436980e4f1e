//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `KILN_CONFIG` env var
//! 3. **Environment variables**: `KILN__*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: HTTP listener settings (bind address, concurrency, body limit)
//! - [`LoggingConfig`]: Log level and format
//! - [`AccountsConfig`]: Generated account count and funding
//! - [`ChainConfig`]: Network id reported by `net_version`
//! - [`HeadSyncConfig`]: Method to head-sync timing table
//!
//! # Example
//!
//! ```toml
//! [server]
//! bind_port = 8545
//!
//! [accounts]
//! count = 5
//!
//! [head_sync.policies]
//! eth_call = "before"
//! evm_mine = "after"
//! ```

use crate::{
    backend::AccountOptions,
    sync::{SyncConfigError, SyncPolicy, SyncPolicyTable},
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on. Must be greater than 0. Defaults to `8545`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Maximum number of in-flight HTTP requests. Defaults to `256`.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Largest accepted request body in bytes. Defaults to 1 MiB.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8545
}

fn default_max_concurrent_requests() -> usize {
    256
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Options forwarded to the account state manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsConfig {
    /// Number of accounts generated at startup. Defaults to `10`.
    #[serde(default = "default_account_count")]
    pub count: usize,

    /// Starting balance of each account, in ether. Defaults to `100`.
    #[serde(default = "default_initial_balance_ether")]
    pub initial_balance_ether: u64,
}

fn default_account_count() -> usize {
    10
}

fn default_initial_balance_ether() -> u64 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Network id returned by `net_version`. Defaults to `1337`.
    #[serde(default = "default_network_id")]
    pub network_id: u64,
}

fn default_network_id() -> u64 {
    1337
}

/// Which methods refresh the head, and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadSyncConfig {
    /// Method name to `"before"` or `"after"`. Replaces the default table when set.
    #[serde(default = "SyncPolicyTable::default_entries")]
    pub policies: BTreeMap<String, SyncPolicy>,
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub accounts: AccountsConfig,

    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub head_sync: HeadSyncConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            max_concurrent_requests: default_max_concurrent_requests(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            count: default_account_count(),
            initial_balance_ether: default_initial_balance_ether(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self { network_id: default_network_id() }
    }
}

impl Default for HeadSyncConfig {
    fn default() -> Self {
        Self { policies: SyncPolicyTable::default_entries() }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `KILN__` prefix can override any configuration value.
    /// Use `__` as a separator for nested fields (e.g., `KILN__SERVER__BIND_PORT=9545`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("server.bind_address", default_bind_address())?
            .set_default("server.bind_port", i64::from(default_bind_port()))?
            .set_default("server.max_concurrent_requests", 256)?
            .set_default("server.max_body_bytes", 1024 * 1024)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("accounts.count", 10)?
            .set_default("accounts.initial_balance_ether", 100)?
            .set_default("chain.network_id", 1337)?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("KILN").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml` with fallback to defaults.
    ///
    /// The config file path can be overridden using the `KILN_CONFIG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("KILN_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed into a valid [`SocketAddr`].
    ///
    /// [`SocketAddr`]: std::net::SocketAddr
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
            .parse()
            .map_err(|_| {
                format!(
                    "Invalid socket address: {}:{}",
                    self.server.bind_address, self.server.bind_port
                )
            })
    }

    /// Builds the validated head-sync policy table.
    ///
    /// # Errors
    ///
    /// Returns [`SyncConfigError`] for malformed method names.
    pub fn sync_policies(&self) -> Result<SyncPolicyTable, SyncConfigError> {
        SyncPolicyTable::from_config(&self.head_sync.policies)
    }

    /// Options handed to the account state manager.
    #[must_use]
    pub fn account_options(&self) -> AccountOptions {
        AccountOptions {
            count: self.accounts.count,
            initial_balance_ether: self.accounts.initial_balance_ether,
            network_id: self.chain.network_id,
        }
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.bind_address.trim().is_empty() {
            return Err("Bind address must not be empty".to_string());
        }

        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if self.server.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }

        if self.server.max_body_bytes == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }

        if self.accounts.count == 0 {
            return Err("Account count must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        self.sync_policies().map_err(|e| format!("Invalid head sync policies: {e}"))?;

        Ok(())
    }
}

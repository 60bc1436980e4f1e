//! Account state manager.
//!
//! Generates the simulator's funded accounts once, in the background, and reports
//! completion through a [`StartupGate`]. The HTTP listener waits on the same gate,
//! so in practice account queries only race initialization when the manager is
//! embedded without the server.

use crate::{
    engine::{Flow, Provider, ProviderError},
    gate::{InitError, StartupGate},
    types::{to_quantity, Address, JsonRpcRequest},
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{debug, error, info};

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Options forwarded from configuration to the state manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOptions {
    pub count: usize,
    pub initial_balance_ether: u64,
    pub network_id: u64,
}

impl Default for AccountOptions {
    fn default() -> Self {
        Self { count: 10, initial_balance_ether: 100, network_id: 1337 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub balance_wei: u128,
}

/// Ordered set of generated accounts. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSet {
    accounts: Arc<Vec<Account>>,
}

impl AccountSet {
    /// Generates `count` random accounts, each funded with `balance_ether`.
    ///
    /// # Errors
    ///
    /// Returns [`InitError::Failed`] for a zero count or a balance that overflows wei.
    pub fn generate(count: usize, balance_ether: u64) -> Result<Self, InitError> {
        if count == 0 {
            return Err(InitError::Failed("account count must be greater than 0".into()));
        }
        let balance_wei = u128::from(balance_ether)
            .checked_mul(WEI_PER_ETHER)
            .ok_or_else(|| InitError::Failed(format!("balance of {balance_ether} ether overflows")))?;

        let accounts =
            (0..count).map(|_| Account { address: Address::random(), balance_wei }).collect();
        Ok(Self { accounts: Arc::new(accounts) })
    }

    #[must_use]
    pub fn from_accounts(accounts: Vec<Account>) -> Self {
        Self { accounts: Arc::new(accounts) }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    #[must_use]
    pub fn addresses(&self) -> Vec<Address> {
        self.accounts.iter().map(|a| a.address).collect()
    }

    /// The first account, used as coinbase.
    #[must_use]
    pub fn coinbase(&self) -> Option<Address> {
        self.accounts.first().map(|a| a.address)
    }

    #[must_use]
    pub fn balance_of(&self, address: &Address) -> Option<u128> {
        self.accounts.iter().find(|a| a.address == *address).map(|a| a.balance_wei)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// State manager: owns the accounts and the startup gate they settle.
pub struct AccountManager {
    options: AccountOptions,
    gate: StartupGate<AccountSet>,
    started: AtomicBool,
}

impl AccountManager {
    #[must_use]
    pub fn new(options: AccountOptions) -> Arc<Self> {
        Arc::new(Self { options, gate: StartupGate::new(), started: AtomicBool::new(false) })
    }

    #[must_use]
    pub fn options(&self) -> &AccountOptions {
        &self.options
    }

    /// Starts account generation in a background task. Only the first call has an
    /// effect. Must be called from within a tokio runtime.
    pub fn initialize(self: &Arc<Self>) {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("account manager already initializing");
            return;
        }

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = AccountSet::generate(
                manager.options.count,
                manager.options.initial_balance_ether,
            );
            match &outcome {
                Ok(accounts) => info!(count = accounts.len(), "accounts initialized"),
                Err(e) => error!(error = %e, "account initialization failed"),
            }
            manager.gate.settle(outcome);
        });
    }

    /// Waits until initialization has settled.
    ///
    /// # Errors
    ///
    /// Returns the [`InitError`] initialization failed with.
    pub async fn wait_for_initialization(&self) -> Result<AccountSet, InitError> {
        self.gate.wait().await
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.gate.is_settled()
    }

    #[must_use]
    pub fn gate(&self) -> &StartupGate<AccountSet> {
        &self.gate
    }

    fn balance(accounts: &AccountSet, request: &JsonRpcRequest) -> Result<Value, ProviderError> {
        let address: Address = request
            .str_param(0)
            .ok_or_else(|| ProviderError::InvalidParams("eth_getBalance expects an address".into()))?
            .parse()
            .map_err(|e| ProviderError::InvalidParams(format!("invalid address: {e}")))?;

        Ok(json!(to_quantity(accounts.balance_of(&address).unwrap_or(0))))
    }
}

#[async_trait]
impl Provider for AccountManager {
    fn name(&self) -> &'static str {
        "accounts"
    }

    async fn handle(&self, request: &JsonRpcRequest) -> Flow {
        match request.method.as_str() {
            "net_version" => return Flow::Respond(json!(self.options.network_id.to_string())),
            "web3_clientVersion" => {
                return Flow::Respond(json!(concat!("Kiln/v", env!("CARGO_PKG_VERSION"))));
            }
            "eth_accounts" | "eth_coinbase" | "eth_getBalance" => {}
            _ => return Flow::Next,
        }

        let accounts = match self.gate.wait().await {
            Ok(accounts) => accounts,
            Err(e) => return Flow::Abort(e.into()),
        };

        let result = match request.method.as_str() {
            "eth_accounts" => Ok(json!(accounts
                .addresses()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>())),
            "eth_coinbase" => Ok(accounts.coinbase().map_or(Value::Null, |a| json!(a.to_string()))),
            _ => Self::balance(&accounts, request),
        };

        match result {
            Ok(value) => Flow::Respond(value),
            Err(e) => Flow::Abort(e),
        }
    }
}

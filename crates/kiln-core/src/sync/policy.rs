//! Method-to-timing policy table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// When the head is refreshed relative to the rest of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPolicy {
    Before,
    After,
}

impl std::fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

/// Filter-polling methods. `After` on these has been seen to destabilise clients
/// that poll in a tight loop, so they are never in the default table.
pub const POLLING_METHODS: &[&str] = &["eth_getFilterChanges", "eth_getFilterLogs"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncConfigError {
    #[error("head sync policy has an empty method name")]
    EmptyMethod,

    #[error("head sync method name contains whitespace: {0:?}")]
    InvalidMethod(String),
}

/// Validated mapping from method name to [`SyncPolicy`].
///
/// A method absent from the table has no policy and is passed through untouched.
///
/// # Example
///
/// ```
/// use kiln_core::sync::{SyncPolicy, SyncPolicyTable};
///
/// let table = SyncPolicyTable::new([("eth_call".to_string(), SyncPolicy::Before)]).unwrap();
///
/// assert_eq!(table.policy_for("eth_call"), Some(SyncPolicy::Before));
/// assert_eq!(table.policy_for("eth_accounts"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPolicyTable {
    policies: HashMap<String, SyncPolicy>,
}

impl SyncPolicyTable {
    /// Builds a table, rejecting malformed method names.
    ///
    /// # Errors
    ///
    /// Returns [`SyncConfigError`] if a method name is empty or contains whitespace.
    pub fn new(
        entries: impl IntoIterator<Item = (String, SyncPolicy)>,
    ) -> Result<Self, SyncConfigError> {
        let mut policies = HashMap::new();

        for (method, policy) in entries {
            if method.is_empty() {
                return Err(SyncConfigError::EmptyMethod);
            }
            if method.chars().any(char::is_whitespace) {
                return Err(SyncConfigError::InvalidMethod(method));
            }
            if policy == SyncPolicy::After && POLLING_METHODS.contains(&method.as_str()) {
                warn!(
                    method = %method,
                    "after-sync enabled for a filter polling method; this is known to be unstable"
                );
            }
            policies.insert(method, policy);
        }

        Ok(Self { policies })
    }

    /// Builds a table from the string-keyed form used in configuration files.
    ///
    /// # Errors
    ///
    /// See [`SyncPolicyTable::new`].
    pub fn from_config(entries: &BTreeMap<String, SyncPolicy>) -> Result<Self, SyncConfigError> {
        Self::new(entries.iter().map(|(method, policy)| (method.clone(), *policy)))
    }

    #[inline]
    #[must_use]
    pub fn policy_for(&self, method: &str) -> Option<SyncPolicy> {
        self.policies.get(method).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// The default entries: reads that must see a fresh head sync before, mining
    /// syncs after so the next read observes the new block.
    #[must_use]
    pub fn default_entries() -> BTreeMap<String, SyncPolicy> {
        BTreeMap::from([
            ("eth_call".to_string(), SyncPolicy::Before),
            ("eth_getStorageAt".to_string(), SyncPolicy::Before),
            ("evm_mine".to_string(), SyncPolicy::After),
        ])
    }
}

impl Default for SyncPolicyTable {
    fn default() -> Self {
        Self { policies: Self::default_entries().into_iter().collect() }
    }
}

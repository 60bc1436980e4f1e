//! In-process collaborators behind the provider chain.
//!
//! These are deliberately small: enough chain, filter and account behaviour to
//! drive the engine end to end. There is no EVM, no gas accounting and nothing
//! is persisted.
//!
//! ```text
//!   HeadSyncProvider ── fetch_latest_head ──► MemoryChain ◄── mine ── ExecutionProvider
//!          │                                      ▲
//!          └─ set_current_block ─► HeadState ◄────┼──── reads ── FilterProvider
//!                                                 └──── ranges ─┘
//! ```

pub mod accounts;
pub mod chain;
pub mod execution;
pub mod filters;

pub use accounts::{Account, AccountManager, AccountOptions, AccountSet};
pub use chain::MemoryChain;
pub use execution::ExecutionProvider;
pub use filters::FilterProvider;

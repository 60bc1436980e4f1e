//! Mock Infrastructure for Testing Kiln
//!
//! Reusable providers and head sources for driving the engine without the
//! in-process backend.
//!
//! ## Components
//!
//! - `CountingProvider`: records calls and answers with a configurable flow, optionally
//!   after a delay
//! - `HeadReader`: answers with the head number it observes
//! - `ScriptedHeadSource`: hands out queued fetch results and counts fetches
//! - Test helpers for requests and block chains
//!
//! ## Usage
//!
//! ```ignore
//! use tests::mock_infrastructure::{CountingProvider, Reply};
//!
//! let provider = CountingProvider::new("leaf", Reply::Echo);
//! let engine = ProviderEngine::new(vec![provider.clone()]);
//! ```

pub mod providers;
pub mod test_helpers;

pub use providers::{CountingProvider, HeadReader, Reply, ScriptedHeadSource};
pub use test_helpers::*;

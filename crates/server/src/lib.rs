//! HTTP front end for the Kiln local chain simulator.
//!
//! - [`router`]: the transport adapter, a single axum fallback handler in front of
//!   the provider engine.
//! - [`startup`]: gate-aware listener binding and the startup banner.
//! - [`middleware`]: request correlation ids.

pub mod middleware;
pub mod router;
pub mod startup;

//! Kiln runtime assembly.
//!
//! Wires the head state, in-process collaborators and provider chain together in
//! the default order and starts account initialization. Used by the HTTP server
//! and by anything embedding the engine directly.
//!
//! # Example
//!
//! ```no_run
//! use kiln_core::{config::AppConfig, runtime::KilnRuntime};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!
//!     let runtime = KilnRuntime::builder().with_config(config).build()?;
//!     let accounts = runtime.wait_for_initialization().await?;
//!
//!     let engine = runtime.engine();
//!     // ... serve or dispatch requests directly ...
//!     # let _ = (engine, accounts);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod components;
pub mod lifecycle;

pub use builder::{KilnRuntimeBuilder, RuntimeError};
pub use components::KilnComponents;
pub use lifecycle::KilnRuntime;

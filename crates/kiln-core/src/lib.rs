//! # Kiln Core
//!
//! Request-dispatch core of the Kiln local JSON-RPC chain simulator.
//!
//! - **[`engine`]**: Ordered provider chain. Each provider answers a request, passes
//!   it on (optionally registering an interceptor for the way back), or aborts it.
//!
//! - **[`sync`]**: Reactive head synchronisation. Refreshes the current head before
//!   or after selected methods according to a policy table.
//!
//! - **[`chain`]**: The shared current-head snapshot read by every collaborator.
//!
//! - **[`gate`]**: One-shot startup latch used to hold the listener back until the
//!   state manager is ready.
//!
//! - **[`backend`]**: Small in-process collaborators: block store, execution and
//!   filter stand-ins, account state manager.
//!
//! - **[`config`]** and **[`runtime`]**: Layered configuration and component wiring.
//!
//! ## Request Flow
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌──────────────────┐
//! │  ProviderEngine  │
//! │   (dispatch)     │
//! └────────┬─────────┘
//!          │ forward pass
//!          ▼
//! ┌──────────────────┐   Before: fetch + commit head, Next
//! │ HeadSyncProvider │   After:  NextWith(fetch + commit)
//! └────────┬─────────┘   none:   Next
//!          ▼
//! ┌──────────────────┐
//! │  FilterProvider  │ ─── filter methods ──► Respond
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │ExecutionProvider │ ─── block / call methods ──► Respond
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │  AccountManager  │ ─── account methods ──► Respond
//! └────────┬─────────┘
//!          ▼
//!   MethodNotHandled
//!
//!   terminal outcome ──► interceptors, innermost first ──► Response to Client
//! ```

pub mod backend;
pub mod chain;
pub mod config;
pub mod engine;
pub mod gate;
pub mod runtime;
pub mod sync;
pub mod types;

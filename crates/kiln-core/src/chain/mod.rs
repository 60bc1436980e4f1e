//! Chain head state.
//!
//! Provides [`HeadState`], the one piece of cross-request mutable state in the
//! core. It is created once by the runtime and handed out as `Arc<HeadState>`:
//!
//! ```text
//!                    ┌──────────────────┐
//!                    │    HeadState     │
//!                    └────────┬─────────┘
//!          ┌──────────────────┼──────────────────┐
//!          ▼                  ▼                  ▼
//!  ┌───────────────┐  ┌───────────────┐  ┌───────────────┐
//!  │ HeadSync      │  │ Execution     │  │ Filters       │
//!  │ WRITES head   │  │ reads head    │  │ reads head    │
//!  └───────────────┘  └───────────────┘  └───────────────┘
//! ```
//!
//! Passing the `Arc` at construction keeps mutation rights visible: only the
//! head-sync provider calls [`HeadState::set_current_block`].

pub mod state;

pub use state::HeadState;

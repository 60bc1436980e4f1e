//! One-shot startup gate.
//!
//! The state manager performs its setup once, in the background, and settles a
//! [`StartupGate`] with the outcome. Anything that must not run before setup
//! completes (the HTTP listener, account queries) awaits [`StartupGate::wait`].
//!
//! The gate settles at most once. Later `settle` calls are ignored and every
//! waiter, early or late, observes the same outcome.

use tokio::sync::watch;
use tracing::{debug, warn};

/// Initialization failure reported through the gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    #[error("initialization failed: {0}")]
    Failed(String),

    #[error("initialization was abandoned before it settled")]
    Abandoned,
}

/// Write-once, read-many readiness latch.
///
/// # Example
///
/// ```
/// use kiln_core::gate::StartupGate;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gate = StartupGate::<u32>::new();
/// assert!(gate.settle(Ok(7)));
/// assert!(!gate.settle(Ok(8)));
/// assert_eq!(gate.wait().await, Ok(7));
/// # }
/// ```
pub struct StartupGate<T> {
    slot: watch::Sender<Option<Result<T, InitError>>>,
}

impl<T> StartupGate<T>
where
    T: Clone + Send + Sync,
{
    #[must_use]
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self { slot }
    }

    /// Settles the gate. Returns `false` if it had already been settled, in which
    /// case the stored outcome is left untouched.
    pub fn settle(&self, outcome: Result<T, InitError>) -> bool {
        let is_ok = outcome.is_ok();
        let mut pending = Some(outcome);
        let settled = self.slot.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = pending.take();
            true
        });

        if settled {
            debug!(success = is_ok, "startup gate settled");
        } else {
            warn!("startup gate already settled, ignoring second outcome");
        }
        settled
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Waits until the gate is settled and returns its outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`InitError`] the gate was settled with.
    pub async fn wait(&self) -> Result<T, InitError> {
        let mut rx = self.slot.subscribe();
        let settled = match rx.wait_for(Option::is_some).await {
            Ok(slot) => (*slot).clone(),
            Err(_) => None,
        };
        settled.unwrap_or(Err(InitError::Abandoned))
    }
}

impl<T> Default for StartupGate<T>
where
    T: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

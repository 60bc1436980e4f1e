//! Startup sequencing.
//!
//! The listener is only opened once the state manager's gate has settled
//! successfully. A failed gate aborts startup before anything is bound.

use anyhow::{Context, Result};
use kiln_core::{backend::AccountSet, gate::StartupGate};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Waits for `gate`, then binds `addr`.
///
/// # Errors
///
/// Returns an error if the gate settles with a failure or the address cannot be bound.
pub async fn bind_when_ready<T>(gate: &StartupGate<T>, addr: SocketAddr) -> Result<(TcpListener, T)>
where
    T: Clone + Send + Sync,
{
    let ready = gate.wait().await.context("state manager failed to initialize")?;
    let listener =
        TcpListener::bind(addr).await.with_context(|| format!("failed to bind {addr}"))?;
    Ok((listener, ready))
}

/// Logs the account list and listening address once the server is ready.
pub fn announce(accounts: &AccountSet, addr: SocketAddr) {
    info!("Available Accounts");
    info!("==================");
    for (index, account) in accounts.iter().enumerate() {
        info!("({index}) {}", account.address);
    }
    info!("Listening on {addr}");
}

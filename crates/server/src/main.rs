use anyhow::Result;
use axum::serve;
use kiln_core::{config::AppConfig, runtime::KilnRuntime};
use server::{
    router::{self, RpcState},
    startup,
};
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system based on the configuration.
///
/// `RUST_LOG` takes precedence; otherwise `logging.level` applies to the Kiln
/// crates and everything else is held at `warn`.
fn init_logging(config: &AppConfig) {
    let filter = if let Ok(env_filter) = std::env::var("RUST_LOG") {
        if env_filter == "debug" {
            EnvFilter::new("warn,kiln_core=debug,server=debug,kiln=debug")
        } else if env_filter == "trace" {
            EnvFilter::new("warn,kiln_core=trace,server=trace,kiln=trace")
        } else {
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| {
                EnvFilter::new("warn,kiln_core=debug,server=debug,kiln=debug")
            })
        }
    } else {
        let level = &config.logging.level;
        EnvFilter::try_new(format!("warn,kiln_core={level},server={level},kiln={level}"))
            .unwrap_or_else(|_| EnvFilter::new("warn,kiln_core=info,server=info,kiln=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json();
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config =
        AppConfig::load().map_err(|e| anyhow::anyhow!("Configuration loading failed: {e}"))?;
    config.validate().map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

    init_logging(&config);
    info!("Kiln v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        bind_address = %config.server.bind_address,
        bind_port = config.server.bind_port,
        accounts = config.accounts.count,
        "Configuration loaded"
    );

    let addr = config.socket_addr().map_err(anyhow::Error::msg)?;
    let runtime = KilnRuntime::builder().with_config(config.clone()).build()?;

    let (listener, accounts) = startup::bind_when_ready(runtime.accounts().gate(), addr).await?;
    startup::announce(&accounts, listener.local_addr()?);

    let app = router::create_router(
        RpcState::new(runtime.engine().clone(), config.server.max_body_bytes),
        config.server.max_concurrent_requests,
    );

    if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error occurred");
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

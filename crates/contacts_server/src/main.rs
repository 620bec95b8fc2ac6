//! Contact directory HTTP server entry point.

use anyhow::{Context, Result};
use clap::Parser;
use contacts_core::db::open_db;
use contacts_core::{core_version, default_log_level, init_logging};
use contacts_server::{app, AppState, Args};
use log::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, args.log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    // Fail fast on unreadable or too-new databases instead of on first request.
    drop(
        open_db(&args.db)
            .with_context(|| format!("failed to open database `{}`", args.db.display()))?,
    );

    let state = AppState::new(args.db.clone(), args.update_uniqueness.into());
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    info!(
        "event=server_start module=server status=ok bind={} update_uniqueness={:?} version={}",
        args.bind,
        args.update_uniqueness,
        core_version()
    );
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=signal_listen module=server status=error error={err}");
        // Without a signal handler, run until killed.
        std::future::pending::<()>().await;
    }
}

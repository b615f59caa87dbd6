// SPDX-FileCopyrightText: 2026 Handoff Contributors
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `handoff serve` and `handoff migrate` command implementations.
//!
//! `serve` wires the SQLite store, the escalation engine, and the HTTP
//! gateway together and runs until SIGINT or SIGTERM. `migrate` opens
//! the database, which applies any pending migrations, and exits.

use std::sync::Arc;
use std::time::Duration;

use handoff_config::model::{HandoffConfig, ServiceConfig};
use handoff_core::{Authorizer, HandoffError};
use handoff_engine::HandoffEngine;
use handoff_gateway::{BearerAuthorizer, GatewayState, ServerConfig, start_server};
use handoff_storage::SqliteStore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs the `handoff serve` command.
///
/// Opens storage (applying migrations), builds the engine and gateway
/// state, spawns the memory monitor, and serves until a shutdown signal
/// arrives.
pub async fn run_serve(config: HandoffConfig) -> Result<(), HandoffError> {
    init_tracing(&config.service.log_level);

    info!(service = %config.service.name, "starting handoff serve");

    let store = SqliteStore::open(&config.storage).await?;
    info!(
        path = %config.storage.database_path,
        wal = config.storage.wal_mode,
        "storage ready"
    );

    if config.gateway.operator_token.is_none() {
        warn!("no operator token configured; every operator request will be rejected");
    }

    let engine = HandoffEngine::new(Arc::new(store));
    let authorizer: Arc<dyn Authorizer> =
        Arc::new(BearerAuthorizer::new(config.gateway.operator_token.clone()));
    let state = GatewayState::new(engine, authorizer);

    // Install signal handler.
    let cancel = install_signal_handler();

    // Spawn memory monitor background task.
    {
        let service_config = config.service.clone();
        let mem_cancel = cancel.clone();
        tokio::spawn(async move {
            memory_monitor(&service_config, mem_cancel).await;
        });
        info!(warn_mb = config.service.memory_warn_mb, "memory monitor started");
    }

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    start_server(&server_config, state, cancel).await?;

    info!("handoff serve stopped");
    Ok(())
}

/// Runs the `handoff migrate` command.
///
/// Opening the store applies pending migrations; nothing else is wired.
pub async fn run_migrate(config: HandoffConfig) -> Result<(), HandoffError> {
    init_tracing(&config.service.log_level);

    let store = SqliteStore::open(&config.storage).await?;
    store.close().await?;

    info!(path = %config.storage.database_path, "database migrated");
    Ok(())
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal
/// is received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Background task that samples memory usage via jemalloc stats and
/// /proc/self/statm (Linux) every 5 seconds, warning when heap
/// allocation exceeds the configured threshold.
#[cfg(not(target_env = "msvc"))]
async fn memory_monitor(config: &ServiceConfig, cancel: CancellationToken) {
    let warn_bytes = config.memory_warn_mb as usize * 1024 * 1024;
    let mut interval = tokio::time::interval(Duration::from_secs(5));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // jemalloc stats need an epoch advance for fresh data.
                let _ = tikv_jemalloc_ctl::epoch::advance();
                let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
                let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
                let rss = read_rss_bytes().unwrap_or(0);

                debug!(
                    allocated_mb = allocated / (1024 * 1024),
                    resident_mb = resident / (1024 * 1024),
                    rss_mb = rss / (1024 * 1024),
                    "memory sample"
                );

                if allocated > warn_bytes {
                    warn!(
                        allocated_mb = allocated / (1024 * 1024),
                        threshold_mb = config.memory_warn_mb,
                        "memory pressure: heap above warning threshold"
                    );
                    // Best-effort purge; allocated may not drop if every
                    // page is live.
                    let _ = tikv_jemalloc_ctl::epoch::advance();
                }
            }
            _ = cancel.cancelled() => {
                info!("memory monitor shutting down");
                break;
            }
        }
    }
}

/// Stub memory monitor for MSVC (no jemalloc).
#[cfg(target_env = "msvc")]
async fn memory_monitor(_config: &ServiceConfig, cancel: CancellationToken) {
    cancel.cancelled().await;
}

/// Read the process RSS in bytes from /proc/self/statm (Linux only).
///
/// Returns None on non-Linux platforms or if the file cannot be read.
fn read_rss_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        let rss_pages = statm.split_whitespace().nth(1)?.parse::<u64>().ok()?;
        Some(rss_pages * 4096)
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("handoff={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

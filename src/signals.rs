use anyhow::Result;
use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};

use crate::config::{self, Config};

/// Shutdown signal types
#[derive(Debug, Clone, Copy)]
pub enum ShutdownSignal {
    /// Graceful shutdown (drain connections, close the pool)
    Graceful,
}

/// Setup signal handlers for the server
///
/// Returns a broadcast sender for shutdown signals and a join handle for the signal task
///
/// Handles:
/// - SIGTERM/SIGINT: Graceful shutdown
/// - SIGHUP: Configuration reload from `config_path`
#[cfg(unix)]
pub fn setup_signal_handlers(
    config: Arc<ArcSwap<Config>>,
    config_path: PathBuf,
) -> (
    broadcast::Sender<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
) {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        let (mut sigterm, mut sigint, mut sighup) = match install_unix_signals() {
            Ok(signals) => signals,
            Err(e) => {
                error!("Failed to install signal handlers: {}, falling back to Ctrl+C", e);
                wait_for_ctrl_c(tx_clone).await;
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("SIGTERM received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sigint.recv() => {
                    info!("SIGINT received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sighup.recv() => {
                    info!("SIGHUP received, reloading configuration");
                    if let Err(e) = reload_config(&config, &config_path) {
                        error!("Failed to reload configuration: {}", e);
                    } else {
                        info!("Configuration reloaded successfully");
                    }
                }
            }
        }
    });

    (shutdown_tx, handle)
}

#[cfg(unix)]
fn install_unix_signals() -> std::io::Result<(Signal, Signal, Signal)> {
    Ok((
        signal(SignalKind::terminate())?,
        signal(SignalKind::interrupt())?,
        signal(SignalKind::hangup())?,
    ))
}

/// Windows placeholder - only Ctrl+C, no reload
#[cfg(not(unix))]
pub fn setup_signal_handlers(
    _config: Arc<ArcSwap<Config>>,
    _config_path: PathBuf,
) -> (
    broadcast::Sender<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
) {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(wait_for_ctrl_c(tx_clone));

    (shutdown_tx, handle)
}

async fn wait_for_ctrl_c(tx: broadcast::Sender<ShutdownSignal>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Ctrl+C received, initiating shutdown");
            let _ = tx.send(ShutdownSignal::Graceful);
        }
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    }
}

/// Reload configuration atomically
///
/// Candidate lists, default tables and the request deadline take effect on
/// the next request. On any load or validation error the old configuration
/// stays in place. Listener and database settings need a restart.
pub fn reload_config(config: &ArcSwap<Config>, config_path: &Path) -> Result<()> {
    info!("Loading new configuration from {}", config_path.display());

    let new_config = config::load_config(config_path)?;
    let current = config.load();

    if new_config.server.host != current.server.host
        || new_config.server.port != current.server.port
    {
        warn!("Listener address changed, restart required for it to take effect");
    }
    if new_config.database.url != current.database.url {
        warn!("Database URL changed, restart required for it to take effect");
    }

    info!(
        "New configuration loaded. Default region: {}, AWS compute candidates: {}, Azure compute candidates: {}",
        new_config.pricing.default_region,
        new_config.aws.compute_candidates.len(),
        new_config.azure.compute_candidates.len()
    );

    config.store(Arc::new(new_config));
    Ok(())
}

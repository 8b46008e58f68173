//! Daemon entry point -- configuration, wiring, and lifecycle management.
//!
//! Startup order:
//!
//! 1. Parse CLI arguments
//! 2. Load `logvigil.toml` (creating a default file on first run)
//! 3. Apply CLI overrides and initialize tracing
//! 4. Install the metrics recorder (if enabled)
//! 5. Build the remote client and the log watcher
//! 6. Run until SIGTERM/SIGINT, then cancel and drain
//!
//! Exit codes: 0 on clean shutdown or cancellation, 1 on configuration
//! problems or startup failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use logvigil_core::config::LogvigilConfig;
use logvigil_core::event::RestartEvent;
use logvigil_core::metrics as m;
use logvigil_daemon::cli::DaemonCli;
use logvigil_daemon::{logging, metrics_server};
use logvigil_monitor::{
    EnvironmentClient, HttpEnvironmentClient, LogWatcherBuilder, WatcherConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    let (mut config, created) = LogvigilConfig::load_or_create(&cli.config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;

    // CLI overrides take precedence over file and environment
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.general.log_format = format.clone();
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    logging::init_tracing(&config.general)?;

    if created {
        anyhow::bail!(
            "default configuration written to {}; set [remote] api_base_url, api_key \
             and environment_id, then start again",
            cli.config.display()
        );
    }

    if cli.validate {
        config
            .validate_runtime()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
        tracing::info!(path = %cli.config.display(), "configuration is valid");
        return Ok(());
    }

    config
        .validate_runtime()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    tracing::info!("logvigil-daemon starting");
    let start_time = Instant::now();
    let cancel = CancellationToken::new();

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!(m::DAEMON_BUILD_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);
        tracing::info!(port = config.metrics.port, "metrics endpoint enabled");
    }

    let client = Arc::new(
        HttpEnvironmentClient::new(
            &config.remote.api_base_url,
            &config.remote.api_key,
            Duration::from_secs(config.remote.request_timeout_secs),
        )
        .map_err(|e| anyhow::anyhow!("failed to build remote client: {}", e))?,
    );

    // Early connectivity probe; the watcher retries on its own schedule
    if let Err(e) = client.ping().await {
        tracing::warn!(error = %e, "remote endpoint not reachable, running in degraded mode");
    }

    let watcher_config = WatcherConfig::from_core(&config);
    let (watcher, event_rx) = LogWatcherBuilder::new()
        .config(watcher_config)
        .client(Arc::clone(&client))
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build log watcher: {}", e))?;

    // The builder created the channel, so the receiver is always present here
    let audit_task = event_rx.map(|rx| spawn_restart_logger(rx, cancel.clone()));

    let uptime_task = if config.metrics.enabled {
        Some(spawn_uptime_updater(start_time, cancel.clone()))
    } else {
        None
    };

    let watcher_task = tokio::spawn(watcher.run(cancel.clone()));

    tracing::info!("logvigil-daemon running");
    let signal = wait_for_shutdown_signal().await?;
    tracing::info!(signal = signal, "shutdown signal received");

    cancel.cancel();

    if let Err(e) = watcher_task.await {
        tracing::error!(error = %e, "watcher task join failed");
    }
    if let Some(task) = audit_task {
        let _ = task.await;
    }
    if let Some(task) = uptime_task {
        let _ = task.await;
    }

    tracing::info!("logvigil-daemon shut down");
    Ok(())
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use anyhow::Context;
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Spawn a background task that logs received RestartEvents.
///
/// RestartEvents represent restart attempts made by the watcher.
/// This task logs them for audit purposes.
fn spawn_restart_logger(
    mut event_rx: mpsc::Receiver<RestartEvent>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                event_result = event_rx.recv() => {
                    match event_result {
                        Some(event) => {
                            tracing::info!(
                                event_id = %event.id,
                                environment_id = %event.environment_id,
                                success = event.success,
                                detail = %event.detail,
                                operation_id = event.operation_id.as_deref().unwrap_or("N/A"),
                                trace_id = %event.metadata.trace_id,
                                "restart attempt recorded"
                            );
                        }
                        None => {
                            tracing::debug!("restart event channel closed, exiting logger");
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    tracing::debug!("restart logger shutting down");
                    break;
                }
            }
        }
    })
}

/// Spawn a background task that periodically updates the uptime metric.
///
/// Updates every 10 seconds to keep the metric fresh for Prometheus scrapes.
fn spawn_uptime_updater(
    start_time: Instant,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(10));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let uptime_secs = start_time.elapsed().as_secs();
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(uptime_secs as f64);
                }
                _ = cancel.cancelled() => {
                    tracing::debug!("uptime updater shutting down");
                    break;
                }
            }
        }
    })
}

//! Prometheus metrics endpoint.
//!
//! Installs the global recorder from `metrics-exporter-prometheus` with
//! its built-in HTTP listener. After installation every
//! `metrics::counter!()` / `metrics::gauge!()` call in the process is
//! recorded and exposed for scraping.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;

use logvigil_core::config::MetricsConfig;

/// Install the global metrics recorder and start the HTTP listener.
///
/// Call once per process, inside a running tokio runtime.
///
/// # Errors
///
/// - The configured endpoint is not `/metrics`
/// - The listen address does not parse or cannot be bound
/// - A global recorder is already installed
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    anyhow::ensure!(
        config.endpoint == "/metrics",
        "unsupported metrics endpoint '{}': only '/metrics' is currently supported",
        config.endpoint
    );

    let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .context("invalid metrics listen address")?;
    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces; restrict listen_addr in untrusted networks"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("failed to install metrics recorder")?;
    logvigil_core::metrics::describe_all();

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");
    Ok(())
}

use crate::SharedMetrics;
use anyhow::{Context as _, Error as AnyhowError, Result};
use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct MetricsServerConfig {
    pub metrics_address: IpAddr,
    pub metrics_port: u16,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            metrics_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            metrics_port: 9100,
        }
    }
}

impl From<&MetricsServerConfig> for SocketAddr {
    fn from(config: &MetricsServerConfig) -> Self {
        SocketAddr::from((config.metrics_address, config.metrics_port))
    }
}

async fn prometheus_metrics_handler(
    State(metrics): State<SharedMetrics>,
) -> Result<String, StatusCode> {
    metrics.gather().map_err(|err| {
        warn!(error = %err, "Failed to encode metrics");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn run_metrics_server(config: MetricsServerConfig, metrics: SharedMetrics) -> Result<()> {
    let addr = SocketAddr::from(&config);

    let router = Router::new()
        .route("/metrics", get(prometheus_metrics_handler))
        .with_state(metrics);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind metrics server to {addr}"))?;
    info!(%addr, "Metrics server listening");

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(AnyhowError::new)?;

    Ok(())
}

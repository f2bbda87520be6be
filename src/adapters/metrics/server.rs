//! Metrics Server - `/metrics` Exposition Endpoint
//!
//! Serves the Prometheus text format via axum 0.7. Every request runs
//! one collection cycle; the outbound fetch is owned by the request
//! future and is dropped with it if the scraper disconnects.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use super::prometheus::{encode_text, text_content_type, ExporterMetrics};
use crate::usecases::LicenseCollector;

/// State shared by all scrape requests.
#[derive(Clone)]
pub struct MetricsState {
    /// License collector.
    pub collector: Arc<LicenseCollector>,
    /// Exporter self-metrics.
    pub metrics: Arc<ExporterMetrics>,
}

/// Axum-based exposition server.
pub struct MetricsServer {
    state: MetricsState,
}

impl MetricsServer {
    /// Create a new metrics server.
    pub fn new(collector: Arc<LicenseCollector>, metrics: Arc<ExporterMetrics>) -> Self {
        Self {
            state: MetricsState { collector, metrics },
        }
    }

    /// Router exposing `GET /metrics` and nothing else.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(Self::scrape))
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    #[instrument(skip_all)]
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        if let Ok(addr) = listener.local_addr() {
            info!(address = %addr, "Metrics server started");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Metrics server stopped");
        Ok(())
    }

    /// One scrape: license gauges (possibly none) plus exporter metrics.
    async fn scrape(State(state): State<MetricsState>) -> Response {
        let mut families = state.collector.collect().await;
        families.extend(state.metrics.gather());
        families.sort_by(|a, b| a.get_name().cmp(b.get_name()));

        match encode_text(&families) {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, text_content_type())],
                body,
            )
                .into_response(),
            Err(e) => {
                error!(error = %e, "Failed to encode metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
            }
        }
    }
}

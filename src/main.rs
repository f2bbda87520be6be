//! GitLab License Exporter — Entry Point
//!
//! Wiring sequence:
//! 1. Load config (optional TOML file + env overrides)
//! 2. Init tracing (JSON structured logging by default)
//! 3. Exit non-zero if GITLAB_URL / GITLAB_TOKEN are missing
//! 4. Create GitlabClient (reqwest, TLS policy from config)
//! 5. Build license descriptors + exporter self-metrics
//! 6. Bind the listener (bind failure exits non-zero)
//! 7. Serve /metrics until SIGINT/SIGTERM

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use gitlab_license_exporter::adapters::api::GitlabClient;
use gitlab_license_exporter::adapters::metrics::{
    ExporterMetrics, LicenseDescriptors, MetricsServer,
};
use gitlab_license_exporter::config::{self, LogConfig, LogFormat};
use gitlab_license_exporter::usecases::LicenseCollector;

#[tokio::main]
async fn main() {
    // ── 1. Load configuration ───────────────────────────────
    let loaded = config::loader::load_config();

    // ── 2. Initialize logging (defaults if config failed) ───
    let log_config = loaded
        .as_ref()
        .map(|c| c.log.clone())
        .unwrap_or_default();
    init_tracing(&log_config);

    // ── 3. Fatal configuration errors stop us before bind ───
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Invalid configuration, exiting");
            std::process::exit(1);
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        gitlab_url = %config.gitlab.url,
        listen_address = %config.server.listen_address,
        insecure_skip_verify = config.gitlab.insecure_skip_verify,
        "Starting GitLab license exporter"
    );

    if let Err(e) = run(config).await {
        error!(error = %format!("{e:#}"), "Exporter failed");
        std::process::exit(1);
    }
}

/// Build all components and serve until shutdown.
async fn run(config: config::AppConfig) -> Result<()> {
    // ── 4. GitLab client (shared connection pool) ───────────
    let client = Arc::new(
        GitlabClient::new(&config.gitlab).context("Failed to create GitLab client")?,
    );

    // ── 5. Descriptors are built once and never change ──────
    let descriptors =
        Arc::new(LicenseDescriptors::new().context("Failed to build license descriptors")?);
    let metrics = Arc::new(ExporterMetrics::new().context("Failed to register exporter metrics")?);
    let collector = Arc::new(LicenseCollector::new(
        client,
        descriptors,
        Arc::clone(&metrics),
    ));

    let gauge_names: Vec<&str> = collector
        .describe()
        .into_iter()
        .map(|desc| desc.fq_name.as_str())
        .collect();
    info!(gauges = ?gauge_names, "License descriptors registered");

    // ── 6. Bind ─────────────────────────────────────────────
    let listener = TcpListener::bind(&config.server.listen_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen_address))?;

    info!(
        address = %config.server.listen_address,
        "Service started, scrape /metrics"
    );

    // ── 7. Serve until SIGINT/SIGTERM ───────────────────────
    MetricsServer::new(collector, metrics)
        .run(listener, shutdown_signal())
        .await
}

fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("SIGINT received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
}

//! Metrics and Exposition Adapters
//!
//! Provides the license gauge descriptors, the exporter's own Prometheus
//! registry and the axum `/metrics` endpoint.

pub mod prometheus;
pub mod server;

pub use self::prometheus::{ExporterMetrics, LicenseDescriptors};
pub use server::MetricsServer;

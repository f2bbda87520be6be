//! License Collector - One Scrape, One Fetch
//!
//! Orchestrates a scrape: fetch the license document, translate it into
//! the nine gauges and hand them to the exposition layer. A failed fetch
//! yields an empty set, never an error, so the `/metrics` response stays
//! 200 and the missing series are the health signal.
//!
//! The collector is stateless between calls. Concurrent scrapes each run
//! their own fetch; only the descriptors, the HTTP client and the exporter
//! counters are shared.

use std::sync::Arc;

use prometheus::core::Desc;
use prometheus::proto::MetricFamily;
use tracing::{info, instrument, warn};

use crate::adapters::metrics::prometheus::{ExporterMetrics, LicenseDescriptors};
use crate::domain::gauges::GaugeSet;
use crate::ports::{FetchError, LicenseSource};

/// Scrape-time collector for the license gauges.
pub struct LicenseCollector {
  /// Where the license document comes from.
  source: Arc<dyn LicenseSource>,
  /// Process-wide gauge descriptors.
  descriptors: Arc<LicenseDescriptors>,
  /// Exporter self-metrics.
  metrics: Arc<ExporterMetrics>,
}

impl LicenseCollector {
  /// Create a collector over the given source.
  pub fn new(
    source: Arc<dyn LicenseSource>,
    descriptors: Arc<LicenseDescriptors>,
    metrics: Arc<ExporterMetrics>,
  ) -> Self {
    Self {
      source,
      descriptors,
      metrics,
    }
  }

  /// Descriptors of every gauge this collector can emit.
  pub fn describe(&self) -> Vec<&Desc> {
    self.descriptors.describe()
  }

  /// Fetch and translate the license document.
  ///
  /// Returns `None` when the fetch fails; the failure is logged and
  /// counted.
  #[instrument(skip(self))]
  pub async fn collect_gauges(&self) -> Option<GaugeSet> {
    let timer = self.metrics.scrape_duration.start_timer();
    let result = self.source.fetch().await;
    timer.observe_duration();

    match result {
      Ok(record) => {
        let gauges = GaugeSet::from_record(&record);
        if gauges.date_fallbacks.starts_at {
          self.record_date_fallback("starts_at");
        }
        if gauges.date_fallbacks.expires_at {
          self.record_date_fallback("expires_at");
        }
        info!(license_id = record.id, "Metrics retrieved");
        Some(gauges)
      }
      Err(e) => {
        self.record_failure(&e);
        None
      }
    }
  }

  /// Metric families for one scrape: nine gauges, or none on failure.
  pub async fn collect(&self) -> Vec<MetricFamily> {
    self
      .collect_gauges()
      .await
      .map(|gauges| self.descriptors.families(&gauges))
      .unwrap_or_default()
  }

  fn record_failure(&self, error: &FetchError) {
    let reason = error.reason();
    self
      .metrics
      .scrape_failures
      .with_label_values(&[reason])
      .inc();

    match error {
      FetchError::Transport(_) => {
        warn!(reason, error = %error, "License fetch failed, scrape is empty");
      }
      _ => {
        info!(reason, error = %error, "License fetch failed, scrape is empty");
      }
    }
  }

  fn record_date_fallback(&self, field: &str) {
    self
      .metrics
      .date_parse_failures
      .with_label_values(&[field])
      .inc();
  }
}

//! Prometheus Metrics - License Descriptors and Exporter Self-Metrics
//!
//! `LicenseDescriptors` holds the nine immutable gauge descriptors built
//! once at startup. Each scrape turns a fresh [`GaugeSet`] into constant
//! metric families against those descriptors; nothing is stored between
//! scrapes, so a failed fetch leaves no stale license series behind.
//!
//! `ExporterMetrics` owns a regular registry for the exporter's own
//! health (`gitlab_exporter_*`).

use prometheus::core::{Desc, Describer};
use prometheus::proto::{Gauge, Metric, MetricFamily, MetricType};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::domain::gauges::{GaugeKind, GaugeSet};

/// Immutable descriptors for the nine license gauges.
#[derive(Debug)]
pub struct LicenseDescriptors {
    /// Indexed in [`GaugeKind::ALL`] order.
    descs: Vec<(GaugeKind, Desc)>,
}

impl LicenseDescriptors {
    /// Build and validate every descriptor.
    ///
    /// # Errors
    /// Fails if a name or help text is rejected by the prometheus crate.
    pub fn new() -> prometheus::Result<Self> {
        let descs = GaugeKind::ALL
            .into_iter()
            .map(|kind| {
                Opts::new(kind.fq_name(), kind.help())
                    .describe()
                    .map(|desc| (kind, desc))
            })
            .collect::<prometheus::Result<Vec<_>>>()?;

        Ok(Self { descs })
    }

    /// All descriptors, in exposition order.
    pub fn describe(&self) -> Vec<&Desc> {
        self.descs.iter().map(|(_, desc)| desc).collect()
    }

    /// Descriptor of one gauge.
    pub fn get(&self, kind: GaugeKind) -> Option<&Desc> {
        self.descs
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, desc)| desc)
    }

    /// One unlabeled gauge family per sample, valued from `gauges`.
    pub fn families(&self, gauges: &GaugeSet) -> Vec<MetricFamily> {
        gauges
            .samples()
            .filter_map(|(kind, value)| self.get(kind).map(|desc| gauge_family(desc, value)))
            .collect()
    }
}

fn gauge_family(desc: &Desc, value: f64) -> MetricFamily {
    let mut gauge = Gauge::default();
    gauge.set_value(value);

    let mut metric = Metric::default();
    metric.set_gauge(gauge);

    let mut family = MetricFamily::default();
    family.set_name(desc.fq_name.clone());
    family.set_help(desc.help.clone());
    family.set_field_type(MetricType::GAUGE);
    family.set_metric(vec![metric].into());
    family
}

/// Self-observability of the exporter.
///
/// All metrics follow the naming convention `gitlab_exporter_*` so they
/// never mask the absence of `gitlab_license_*` series.
pub struct ExporterMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Failed license fetches by failure reason.
    pub scrape_failures: IntCounterVec,
    /// Duration of the fetch-and-translate cycle (seconds).
    pub scrape_duration: Histogram,
    /// License dates that fell back to the zero time, by field.
    pub date_parse_failures: IntCounterVec,
}

impl ExporterMetrics {
    /// Create and register all exporter metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let scrape_failures = IntCounterVec::new(
            Opts::new(
                "gitlab_exporter_scrape_failures_total",
                "License fetches that produced no metrics, by reason",
            ),
            &["reason"],
        )?;

        let scrape_duration = Histogram::with_opts(
            HistogramOpts::new(
                "gitlab_exporter_scrape_duration_seconds",
                "Time spent fetching and translating the license document",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        let date_parse_failures = IntCounterVec::new(
            Opts::new(
                "gitlab_exporter_date_parse_failures_total",
                "License dates that could not be parsed and were reported as zero time",
            ),
            &["field"],
        )?;

        registry.register(Box::new(scrape_failures.clone()))?;
        registry.register(Box::new(scrape_duration.clone()))?;
        registry.register(Box::new(date_parse_failures.clone()))?;

        Ok(Self {
            registry,
            scrape_failures,
            scrape_duration,
            date_parse_failures,
        })
    }

    /// Snapshot of the exporter's own metric families.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}

/// Encode metric families in the Prometheus text format.
///
/// # Errors
/// Fails if a family is malformed or the output is not UTF-8.
pub fn encode_text(families: &[MetricFamily]) -> anyhow::Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Content type of [`encode_text`] output.
pub fn text_content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

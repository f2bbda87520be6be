//! Domain layer - License document and gauge mapping.
//!
//! Pure translation logic with no I/O: decoding the license document and
//! turning it into the numeric samples the exporter publishes.

pub mod gauges;
pub mod license;

// Re-export core types for convenience
pub use gauges::{GaugeKind, GaugeSet, NAMESPACE};
pub use license::{DateParseError, LicenseRecord};

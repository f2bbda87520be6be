//! Use Cases Layer - Application Orchestration
//!
//! Wires the domain mapping to the ports:
//! - `LicenseCollector`: per-scrape fetch and gauge translation

pub mod collector;

pub use collector::LicenseCollector;

//! GitLab API Adapter
//!
//! Implements the HTTP client for the GitLab license endpoint.
//!
//! Sub-modules:
//! - `client`: reqwest-based `LicenseSource` implementation

pub mod client;

pub use client::{GitlabClient, TransportPolicy, LICENSE_PATH};

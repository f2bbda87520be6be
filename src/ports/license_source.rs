//! License Source Port - Remote License Retrieval Interface
//!
//! Defines the trait the collector uses to obtain the current license
//! document, and the failures a retrieval can end in. The HTTP adapter
//! lives in `crate::adapters::api`; tests substitute mocks.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::license::LicenseRecord;

/// Why a license retrieval produced no record.
///
/// Every variant is scoped to a single scrape; none is fatal.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Base URL or token is empty at fetch time.
  #[error("license source is not configured (missing URL or token)")]
  NotConfigured,

  /// Connection, TLS, timeout or body read failure.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The API rejected the bearer token (HTTP 401).
  #[error("unauthorized (HTTP 401)")]
  Unauthorized,

  /// Any other non-200 response.
  #[error("unexpected HTTP status {0}")]
  Status(u16),

  /// The body is not a license document.
  #[error("failed to decode license document: {0}")]
  Decode(#[from] serde_json::Error),
}

impl FetchError {
  /// Short label used for logging and the failure counter.
  pub const fn reason(&self) -> &'static str {
    match self {
      Self::NotConfigured => "not_configured",
      Self::Transport(_) => "transport",
      Self::Unauthorized => "unauthorized",
      Self::Status(_) => "status",
      Self::Decode(_) => "decode",
    }
  }
}

/// Anything that can produce the current license document.
#[async_trait]
pub trait LicenseSource: Send + Sync + 'static {
  /// Retrieve and decode the license document.
  ///
  /// Performs exactly one attempt; retries are left to the next scrape.
  async fn fetch(&self) -> Result<LicenseRecord, FetchError>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_reason_labels() {
    assert_eq!(FetchError::NotConfigured.reason(), "not_configured");
    assert_eq!(FetchError::Unauthorized.reason(), "unauthorized");
    assert_eq!(FetchError::Status(503).reason(), "status");

    let decode = serde_json::from_str::<LicenseRecord>("nope").unwrap_err();
    assert_eq!(FetchError::from(decode).reason(), "decode");
  }

  #[test]
  fn test_display() {
    assert_eq!(FetchError::Status(403).to_string(), "unexpected HTTP status 403");
  }
}

//! GitLab HTTP Client - License Endpoint Adapter
//!
//! Wraps a reqwest client configured once at startup and implements the
//! [`LicenseSource`] port against `GET /api/v4/license`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::config::GitlabConfig;
use crate::domain::license::LicenseRecord;
use crate::ports::{FetchError, LicenseSource};

/// Path of the license endpoint, appended verbatim to the base URL.
pub const LICENSE_PATH: &str = "/api/v4/license";

/// Transport settings for the GitLab client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportPolicy {
  /// Skip TLS certificate verification.
  pub insecure_skip_verify: bool,
  /// Whole-request timeout; `None` keeps reqwest's default (no deadline).
  pub timeout: Option<Duration>,
}

impl From<&GitlabConfig> for TransportPolicy {
  fn from(config: &GitlabConfig) -> Self {
    Self {
      insecure_skip_verify: config.insecure_skip_verify,
      timeout: config.timeout(),
    }
  }
}

/// Authenticated client for the GitLab license API.
///
/// Immutable after construction; the inner connection pool is shared by
/// concurrent scrapes.
pub struct GitlabClient {
  /// Underlying HTTP client.
  http: Client,
  /// API base URL (no trailing-slash normalization).
  base_url: String,
  /// Bearer token.
  token: String,
}

impl GitlabClient {
  /// Build a client from the GitLab section of the config.
  ///
  /// # Errors
  /// Fails if the TLS backend cannot be initialised.
  pub fn new(config: &GitlabConfig) -> Result<Self> {
    Self::with_policy(&config.url, &config.token, TransportPolicy::from(config))
  }

  /// Build a client with an explicit transport policy.
  ///
  /// # Errors
  /// Fails if the TLS backend cannot be initialised.
  pub fn with_policy(base_url: &str, token: &str, policy: TransportPolicy) -> Result<Self> {
    if policy.insecure_skip_verify {
      warn!(url = %base_url, "TLS certificate verification disabled for GitLab API");
    }

    let mut builder = Client::builder().danger_accept_invalid_certs(policy.insecure_skip_verify);
    if let Some(timeout) = policy.timeout {
      builder = builder.timeout(timeout);
    }
    let http = builder.build().context("Failed to build HTTP client")?;

    Ok(Self::from_parts(http, base_url, token))
  }

  /// Wrap an already configured reqwest client.
  pub fn from_parts(http: Client, base_url: &str, token: &str) -> Self {
    Self {
      http,
      base_url: base_url.to_string(),
      token: token.to_string(),
    }
  }

  /// Full URL of the license endpoint.
  pub fn license_url(&self) -> String {
    format!("{}{LICENSE_PATH}", self.base_url)
  }
}

#[async_trait]
impl LicenseSource for GitlabClient {
  async fn fetch(&self) -> Result<LicenseRecord, FetchError> {
    if self.base_url.is_empty() || self.token.is_empty() {
      return Err(FetchError::NotConfigured);
    }

    let url = self.license_url();
    debug!(url = %url, "Fetching license");

    let response = self.http.get(&url).bearer_auth(&self.token).send().await?;

    match response.status() {
      StatusCode::OK => {}
      StatusCode::UNAUTHORIZED => return Err(FetchError::Unauthorized),
      status => return Err(FetchError::Status(status.as_u16())),
    }

    // Read the whole body before decoding so the connection is released
    // even when decoding fails.
    let body = response.bytes().await?;
    Ok(LicenseRecord::from_json(&body)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_license_url_concatenation() {
    let client = GitlabClient::from_parts(Client::new(), "https://gitlab.example.com", "t");
    assert_eq!(client.license_url(), "https://gitlab.example.com/api/v4/license");
  }

  #[test]
  fn test_policy_from_config() {
    let config = GitlabConfig {
      url: "https://g".to_string(),
      token: "t".to_string(),
      insecure_skip_verify: false,
      timeout_seconds: Some(3),
    };
    let policy = TransportPolicy::from(&config);
    assert!(!policy.insecure_skip_verify);
    assert_eq!(policy.timeout, Some(Duration::from_secs(3)));
  }

  #[tokio::test]
  async fn test_empty_token_not_configured() {
    let client = GitlabClient::from_parts(Client::new(), "https://gitlab.example.com", "");
    let err = client.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::NotConfigured));
  }

  #[tokio::test]
  async fn test_unreachable_host_is_transport_error() {
    // Port 9 (discard) on loopback is expected to refuse connections.
    let client = GitlabClient::from_parts(Client::new(), "http://127.0.0.1:9", "t");
    let err = client.fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
  }
}

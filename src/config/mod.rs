//! Configuration Module - Exporter Settings
//!
//! Loads and validates configuration from an optional TOML file with
//! environment variable overrides. `GITLAB_URL` and `GITLAB_TOKEN` are
//! the only required settings; everything else has a default.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

/// Top-level exporter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Remote license API.
  pub gitlab: GitlabConfig,
  /// Local `/metrics` listener.
  pub server: ServerConfig,
  /// Logging output.
  pub log: LogConfig,
}

/// Remote GitLab API settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GitlabConfig {
  /// Base URL, e.g. `https://gitlab.example.com`.
  pub url: String,
  /// Personal/admin access token sent as a bearer credential.
  pub token: String,
  /// Accept any TLS certificate presented by the API.
  ///
  /// Defaults to `true` for compatibility with self-signed and
  /// internal-CA instances.
  pub insecure_skip_verify: bool,
  /// Per-request timeout; `None` leaves the client default in place.
  pub timeout_seconds: Option<u64>,
}

impl GitlabConfig {
  /// Configured request timeout, if any.
  pub fn timeout(&self) -> Option<Duration> {
    self.timeout_seconds.map(Duration::from_secs)
  }
}

impl Default for GitlabConfig {
  fn default() -> Self {
    Self {
      url: String::new(),
      token: String::new(),
      insecure_skip_verify: true,
      timeout_seconds: None,
    }
  }
}

// Token stays out of logs.
impl std::fmt::Debug for GitlabConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GitlabConfig")
      .field("url", &self.url)
      .field("token", &"<redacted>")
      .field("insecure_skip_verify", &self.insecure_skip_verify)
      .field("timeout_seconds", &self.timeout_seconds)
      .finish()
  }
}

/// Metrics server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  /// Bind address of the `/metrics` listener.
  pub listen_address: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      listen_address: default_listen_address(),
    }
  }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
  /// One JSON object per event.
  #[default]
  Json,
  /// Human-readable lines with full timestamps.
  Text,
}

impl std::str::FromStr for LogFormat {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "json" => Ok(Self::Json),
      "text" => Ok(Self::Text),
      other => Err(anyhow::anyhow!("unknown log format {other:?} (expected json or text)")),
    }
  }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
  pub level: String,
  /// Output format.
  pub format: LogFormat,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      format: LogFormat::default(),
    }
  }
}

// Default value functions for serde

fn default_listen_address() -> String {
  "0.0.0.0:9191".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

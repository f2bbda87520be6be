//! Configuration Loader - File Loading, Env Overrides and Validation
//!
//! Resolution order: built-in defaults, then the TOML file named by
//! `EXPORTER_CONFIG` (if set), then individual environment variables.
//! Missing `GITLAB_URL`/`GITLAB_TOKEN` is fatal and reported before the
//! listener is ever bound.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};

use super::AppConfig;

/// Env var naming an optional TOML config file.
pub const CONFIG_PATH_VAR: &str = "EXPORTER_CONFIG";

/// Load configuration from the process environment.
///
/// # Errors
/// See [`load_from`].
pub fn load_config() -> Result<AppConfig> {
  load_from(|key| std::env::var(key).ok())
}

/// Load configuration using `lookup` in place of the process environment.
///
/// # Errors
/// Returns detailed error if:
/// - The config file can't be read or parsed
/// - An override has an unparseable value
/// - `GITLAB_URL` or `GITLAB_TOKEN` is absent from both file and env
/// - The listen address is not a socket address
pub fn load_from<F>(lookup: F) -> Result<AppConfig>
where
  F: Fn(&str) -> Option<String>,
{
  let mut config = match lookup(CONFIG_PATH_VAR) {
    Some(path) if !path.is_empty() => load_file(Path::new(&path))?,
    _ => AppConfig::default(),
  };

  apply_env_overrides(&mut config, &lookup)?;
  validate_config(&config)?;

  Ok(config)
}

/// Read and parse a TOML config file.
fn load_file(path: &Path) -> Result<AppConfig> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  parse_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse TOML config content.
///
/// # Errors
/// Returns an error for malformed TOML or mistyped keys.
pub fn parse_toml(content: &str) -> Result<AppConfig> {
  Ok(toml::from_str(content)?)
}

fn apply_env_overrides<F>(config: &mut AppConfig, lookup: &F) -> Result<()>
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(url) = lookup("GITLAB_URL") {
    config.gitlab.url = url;
  }
  if let Some(token) = lookup("GITLAB_TOKEN") {
    config.gitlab.token = token;
  }
  if let Some(raw) = lookup("GITLAB_INSECURE_SKIP_VERIFY") {
    config.gitlab.insecure_skip_verify = parse_bool(&raw)
      .with_context(|| format!("GITLAB_INSECURE_SKIP_VERIFY has invalid value {raw:?}"))?;
  }
  if let Some(raw) = lookup("GITLAB_TIMEOUT_SECONDS") {
    let secs = raw
      .trim()
      .parse::<u64>()
      .with_context(|| format!("GITLAB_TIMEOUT_SECONDS has invalid value {raw:?}"))?;
    config.gitlab.timeout_seconds = Some(secs);
  }
  if let Some(addr) = lookup("LISTEN_ADDRESS") {
    config.server.listen_address = addr;
  }
  if let Some(level) = lookup("LOG_LEVEL") {
    config.log.level = level;
  }
  if let Some(raw) = lookup("LOG_FORMAT") {
    config.log.format = raw.parse().context("LOG_FORMAT is invalid")?;
  }
  Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" => Some(false),
    _ => None,
  }
}

/// Validate the merged configuration.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.gitlab.url.is_empty(),
    "GITLAB_URL environment variable is not set"
  );
  anyhow::ensure!(
    !config.gitlab.token.is_empty(),
    "GITLAB_TOKEN environment variable is not set"
  );
  anyhow::ensure!(
    config.gitlab.timeout_seconds != Some(0),
    "GitLab timeout must be positive when set"
  );

  config
    .server
    .listen_address
    .parse::<SocketAddr>()
    .with_context(|| {
      format!(
        "Listen address {:?} is not a valid socket address",
        config.server.listen_address
      )
    })?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;
  use crate::config::LogFormat;

  fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
      .collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn test_minimal_env() {
    let config = load_from(env(&[
      ("GITLAB_URL", "https://gitlab.example.com"),
      ("GITLAB_TOKEN", "glpat-abc"),
    ]))
    .unwrap();

    assert_eq!(config.gitlab.url, "https://gitlab.example.com");
    assert_eq!(config.gitlab.token, "glpat-abc");
    assert!(config.gitlab.insecure_skip_verify);
    assert!(config.gitlab.timeout().is_none());
    assert_eq!(config.server.listen_address, "0.0.0.0:9191");
    assert_eq!(config.log.format, LogFormat::Json);
  }

  #[test]
  fn test_missing_url_is_fatal() {
    let err = load_from(env(&[("GITLAB_TOKEN", "glpat-abc")])).unwrap_err();
    assert!(err.to_string().contains("GITLAB_URL"));
  }

  #[test]
  fn test_missing_token_is_fatal() {
    let err = load_from(env(&[("GITLAB_URL", "https://gitlab.example.com")])).unwrap_err();
    assert!(err.to_string().contains("GITLAB_TOKEN"));
  }

  #[test]
  fn test_empty_token_is_fatal() {
    let result = load_from(env(&[
      ("GITLAB_URL", "https://gitlab.example.com"),
      ("GITLAB_TOKEN", ""),
    ]));
    assert!(result.is_err());
  }

  #[test]
  fn test_env_overrides() {
    let config = load_from(env(&[
      ("GITLAB_URL", "https://gitlab.internal"),
      ("GITLAB_TOKEN", "t"),
      ("GITLAB_INSECURE_SKIP_VERIFY", "false"),
      ("GITLAB_TIMEOUT_SECONDS", "15"),
      ("LISTEN_ADDRESS", "127.0.0.1:9292"),
      ("LOG_LEVEL", "debug"),
      ("LOG_FORMAT", "text"),
    ]))
    .unwrap();

    assert!(!config.gitlab.insecure_skip_verify);
    assert_eq!(config.gitlab.timeout(), Some(std::time::Duration::from_secs(15)));
    assert_eq!(config.server.listen_address, "127.0.0.1:9292");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.log.format, LogFormat::Text);
  }

  #[test]
  fn test_invalid_overrides_rejected() {
    let base = [("GITLAB_URL", "https://g"), ("GITLAB_TOKEN", "t")];

    let mut bad_bool = base.to_vec();
    bad_bool.push(("GITLAB_INSECURE_SKIP_VERIFY", "maybe"));
    assert!(load_from(env(&bad_bool)).is_err());

    let mut bad_addr = base.to_vec();
    bad_addr.push(("LISTEN_ADDRESS", "localhost"));
    assert!(load_from(env(&bad_addr)).is_err());

    let mut zero_timeout = base.to_vec();
    zero_timeout.push(("GITLAB_TIMEOUT_SECONDS", "0"));
    assert!(load_from(env(&zero_timeout)).is_err());
  }

  #[test]
  fn test_parse_toml_sections() {
    let config = parse_toml(
      r#"
        [gitlab]
        url = "https://gitlab.example.com"
        token = "from-file"
        insecure_skip_verify = false
        timeout_seconds = 5

        [server]
        listen_address = "127.0.0.1:9999"

        [log]
        format = "text"
      "#,
    )
    .unwrap();

    assert_eq!(config.gitlab.token, "from-file");
    assert!(!config.gitlab.insecure_skip_verify);
    assert_eq!(config.gitlab.timeout_seconds, Some(5));
    assert_eq!(config.server.listen_address, "127.0.0.1:9999");
    assert_eq!(config.log.level, "info");
    assert_eq!(config.log.format, LogFormat::Text);
  }

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_from(env(&[
      (CONFIG_PATH_VAR, "nonexistent.toml"),
      ("GITLAB_URL", "https://g"),
      ("GITLAB_TOKEN", "t"),
    ]));
    assert!(result.is_err());
  }

  #[test]
  fn test_token_redacted_in_debug() {
    let config = load_from(env(&[("GITLAB_URL", "https://g"), ("GITLAB_TOKEN", "secret")]))
      .unwrap();
    assert!(!format!("{:?}", config.gitlab).contains("secret"));
  }
}

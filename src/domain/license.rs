//! License Record - Decoded `/api/v4/license` Document
//!
//! Mirrors the subset of the GitLab license API response that the
//! exporter republishes. Decoding is deliberately lenient: unknown keys
//! are ignored and missing or `null` keys fall back to zero values, so a
//! partially populated document still yields a complete record.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Date layout used by the license API (`2024-01-15`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Unix seconds of `0001-01-01T00:00:00Z`, the value a date that fails
/// to parse is reported as.
pub const ZERO_TIME_UNIX: i64 = -62_135_596_800;

/// A license date that does not match [`DATE_FORMAT`].
#[derive(Debug, Error)]
pub enum DateParseError {
  /// Not exactly `YYYY-MM-DD` (ten characters, zero-padded digits).
  #[error("license date {0:?} is not in YYYY-MM-DD form")]
  Layout(String),

  /// Right shape, but not a calendar date (e.g. `2024-02-30`).
  #[error("invalid license date {input:?}: {source}")]
  Calendar {
    input: String,
    #[source]
    source: chrono::ParseError,
  },
}

impl DateParseError {
  /// The raw string received from the API.
  pub fn input(&self) -> &str {
    match self {
      Self::Layout(input) | Self::Calendar { input, .. } => input,
    }
  }
}

/// License status as returned by the GitLab API.
///
/// Immutable once decoded. Every field defaults to its zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LicenseRecord {
  /// Opaque license identifier.
  #[serde(deserialize_with = "null_as_default")]
  pub id: i64,
  /// Activation date, `YYYY-MM-DD`.
  #[serde(deserialize_with = "null_as_default")]
  pub starts_at: String,
  /// Expiry date, `YYYY-MM-DD`.
  #[serde(deserialize_with = "null_as_default")]
  pub expires_at: String,
  /// Highest user count observed since the license started.
  #[serde(deserialize_with = "null_as_default")]
  pub historical_max: i64,
  /// Same semantics as `historical_max`; published separately by the API.
  #[serde(deserialize_with = "null_as_default")]
  pub maximum_user_count: i64,
  /// Whether the license has expired.
  #[serde(deserialize_with = "null_as_default")]
  pub expired: bool,
  /// Billable users minus licensed seats, reported as-is.
  #[serde(deserialize_with = "null_as_default")]
  pub overage: i64,
  /// Licensed seats.
  #[serde(deserialize_with = "null_as_default")]
  pub user_limit: i64,
  /// Seats currently consumed.
  #[serde(deserialize_with = "null_as_default")]
  pub active_users: i64,
}

impl LicenseRecord {
  /// Decode a response body.
  ///
  /// # Errors
  /// Fails when the body is not JSON or a known key has the wrong type.
  pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
    serde_json::from_slice(body)
  }
}

/// Treat an explicit JSON `null` the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Convert a `YYYY-MM-DD` date to Unix seconds at midnight UTC.
///
/// # Errors
/// Returns [`DateParseError`] when `date` does not match [`DATE_FORMAT`].
pub fn date_to_unix(date: &str) -> Result<i64, DateParseError> {
  // chrono alone accepts `2024-1-5`, ` 2024-01-15` and `+2024-01-15`.
  if !has_date_layout(date) {
    return Err(DateParseError::Layout(date.to_string()));
  }

  let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|source| {
    DateParseError::Calendar {
      input: date.to_string(),
      source,
    }
  })?;
  Ok(parsed.and_time(NaiveTime::MIN).and_utc().timestamp())
}

/// Exactly four, two and two ASCII digits separated by `-`.
fn has_date_layout(date: &str) -> bool {
  let bytes = date.as_bytes();
  bytes.len() == 10
    && bytes.iter().enumerate().all(|(i, b)| match i {
      4 | 7 => *b == b'-',
      _ => b.is_ascii_digit(),
    })
}

/// Gauge value of the `expired` flag: 1.0 when expired, otherwise 0.0.
pub fn expired_value(expired: bool) -> f64 {
  if expired { 1.0 } else { 0.0 }
}

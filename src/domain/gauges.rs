//! Gauge Set - License Fields as Numeric Samples
//!
//! Translates a [`LicenseRecord`] into the nine gauge values the exporter
//! publishes. Built fresh for every scrape and never shared between
//! scrapes.

use tracing::info;

use super::license::{date_to_unix, expired_value, LicenseRecord, ZERO_TIME_UNIX};

/// Metric namespace shared by all license gauges.
pub const NAMESPACE: &str = "gitlab_license";

/// One of the nine published license gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GaugeKind {
  Id,
  StartsAt,
  ExpiresAt,
  HistoricalMax,
  MaximumUserCount,
  Expired,
  Overage,
  UserLimit,
  ActiveUsers,
}

impl GaugeKind {
  /// Every gauge, in exposition order.
  pub const ALL: [Self; 9] = [
    Self::Id,
    Self::StartsAt,
    Self::ExpiresAt,
    Self::HistoricalMax,
    Self::MaximumUserCount,
    Self::Expired,
    Self::Overage,
    Self::UserLimit,
    Self::ActiveUsers,
  ];

  /// Metric name without the namespace.
  pub const fn name(self) -> &'static str {
    match self {
      Self::Id => "id",
      Self::StartsAt => "starts_at",
      Self::ExpiresAt => "expires_at",
      Self::HistoricalMax => "historical_max",
      Self::MaximumUserCount => "maximum_user_count",
      Self::Expired => "expired",
      Self::Overage => "overage",
      Self::UserLimit => "user_limit",
      Self::ActiveUsers => "active_users",
    }
  }

  /// Help text shown in the exposition output.
  pub const fn help(self) -> &'static str {
    match self {
      Self::Id => "ID of the license",
      Self::StartsAt => "Date the license starts at",
      Self::ExpiresAt => "Date the license expires at",
      Self::HistoricalMax | Self::MaximumUserCount => {
        "This is the highest peak of users on your installation since the license started"
      }
      Self::Expired => "Expiry status of the license",
      Self::Overage => {
        "The difference between the number of billable users and the licensed number of users"
      }
      Self::UserLimit => "The number of users the license is licensed for",
      Self::ActiveUsers => "Current active users that consume a license",
    }
  }

  /// Fully qualified metric name, e.g. `gitlab_license_user_limit`.
  pub fn fq_name(self) -> String {
    format!("{NAMESPACE}_{}", self.name())
  }
}

/// Numeric view of one license document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeSet {
  pub id: f64,
  pub starts_at: f64,
  pub expires_at: f64,
  pub historical_max: f64,
  pub maximum_user_count: f64,
  pub expired: f64,
  pub overage: f64,
  pub user_limit: f64,
  pub active_users: f64,
  /// Which date fields fell back to [`ZERO_TIME_UNIX`].
  pub date_fallbacks: DateFallbacks,
}

/// Date fields that could not be parsed during the last conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFallbacks {
  pub starts_at: bool,
  pub expires_at: bool,
}

impl GaugeSet {
  /// Map every record field to its gauge value.
  ///
  /// Counts are cast directly, dates become Unix seconds at midnight UTC
  /// and `expired` becomes 1.0 or 0.0. An unparseable date is logged and
  /// reported as [`ZERO_TIME_UNIX`]; it never drops the other samples.
  #[allow(clippy::cast_precision_loss)]
  pub fn from_record(record: &LicenseRecord) -> Self {
    let (starts_at, starts_fallback) = date_value(record.id, "starts_at", &record.starts_at);
    let (expires_at, expires_fallback) = date_value(record.id, "expires_at", &record.expires_at);

    Self {
      id: record.id as f64,
      starts_at,
      expires_at,
      historical_max: record.historical_max as f64,
      maximum_user_count: record.maximum_user_count as f64,
      expired: expired_value(record.expired),
      overage: record.overage as f64,
      user_limit: record.user_limit as f64,
      active_users: record.active_users as f64,
      date_fallbacks: DateFallbacks {
        starts_at: starts_fallback,
        expires_at: expires_fallback,
      },
    }
  }

  /// Value of a single gauge.
  pub const fn value(&self, kind: GaugeKind) -> f64 {
    match kind {
      GaugeKind::Id => self.id,
      GaugeKind::StartsAt => self.starts_at,
      GaugeKind::ExpiresAt => self.expires_at,
      GaugeKind::HistoricalMax => self.historical_max,
      GaugeKind::MaximumUserCount => self.maximum_user_count,
      GaugeKind::Expired => self.expired,
      GaugeKind::Overage => self.overage,
      GaugeKind::UserLimit => self.user_limit,
      GaugeKind::ActiveUsers => self.active_users,
    }
  }

  /// All nine samples in exposition order.
  pub fn samples(&self) -> impl Iterator<Item = (GaugeKind, f64)> + '_ {
    GaugeKind::ALL.into_iter().map(move |kind| (kind, self.value(kind)))
  }
}

/// Date gauge value plus whether the zero-time fallback was used.
#[allow(clippy::cast_precision_loss)]
fn date_value(license_id: i64, field: &'static str, raw: &str) -> (f64, bool) {
  match date_to_unix(raw) {
    Ok(seconds) => (seconds as f64, false),
    Err(e) => {
      info!(
        license_id,
        field,
        error = %e,
        "License date unparseable, reporting zero time"
      );
      (ZERO_TIME_UNIX as f64, true)
    }
  }
}

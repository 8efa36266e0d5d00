//! Customer records — the single entity kept by the Roster store.
//!
//! A record is identified by a store-assigned integer id. The pair
//! (`full_name`, `phone`) is its natural key for duplicate detection, but the
//! store itself never enforces it; see [`crate::oracle`].

use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound as _};
use serde::Serialize;

use crate::{Error, Result};

// ─── Formats ─────────────────────────────────────────────────────────────────

/// Canonical text form of `registered_at`, both in the database and in
/// exported sheets.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The only accepted form for date bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Alternative timestamp forms accepted from import sources, tried after
/// [`TIMESTAMP_FORMAT`]. Spreadsheet tools often drop the seconds or add a
/// fraction.
const LENIENT_TIMESTAMP_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M",
];

/// The current local wall-clock time truncated to whole seconds.
pub fn now() -> NaiveDateTime { Local::now().naive_local().trunc_subsecs(0) }

pub fn format_timestamp(ts: NaiveDateTime) -> String {
  ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a registration timestamp, ignoring surrounding whitespace.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` with an optional fraction (dropped), the
/// same with a `T` separator, `YYYY-MM-DD HH:MM` and a bare `YYYY-MM-DD`
/// (read as midnight).
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
  let trimmed = s.trim();
  std::iter::once(TIMESTAMP_FORMAT)
    .chain(LENIENT_TIMESTAMP_FORMATS.iter().copied())
    .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    .or_else(|| {
      parse_date(trimmed)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
    .map(|ts| ts.trunc_subsecs(0))
    .ok_or_else(|| Error::InvalidTimestamp(s.to_owned()))
}

/// Parse a strict `YYYY-MM-DD` date. Unpadded components are rejected.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  let shaped = s.len() == 10
    && s.bytes().enumerate().all(|(i, b)| match i {
      4 | 7 => b == b'-',
      _ => b.is_ascii_digit(),
    });
  if !shaped {
    return Err(Error::InvalidDate(s.to_owned()));
  }
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|_| Error::InvalidDate(s.to_owned()))
}

/// Map an empty string to `None`. Optional fields are never stored empty.
pub fn non_empty(s: impl Into<String>) -> Option<String> {
  let s = s.into();
  (!s.is_empty()).then_some(s)
}

// ─── Customer ────────────────────────────────────────────────────────────────

/// A persisted customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
  /// Store-assigned; strictly increasing and never reused.
  pub id:            i64,
  pub full_name:     String,
  pub phone:         Option<String>,
  pub email:         Option<String>,
  pub address:       Option<String>,
  pub registered_at: NaiveDateTime,
}

// ─── NewCustomer ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::CustomerStore::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
  pub full_name:     String,
  pub phone:         Option<String>,
  pub email:         Option<String>,
  pub address:       Option<String>,
  pub registered_at: NaiveDateTime,
}

impl NewCustomer {
  /// Convenience constructor: no contact details, registered now.
  pub fn new(full_name: impl Into<String>) -> Self {
    Self {
      full_name:     full_name.into(),
      phone:         None,
      email:         None,
      address:       None,
      registered_at: now(),
    }
  }

  /// Build from raw text fields as typed by a user; empty strings become
  /// `None`.
  pub fn from_text(
    full_name: &str,
    phone: &str,
    email: &str,
    address: &str,
  ) -> Self {
    Self {
      phone: non_empty(phone),
      email: non_empty(email),
      address: non_empty(address),
      ..Self::new(full_name)
    }
  }
}

// ─── CustomerUpdate ──────────────────────────────────────────────────────────

/// Full overwrite of every non-id field except `registered_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerUpdate {
  pub full_name: String,
  pub phone:     Option<String>,
  pub email:     Option<String>,
  pub address:   Option<String>,
}

impl CustomerUpdate {
  pub fn from_text(
    full_name: &str,
    phone: &str,
    email: &str,
    address: &str,
  ) -> Self {
    Self {
      full_name: full_name.to_owned(),
      phone:     non_empty(phone),
      email:     non_empty(email),
      address:   non_empty(address),
    }
  }
}

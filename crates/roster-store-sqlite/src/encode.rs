//! Encoding and decoding helpers between [`Customer`] and its SQLite row.
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text so that lexical order
//! is chronological and `substr(registered_at, 1, 10)` is the date.

use chrono::{NaiveDate, NaiveDateTime};
use roster_core::customer::{Customer, TIMESTAMP_FORMAT, format_timestamp};

use crate::{Error, Result};

/// Column list matching [`RawCustomer::from_row`].
pub const COLUMNS: &str = "id, full_name, phone, email, address, registered_at";

pub fn encode_ts(ts: NaiveDateTime) -> String { format_timestamp(ts) }

pub fn decode_ts(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

/// A customer row as read from SQLite, before timestamp decoding.
pub struct RawCustomer {
  pub id:            i64,
  pub full_name:     String,
  pub phone:         Option<String>,
  pub email:         Option<String>,
  pub address:       Option<String>,
  pub registered_at: String,
}

impl RawCustomer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      full_name:     row.get(1)?,
      phone:         row.get(2)?,
      email:         row.get(3)?,
      address:       row.get(4)?,
      registered_at: row.get(5)?,
    })
  }

  pub fn into_customer(self) -> Result<Customer> {
    Ok(Customer {
      id:            self.id,
      full_name:     self.full_name,
      phone:         self.phone,
      email:         self.email,
      address:       self.address,
      registered_at: decode_ts(&self.registered_at)?,
    })
  }
}

//! Error type for `roster-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] roster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Update or delete referenced an id with no record.
  #[error("customer not found: {0}")]
  NotFound(i64),

  #[error("i/o error on {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("no free backup name for {}", .0.display())]
  BackupNameCollision(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

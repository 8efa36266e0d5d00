//! Error type for `roster-sheet`.

use std::path::PathBuf;

use thiserror::Error;

use crate::ImportReport;

#[derive(Debug, Error)]
pub enum Error {
  /// A date bound for a range export was not `YYYY-MM-DD`. Nothing written.
  #[error("invalid date {0:?}: expected YYYY-MM-DD")]
  Format(String),

  /// The import source does not exist. The store was not touched.
  #[error("file not found: {}", .0.display())]
  FileNotFound(PathBuf),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("i/o error on {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// An import stopped part-way. Rows counted in `report` as imported stay
  /// committed.
  #[error(
    "import stopped after {} imported and {} skipped",
    report.imported,
    report.skipped
  )]
  Partial {
    report: ImportReport,
    #[source]
    source: Box<Error>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub(crate) fn partial(report: ImportReport, source: Error) -> Self {
    Self::Partial { report, source: Box::new(source) }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

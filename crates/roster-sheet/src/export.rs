//! Bulk export: all records, or a date-bounded subset, to a CSV sheet.

use std::{
  ffi::OsString,
  fs::{self, File},
  io::{self, BufWriter},
  path::{Path, PathBuf},
};

use chrono::NaiveDate;
use roster_core::{
  customer::{Customer, parse_date},
  store::{CustomerStore, ListOrder},
};

use crate::{Error, Result, codec::write_sheet};

/// File name used by [`export_all`].
pub const EXPORT_ALL_FILE: &str = "customers.csv";

const PARTIAL_SUFFIX: &str = ".partial";

/// Where an export landed and how many data rows it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
  pub path: PathBuf,
  pub rows: usize,
}

/// File name used by [`export_range`]; the same bounds always give the same
/// name.
pub fn range_file_name(start: NaiveDate, end: NaiveDate) -> String {
  format!("customers_{start}_{end}.csv")
}

/// Export every record, ordered by id, to `<dir>/customers.csv`.
pub async fn export_all<S: CustomerStore>(
  store: &S,
  dir: &Path,
) -> Result<ExportSummary> {
  let customers = store
    .list(ListOrder::default())
    .await
    .map_err(Error::store)?;
  write_export(&dir.join(EXPORT_ALL_FILE), &customers)
}

/// Export records registered between `start` and `end` (inclusive,
/// `YYYY-MM-DD`), oldest first, to `<dir>/customers_<start>_<end>.csv`.
///
/// Both bounds are validated before the store or filesystem is touched.
pub async fn export_range<S: CustomerStore>(
  store: &S,
  dir: &Path,
  start: &str,
  end: &str,
) -> Result<ExportSummary> {
  let start = parse_date(start).map_err(|_| Error::Format(start.to_owned()))?;
  let end = parse_date(end).map_err(|_| Error::Format(end.to_owned()))?;

  let customers = store.range(start, end).await.map_err(Error::store)?;
  write_export(&dir.join(range_file_name(start, end)), &customers)
}

/// Write to a `.partial` sibling, then rename over `path`.
fn write_export(path: &Path, customers: &[Customer]) -> Result<ExportSummary> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
  }

  let mut partial = OsString::from(path.as_os_str());
  partial.push(PARTIAL_SUFFIX);
  let partial = PathBuf::from(partial);

  let written = File::create(&partial)
    .map_err(|e| io_error(&partial, e))
    .and_then(|file| Ok(write_sheet(BufWriter::new(file), customers)?))
    .and_then(|buf| {
      buf
        .into_inner()
        .map_err(|e| io_error(&partial, e.into_error()))?
        .sync_all()
        .map_err(|e| io_error(&partial, e))
    });
  if let Err(e) = written {
    fs::remove_file(&partial).ok();
    return Err(e);
  }

  fs::rename(&partial, path).map_err(|e| io_error(path, e))?;

  tracing::info!(path = %path.display(), rows = customers.len(), "export written");
  Ok(ExportSummary { path: path.to_path_buf(), rows: customers.len() })
}

fn io_error(path: &Path, source: io::Error) -> Error {
  Error::Io { path: path.to_path_buf(), source }
}

//! Bulk import with duplicate reconciliation.
//!
//! Each row is committed on its own. If the store fails part-way through a
//! file, rows already imported stay imported and the returned error carries
//! the counts so far; the import is at-least-once-partial, never rolled back.

use std::{fs::File, path::Path};

use roster_core::{
  customer::{NewCustomer, now, parse_timestamp},
  oracle::is_duplicate,
  store::CustomerStore,
};

use crate::{Error, Result, SheetRow, codec::sheet_reader};

/// Row counts from an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
  pub imported: usize,
  /// Undecodable rows and rows with an empty name, an unreadable timestamp
  /// or a duplicate key.
  pub skipped:  usize,
}

#[derive(Debug)]
enum Outcome {
  Imported(i64),
  Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy)]
enum SkipReason {
  EmptyName,
  BadTimestamp,
  Duplicate,
}

/// Import every data row of the sheet at `path` into `store`.
///
/// Fails with [`Error::FileNotFound`] before touching the store if `path`
/// does not exist. A row that cannot be decoded is counted as skipped. A
/// store or read failure ends the import with [`Error::Partial`], carrying
/// the counts for the rows already handled.
pub async fn import<S: CustomerStore>(store: &S, path: &Path) -> Result<ImportReport> {
  if !path.exists() {
    return Err(Error::FileNotFound(path.to_path_buf()));
  }
  let file = File::open(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;

  let mut report = ImportReport::default();
  for record in sheet_reader(file).into_records() {
    let record = match record {
      Ok(record) => record,
      Err(e) if e.is_io_error() => return Err(Error::partial(report, e.into())),
      Err(e) => {
        let line = e.position().map(|p| p.line());
        tracing::warn!(?line, error = %e, "undecodable import row");
        report.skipped += 1;
        continue;
      }
    };

    let line = record.position().map(|p| p.line());
    match reconcile(store, SheetRow::from_record(&record)).await {
      Ok(Outcome::Imported(id)) => {
        tracing::debug!(?line, id, "row imported");
        report.imported += 1;
      }
      Ok(Outcome::Skipped(reason)) => {
        tracing::debug!(?line, ?reason, "row skipped");
        report.skipped += 1;
      }
      Err(e) => {
        tracing::warn!(?line, error = %e, "import stopped");
        return Err(Error::partial(report, e));
      }
    }
  }

  tracing::info!(
    path = %path.display(),
    imported = report.imported,
    skipped = report.skipped,
    "import finished"
  );
  Ok(report)
}

async fn reconcile<S: CustomerStore>(store: &S, row: SheetRow) -> Result<Outcome> {
  if row.full_name.is_empty() {
    return Ok(Outcome::Skipped(SkipReason::EmptyName));
  }

  let registered_at = match row.registered_at.as_deref() {
    Some(raw) => match parse_timestamp(raw) {
      Ok(ts) => ts,
      Err(e) => {
        tracing::warn!(error = %e, "unreadable timestamp in import row");
        return Ok(Outcome::Skipped(SkipReason::BadTimestamp));
      }
    },
    None => now(),
  };

  if is_duplicate(store, &row.full_name, row.phone.as_deref())
    .await
    .map_err(Error::store)?
  {
    return Ok(Outcome::Skipped(SkipReason::Duplicate));
  }

  let id = store
    .insert(NewCustomer {
      full_name: row.full_name,
      phone: row.phone,
      email: row.email,
      address: row.address,
      registered_at,
    })
    .await
    .map_err(Error::store)?;
  Ok(Outcome::Imported(id))
}

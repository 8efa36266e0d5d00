//! Backup agent: byte-for-byte snapshots of the store file.
//!
//! Run once on clean shutdown, after the connection is closed, so the file on
//! disk holds every committed row. Snapshots are named after the store file
//! and the wall-clock second they were taken, e.g.
//! `customers_20240305-140709.db`.

use std::{
  ffi::OsString,
  fs, io,
  path::{Path, PathBuf},
};

use chrono::NaiveDateTime;

use crate::{Error, Result};

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
const PARTIAL_SUFFIX: &str = ".partial";
const MAX_COLLISION_SUFFIX: u32 = 100;

/// Copy `store_path` into `backup_dir` under a timestamped name.
///
/// Returns `Ok(None)` without touching the filesystem if the store file is
/// missing or empty. Repeated backups within the same second get a `-01`,
/// `-02`, … suffix rather than overwriting each other.
pub fn backup(
  store_path: &Path,
  backup_dir: &Path,
  now: NaiveDateTime,
) -> Result<Option<PathBuf>> {
  let meta = match fs::metadata(store_path) {
    Ok(meta) => meta,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      tracing::debug!(path = %store_path.display(), "no store file; skipping backup");
      return Ok(None);
    }
    Err(source) => return Err(io_error(store_path, source)),
  };
  if meta.len() == 0 {
    tracing::debug!(path = %store_path.display(), "empty store file; skipping backup");
    return Ok(None);
  }

  fs::create_dir_all(backup_dir).map_err(|e| io_error(backup_dir, e))?;

  let target = unique_backup_path(store_path, backup_dir, now)?;
  let mut partial = OsString::from(target.as_os_str());
  partial.push(PARTIAL_SUFFIX);
  let partial = PathBuf::from(partial);

  if let Err(e) = fs::copy(store_path, &partial) {
    fs::remove_file(&partial).ok();
    return Err(io_error(store_path, e));
  }
  fs::rename(&partial, &target).map_err(|e| io_error(&target, e))?;

  tracing::info!(
    from = %store_path.display(),
    to = %target.display(),
    bytes = meta.len(),
    "store backed up"
  );
  Ok(Some(target))
}

/// `<backup_dir>/<stem>_<timestamp>[-NN].<ext>`, choosing the first name not
/// already taken.
fn unique_backup_path(
  store_path: &Path,
  backup_dir: &Path,
  now: NaiveDateTime,
) -> Result<PathBuf> {
  let stem = store_path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| "store".to_owned());
  let ext = store_path
    .extension()
    .map(|e| format!(".{}", e.to_string_lossy()))
    .unwrap_or_default();
  let base = format!("{stem}_{}", now.format(BACKUP_TIMESTAMP_FORMAT));

  for suffix in 0..MAX_COLLISION_SUFFIX {
    let candidate = if suffix == 0 {
      backup_dir.join(format!("{base}{ext}"))
    } else {
      backup_dir.join(format!("{base}-{suffix:02}{ext}"))
    };
    if !candidate.exists() {
      return Ok(candidate);
    }
  }
  Err(Error::BackupNameCollision(backup_dir.join(base)))
}

fn io_error(path: &Path, source: io::Error) -> Error {
  Error::Io { path: path.to_path_buf(), source }
}

//! Layered configuration: defaults, then `roster.toml`, then `ROSTER_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Runtime settings for the `roster` binary.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
  /// SQLite store file.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Directory that receives exported sheets.
  #[serde(default = "default_export_dir")]
  pub export_dir: PathBuf,
  /// Directory that receives store backups.
  #[serde(default = "default_backup_dir")]
  pub backup_dir: PathBuf,
}

fn default_store_path() -> PathBuf { PathBuf::from("customers.db") }
fn default_export_dir() -> PathBuf { PathBuf::from(".") }
fn default_backup_dir() -> PathBuf { PathBuf::from("backups") }

impl Default for Settings {
  fn default() -> Self {
    Self {
      store_path: default_store_path(),
      export_dir: default_export_dir(),
      backup_dir: default_backup_dir(),
    }
  }
}

impl Settings {
  /// Load from `config_path` (optional) and the environment.
  pub fn load(config_path: &Path) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .add_source(config::File::from(config_path).required(false))
      .add_source(config::Environment::with_prefix("ROSTER"))
      .build()
      .context("failed to read config file")?;

    let settings: Settings = raw
      .try_deserialize()
      .context("failed to deserialise Settings")?;
    Ok(settings.expanded())
  }

  fn expanded(self) -> Self {
    Self {
      store_path: expand_tilde(&self.store_path),
      export_dir: expand_tilde(&self.export_dir),
      backup_dir: expand_tilde(&self.backup_dir),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

//! Spreadsheet exchange for Roster: bulk export to, and duplicate-safe bulk
//! import from, six-column CSV sheets.
//!
//! # Sheet layout
//!
//! | col | header          | on import                  |
//! |-----|-----------------|----------------------------|
//! | 1   | `ID`            | ignored                    |
//! | 2   | `Full Name`     | required; empty → skipped  |
//! | 3   | `Phone`         | optional                   |
//! | 4   | `Email`         | optional                   |
//! | 5   | `Address`       | optional                   |
//! | 6   | `Registered At` | optional; empty → now      |
//!
//! The header row is always written on export and always skipped on import.

mod codec;
mod export;
mod import;

pub mod error;

pub use codec::{HEADER, SheetRow};
pub use error::{Error, Result};
pub use export::{EXPORT_ALL_FILE, ExportSummary, export_all, export_range, range_file_name};
pub use import::{ImportReport, import};

#[cfg(test)]
mod tests;

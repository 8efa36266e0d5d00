//! SQLite backend for the Roster customer store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread. Also home to the backup agent, which snapshots the store file.

mod encode;
mod schema;
mod store;

pub mod backup;
pub mod error;

pub use backup::backup;
pub use error::{Error, Result};
pub use store::SqliteStore;

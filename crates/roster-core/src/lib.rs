//! Core types and trait definitions for the Roster customer store.
//!
//! This crate is deliberately free of database and file-format dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod customer;
pub mod error;
pub mod oracle;
pub mod store;

pub use error::{Error, Result};

//! The `CustomerStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-sheet`, `roster-cli`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::customer::{Customer, CustomerUpdate, NewCustomer};

// ─── Ordering ────────────────────────────────────────────────────────────────

/// The column a listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
  #[default]
  Id,
  RegisteredAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
  #[default]
  Ascending,
  Descending,
}

/// Parameters for [`CustomerStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOrder {
  pub key:       SortKey,
  pub direction: Direction,
}

impl ListOrder {
  pub fn new(key: SortKey, direction: Direction) -> Self {
    Self { key, direction }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Roster customer store backend.
///
/// Every mutation is committed before its future resolves; readers never see
/// a partial write. The store does not enforce the natural key — callers
/// consult [`crate::oracle`] before inserting.
pub trait CustomerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a new record and return its assigned id.
  ///
  /// Fails if `full_name` is empty.
  fn insert(
    &self,
    input: NewCustomer,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Overwrite every non-id field of record `id` except `registered_at`.
  ///
  /// Fails with a not-found error if no such record exists.
  fn update(
    &self,
    id: i64,
    fields: CustomerUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove record `id`. Its id is never handed out again.
  fn delete(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  /// All records in the requested order. Ties on `registered_at` are broken
  /// by id in the same direction.
  fn list(
    &self,
    order: ListOrder,
  ) -> impl Future<Output = Result<Vec<Customer>, Self::Error>> + Send + '_;

  /// Records whose name, phone, email or address contains `text`
  /// (case-sensitive), ordered by id.
  fn search<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Vec<Customer>, Self::Error>> + Send + 'a;

  /// Records whose registration date lies in `[start, end]`, ordered by
  /// `registered_at` ascending. An inverted range is empty.
  fn range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Customer>, Self::Error>> + Send + '_;

  /// The `limit` most recently registered records, newest first.
  fn recent(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Customer>, Self::Error>> + Send + '_;

  fn count(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Whether a record with exactly this `full_name` and `phone` exists.
  /// `None` and `Some("")` are the same phone.
  fn exists<'a>(
    &'a self,
    full_name: &'a str,
    phone: Option<&'a str>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

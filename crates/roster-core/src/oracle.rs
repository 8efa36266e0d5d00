//! Duplicate detection — the one policy shared by the interactive add path
//! and the bulk importer.
//!
//! Two records are duplicates iff their `full_name` values are byte-equal and
//! their `phone` values are byte-equal, where a missing phone equals an empty
//! one. Nothing is trimmed or case-folded, so `"Ada"` and `"ada "` coexist.

use crate::{customer::NewCustomer, store::CustomerStore};

/// Outcome of [`add_customer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
  /// Inserted under the given id.
  Added(i64),
  /// A record with the same name and phone already exists; nothing written.
  Duplicate,
}

/// Whether inserting (`full_name`, `phone`) would duplicate a stored record.
pub async fn is_duplicate<S: CustomerStore>(
  store: &S,
  full_name: &str,
  phone: Option<&str>,
) -> Result<bool, S::Error> {
  let phone = phone.filter(|p| !p.is_empty());
  let found = store.exists(full_name, phone).await?;
  if found {
    tracing::debug!(full_name, phone, "duplicate customer");
  }
  Ok(found)
}

/// Insert `input` unless it duplicates an existing record.
pub async fn add_customer<S: CustomerStore>(
  store: &S,
  input: NewCustomer,
) -> Result<AddOutcome, S::Error> {
  if is_duplicate(store, &input.full_name, input.phone.as_deref()).await? {
    return Ok(AddOutcome::Duplicate);
  }
  let id = store.insert(input).await?;
  tracing::info!(id, "customer added");
  Ok(AddOutcome::Added(id))
}

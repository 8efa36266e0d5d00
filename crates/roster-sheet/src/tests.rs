//! Export/import tests against an in-memory `SqliteStore`.

use std::{
  fs,
  path::Path,
  sync::atomic::{AtomicUsize, Ordering},
};

use chrono::NaiveDate;
use roster_core::{
  customer::{Customer, CustomerUpdate, NewCustomer, now, parse_timestamp},
  store::{CustomerStore, ListOrder},
};
use roster_store_sqlite::SqliteStore;

use crate::{EXPORT_ALL_FILE, Error, ImportReport, export_all, export_range, import};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn customer(name: &str, phone: &str, at: &str) -> NewCustomer {
  NewCustomer {
    phone: roster_core::customer::non_empty(phone),
    registered_at: parse_timestamp(at).unwrap(),
    ..NewCustomer::new(name)
  }
}

async fn seeded() -> SqliteStore {
  let s = store().await;
  let mut ada = customer("Ada Lovelace", "555-0100", "2024-02-10 08:00:00");
  ada.email = Some("ada@example.com".into());
  ada.address = Some("Ockham Park, Surrey".into());
  s.insert(ada).await.unwrap();
  s.insert(customer("Alan Turing", "555-0101", "2024-01-15 12:30:00"))
    .await
    .unwrap();
  s.insert(customer("Grace Hopper", "", "2024-02-01 00:00:00"))
    .await
    .unwrap();
  s.insert(customer("Edsger Dijkstra", "555-0103", "2024-03-01 09:15:00"))
    .await
    .unwrap();
  s
}

fn read_lines(path: &Path) -> Vec<String> {
  fs::read_to_string(path)
    .unwrap()
    .lines()
    .map(str::to_owned)
    .collect()
}

fn write_sheet(dir: &Path, body: &str) -> std::path::PathBuf {
  let path = dir.join("incoming.csv");
  fs::write(&path, format!("ID,Full Name,Phone,Email,Address,Registered At\n{body}"))
    .unwrap();
  path
}

/// Every field except the id.
fn without_id(c: &Customer) -> (String, Option<String>, Option<String>, Option<String>, String) {
  (
    c.full_name.clone(),
    c.phone.clone(),
    c.email.clone(),
    c.address.clone(),
    c.registered_at.to_string(),
  )
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn export_all_writes_header_and_rows_by_id() {
  let s = seeded().await;
  let dir = tempfile::tempdir().unwrap();

  let summary = export_all(&s, dir.path()).await.unwrap();
  assert_eq!(summary.path, dir.path().join(EXPORT_ALL_FILE));
  assert_eq!(summary.rows, 4);

  let lines = read_lines(&summary.path);
  assert_eq!(lines.len(), 5);
  assert_eq!(lines[0], "ID,Full Name,Phone,Email,Address,Registered At");
  assert_eq!(
    lines[1],
    "1,Ada Lovelace,555-0100,ada@example.com,\"Ockham Park, Surrey\",2024-02-10 08:00:00"
  );
  assert_eq!(lines[3], "3,Grace Hopper,,,,2024-02-01 00:00:00");
  assert!(lines[4].starts_with("4,Edsger Dijkstra,"));
}

#[tokio::test]
async fn export_all_replaces_previous_file() {
  let s = seeded().await;
  let dir = tempfile::tempdir().unwrap();
  fs::write(dir.path().join(EXPORT_ALL_FILE), "stale\nstale\nstale\nstale\nstale\nstale\n")
    .unwrap();

  export_all(&s, dir.path()).await.unwrap();

  let lines = read_lines(&dir.path().join(EXPORT_ALL_FILE));
  assert_eq!(lines.len(), 5);
  assert!(lines.iter().all(|l| l != "stale"));
  assert!(!dir.path().join("customers.csv.partial").exists());
}

#[tokio::test]
async fn export_of_empty_store_has_only_header() {
  let s = store().await;
  let dir = tempfile::tempdir().unwrap();

  let summary = export_all(&s, dir.path()).await.unwrap();
  assert_eq!(summary.rows, 0);
  assert_eq!(read_lines(&summary.path).len(), 1);
}

#[tokio::test]
async fn export_range_filters_inclusively_and_orders_by_date() {
  let s = seeded().await;
  let dir = tempfile::tempdir().unwrap();

  let summary = export_range(&s, dir.path(), "2024-01-15", "2024-02-10")
    .await
    .unwrap();
  assert_eq!(summary.path, dir.path().join("customers_2024-01-15_2024-02-10.csv"));
  assert_eq!(summary.rows, 3);

  let names: Vec<String> = read_lines(&summary.path)
    .iter()
    .skip(1)
    .map(|l| l.split(',').nth(1).unwrap().to_owned())
    .collect();
  assert_eq!(names, ["Alan Turing", "Grace Hopper", "Ada Lovelace"]);
}

#[tokio::test]
async fn export_range_same_bounds_reuses_file_name() {
  let s = seeded().await;
  let dir = tempfile::tempdir().unwrap();

  let a = export_range(&s, dir.path(), "2024-03-01", "2024-03-31").await.unwrap();
  let b = export_range(&s, dir.path(), "2024-03-01", "2024-03-31").await.unwrap();
  assert_eq!(a.path, b.path);
  assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn export_range_rejects_malformed_dates_without_writing() {
  let s = seeded().await;
  let dir = tempfile::tempdir().unwrap();

  for (start, end) in [
    ("2024/01/01", "2024-02-01"),
    ("2024-01-01", "Feb 1"),
    ("2024-1-1", "2024-02-01"),
    ("2024-13-01", "2024-12-31"),
  ] {
    let err = export_range(&s, dir.path(), start, end).await.unwrap_err();
    assert!(matches!(err, Error::Format(_)), "{start}..{end}: {err}");
  }
  assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn import_missing_file_is_file_not_found() {
  let s = store().await;
  let dir = tempfile::tempdir().unwrap();

  let err = import(&s, &dir.path().join("nope.csv")).await.unwrap_err();
  assert!(matches!(err, Error::FileNotFound(_)));
  assert_eq!(s.count().await.unwrap(), 0);
}

#[tokio::test]
async fn export_then_import_reproduces_records() {
  let original = seeded().await;
  original.delete(2).await.unwrap();
  let dir = tempfile::tempdir().unwrap();
  let summary = export_all(&original, dir.path()).await.unwrap();

  let fresh = store().await;
  let report = import(&fresh, &summary.path).await.unwrap();
  assert_eq!(report, ImportReport { imported: 3, skipped: 0 });

  let before: Vec<_> = original
    .list(ListOrder::default())
    .await
    .unwrap()
    .iter()
    .map(without_id)
    .collect();
  let after: Vec<_> = fresh
    .list(ListOrder::default())
    .await
    .unwrap()
    .iter()
    .map(without_id)
    .collect();
  assert_eq!(before, after);
}

#[tokio::test]
async fn reimport_into_same_store_skips_everything() {
  let s = seeded().await;
  let dir = tempfile::tempdir().unwrap();
  let summary = export_all(&s, dir.path()).await.unwrap();

  let report = import(&s, &summary.path).await.unwrap();
  assert_eq!(report, ImportReport { imported: 0, skipped: 4 });
  assert_eq!(s.count().await.unwrap(), 4);
}

#[tokio::test]
async fn import_counts_empty_names_and_duplicates_as_skipped() {
  let s = seeded().await;
  let dir = tempfile::tempdir().unwrap();
  // N = 6 rows, M = 2 empty names, K = 2 duplicates of stored records.
  let path = write_sheet(
    dir.path(),
    "\
9,Ada Lovelace,555-0100,,,\n\
9,,555-0999,nobody@example.com,,\n\
9,Grace Hopper,,,,\n\
9,Barbara Liskov,555-0200,,,2024-04-01 10:00:00\n\
,,,,,\n\
9,Ada Lovelace,555-0199,,,\n",
  );

  let report = import(&s, &path).await.unwrap();
  assert_eq!(report, ImportReport { imported: 2, skipped: 4 });
  assert_eq!(s.count().await.unwrap(), 6);
}

#[tokio::test]
async fn import_ignores_source_ids_and_uses_row_timestamp() {
  let s = store().await;
  s.insert(NewCustomer::new("Existing")).await.unwrap();
  let dir = tempfile::tempdir().unwrap();
  let path = write_sheet(dir.path(), "500,Barbara Liskov,555-0200,,,2024-04-01 10:00:00\n");

  import(&s, &path).await.unwrap();

  let c = s.get(2).await.unwrap().expect("assigned the next store id");
  assert_eq!(c.full_name, "Barbara Liskov");
  assert_eq!(c.registered_at, parse_timestamp("2024-04-01 10:00:00").unwrap());
  assert!(s.get(500).await.unwrap().is_none());
}

#[tokio::test]
async fn import_without_timestamp_uses_current_time() {
  let s = store().await;
  let dir = tempfile::tempdir().unwrap();
  // Short rows: no Registered At cell at all, or an empty one.
  let path = write_sheet(dir.path(), "1,Short Row,555\n2,Empty Stamp,556,,,\n");

  let before = now();
  let report = import(&s, &path).await.unwrap();
  let after = now();
  assert_eq!(report, ImportReport { imported: 2, skipped: 0 });

  for c in s.list(ListOrder::default()).await.unwrap() {
    assert!(c.registered_at >= before && c.registered_at <= after);
    assert_eq!(c.email, None);
  }
}

#[tokio::test]
async fn import_skips_duplicates_within_the_same_file() {
  let s = store().await;
  let dir = tempfile::tempdir().unwrap();
  let path = write_sheet(
    dir.path(),
    "1,Alan Turing,555-0101,,,\n2,Alan Turing,555-0101,alan@example.com,,\n",
  );

  let report = import(&s, &path).await.unwrap();
  assert_eq!(report, ImportReport { imported: 1, skipped: 1 });
}

#[tokio::test]
async fn import_skips_unreadable_timestamps() {
  let s = store().await;
  let dir = tempfile::tempdir().unwrap();
  let path = write_sheet(
    dir.path(),
    "1,Alan Turing,555-0101,,,last tuesday\n2,Grace Hopper,,,,2024-02-01\n",
  );

  let report = import(&s, &path).await.unwrap();
  assert_eq!(report, ImportReport { imported: 1, skipped: 1 });
  let grace = s.get(1).await.unwrap().unwrap();
  assert_eq!(grace.full_name, "Grace Hopper");
  assert_eq!(grace.registered_at, parse_timestamp("2024-02-01 00:00:00").unwrap());
}

#[tokio::test]
async fn import_does_not_trim_or_fold_case() {
  let s = seeded().await;
  let dir = tempfile::tempdir().unwrap();
  let path = write_sheet(
    dir.path(),
    "1,ada lovelace,555-0100,,,\n2,Ada Lovelace ,555-0100,,,\n",
  );

  let report = import(&s, &path).await.unwrap();
  assert_eq!(report, ImportReport { imported: 2, skipped: 0 });
}

#[tokio::test]
async fn import_skips_undecodable_rows_and_continues() {
  let s = store().await;
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("incoming.csv");
  let mut bytes = b"ID,Full Name,Phone,Email,Address,Registered At\n1,Alpha,1,,,\n".to_vec();
  bytes.extend_from_slice(b"2,Bet\xffa,2,,,\n3,Gamma,3,,,\n");
  fs::write(&path, bytes).unwrap();

  let report = import(&s, &path).await.unwrap();
  assert_eq!(report, ImportReport { imported: 2, skipped: 1 });

  let all = s.list(ListOrder::default()).await.unwrap();
  let names: Vec<&str> = all.iter().map(|c| c.full_name.as_str()).collect();
  assert_eq!(names, ["Alpha", "Gamma"]);
}

#[tokio::test]
async fn import_accepts_spreadsheet_timestamp_variants() {
  let s = store().await;
  let dir = tempfile::tempdir().unwrap();
  let path = write_sheet(
    dir.path(),
    "1,No Seconds,1,,,2024-03-05 14:07\n\
     2,Fraction,2,,,2024-03-05 14:07:09.500\n\
     3,Padded,3,,, 2024-03-05 14:07:09 \n",
  );

  let report = import(&s, &path).await.unwrap();
  assert_eq!(report, ImportReport { imported: 3, skipped: 0 });

  let stamps: Vec<String> = s
    .list(ListOrder::default())
    .await
    .unwrap()
    .iter()
    .map(|c| c.registered_at.to_string())
    .collect();
  assert_eq!(
    stamps,
    ["2024-03-05 14:07:00", "2024-03-05 14:07:09", "2024-03-05 14:07:09"]
  );
}

// ─── Mid-file store failure ──────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum FlakyError {
  #[error(transparent)]
  Store(#[from] roster_store_sqlite::Error),
  #[error("disk went away")]
  DiskGone,
}

/// Delegates to an in-memory store but fails the `fail_on`-th insert.
struct FlakyStore {
  inner:   SqliteStore,
  fail_on: usize,
  inserts: AtomicUsize,
}

impl CustomerStore for FlakyStore {
  type Error = FlakyError;

  async fn insert(&self, input: NewCustomer) -> Result<i64, FlakyError> {
    let n = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
    if n == self.fail_on {
      return Err(FlakyError::DiskGone);
    }
    Ok(self.inner.insert(input).await?)
  }

  async fn update(&self, id: i64, fields: CustomerUpdate) -> Result<(), FlakyError> {
    Ok(self.inner.update(id, fields).await?)
  }

  async fn delete(&self, id: i64) -> Result<(), FlakyError> {
    Ok(self.inner.delete(id).await?)
  }

  async fn get(&self, id: i64) -> Result<Option<Customer>, FlakyError> {
    Ok(self.inner.get(id).await?)
  }

  async fn list(&self, order: ListOrder) -> Result<Vec<Customer>, FlakyError> {
    Ok(self.inner.list(order).await?)
  }

  async fn search(&self, text: &str) -> Result<Vec<Customer>, FlakyError> {
    Ok(self.inner.search(text).await?)
  }

  async fn range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Customer>, FlakyError> {
    Ok(self.inner.range(start, end).await?)
  }

  async fn recent(&self, limit: usize) -> Result<Vec<Customer>, FlakyError> {
    Ok(self.inner.recent(limit).await?)
  }

  async fn count(&self) -> Result<usize, FlakyError> { Ok(self.inner.count().await?) }

  async fn exists(
    &self,
    full_name: &str,
    phone: Option<&str>,
  ) -> Result<bool, FlakyError> {
    Ok(self.inner.exists(full_name, phone).await?)
  }
}

#[tokio::test]
async fn store_failure_keeps_committed_rows_and_reports_counts() {
  let s = FlakyStore {
    inner:   store().await,
    fail_on: 3,
    inserts: AtomicUsize::new(0),
  };
  let dir = tempfile::tempdir().unwrap();
  let path = write_sheet(
    dir.path(),
    "1,Alpha,1,,,\n2,,,,,\n3,Beta,2,,,\n4,Gamma,3,,,\n5,Delta,4,,,\n",
  );

  let err = import(&s, &path).await.unwrap_err();
  let Error::Partial { report, source } = err else {
    panic!("expected a partial import");
  };
  assert_eq!(report, ImportReport { imported: 2, skipped: 1 });
  assert!(matches!(*source, Error::Store(_)));

  let kept = s.inner.list(ListOrder::default()).await.unwrap();
  let names: Vec<&str> = kept.iter().map(|c| c.full_name.as_str()).collect();
  assert_eq!(names, ["Alpha", "Beta"]);
}

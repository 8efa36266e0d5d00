//! [`SqliteStore`] — the SQLite implementation of [`CustomerStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{OptionalExtension as _, types::Value};

use roster_core::{
  customer::{Customer, CustomerUpdate, NewCustomer},
  store::{CustomerStore, Direction, ListOrder, SortKey},
};

use crate::{
  encode::{COLUMNS, RawCustomer, encode_date, encode_ts},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster customer store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path.as_ref()).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the connection, flushing everything to the store file.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT {COLUMNS} …` statement and decode every row.
  async fn query_customers(
    &self,
    sql: String,
    params: Vec<Value>,
  ) -> Result<Vec<Customer>> {
    let raws: Vec<RawCustomer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawCustomer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCustomer::into_customer).collect()
  }
}

fn direction_sql(direction: Direction) -> &'static str {
  match direction {
    Direction::Ascending => "ASC",
    Direction::Descending => "DESC",
  }
}

fn order_by_sql(order: ListOrder) -> String {
  let dir = direction_sql(order.direction);
  match order.key {
    SortKey::Id => format!("ORDER BY id {dir}"),
    SortKey::RegisteredAt => format!("ORDER BY registered_at {dir}, id {dir}"),
  }
}

fn optional(field: Option<String>) -> Option<String> {
  field.filter(|s| !s.is_empty())
}

// ─── CustomerStore impl ──────────────────────────────────────────────────────

impl CustomerStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert(&self, input: NewCustomer) -> Result<i64> {
    if input.full_name.is_empty() {
      return Err(roster_core::Error::EmptyName.into());
    }

    let at_str = encode_ts(input.registered_at);
    let NewCustomer { full_name, phone, email, address, .. } = input;
    let (phone, email, address) = (optional(phone), optional(email), optional(address));

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO customers (full_name, phone, email, address, registered_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![full_name, phone, email, address, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(id, "inserted customer");
    Ok(id)
  }

  async fn update(&self, id: i64, fields: CustomerUpdate) -> Result<()> {
    if fields.full_name.is_empty() {
      return Err(roster_core::Error::EmptyName.into());
    }

    let CustomerUpdate { full_name, phone, email, address } = fields;
    let (phone, email, address) = (optional(phone), optional(email), optional(address));

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE customers
           SET full_name = ?1, phone = ?2, email = ?3, address = ?4
           WHERE id = ?5",
          rusqlite::params![full_name, phone, email, address, id],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::NotFound(id));
    }
    tracing::debug!(id, "updated customer");
    Ok(())
  }

  async fn delete(&self, id: i64) -> Result<()> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM customers WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::NotFound(id));
    }
    tracing::debug!(id, "deleted customer");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, id: i64) -> Result<Option<Customer>> {
    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COLUMNS} FROM customers WHERE id = ?1"),
            rusqlite::params![id],
            RawCustomer::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn list(&self, order: ListOrder) -> Result<Vec<Customer>> {
    let sql = format!("SELECT {COLUMNS} FROM customers {}", order_by_sql(order));
    self.query_customers(sql, Vec::new()).await
  }

  async fn search(&self, text: &str) -> Result<Vec<Customer>> {
    // instr() is case-sensitive, unlike LIKE.
    let sql = format!(
      "SELECT {COLUMNS} FROM customers
       WHERE instr(full_name, ?1) > 0
          OR instr(COALESCE(phone, ''), ?1) > 0
          OR instr(COALESCE(email, ''), ?1) > 0
          OR instr(COALESCE(address, ''), ?1) > 0
       ORDER BY id ASC"
    );
    self.query_customers(sql, vec![text.to_owned().into()]).await
  }

  async fn range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Customer>> {
    let sql = format!(
      "SELECT {COLUMNS} FROM customers
       WHERE substr(registered_at, 1, 10) BETWEEN ?1 AND ?2
       ORDER BY registered_at ASC, id ASC"
    );
    self
      .query_customers(sql, vec![encode_date(start).into(), encode_date(end).into()])
      .await
  }

  async fn recent(&self, limit: usize) -> Result<Vec<Customer>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let sql = format!(
      "SELECT {COLUMNS} FROM customers
       ORDER BY registered_at DESC, id DESC
       LIMIT ?1"
    );
    self.query_customers(sql, vec![limit.into()]).await
  }

  async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM customers", [], |r| r.get(0))?)
      })
      .await?;
    Ok(n as usize)
  }

  async fn exists(&self, full_name: &str, phone: Option<&str>) -> Result<bool> {
    let full_name = full_name.to_owned();
    let phone = phone.map(str::to_owned);

    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (
             SELECT 1 FROM customers
             WHERE full_name = ?1 AND COALESCE(phone, '') = COALESCE(?2, '')
           )",
          rusqlite::params![full_name, phone],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(found)
  }
}

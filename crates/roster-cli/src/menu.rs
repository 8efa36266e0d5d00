//! Interactive console menu.
//!
//! Reads one command at a time from `input`, runs it against the store and
//! reports the result on `out`. A failed operation prints its error and the
//! loop carries on; end of input is treated as a clean exit.

use std::{
  io::{self, BufRead, Write},
  path::Path,
};

use anyhow::Context as _;
use roster_core::{
  customer::{CustomerUpdate, NewCustomer},
  oracle::{AddOutcome, add_customer},
  store::{CustomerStore, ListOrder},
};

use crate::render;

const MENU: &str = "
1) Add customer
2) List customers
3) Search
4) Delete customer
5) Update customer
6) Export to spreadsheet
7) Import from spreadsheet
8) Export date range
9) Recent customers
0) Exit
";

const DEFAULT_RECENT: usize = 5;

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
  Continue,
  Exit,
}

pub struct Menu<'a, S, R, W> {
  store:      &'a S,
  export_dir: &'a Path,
  input:      R,
  out:        W,
}

/// Read a line or leave the menu on end of input.
macro_rules! ask {
  ($menu:expr, $label:expr) => {
    match $menu.prompt($label)? {
      Some(line) => line,
      None => return Ok(Step::Exit),
    }
  };
}

impl<'a, S, R, W> Menu<'a, S, R, W>
where
  S: CustomerStore,
  R: BufRead,
  W: Write,
{
  pub fn new(store: &'a S, export_dir: &'a Path, input: R, out: W) -> Self {
    Self { store, export_dir, input, out }
  }

  /// Run until the user picks "Exit" or input ends.
  pub async fn run(&mut self) -> anyhow::Result<()> {
    loop {
      write!(self.out, "{MENU}")?;
      let Some(choice) = self.prompt("Choice: ")? else {
        break;
      };
      if self.dispatch(choice.trim()).await? == Step::Exit {
        break;
      }
    }
    Ok(())
  }

  async fn dispatch(&mut self, choice: &str) -> anyhow::Result<Step> {
    let result = match choice {
      "1" => self.add().await,
      "2" => self.list().await,
      "3" => self.search().await,
      "4" => self.delete().await,
      "5" => self.update().await,
      "6" => self.export_all().await,
      "7" => self.import().await,
      "8" => self.export_range().await,
      "9" => self.recent().await,
      "0" => return Ok(Step::Exit),
      _ => {
        writeln!(self.out, "Invalid choice.")?;
        return Ok(Step::Continue);
      }
    };

    match result {
      Ok(step) => Ok(step),
      Err(e) => {
        tracing::debug!(choice, error = %e, "menu command failed");
        writeln!(self.out, "Error: {e:#}")?;
        Ok(Step::Continue)
      }
    }
  }

  fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
    write!(self.out, "{label}")?;
    self.out.flush()?;
    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_owned()))
  }

  fn ask_id(&mut self, label: &str) -> anyhow::Result<Option<i64>> {
    let Some(raw) = self.prompt(label)? else {
      return Ok(None);
    };
    let id = raw
      .trim()
      .parse()
      .with_context(|| format!("invalid id {raw:?}"))?;
    Ok(Some(id))
  }

  // ── Commands ──────────────────────────────────────────────────────────────

  async fn add(&mut self) -> anyhow::Result<Step> {
    let name = ask!(self, "Full name: ");
    let phone = ask!(self, "Phone: ");
    let email = ask!(self, "Email: ");
    let address = ask!(self, "Address: ");

    let input = NewCustomer::from_text(&name, &phone, &email, &address);
    match add_customer(self.store, input).await? {
      AddOutcome::Added(id) => writeln!(self.out, "Customer added (id {id}).")?,
      AddOutcome::Duplicate => {
        writeln!(self.out, "This customer is already registered!")?
      }
    }
    Ok(Step::Continue)
  }

  async fn list(&mut self) -> anyhow::Result<Step> {
    let customers = self.store.list(ListOrder::default()).await?;
    render::table(&mut self.out, &customers)?;
    Ok(Step::Continue)
  }

  async fn search(&mut self) -> anyhow::Result<Step> {
    let text = ask!(self, "Search: ");
    let customers = self.store.search(&text).await?;
    render::table(&mut self.out, &customers)?;
    Ok(Step::Continue)
  }

  async fn delete(&mut self) -> anyhow::Result<Step> {
    let Some(id) = self.ask_id("ID to delete: ")? else {
      return Ok(Step::Exit);
    };
    self.store.delete(id).await?;
    writeln!(self.out, "Customer deleted.")?;
    Ok(Step::Continue)
  }

  async fn update(&mut self) -> anyhow::Result<Step> {
    let Some(id) = self.ask_id("ID to update: ")? else {
      return Ok(Step::Exit);
    };
    let name = ask!(self, "New full name: ");
    let phone = ask!(self, "New phone: ");
    let email = ask!(self, "New email: ");
    let address = ask!(self, "New address: ");

    let fields = CustomerUpdate::from_text(&name, &phone, &email, &address);
    self.store.update(id, fields).await?;
    writeln!(self.out, "Customer updated.")?;
    Ok(Step::Continue)
  }

  async fn export_all(&mut self) -> anyhow::Result<Step> {
    let summary = roster_sheet::export_all(self.store, self.export_dir).await?;
    writeln!(
      self.out,
      "Exported {} customer(s) to {}",
      summary.rows,
      summary.path.display()
    )?;
    Ok(Step::Continue)
  }

  async fn export_range(&mut self) -> anyhow::Result<Step> {
    let start = ask!(self, "Start date (YYYY-MM-DD): ");
    let end = ask!(self, "End date (YYYY-MM-DD): ");
    let summary =
      roster_sheet::export_range(self.store, self.export_dir, start.trim(), end.trim())
        .await?;
    writeln!(
      self.out,
      "Exported {} customer(s) to {}",
      summary.rows,
      summary.path.display()
    )?;
    Ok(Step::Continue)
  }

  async fn import(&mut self) -> anyhow::Result<Step> {
    let path = ask!(self, "Spreadsheet to import: ");
    let report = roster_sheet::import(self.store, Path::new(path.trim())).await?;
    writeln!(
      self.out,
      "{} customer(s) imported, {} row(s) skipped.",
      report.imported, report.skipped
    )?;
    Ok(Step::Continue)
  }

  async fn recent(&mut self) -> anyhow::Result<Step> {
    let raw = ask!(self, "How many? ");
    let n = match raw.trim() {
      "" => DEFAULT_RECENT,
      n => n.parse().with_context(|| format!("invalid count {n:?}"))?,
    };
    let customers = self.store.recent(n).await?;
    render::table(&mut self.out, &customers)?;
    Ok(Step::Continue)
  }
}

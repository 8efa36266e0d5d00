//! `roster` — local customer-record manager.
//!
//! # Usage
//!
//! ```text
//! roster                              # interactive menu; backs up on exit
//! roster --store shop.db list --order registered --desc
//! roster export --from 2024-01-01 --to 2024-03-31
//! roster import customers.csv
//! ```

mod menu;
mod render;
mod settings;

use std::{
  io::{self, BufRead, Write},
  path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use menu::Menu;
use roster_core::{
  customer::{CustomerUpdate, NewCustomer, now},
  oracle::{AddOutcome, add_customer},
  store::{CustomerStore, Direction, ListOrder, SortKey},
};
use roster_store_sqlite::SqliteStore;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", author, version, about = "Local customer-record manager")]
struct Cli {
  /// Path to a TOML config file (store_path, export_dir, backup_dir).
  #[arg(short, long, value_name = "FILE", default_value = "roster.toml")]
  config: PathBuf,

  /// Store file; overrides `store_path` from the config.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Run one command and exit instead of starting the menu.
  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  #[command(flatten)]
  Store(StoreCommand),
  /// Snapshot the store file into the backup directory.
  Backup,
}

/// Subcommands that run against an open store.
#[derive(Subcommand, Debug)]
enum StoreCommand {
  /// Add a customer unless the same name and phone is already registered.
  Add {
    name:    String,
    #[arg(long, default_value = "")]
    phone:   String,
    #[arg(long, default_value = "")]
    email:   String,
    #[arg(long, default_value = "")]
    address: String,
  },
  /// List all customers.
  List {
    #[arg(long, value_enum, default_value_t = OrderArg::Id)]
    order: OrderArg,
    /// Newest / highest id first.
    #[arg(long)]
    desc:  bool,
    #[arg(long)]
    json:  bool,
  },
  /// Case-sensitive substring search over name, phone, email and address.
  Search {
    text: String,
    #[arg(long)]
    json: bool,
  },
  /// Overwrite every field of a customer.
  Update {
    id:      i64,
    name:    String,
    #[arg(long, default_value = "")]
    phone:   String,
    #[arg(long, default_value = "")]
    email:   String,
    #[arg(long, default_value = "")]
    address: String,
  },
  /// Delete a customer by id.
  Delete { id: i64 },
  /// The most recently registered customers.
  Recent {
    #[arg(default_value_t = 5)]
    count: usize,
    #[arg(long)]
    json:  bool,
  },
  /// Export all customers, or those registered between two dates.
  Export {
    #[arg(long, value_name = "YYYY-MM-DD", requires = "to")]
    from: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD", requires = "from")]
    to:   Option<String>,
  },
  /// Import customers from a sheet, skipping duplicates.
  Import { path: PathBuf },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
  Id,
  Registered,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  // Logs go to stderr; stdout belongs to the menu.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)
    .with_context(|| format!("loading settings from {}", cli.config.display()))?;
  if let Some(store) = cli.store {
    settings.store_path = store;
  }

  match cli.command {
    None => {
      run_session(&settings, io::stdin().lock(), io::stdout().lock()).await?;
      Ok(())
    }
    Some(Command::Backup) => {
      run_backup(&settings, &mut io::stdout().lock())?;
      Ok(())
    }
    Some(Command::Store(command)) => run_command(&settings, command).await,
  }
}

async fn open_store(settings: &Settings) -> Result<SqliteStore> {
  SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))
}

/// Interactive session on `input`/`out`, then the shutdown backup once the
/// store is closed. Returns the backup file, if one was written.
async fn run_session<R: BufRead, W: Write>(
  settings: &Settings,
  input: R,
  mut out: W,
) -> Result<Option<PathBuf>> {
  let store = open_store(settings).await?;

  Menu::new(&store, &settings.export_dir, input, &mut out)
    .run()
    .await?;

  store.close().await.context("closing store")?;
  run_backup(settings, &mut out)
}

fn run_backup(settings: &Settings, out: &mut impl Write) -> Result<Option<PathBuf>> {
  let written = roster_store_sqlite::backup(&settings.store_path, &settings.backup_dir, now())
    .context("backing up store")?;
  match &written {
    Some(path) => writeln!(out, "Backup written to {}", path.display())?,
    None => tracing::info!("nothing to back up"),
  }
  Ok(written)
}

async fn run_command(settings: &Settings, command: StoreCommand) -> Result<()> {
  let store = open_store(settings).await?;
  let mut out = io::stdout().lock();

  match command {
    StoreCommand::Add { name, phone, email, address } => {
      let input = NewCustomer::from_text(&name, &phone, &email, &address);
      match add_customer(&store, input).await? {
        AddOutcome::Added(id) => writeln!(out, "Customer added (id {id}).")?,
        AddOutcome::Duplicate => writeln!(out, "This customer is already registered!")?,
      }
    }
    StoreCommand::List { order, desc, json } => {
      let key = match order {
        OrderArg::Id => SortKey::Id,
        OrderArg::Registered => SortKey::RegisteredAt,
      };
      let direction = if desc { Direction::Descending } else { Direction::Ascending };
      let customers = store.list(ListOrder::new(key, direction)).await?;
      print_customers(&mut out, &customers, json)?;
    }
    StoreCommand::Search { text, json } => {
      let customers = store.search(&text).await?;
      print_customers(&mut out, &customers, json)?;
    }
    StoreCommand::Update { id, name, phone, email, address } => {
      let fields = CustomerUpdate::from_text(&name, &phone, &email, &address);
      store.update(id, fields).await?;
      writeln!(out, "Customer updated.")?;
    }
    StoreCommand::Delete { id } => {
      store.delete(id).await?;
      writeln!(out, "Customer deleted.")?;
    }
    StoreCommand::Recent { count, json } => {
      let customers = store.recent(count).await?;
      print_customers(&mut out, &customers, json)?;
    }
    StoreCommand::Export { from: Some(from), to: Some(to) } => {
      let summary =
        roster_sheet::export_range(&store, &settings.export_dir, &from, &to).await?;
      writeln!(out, "Exported {} customer(s) to {}", summary.rows, summary.path.display())?;
    }
    StoreCommand::Export { .. } => {
      let summary = roster_sheet::export_all(&store, &settings.export_dir).await?;
      writeln!(out, "Exported {} customer(s) to {}", summary.rows, summary.path.display())?;
    }
    StoreCommand::Import { path } => {
      let report = roster_sheet::import(&store, &path).await?;
      writeln!(
        out,
        "{} customer(s) imported, {} row(s) skipped.",
        report.imported, report.skipped
      )?;
    }
  }

  drop(out);
  store.close().await.context("closing store")?;
  Ok(())
}

fn print_customers(
  out: &mut impl io::Write,
  customers: &[roster_core::customer::Customer],
  json: bool,
) -> Result<()> {
  if json {
    render::json(out, customers)
  } else {
    render::table(out, customers)?;
    Ok(())
  }
}

//! Plain-text and JSON rendering of customer lists.

use std::io::{self, Write};

use roster_core::customer::{Customer, format_timestamp};

/// Write `customers` as an aligned table, or a placeholder line if empty.
pub fn table(out: &mut impl Write, customers: &[Customer]) -> io::Result<()> {
  if customers.is_empty() {
    return writeln!(out, "(no customers)");
  }

  writeln!(
    out,
    "{:>5}  {:<24} {:<16} {:<28} {:<28} {}",
    "ID", "Full Name", "Phone", "Email", "Address", "Registered At"
  )?;
  for c in customers {
    writeln!(
      out,
      "{:>5}  {:<24} {:<16} {:<28} {:<28} {}",
      c.id,
      c.full_name,
      c.phone.as_deref().unwrap_or("-"),
      c.email.as_deref().unwrap_or("-"),
      c.address.as_deref().unwrap_or("-"),
      format_timestamp(c.registered_at),
    )?;
  }
  writeln!(out, "{} customer(s)", customers.len())
}

pub fn json(out: &mut impl Write, customers: &[Customer]) -> anyhow::Result<()> {
  serde_json::to_writer_pretty(&mut *out, customers)?;
  writeln!(out)?;
  Ok(())
}

//! Positional CSV codec for customer sheets.
//!
//! Rows are decoded into a named [`SheetRow`] as soon as they are read so the
//! column positions never leak past this module.

use std::io;

use roster_core::customer::{Customer, format_timestamp, non_empty};

/// Header row written on export, in column order.
pub const HEADER: [&str; 6] =
  ["ID", "Full Name", "Phone", "Email", "Address", "Registered At"];

const COL_FULL_NAME: usize = 1;
const COL_PHONE: usize = 2;
const COL_EMAIL: usize = 3;
const COL_ADDRESS: usize = 4;
const COL_REGISTERED_AT: usize = 5;

/// One data row of an import sheet. The source `ID` column is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
  /// Empty when the cell is blank or the row is too short.
  pub full_name:     String,
  pub phone:         Option<String>,
  pub email:         Option<String>,
  pub address:       Option<String>,
  /// Timestamp text with surrounding whitespace removed; validated by the
  /// importer. A blank cell reads as `None`.
  pub registered_at: Option<String>,
}

impl SheetRow {
  /// Decode a record positionally. Missing trailing cells read as empty.
  pub fn from_record(record: &csv::StringRecord) -> Self {
    let cell = |i: usize| record.get(i).unwrap_or("");
    Self {
      full_name:     cell(COL_FULL_NAME).to_owned(),
      phone:         non_empty(cell(COL_PHONE)),
      email:         non_empty(cell(COL_EMAIL)),
      address:       non_empty(cell(COL_ADDRESS)),
      registered_at: non_empty(cell(COL_REGISTERED_AT).trim()),
    }
  }
}

fn encode_customer(c: &Customer) -> [String; 6] {
  [
    c.id.to_string(),
    c.full_name.clone(),
    c.phone.clone().unwrap_or_default(),
    c.email.clone().unwrap_or_default(),
    c.address.clone().unwrap_or_default(),
    format_timestamp(c.registered_at),
  ]
}

/// Write the header and one row per customer, then flush.
pub(crate) fn write_sheet<W: io::Write>(
  out: W,
  customers: &[Customer],
) -> csv::Result<W> {
  let mut wtr = csv::Writer::from_writer(out);
  wtr.write_record(HEADER)?;
  for c in customers {
    wtr.write_record(encode_customer(c))?;
  }
  wtr.flush()?;
  wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

/// A reader that skips the header row and tolerates short rows.
pub(crate) fn sheet_reader<R: io::Read>(input: R) -> csv::Reader<R> {
  csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(input)
}

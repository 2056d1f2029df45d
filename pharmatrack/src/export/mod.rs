// CSV export of the records currently on screen

use crate::error::{PharmaTrackError, Result};
use crate::record::{InventoryRecord, RecordId};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Column order of an export file. `created_on` is not exported.
pub const EXPORT_HEADER: [&str; 8] = [
    "id",
    "product_name",
    "category",
    "batch_no",
    "quantity",
    "price",
    "supplier",
    "expiry_date",
];

/// One row of an export file. Field order defines the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub id: RecordId,
    pub product_name: String,
    pub category: Option<String>,
    pub batch_no: Option<String>,
    pub quantity: i64,
    pub price: Option<f64>,
    pub supplier: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl From<&InventoryRecord> for ExportRow {
    fn from(record: &InventoryRecord) -> Self {
        let f = &record.fields;
        ExportRow {
            id: record.id,
            product_name: f.product_name.clone(),
            category: f.category.clone(),
            batch_no: f.batch_no.clone(),
            quantity: f.quantity,
            price: f.price,
            supplier: f.supplier.clone(),
            expiry_date: f.expiry_date,
        }
    }
}

/// Write `records` as CSV (header first) to `writer`. Returns the number of data rows.
pub fn write_csv<W: Write>(records: &[InventoryRecord], writer: W) -> Result<usize> {
    // The header is written by hand so an empty export still carries it.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(EXPORT_HEADER)?;
    for record in records {
        wtr.serialize(ExportRow::from(record))?;
    }
    wtr.flush()?;
    Ok(records.len())
}

/// Read an export file back into rows.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ExportRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.iter().ne(EXPORT_HEADER) {
        return Err(PharmaTrackError::Csv(csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unexpected CSV header: {}", headers.iter().collect::<Vec<_>>().join(",")),
        ))));
    }

    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Export `records` to a new file at `path`. Refuses to write an empty export.
pub fn export_to_path(records: &[InventoryRecord], path: &Path) -> Result<usize> {
    if records.is_empty() {
        return Err(PharmaTrackError::NothingToExport);
    }
    let file = File::create(path)?;
    let written = write_csv(records, file)?;
    log::info!("Exported {written} rows to {}", path.display());
    Ok(written)
}

/// Default export file name, e.g. `pharmacy_export_20250115_093000.csv`.
pub fn default_file_name(now: NaiveDateTime) -> String {
    format!("pharmacy_export_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// `dir` joined with [`default_file_name`].
pub fn default_export_path(dir: &Path, now: NaiveDateTime) -> PathBuf {
    dir.join(default_file_name(now))
}

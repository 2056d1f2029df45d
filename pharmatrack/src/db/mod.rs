use crate::error::Result;
use crate::record::{InventoryRecord, RecordFields, RecordId};
use crate::validation::DATE_FORMAT;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RECORD_COLUMNS: &str =
    "id, product_name, category, batch_no, quantity, price, supplier, expiry_date, created_on";

/// Null expiry dates first, then calendar order, then insertion order.
const ORDER_BY_EXPIRY: &str = "ORDER BY expiry_date IS NOT NULL, expiry_date, id";

/// The SQLite table holding inventory records.
pub struct InventoryDb {
    conn: Connection,
}

impl InventoryDb {
    /// Open or create the inventory database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = InventoryDb { conn };
        db.initialize_tables()?;
        db.normalize_legacy_dates()?;
        Ok(db)
    }

    /// Open an in-memory inventory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = InventoryDb { conn };
        db.initialize_tables()?;
        Ok(db)
    }

    fn initialize_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS inventory (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_name TEXT NOT NULL CHECK (length(trim(product_name)) > 0),
                category TEXT,
                batch_no TEXT,
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                price REAL CHECK (price IS NULL OR price >= 0),
                supplier TEXT,
                expiry_date TEXT,
                created_on TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_inventory_expiry ON inventory(expiry_date);
            ",
        )?;
        Ok(())
    }

    /// Rewrite expiry dates written without zero padding (`2025-1-5`) as
    /// `2025-01-05`, and blank ones as NULL, so that SQL comparisons and
    /// ordering on the text column follow the calendar.
    fn normalize_legacy_dates(&self) -> Result<()> {
        let blanks = self.conn.execute(
            "UPDATE inventory SET expiry_date = NULL WHERE trim(expiry_date) = ''",
            [],
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT id, expiry_date FROM inventory
             WHERE expiry_date IS NOT NULL AND length(expiry_date) != 10",
        )?;
        let legacy = stmt
            .query_map([], |row| Ok((row.get::<_, RecordId>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut rewritten = 0;
        for (id, text) in legacy {
            match NaiveDate::parse_from_str(text.trim(), DATE_FORMAT) {
                Ok(date) => {
                    self.conn.execute(
                        "UPDATE inventory SET expiry_date = ?1 WHERE id = ?2",
                        params![date, id],
                    )?;
                    rewritten += 1;
                }
                Err(_) => log::warn!("Record {id} has unreadable expiry date '{text}'"),
            }
        }

        if blanks + rewritten > 0 {
            log::info!("Normalized {} legacy expiry dates", blanks + rewritten);
        }
        Ok(())
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert a record. Returns the id SQLite assigned.
    pub fn insert(&self, fields: &RecordFields, created_on: NaiveDate) -> Result<RecordId> {
        self.conn.execute(
            "INSERT INTO inventory
                (product_name, category, batch_no, quantity, price, supplier, expiry_date, created_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                fields.product_name,
                fields.category,
                fields.batch_no,
                fields.quantity,
                fields.price,
                fields.supplier,
                fields.expiry_date,
                created_on,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite every mutable column of a record. Returns false if no row has that id.
    pub fn update(&self, id: RecordId, fields: &RecordFields) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE inventory
             SET product_name = ?1, category = ?2, batch_no = ?3, quantity = ?4,
                 price = ?5, supplier = ?6, expiry_date = ?7
             WHERE id = ?8",
            params![
                fields.product_name,
                fields.category,
                fields.batch_no,
                fields.quantity,
                fields.price,
                fields.supplier,
                fields.expiry_date,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a record. Returns false if no row has that id.
    pub fn delete(&self, id: RecordId) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM inventory WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Get a record by id.
    pub fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM inventory WHERE id = ?1");
        let result = self
            .conn
            .query_row(&sql, params![id], record_from_row)
            .optional()?;
        Ok(result)
    }

    /// All records in expiry order.
    pub fn list_all(&self) -> Result<Vec<InventoryRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM inventory {ORDER_BY_EXPIRY}");
        self.query_records(&sql, [])
    }

    /// Records whose `column` contains `needle`, case-insensitively for ASCII.
    /// `column` must come from a fixed allow-list; it is spliced into the SQL.
    pub fn search_like(&self, column: &str, needle: &str) -> Result<Vec<InventoryRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM inventory
             WHERE {column} LIKE ?1 ESCAPE '\\'
             {ORDER_BY_EXPIRY}"
        );
        let pattern = format!("%{}%", escape_like(needle));
        self.query_records(&sql, params![pattern])
    }

    /// Records with an expiry date on or before `cutoff`, soonest first.
    pub fn expiring_on_or_before(&self, cutoff: NaiveDate) -> Result<Vec<InventoryRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM inventory
             WHERE expiry_date IS NOT NULL AND expiry_date <= ?1
             ORDER BY expiry_date, id"
        );
        self.query_records(&sql, params![cutoff])
    }

    /// Records with quantity at or below `threshold`, smallest first.
    pub fn quantity_at_most(&self, threshold: i64) -> Result<Vec<InventoryRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM inventory
             WHERE quantity <= ?1
             ORDER BY quantity, id"
        );
        self.query_records(&sql, params![threshold])
    }

    fn query_records<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<InventoryRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, record_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryRecord> {
    Ok(InventoryRecord {
        id: row.get(0)?,
        fields: RecordFields {
            product_name: row.get(1)?,
            category: non_empty(row.get(2)?),
            batch_no: non_empty(row.get(3)?),
            quantity: row.get(4)?,
            price: row.get(5)?,
            supplier: non_empty(row.get(6)?),
            expiry_date: row.get(7)?,
        },
        created_on: row.get(8)?,
    })
}

/// Older databases stored blank optional text as '' rather than NULL.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Escape LIKE wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

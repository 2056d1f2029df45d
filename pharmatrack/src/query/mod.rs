use crate::error::Result;
use crate::record::InventoryRecord;
use crate::store::Store;
use chrono::{Days, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Columns that may be searched by substring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchColumn {
    ProductName,
    Category,
    BatchNo,
    Supplier,
}

impl SearchColumn {
    pub const ALL: [SearchColumn; 4] = [
        SearchColumn::ProductName,
        SearchColumn::Category,
        SearchColumn::BatchNo,
        SearchColumn::Supplier,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            SearchColumn::ProductName => "product_name",
            SearchColumn::Category => "category",
            SearchColumn::BatchNo => "batch_no",
            SearchColumn::Supplier => "supplier",
        }
    }
}

impl fmt::Display for SearchColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for SearchColumn {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SearchColumn::ALL
            .into_iter()
            .find(|c| c.column_name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = SearchColumn::ALL.iter().map(|c| c.column_name()).collect();
                format!("Unknown search column '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// A description of which records to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    All,
    Search { column: SearchColumn, needle: String },
    ExpiringWithin(u32),
    BelowQuantity(u32),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::All => f.write_str("all records"),
            Query::Search { column, needle } => write!(f, "{column} containing '{needle}'"),
            Query::ExpiringWithin(days) => write!(f, "expiring within {days} days"),
            Query::BelowQuantity(threshold) => write!(f, "quantity <= {threshold}"),
        }
    }
}

impl Store {
    /// Records whose `column` contains `needle` (ASCII case-insensitive),
    /// in expiry order. A blank needle lists everything.
    pub fn search(&self, column: SearchColumn, needle: &str) -> Result<Vec<InventoryRecord>> {
        let needle = needle.trim();
        if needle.is_empty() {
            return self.list_all();
        }
        log::debug!("Searching {column} for '{needle}'");
        self.db.search_like(column.column_name(), needle)
    }

    /// Records with an expiry date on or before today + `days`, soonest first.
    /// Already-expired records are included; undated records are not.
    pub fn expiring_within(&self, days: u32) -> Result<Vec<InventoryRecord>> {
        let latest = last_storable_date();
        let cutoff = self
            .today()
            .checked_add_days(Days::new(u64::from(days)))
            .map_or(latest, |d| d.min(latest));
        log::debug!("Listing records expiring on or before {cutoff}");
        self.db.expiring_on_or_before(cutoff)
    }

    /// Records with quantity at or below `threshold`, smallest first.
    pub fn below_quantity(&self, threshold: u32) -> Result<Vec<InventoryRecord>> {
        log::debug!("Listing records with quantity <= {threshold}");
        self.db.quantity_at_most(i64::from(threshold))
    }

    pub fn run(&self, query: &Query) -> Result<Vec<InventoryRecord>> {
        match query {
            Query::All => self.list_all(),
            Query::Search { column, needle } => self.search(*column, needle),
            Query::ExpiringWithin(days) => self.expiring_within(*days),
            Query::BelowQuantity(threshold) => self.below_quantity(*threshold),
        }
    }
}

/// Validated expiry dates never go past year 9999; clamping the cutoff keeps
/// the text comparison in SQL in calendar order.
fn last_storable_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned record identifier
pub type RecordId = i64;

/// The mutable part of an inventory record, already validated and normalized.
/// Optional text fields are `None` rather than empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    pub product_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub batch_no: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

impl RecordFields {
    /// Minimal field set: a name and a quantity, everything else absent.
    pub fn new(product_name: impl Into<String>, quantity: i64) -> Self {
        RecordFields {
            product_name: product_name.into(),
            category: None,
            batch_no: None,
            quantity,
            price: None,
            supplier: None,
            expiry_date: None,
        }
    }

    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }
}

/// One inventory line item (a batch of a product) as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: RecordFields,
    pub created_on: NaiveDate,
}

impl InventoryRecord {
    pub fn product_name(&self) -> &str {
        &self.fields.product_name
    }

    /// Whether the batch has expired as of `today`. Expiring today counts as not yet expired.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        matches!(self.fields.expiry_date, Some(d) if d < today)
    }
}

/// Raw, untyped field values as collected from an input form or command line.
/// An empty string means the field was left blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub product_name: String,
    pub category: String,
    pub batch_no: String,
    pub quantity: String,
    pub price: String,
    pub supplier: String,
    pub expiry_date: String,
}

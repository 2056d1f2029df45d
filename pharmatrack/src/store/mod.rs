use crate::clock::{Clock, SystemClock};
use crate::db::InventoryDb;
use crate::error::{PharmaTrackError, Result};
use crate::record::{InventoryRecord, RawFields, RecordFields, RecordId};
use crate::validation;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// The main entry point for pharmatrack.
/// Owns the inventory database and the clock used to stamp and compare dates.
/// Construct one per caller and pass it explicitly; dropping it (or calling
/// [`Store::close`]) releases the database.
pub struct Store {
    pub(crate) db: InventoryDb,
    clock: Box<dyn Clock>,
}

impl Store {
    /// Open (or create) the inventory database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Opening inventory database at {}", path.display());
        let db = InventoryDb::open(path)?;
        Ok(Store {
            db,
            clock: Box::new(SystemClock),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let db = InventoryDb::open_in_memory()?;
        Ok(Store {
            db,
            clock: Box::new(SystemClock),
        })
    }

    /// Replace the clock, e.g. with a [`crate::clock::FixedClock`].
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Release the database connection.
    pub fn close(self) -> Result<()> {
        self.db.close()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    // ── Record lifecycle ─────────────────────────────────────────────

    /// Persist a new record, stamping `created_on` with today's date.
    /// `fields` are checked and normalized like form input first.
    /// Returns the assigned id.
    pub fn create(&self, fields: RecordFields) -> Result<RecordId> {
        let fields = validation::check_fields(fields)?;
        let created_on = self.today();
        let id = self.db.insert(&fields, created_on)?;
        log::info!(
            "Created record {id}: {} (qty {})",
            fields.product_name,
            fields.quantity
        );
        Ok(id)
    }

    /// Overwrite every mutable field of record `id`. `id` and `created_on` are kept.
    pub fn update(&self, id: RecordId, fields: RecordFields) -> Result<()> {
        let fields = validation::check_fields(fields)?;
        if !self.db.update(id, &fields)? {
            log::warn!("Update of missing record {id}");
            return Err(PharmaTrackError::NotFound { id });
        }
        log::info!("Updated record {id}");
        Ok(())
    }

    /// Remove record `id` permanently.
    pub fn delete(&self, id: RecordId) -> Result<()> {
        if !self.db.delete(id)? {
            log::warn!("Delete of missing record {id}");
            return Err(PharmaTrackError::NotFound { id });
        }
        log::info!("Deleted record {id}");
        Ok(())
    }

    /// Validate raw input, then create.
    pub fn add(&self, raw: &RawFields) -> Result<RecordId> {
        let fields = validation::validate(raw)?;
        self.create(fields)
    }

    /// Validate raw input, then update.
    pub fn edit(&self, id: RecordId, raw: &RawFields) -> Result<()> {
        let fields = validation::validate(raw)?;
        self.update(id, fields)
    }

    pub fn get(&self, id: RecordId) -> Result<InventoryRecord> {
        self.db.get(id)?.ok_or(PharmaTrackError::NotFound { id })
    }

    /// Every record, ordered by expiry date with undated records first.
    pub fn list_all(&self) -> Result<Vec<InventoryRecord>> {
        self.db.list_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::ErrorKind;
    use crate::validation::{Field, ValidationErrorKind};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn jan_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn setup_test_store() -> Store {
        Store::open_in_memory()
            .unwrap()
            .with_clock(FixedClock(jan_15()))
    }

    fn raw(name: &str, quantity: &str, expiry: &str) -> RawFields {
        RawFields {
            product_name: name.into(),
            quantity: quantity.into(),
            expiry_date: expiry.into(),
            ..RawFields::default()
        }
    }

    #[test]
    fn test_create_then_list_contains_record_once() {
        let store = setup_test_store();
        let existing = store.add(&raw("Aspirin", "50", "")).unwrap();

        let fields = validation::validate(&raw("Paracetamol", "10", "2025-01-01")).unwrap();
        let id = store.create(fields.clone()).unwrap();
        assert_ne!(id, existing);

        let all = store.list_all().unwrap();
        let matching: Vec<_> = all.iter().filter(|r| r.id == id).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].fields, fields);
        assert_eq!(matching[0].created_on, jan_15());
    }

    #[test]
    fn test_update_overwrites_fields_but_not_identity() {
        let store = setup_test_store();
        let mut input = raw("Amoxicillin", "20", "2025-06-01");
        input.category = "Antibiotic".into();
        let id = store.add(&input).unwrap();
        let before = store.get(id).unwrap();

        let later = store.with_clock(FixedClock(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
        let replacement = RecordFields::new("Amoxicillin 250mg", 15);
        later.update(id, replacement.clone()).unwrap();

        let after = later.get(id).unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.created_on, before.created_on);
        // Full overwrite: category and expiry are cleared, not merged.
        assert_eq!(after.fields, replacement);
    }

    #[test]
    fn test_create_rejects_fields_that_bypass_the_form() {
        let store = setup_test_store();

        let err = store.create(RecordFields::new("", 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut priced = RecordFields::new("Aspirin", 1);
        priced.price = Some(-5.0);
        let err = store.create(priced.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        priced.price = Some(f64::NAN);
        assert!(store.create(priced).is_err());
        assert!(store.list_all().unwrap().is_empty());

        let id = store.add(&raw("Aspirin", "1", "")).unwrap();
        let err = store.update(id, RecordFields::new("  ", 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.get(id).unwrap().product_name(), "Aspirin");
    }

    #[test]
    fn test_create_stores_normalized_fields() {
        let store = setup_test_store();
        let mut fields = RecordFields::new("Saline", 4);
        fields.category = Some("".into());
        fields.price = Some(0.0);

        let id = store.create(fields.clone()).unwrap();
        let stored = store.get(id).unwrap();
        assert_eq!(stored.fields, validation::check_fields(fields).unwrap());
        assert_eq!(stored.fields.category, None);
        assert_eq!(stored.fields.price, Some(0.0));
    }

    #[test]
    fn test_failed_write_is_persistence_error() {
        let store = setup_test_store();
        store.db.execute_batch("DROP TABLE inventory").unwrap();

        let err = store.create(RecordFields::new("Aspirin", 1)).unwrap_err();
        assert!(matches!(err, PharmaTrackError::Sqlite(_)));
        assert_eq!(err.kind(), ErrorKind::Persistence);

        let err = store.add(&raw("Aspirin", "1", "")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = setup_test_store();
        let err = store.update(404, RecordFields::new("Ghost", 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_delete_then_lookup_fails() {
        let store = setup_test_store();
        let id = store.add(&raw("Morphine", "2", "2025-09-09")).unwrap();

        store.delete(id).unwrap();

        let err = store.get(id).unwrap_err();
        assert!(matches!(err, PharmaTrackError::NotFound { id: missing } if missing == id));
        assert!(store.list_all().unwrap().iter().all(|r| r.id != id));

        let again = store.delete(id).unwrap_err();
        assert_eq!(again.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_add_rejects_invalid_input_without_writing() {
        let store = setup_test_store();
        let err = store.add(&raw("Aspirin", "-1", "")).unwrap_err();
        match err {
            PharmaTrackError::Validation(v) => {
                assert_eq!(v.field, Field::Quantity);
                assert_eq!(v.kind, ValidationErrorKind::Negative);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_edit_validates_before_lookup() {
        let store = setup_test_store();
        let err = store.edit(1, &raw("", "1", "")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_store_usable_after_failed_operation() {
        let store = setup_test_store();
        assert!(store.delete(1).is_err());
        assert!(store.add(&raw("", "1", "")).is_err());
        let id = store.add(&raw("Zinc", "9", "")).unwrap();
        assert_eq!(store.get(id).unwrap().product_name(), "Zinc");
    }

    #[test]
    fn test_open_close_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pharmacy.db");

        let store = Store::open(&path).unwrap().with_clock(FixedClock(jan_15()));
        let id = store.add(&raw("Insulin", "4", "2025-02-01")).unwrap();
        store.close().unwrap();

        let store = Store::open(&path).unwrap();
        let record = store.get(id).unwrap();
        assert_eq!(record.product_name(), "Insulin");
        assert_eq!(record.created_on, jan_15());
    }
}

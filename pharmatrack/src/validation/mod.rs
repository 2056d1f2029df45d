use crate::record::{RawFields, RecordFields};
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// The on-disk and on-screen date format for expiry dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A record field, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ProductName,
    Category,
    BatchNo,
    Quantity,
    Price,
    Supplier,
    ExpiryDate,
}

impl Field {
    pub fn column_name(&self) -> &'static str {
        match self {
            Field::ProductName => "product_name",
            Field::Category => "category",
            Field::BatchNo => "batch_no",
            Field::Quantity => "quantity",
            Field::Price => "price",
            Field::Supplier => "supplier",
            Field::ExpiryDate => "expiry_date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    MissingField,
    NotInteger,
    Negative,
    NotNumber,
    BadDateFormat,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ValidationErrorKind::MissingField => "is required",
            ValidationErrorKind::NotInteger => "must be a whole number",
            ValidationErrorKind::Negative => "must not be negative",
            ValidationErrorKind::NotNumber => "must be a number (use '.' for decimals)",
            ValidationErrorKind::BadDateFormat => "must be a date in YYYY-MM-DD format",
        };
        f.write_str(msg)
    }
}

/// A user-correctable input problem, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {kind}")]
pub struct ValidationError {
    pub field: Field,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(field: Field, kind: ValidationErrorKind) -> Self {
        ValidationError { field, kind }
    }
}

/// Validate raw form input and normalize it into typed record fields.
/// Fields are checked in column order; the first failure is returned.
pub fn validate(raw: &RawFields) -> Result<RecordFields, ValidationError> {
    let product_name = required_text(Field::ProductName, &raw.product_name)?;
    let category = optional_text(&raw.category);
    let batch_no = optional_text(&raw.batch_no);
    let quantity = parse_quantity(&raw.quantity)?;
    let price = parse_price(&raw.price)?;
    let supplier = optional_text(&raw.supplier);
    let expiry_date = parse_optional_date(&raw.expiry_date)?;

    Ok(RecordFields {
        product_name,
        category,
        batch_no,
        quantity,
        price,
        supplier,
        expiry_date,
    })
}

/// Apply the same rules to fields that were built in code rather than parsed
/// from a form. Text is normalized the way [`validate`] does it: the name is
/// trimmed and blank optional text becomes `None`.
pub fn check_fields(fields: RecordFields) -> Result<RecordFields, ValidationError> {
    let product_name = required_text(Field::ProductName, &fields.product_name)?;
    if fields.quantity < 0 {
        return Err(ValidationError::new(Field::Quantity, ValidationErrorKind::Negative));
    }
    let price = fields.price.map(check_price).transpose()?;
    let expiry_date = fields.expiry_date.map(check_year).transpose()?;

    Ok(RecordFields {
        product_name,
        category: fields.category.as_deref().and_then(optional_text),
        batch_no: fields.batch_no.as_deref().and_then(optional_text),
        quantity: fields.quantity,
        price,
        supplier: fields.supplier.as_deref().and_then(optional_text),
        expiry_date,
    })
}

fn required_text(field: Field, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, ValidationErrorKind::MissingField));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse a required, non-negative quantity.
pub fn parse_quantity(value: &str) -> Result<i64, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(Field::Quantity, ValidationErrorKind::MissingField));
    }
    let quantity: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::new(Field::Quantity, ValidationErrorKind::NotInteger))?;
    if quantity < 0 {
        return Err(ValidationError::new(Field::Quantity, ValidationErrorKind::Negative));
    }
    Ok(quantity)
}

/// Parse an optional price. Blank means "no price".
pub fn parse_price(value: &str) -> Result<Option<f64>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let price: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::new(Field::Price, ValidationErrorKind::NotNumber))?;
    check_price(price).map(Some)
}

fn check_price(price: f64) -> Result<f64, ValidationError> {
    if !price.is_finite() {
        return Err(ValidationError::new(Field::Price, ValidationErrorKind::NotNumber));
    }
    if price < 0.0 {
        return Err(ValidationError::new(Field::Price, ValidationErrorKind::Negative));
    }
    Ok(price)
}

/// Parse an optional `YYYY-MM-DD` date. Blank means "no expiry".
pub fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_date(trimmed).map(Some)
}

/// Parse a `YYYY-MM-DD` date. Only four-digit years are accepted so that the
/// stored text sorts in calendar order.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let date = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::new(Field::ExpiryDate, ValidationErrorKind::BadDateFormat))?;
    check_year(date)
}

fn check_year(date: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if !(1..=9999).contains(&date.year()) {
        return Err(ValidationError::new(
            Field::ExpiryDate,
            ValidationErrorKind::BadDateFormat,
        ));
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(name: &str, quantity: &str) -> RawFields {
        RawFields {
            product_name: name.into(),
            quantity: quantity.into(),
            ..RawFields::default()
        }
    }

    fn kind_of(raw: &RawFields) -> (Field, ValidationErrorKind) {
        let err = validate(raw).unwrap_err();
        (err.field, err.kind)
    }

    #[test]
    fn test_valid_full_record() {
        let input = RawFields {
            product_name: "  Paracetamol 500mg ".into(),
            category: "Analgesic".into(),
            batch_no: "B-1042".into(),
            quantity: " 120 ".into(),
            price: "2.75".into(),
            supplier: "MedSupply".into(),
            expiry_date: "2026-03-31".into(),
        };

        let fields = validate(&input).unwrap();
        assert_eq!(
            fields,
            RecordFields {
                product_name: "Paracetamol 500mg".into(),
                category: Some("Analgesic".into()),
                batch_no: Some("B-1042".into()),
                quantity: 120,
                price: Some(2.75),
                supplier: Some("MedSupply".into()),
                expiry_date: NaiveDate::from_ymd_opt(2026, 3, 31),
            }
        );
    }

    #[test]
    fn test_blank_optionals_become_none() {
        let mut input = raw("Bandage", "3");
        input.category = "   ".into();

        let fields = validate(&input).unwrap();
        assert_eq!(fields.category, None);
        assert_eq!(fields.price, None);
        assert_eq!(fields.expiry_date, None);
    }

    #[test]
    fn test_missing_product_name() {
        assert_eq!(
            kind_of(&raw("", "10")),
            (Field::ProductName, ValidationErrorKind::MissingField)
        );
        assert_eq!(
            kind_of(&raw("   ", "10")),
            (Field::ProductName, ValidationErrorKind::MissingField)
        );
    }

    #[test]
    fn test_quantity_rules() {
        assert_eq!(
            kind_of(&raw("Aspirin", "-1")),
            (Field::Quantity, ValidationErrorKind::Negative)
        );
        assert_eq!(
            kind_of(&raw("Aspirin", "abc")),
            (Field::Quantity, ValidationErrorKind::NotInteger)
        );
        assert_eq!(
            kind_of(&raw("Aspirin", "2.5")),
            (Field::Quantity, ValidationErrorKind::NotInteger)
        );
        assert_eq!(
            kind_of(&raw("Aspirin", "")),
            (Field::Quantity, ValidationErrorKind::MissingField)
        );
        assert_eq!(validate(&raw("Aspirin", "0")).unwrap().quantity, 0);
    }

    #[test]
    fn test_price_rules() {
        let mut input = raw("Aspirin", "1");
        input.price = "ten".into();
        assert_eq!(kind_of(&input), (Field::Price, ValidationErrorKind::NotNumber));

        input.price = "NaN".into();
        assert_eq!(kind_of(&input), (Field::Price, ValidationErrorKind::NotNumber));

        input.price = "-0.5".into();
        assert_eq!(kind_of(&input), (Field::Price, ValidationErrorKind::Negative));

        input.price = "12".into();
        assert_eq!(validate(&input).unwrap().price, Some(12.0));
    }

    #[test]
    fn test_bad_expiry_dates() {
        let mut input = raw("Aspirin", "1");
        for bad in ["2025-13-40", "2025-02-30", "01/02/2025", "tomorrow", "12025-01-01"] {
            input.expiry_date = bad.into();
            assert_eq!(
                kind_of(&input),
                (Field::ExpiryDate, ValidationErrorKind::BadDateFormat),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_past_expiry_is_legal() {
        let mut input = raw("Aspirin", "1");
        input.expiry_date = "1999-12-31".into();
        assert_eq!(
            validate(&input).unwrap().expiry_date,
            NaiveDate::from_ymd_opt(1999, 12, 31)
        );
    }

    #[test]
    fn test_first_failing_field_wins() {
        let mut input = raw("", "abc");
        input.expiry_date = "nope".into();
        assert_eq!(kind_of(&input).0, Field::ProductName);
    }

    #[test]
    fn test_check_fields_applies_form_rules() {
        let check = |fields: RecordFields| {
            let err = check_fields(fields).unwrap_err();
            (err.field, err.kind)
        };

        assert_eq!(
            check(RecordFields::new("  ", 1)),
            (Field::ProductName, ValidationErrorKind::MissingField)
        );
        assert_eq!(
            check(RecordFields::new("Aspirin", -1)),
            (Field::Quantity, ValidationErrorKind::Negative)
        );

        let mut priced = RecordFields::new("Aspirin", 1);
        priced.price = Some(-5.0);
        assert_eq!(check(priced.clone()), (Field::Price, ValidationErrorKind::Negative));
        priced.price = Some(f64::NAN);
        assert_eq!(check(priced), (Field::Price, ValidationErrorKind::NotNumber));

        let far_future = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
        assert_eq!(
            check(RecordFields::new("Aspirin", 1).with_expiry(far_future)),
            (Field::ExpiryDate, ValidationErrorKind::BadDateFormat)
        );
    }

    #[test]
    fn test_check_fields_normalizes_text() {
        let mut fields = RecordFields::new(" Bandage ", 3);
        fields.category = Some("".into());
        fields.supplier = Some(" Acme ".into());

        let checked = check_fields(fields).unwrap();
        assert_eq!(checked.product_name, "Bandage");
        assert_eq!(checked.category, None);
        assert_eq!(checked.supplier, Some("Acme".into()));
        // Already-normal input passes through unchanged.
        assert_eq!(check_fields(checked.clone()).unwrap(), checked);
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new(Field::ExpiryDate, ValidationErrorKind::BadDateFormat);
        assert_eq!(err.to_string(), "expiry_date: must be a date in YYYY-MM-DD format");
    }
}

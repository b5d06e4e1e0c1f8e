use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::RecordType;
use crate::types::FieldType;

const INTEGER_WIDTHS: [u8; 4] = [8, 16, 32, 64];

/// Validate internal consistency of a record type.
///
/// This checks, recursively through nested records, lists and optionals:
/// - the record and its fields have non-empty names
/// - field names are unique within a record
/// - integer widths are one of 8, 16, 32 or 64
pub fn validate_record_type(record: &RecordType) -> Result<()> {
    if record.name.trim().is_empty() {
        return Err(Error::InvalidRecord("record name is empty".to_string()));
    }

    let mut seen = BTreeSet::new();
    for field in &record.fields {
        if field.name.trim().is_empty() {
            return Err(Error::InvalidRecord(format!(
                "empty field name in record {}",
                record.name
            )));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(Error::InvalidRecord(format!(
                "duplicate field name: {}.{}",
                record.name, field.name
            )));
        }
        validate_field_type(&record.name, &field.name, &field.ty)?;
    }

    Ok(())
}

fn validate_field_type(record: &str, field: &str, ty: &FieldType) -> Result<()> {
    match ty {
        FieldType::Int { bits } | FieldType::UInt { bits } => {
            if !INTEGER_WIDTHS.contains(bits) {
                return Err(Error::InvalidRecord(format!(
                    "unsupported integer width {bits} for {record}.{field}"
                )));
            }
            Ok(())
        }
        FieldType::List { element } => validate_field_type(record, field, element),
        FieldType::Optional { inner } => validate_field_type(record, field, inner),
        FieldType::Record(nested) => validate_record_type(nested),
        FieldType::Bool
        | FieldType::Float
        | FieldType::Text
        | FieldType::Bytes
        | FieldType::Opaque { .. } => Ok(()),
    }
}

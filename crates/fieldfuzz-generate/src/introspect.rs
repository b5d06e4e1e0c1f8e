use std::collections::BTreeMap;

use fieldfuzz_core::{FieldDescriptor, FieldType, RecordType, validate_record_type};

use crate::errors::FuzzError;

/// Field table of a record type, captured once per session.
#[derive(Debug, Clone)]
pub struct RecordShape {
    pub record: RecordType,
    /// Fields keyed by name. Iteration follows key order, not declaration order.
    pub fields: BTreeMap<String, FieldDescriptor>,
}

/// Capture the field table of `ty`.
///
/// Fails with [`FuzzError::NotARecordType`] when the handle is absent or does
/// not describe a record.
pub fn introspect(ty: Option<&FieldType>) -> Result<RecordShape, FuzzError> {
    let record = ty
        .and_then(FieldType::as_record)
        .ok_or(FuzzError::NotARecordType)?;
    validate_record_type(record)?;

    let fields = record
        .fields
        .iter()
        .map(|field| (field.name.clone(), field.clone()))
        .collect();

    Ok(RecordShape {
        record: record.clone(),
        fields,
    })
}

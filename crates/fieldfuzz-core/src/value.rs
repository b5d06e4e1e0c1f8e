use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::RecordType;
use crate::types::FieldType;

/// Dynamically typed value for a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent optional value, or the zero value of an opaque field.
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<FieldValue>),
    Record(RecordValue),
}

impl FieldValue {
    /// Zero value of a declared type.
    pub fn zero(ty: &FieldType) -> Self {
        match ty {
            FieldType::Bool => FieldValue::Bool(false),
            FieldType::Int { .. } => FieldValue::Int(0),
            FieldType::UInt { .. } => FieldValue::UInt(0),
            FieldType::Float => FieldValue::Float(0.0),
            FieldType::Text => FieldValue::Text(String::new()),
            FieldType::Bytes => FieldValue::Bytes(Vec::new()),
            FieldType::List { .. } => FieldValue::List(Vec::new()),
            FieldType::Optional { .. } | FieldType::Opaque { .. } => FieldValue::Null,
            FieldType::Record(record) => FieldValue::Record(RecordValue::zeroed(record)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::UInt(_) => "uint",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::List(_) => "list",
            FieldValue::Record(_) => "record",
        }
    }

    /// Whether this value can be stored in a field of type `ty`.
    pub fn conforms_to(&self, ty: &FieldType) -> bool {
        match (ty, self) {
            (FieldType::Opaque { .. }, _) => true,
            (FieldType::Optional { .. }, FieldValue::Null) => true,
            (FieldType::Optional { inner }, value) => value.conforms_to(inner),
            (FieldType::Bool, FieldValue::Bool(_)) => true,
            (FieldType::Int { bits }, FieldValue::Int(value)) => int_fits(*value, *bits),
            (FieldType::UInt { bits }, FieldValue::UInt(value)) => uint_fits(*value, *bits),
            (FieldType::Float, FieldValue::Float(_)) => true,
            (FieldType::Text, FieldValue::Text(_)) => true,
            (FieldType::Bytes, FieldValue::Bytes(_)) => true,
            (FieldType::List { element }, FieldValue::List(items)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            (FieldType::Record(record), FieldValue::Record(value)) => value.conforms_to(record),
            _ => false,
        }
    }

    /// Convert a JSON value into a field value of type `ty`.
    pub fn from_json(value: &Value, ty: &FieldType) -> Result<Self> {
        let mismatch = || {
            Error::Conversion(format!(
                "cannot read {} from json {}",
                ty.describe(),
                value
            ))
        };
        let converted = match ty {
            FieldType::Bool => FieldValue::Bool(value.as_bool().ok_or_else(mismatch)?),
            FieldType::Int { .. } => FieldValue::Int(value.as_i64().ok_or_else(mismatch)?),
            FieldType::UInt { .. } => FieldValue::UInt(value.as_u64().ok_or_else(mismatch)?),
            FieldType::Float => FieldValue::Float(value.as_f64().ok_or_else(mismatch)?),
            FieldType::Text => FieldValue::Text(value.as_str().ok_or_else(mismatch)?.to_string()),
            FieldType::Bytes => {
                let items = value.as_array().ok_or_else(mismatch)?;
                let bytes = items
                    .iter()
                    .map(|item| {
                        item.as_u64()
                            .and_then(|byte| u8::try_from(byte).ok())
                            .ok_or_else(mismatch)
                    })
                    .collect::<Result<Vec<_>>>()?;
                FieldValue::Bytes(bytes)
            }
            FieldType::List { element } => {
                let items = value.as_array().ok_or_else(mismatch)?;
                FieldValue::List(
                    items
                        .iter()
                        .map(|item| FieldValue::from_json(item, element))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            FieldType::Optional { inner } => {
                if value.is_null() {
                    FieldValue::Null
                } else {
                    FieldValue::from_json(value, inner)?
                }
            }
            FieldType::Record(record) => {
                let object = value.as_object().ok_or_else(mismatch)?;
                let mut out = RecordValue::zeroed(record);
                for (name, item) in object {
                    let field = record.field(name).ok_or_else(|| Error::UnknownField {
                        record: record.name.clone(),
                        field: name.clone(),
                    })?;
                    out.set(name, FieldValue::from_json(item, &field.ty)?)?;
                }
                FieldValue::Record(out)
            }
            FieldType::Opaque { name } => {
                return Err(Error::Conversion(format!(
                    "opaque type {name} cannot be read from json"
                )));
            }
        };

        if !converted.conforms_to(ty) {
            return Err(mismatch());
        }
        Ok(converted)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            FieldValue::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Result<RecordValue> {
        match self {
            FieldValue::Record(record) => Ok(record),
            other => Err(Error::Conversion(format!(
                "expected record, found {}",
                other.kind()
            ))),
        }
    }
}

fn int_fits(value: i64, bits: u8) -> bool {
    match bits {
        0 => return value == 0,
        64.. => return true,
        _ => {}
    }
    let max = (1_i64 << (bits - 1)) - 1;
    let min = -(1_i64 << (bits - 1));
    (min..=max).contains(&value)
}

fn uint_fits(value: u64, bits: u8) -> bool {
    bits >= 64 || value < (1_u64 << bits)
}

/// Concrete value of a record: one value per declared field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    name: String,
    fields: Vec<(String, FieldValue)>,
}

impl RecordValue {
    /// A fresh instance with every field at its zero value.
    pub fn zeroed(record: &RecordType) -> Self {
        Self {
            name: record.name.clone(),
            fields: record
                .fields
                .iter()
                .map(|field| (field.name.clone(), FieldValue::zero(&field.ty)))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn set(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let slot = self.slot(field)?;
        *slot = value;
        Ok(())
    }

    /// Move a field's value out, leaving `Null` behind.
    pub fn take(&mut self, field: &str) -> Result<FieldValue> {
        let slot = self.slot(field)?;
        Ok(std::mem::replace(slot, FieldValue::Null))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn conforms_to(&self, record: &RecordType) -> bool {
        self.name == record.name
            && self.fields.len() == record.fields.len()
            && record.fields.iter().all(|field| {
                self.get(&field.name)
                    .is_some_and(|value| value.conforms_to(&field.ty))
            })
    }

    fn slot(&mut self, field: &str) -> Result<&mut FieldValue> {
        let record = self.name.clone();
        self.fields
            .iter_mut()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
            .ok_or_else(|| Error::UnknownField {
                record,
                field: field.to_string(),
            })
    }
}

impl From<RecordValue> for FieldValue {
    fn from(record: RecordValue) -> Self {
        FieldValue::Record(record)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Bool(value) => serializer.serialize_bool(*value),
            FieldValue::Int(value) => serializer.serialize_i64(*value),
            FieldValue::UInt(value) => serializer.serialize_u64(*value),
            FieldValue::Float(value) => serializer.serialize_f64(*value),
            FieldValue::Text(value) => serializer.serialize_str(value),
            FieldValue::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for byte in bytes {
                    seq.serialize_element(byte)?;
                }
                seq.end()
            }
            FieldValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Record(record) => record.serialize(serializer),
        }
    }
}

impl Serialize for RecordValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

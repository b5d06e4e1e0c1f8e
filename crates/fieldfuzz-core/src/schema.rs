use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::FieldType;
use crate::validation::validate_record_type;

/// Shape of a record: a name plus its declared fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecordType {
    /// Record name (e.g. `Person`).
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

/// A named, typed field of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl RecordType {
    /// Build a record type, rejecting duplicate or empty field names.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Result<Self> {
        let record = Self {
            name: name.into(),
            fields,
        };
        validate_record_type(&record)?;
        Ok(record)
    }

    pub fn builder(name: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }
}

impl From<RecordType> for FieldType {
    fn from(record: RecordType) -> Self {
        FieldType::Record(record)
    }
}

/// Incremental builder for [`RecordType`].
///
/// Declaring a field twice replaces the earlier declaration in place.
#[derive(Debug, Clone)]
pub struct RecordTypeBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordTypeBuilder {
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        let descriptor = FieldDescriptor::new(name, ty);
        match self
            .fields
            .iter_mut()
            .find(|field| field.name == descriptor.name)
        {
            Some(existing) => *existing = descriptor,
            None => self.fields.push(descriptor),
        }
        self
    }

    pub fn build(self) -> RecordType {
        RecordType {
            name: self.name,
            fields: self.fields,
        }
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schema::RecordType;

/// Declared type of a record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    /// Signed integer with the given width in bits (8, 16, 32 or 64).
    Int {
        #[serde(default = "default_bits")]
        bits: u8,
    },
    /// Unsigned integer with the given width in bits (8, 16, 32 or 64).
    #[serde(rename = "uint")]
    UInt {
        #[serde(default = "default_bits")]
        bits: u8,
    },
    Float,
    Text,
    Bytes,
    List {
        element: Box<FieldType>,
    },
    Optional {
        inner: Box<FieldType>,
    },
    /// Nested record.
    Record(RecordType),
    /// A type that cannot be fabricated from random bits (functions, handles,
    /// channels). Only explicit generators can populate it.
    Opaque {
        name: String,
    },
}

fn default_bits() -> u8 {
    64
}

impl FieldType {
    pub fn int(bits: u8) -> Self {
        FieldType::Int { bits }
    }

    pub fn uint(bits: u8) -> Self {
        FieldType::UInt { bits }
    }

    pub fn list(element: FieldType) -> Self {
        FieldType::List {
            element: Box::new(element),
        }
    }

    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        FieldType::Opaque { name: name.into() }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, FieldType::Record(_))
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            FieldType::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Short human readable name used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Bool => "bool".to_string(),
            FieldType::Int { bits } => format!("i{bits}"),
            FieldType::UInt { bits } => format!("u{bits}"),
            FieldType::Float => "float".to_string(),
            FieldType::Text => "text".to_string(),
            FieldType::Bytes => "bytes".to_string(),
            FieldType::List { element } => format!("list<{}>", element.describe()),
            FieldType::Optional { inner } => format!("optional<{}>", inner.describe()),
            FieldType::Record(record) => format!("record {}", record.name),
            FieldType::Opaque { name } => format!("opaque {name}"),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

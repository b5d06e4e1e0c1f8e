use thiserror::Error;

/// Core error type shared across fieldfuzz crates.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The record shape violates internal invariants.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// A value does not fit the declared type of a field.
    #[error("type mismatch for '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// A field name is not declared by the record.
    #[error("unknown field '{field}' in record '{record}'")]
    UnknownField { record: String, field: String },
    /// A dynamic value could not be converted into a typed value.
    #[error("conversion error: {0}")]
    Conversion(String),
}

/// Convenience alias for results returned by fieldfuzz crates.
pub type Result<T> = std::result::Result<T, Error>;

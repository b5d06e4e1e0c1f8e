//! Core contracts for fieldfuzz.
//!
//! This crate defines record shapes (field type descriptors), dynamic field
//! values, shape validation, and the bridge traits that connect plain Rust
//! structs to the dynamic model.

pub mod error;
pub mod schema;
pub mod typed;
pub mod types;
pub mod validation;
pub mod value;

pub use error::{Error, Result};
pub use schema::{FieldDescriptor, RecordType, RecordTypeBuilder};
pub use typed::{FromFieldValue, Shaped};
pub use types::FieldType;
pub use validation::validate_record_type;
pub use value::{FieldValue, RecordValue};

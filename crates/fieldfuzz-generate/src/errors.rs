use thiserror::Error;

use fieldfuzz_core::RecordValue;

use crate::generators::GeneratorError;
use crate::options::UndoLog;

/// Errors emitted by a fuzz session.
#[derive(Debug, Error)]
pub enum FuzzError {
    #[error("fuzz: requested type is not a record type")]
    NotARecordType,
    #[error("fuzz: unmatched binding '{0}'")]
    UnmatchedBinding(String),
    #[error("fuzz: duplicated binding '{0}'")]
    DuplicateBinding(String),
    #[error("fuzz: absent binding '{0}'")]
    AbsentBinding(String),
    #[error("fuzz: illegal type {ty} for default value of '{field}'")]
    UnsupportedFieldType { field: String, ty: String },
    #[error("fuzz: generator failed for '{field}': {source}")]
    GeneratorFailure {
        field: String,
        #[source]
        source: GeneratorError,
    },
    #[error("fuzz: generator for '{field}' produced {found}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    #[error("fuzz: option error {0}")]
    Configuration(String),
    #[error("fuzz: {0}")]
    Panicked(String),
    #[error(transparent)]
    Core(#[from] fieldfuzz_core::Error),
}

/// Failure of a composite configuration call.
///
/// `undo` holds the inverses of every operation applied before the failing
/// one; nothing is rolled back automatically.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ApplyFailure {
    #[source]
    pub error: FuzzError,
    pub undo: UndoLog,
}

/// Failure of a value production call.
///
/// `partial` is the record as assembled up to the failing field, kept for
/// diagnostics. Fields not reached yet keep their zero value.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ProduceFailure {
    #[source]
    pub error: FuzzError,
    pub partial: RecordValue,
}

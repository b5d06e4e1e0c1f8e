//! Per-field value generation for record types.
//!
//! A [`Session`] wraps one record type. Fields can be bound to custom
//! generators through reversible [`ConfigOp`]s; every other field gets either
//! its zero value or a random default, depending on the session's fallthrough
//! flag.

pub mod adapters;
pub mod defaults;
pub mod errors;
pub mod generators;
pub mod introspect;
pub mod model;
pub mod options;
pub mod registry;
pub mod session;

pub use adapters::{QuickGenerator, quick_values};
pub use defaults::{DefaultValues, RandomDefaults};
pub use errors::{ApplyFailure, FuzzError, ProduceFailure};
pub use generators::{FnGenerator, Generator, GeneratorError, SharedGenerator, from_fn};
pub use model::SessionOptions;
pub use options::{ConfigOp, UndoLog};
pub use registry::BindingRegistry;
pub use session::{FieldSource, Session};

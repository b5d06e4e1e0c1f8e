//! Reversible configuration operations.
//!
//! Every [`ConfigOp`] applied to a [`Session`] yields the operation that
//! undoes it, so a sequence of inverses replayed newest first restores the
//! session to where it started.

use std::sync::Arc;

use tracing::debug;

use crate::errors::{ApplyFailure, FuzzError};
use crate::generators::{Generator, SharedGenerator};
use crate::session::Session;

/// One pending change to a session.
#[derive(Clone)]
pub enum ConfigOp {
    /// Attach a generator to a named field.
    BindField {
        name: String,
        generator: SharedGenerator,
    },
    /// Remove the generator attached to a named field.
    UnbindField { name: String },
    /// Leave unbound fields at their zero value instead of a random one.
    SetZeroValueFallthrough { on: bool },
}

impl ConfigOp {
    pub fn bind_field(name: impl Into<String>, generator: impl Generator + 'static) -> Self {
        Self::bind_shared(name, Arc::new(generator))
    }

    pub fn bind_shared(name: impl Into<String>, generator: SharedGenerator) -> Self {
        ConfigOp::BindField {
            name: name.into(),
            generator,
        }
    }

    pub fn unbind_field(name: impl Into<String>) -> Self {
        ConfigOp::UnbindField { name: name.into() }
    }

    pub fn zero_value_fallthrough(on: bool) -> Self {
        ConfigOp::SetZeroValueFallthrough { on }
    }

    /// Apply the operation and return its inverse.
    ///
    /// A failed operation leaves the session unchanged.
    pub fn apply(self, session: &mut Session) -> Result<ConfigOp, FuzzError> {
        match self {
            ConfigOp::BindField { name, generator } => {
                if session.bindings.contains(&name) {
                    return Err(FuzzError::DuplicateBinding(name));
                }
                if !session.has_field(&name) {
                    return Err(FuzzError::UnmatchedBinding(name));
                }
                debug!(
                    record = %session.record_type().name,
                    field = %name,
                    generator = generator.id(),
                    "field bound"
                );
                session.bindings.insert(&name, generator);
                Ok(ConfigOp::UnbindField { name })
            }
            ConfigOp::UnbindField { name } => {
                let Some(generator) = session.bindings.get(&name) else {
                    return Err(FuzzError::AbsentBinding(name));
                };
                // Log before removing; a panicking id() must leave the binding in place.
                debug!(
                    record = %session.record_type().name,
                    field = %name,
                    generator = generator.id(),
                    "field unbound"
                );
                let Some(generator) = session.bindings.remove(&name) else {
                    return Err(FuzzError::AbsentBinding(name));
                };
                Ok(ConfigOp::BindField { name, generator })
            }
            ConfigOp::SetZeroValueFallthrough { on } => {
                let previous = std::mem::replace(&mut session.zero_value_fallthrough, on);
                debug!(
                    record = %session.record_type().name,
                    on,
                    previous,
                    "zero-value fallthrough set"
                );
                Ok(ConfigOp::SetZeroValueFallthrough { on: previous })
            }
        }
    }
}

impl PartialEq for ConfigOp {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ConfigOp::BindField {
                    name: left,
                    generator: left_gen,
                },
                ConfigOp::BindField {
                    name: right,
                    generator: right_gen,
                },
            ) => left == right && Arc::ptr_eq(left_gen, right_gen),
            (ConfigOp::UnbindField { name: left }, ConfigOp::UnbindField { name: right }) => {
                left == right
            }
            (
                ConfigOp::SetZeroValueFallthrough { on: left },
                ConfigOp::SetZeroValueFallthrough { on: right },
            ) => left == right,
            _ => false,
        }
    }
}

impl std::fmt::Debug for ConfigOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigOp::BindField { name, generator } => f
                .debug_struct("BindField")
                .field("name", name)
                .field("generator", &generator.id())
                .finish(),
            ConfigOp::UnbindField { name } => {
                f.debug_struct("UnbindField").field("name", name).finish()
            }
            ConfigOp::SetZeroValueFallthrough { on } => f
                .debug_struct("SetZeroValueFallthrough")
                .field("on", on)
                .finish(),
        }
    }
}

impl std::fmt::Display for ConfigOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigOp::BindField { name, generator } => {
                write!(f, "bind {name} to {}", generator.id())
            }
            ConfigOp::UnbindField { name } => write!(f, "unbind {name}"),
            ConfigOp::SetZeroValueFallthrough { on } => {
                write!(f, "set zero-value fallthrough to {on}")
            }
        }
    }
}

/// Inverses of the operations applied by one call, in application order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UndoLog {
    inverses: Vec<ConfigOp>,
}

impl UndoLog {
    pub(crate) fn push(&mut self, inverse: ConfigOp) {
        self.inverses.push(inverse);
    }

    /// Inverse of the most recently applied operation.
    pub fn last(&self) -> Option<&ConfigOp> {
        self.inverses.last()
    }

    pub fn into_last(mut self) -> Option<ConfigOp> {
        self.inverses.pop()
    }

    pub fn len(&self) -> usize {
        self.inverses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigOp> {
        self.inverses.iter()
    }

    pub fn into_inverses(self) -> Vec<ConfigOp> {
        self.inverses
    }

    /// Replay the inverses newest first. The returned log redoes the rollback.
    pub fn rollback(self, session: &mut Session) -> Result<UndoLog, ApplyFailure> {
        session.apply(self.inverses.into_iter().rev())
    }
}

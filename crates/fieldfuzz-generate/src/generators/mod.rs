use std::sync::Arc;

use rand::RngCore;
use thiserror::Error;

use fieldfuzz_core::FieldValue;

pub mod primitives;

pub use primitives::{Constant, FloatRange, IntRange, OneOf, TextOf};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Produces a value of some type from a random source and a size hint.
///
/// Sessions hold generators behind an [`Arc`]; the caller that registers a
/// generator keeps its own handle.
pub trait Generator: Send + Sync {
    fn id(&self) -> &str;

    /// Emit a value for the random source `rng` and size hint `size`.
    fn generate(&self, rng: &mut dyn RngCore, size: usize) -> Result<FieldValue, GeneratorError>;
}

/// Shared handle to a generator.
pub type SharedGenerator = Arc<dyn Generator>;

impl<G: Generator + ?Sized> Generator for Arc<G> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn generate(&self, rng: &mut dyn RngCore, size: usize) -> Result<FieldValue, GeneratorError> {
        (**self).generate(rng, size)
    }
}

/// Failure reported by a generator.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GeneratorError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl GeneratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Adapts a plain closure into a [`Generator`].
pub struct FnGenerator<F> {
    id: String,
    func: F,
}

impl<F> FnGenerator<F>
where
    F: Fn(&mut dyn RngCore, usize) -> Result<FieldValue, GeneratorError> + Send + Sync,
{
    pub fn new(id: impl Into<String>, func: F) -> Self {
        Self {
            id: id.into(),
            func,
        }
    }
}

impl<F> Generator for FnGenerator<F>
where
    F: Fn(&mut dyn RngCore, usize) -> Result<FieldValue, GeneratorError> + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn generate(&self, rng: &mut dyn RngCore, size: usize) -> Result<FieldValue, GeneratorError> {
        (self.func)(rng, size)
    }
}

impl<F> std::fmt::Debug for FnGenerator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnGenerator").field("id", &self.id).finish()
    }
}

/// Shorthand for [`FnGenerator::new`].
pub fn from_fn<F>(id: impl Into<String>, func: F) -> FnGenerator<F>
where
    F: Fn(&mut dyn RngCore, usize) -> Result<FieldValue, GeneratorError> + Send + Sync,
{
    FnGenerator::new(id, func)
}

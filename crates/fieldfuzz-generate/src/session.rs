use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rand::RngCore;
use tracing::{debug, trace, warn};

use fieldfuzz_core::{
    FieldDescriptor, FieldType, FieldValue, FromFieldValue, RecordType, RecordValue, Shaped,
};

use crate::defaults::{DefaultValues, RandomDefaults};
use crate::errors::{ApplyFailure, FuzzError, ProduceFailure};
use crate::generators::{Generator, GeneratorError};
use crate::introspect::{RecordShape, introspect};
use crate::model::SessionOptions;
use crate::options::{ConfigOp, UndoLog};
use crate::registry::BindingRegistry;

/// Where a field's value comes from under the current configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// The bound generator, by id.
    Bound(String),
    /// Left at the zero value.
    Zero,
    /// The default value facility.
    Default,
}

/// A fuzz context for one record type.
///
/// Configuration goes through [`Session::apply`] and takes `&mut self`;
/// production takes `&self`. Sharing a session across threads needs external
/// synchronisation, the random source is borrowed per call.
pub struct Session {
    shape: RecordShape,
    pub(crate) bindings: BindingRegistry,
    pub(crate) zero_value_fallthrough: bool,
    defaults: Arc<dyn DefaultValues>,
}

impl Session {
    /// Create a session for `ty`, which must be a record type.
    pub fn new(ty: &FieldType) -> Result<Self, FuzzError> {
        Self::from_handle(Some(ty))
    }

    /// Like [`Session::new`], but an absent handle is reported as
    /// [`FuzzError::NotARecordType`].
    pub fn from_handle(ty: Option<&FieldType>) -> Result<Self, FuzzError> {
        Self::with_options(ty, &SessionOptions::default())
    }

    /// Like [`Session::new`], but panics when `ty` is not a record type.
    /// Meant for setup code where a wrong handle is a programming error.
    pub fn must_new(ty: &FieldType) -> Self {
        match Self::new(ty) {
            Ok(session) => session,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create a session for a Rust type with a static shape.
    pub fn for_record<T: Shaped>() -> Result<Self, FuzzError> {
        Self::new(&T::field_type())
    }

    pub fn with_options(ty: Option<&FieldType>, options: &SessionOptions) -> Result<Self, FuzzError> {
        let shape = introspect(ty)?;
        debug!(
            record = %shape.record.name,
            fields = shape.fields.len(),
            zero_value_fallthrough = options.zero_value_fallthrough,
            "session created"
        );
        Ok(Self {
            shape,
            bindings: BindingRegistry::new(),
            zero_value_fallthrough: options.zero_value_fallthrough,
            defaults: Arc::new(RandomDefaults::new(options.max_len)),
        })
    }

    /// Replace the default value facility.
    pub fn with_defaults(mut self, defaults: impl DefaultValues + 'static) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    pub fn record_type(&self) -> &RecordType {
        &self.shape.record
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.shape.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.shape.fields.contains_key(name)
    }

    pub fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains(name)
    }

    pub fn zero_value_fallthrough(&self) -> bool {
        self.zero_value_fallthrough
    }

    /// Apply operations in order, stopping at the first failure.
    ///
    /// On success the returned log holds one inverse per operation. On
    /// failure the operations after the failing one are never attempted, the
    /// ones before it stay applied, and their inverses travel with the error.
    pub fn apply<I>(&mut self, ops: I) -> Result<UndoLog, ApplyFailure>
    where
        I: IntoIterator<Item = ConfigOp>,
    {
        let mut undo = UndoLog::default();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<(), FuzzError> {
            for op in ops {
                let inverse = op.apply(self)?;
                undo.push(inverse);
            }
            Ok(())
        }));

        let error = match outcome {
            Ok(Ok(())) => return Ok(undo),
            Ok(Err(err)) => err,
            Err(panic) => FuzzError::Configuration(panic_message(panic)),
        };
        warn!(
            record = %self.shape.record.name,
            applied = undo.len(),
            error = %error,
            "configuration stopped"
        );
        Err(ApplyFailure { error, undo })
    }

    /// Apply a single operation, returning its inverse.
    pub fn option(&mut self, op: ConfigOp) -> Result<ConfigOp, FuzzError> {
        self.apply([op])
            .map_err(|failure| failure.error)?
            .into_last()
            .ok_or_else(|| FuzzError::Configuration("no inverse recorded".to_string()))
    }

    /// Apply operations, panicking on failure. Meant for one-time setup where
    /// misconfiguration is a programming error.
    pub fn must_apply<I>(&mut self, ops: I) -> UndoLog
    where
        I: IntoIterator<Item = ConfigOp>,
    {
        match self.apply(ops) {
            Ok(undo) => undo,
            Err(failure) => panic!("{failure}"),
        }
    }

    /// Source each field would be populated from right now.
    pub fn resolutions(&self) -> BTreeMap<&str, FieldSource> {
        self.shape
            .fields
            .keys()
            .map(|name| (name.as_str(), self.source_for(name)))
            .collect()
    }

    fn source_for(&self, name: &str) -> FieldSource {
        match self.bindings.get(name) {
            Some(generator) => FieldSource::Bound(generator.id().to_string()),
            None if self.zero_value_fallthrough => FieldSource::Zero,
            None => FieldSource::Default,
        }
    }

    /// Produce one record value.
    ///
    /// Every field is visited exactly once; the visiting order is not the
    /// declaration order and callers must not depend on it. Any failure,
    /// including a panic inside a generator, aborts the whole call; the record
    /// as assembled so far is returned with the error.
    pub fn produce(&self, rng: &mut dyn RngCore, size: usize) -> Result<RecordValue, ProduceFailure> {
        let mut value = RecordValue::zeroed(&self.shape.record);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.assemble(&mut value, rng, size)
        }));

        let error = match outcome {
            Ok(Ok(())) => return Ok(value),
            Ok(Err(err)) => err,
            Err(panic) => FuzzError::Panicked(panic_message(panic)),
        };
        warn!(record = %self.shape.record.name, error = %error, "production aborted");
        Err(ProduceFailure {
            error,
            partial: value,
        })
    }

    /// Produce one value and convert it into `T`.
    pub fn produce_as<T: FromFieldValue>(
        &self,
        rng: &mut dyn RngCore,
        size: usize,
    ) -> Result<T, FuzzError> {
        let value = self.produce(rng, size).map_err(|failure| failure.error)?;
        Ok(T::from_field_value(FieldValue::Record(value))?)
    }

    fn assemble(
        &self,
        value: &mut RecordValue,
        rng: &mut dyn RngCore,
        size: usize,
    ) -> Result<(), FuzzError> {
        for (name, field) in &self.shape.fields {
            let produced = match self.bindings.get(name) {
                Some(generator) => {
                    let produced = generator.generate(rng, size).map_err(|source| {
                        FuzzError::GeneratorFailure {
                            field: name.clone(),
                            source,
                        }
                    })?;
                    if !produced.conforms_to(&field.ty) {
                        return Err(FuzzError::TypeMismatch {
                            field: name.clone(),
                            expected: field.ty.describe(),
                            found: produced.kind().to_string(),
                        });
                    }
                    trace!(field = %name, generator = generator.id(), "bound value");
                    produced
                }
                None if self.zero_value_fallthrough => {
                    trace!(field = %name, "zero value");
                    continue;
                }
                None => {
                    let produced = self.defaults.value(&field.ty, rng).ok_or_else(|| {
                        FuzzError::UnsupportedFieldType {
                            field: name.clone(),
                            ty: field.ty.describe(),
                        }
                    })?;
                    trace!(field = %name, "default value");
                    produced
                }
            };
            value.set(name, produced)?;
        }
        Ok(())
    }
}

/// A session is itself a generator of records, so it can be bound to a
/// nested record field of another session.
impl Generator for Session {
    fn id(&self) -> &str {
        &self.shape.record.name
    }

    fn generate(&self, rng: &mut dyn RngCore, size: usize) -> Result<FieldValue, GeneratorError> {
        self.produce(rng, size)
            .map(FieldValue::Record)
            .map_err(|failure| GeneratorError::with_source(failure.error.to_string(), failure))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("record", &self.shape.record.name)
            .field("bindings", &self.bindings)
            .field("zero_value_fallthrough", &self.zero_value_fallthrough)
            .finish_non_exhaustive()
    }
}

pub(crate) fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during fuzzing".to_string()
    }
}

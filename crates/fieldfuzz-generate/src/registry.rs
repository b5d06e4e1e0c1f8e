use std::collections::BTreeMap;

use crate::generators::SharedGenerator;

/// Field name to generator bindings for one session.
///
/// The registry itself does not know the record shape; the session checks
/// field names before calling [`BindingRegistry::insert`].
#[derive(Clone, Default)]
pub struct BindingRegistry {
    bindings: BTreeMap<String, SharedGenerator>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&SharedGenerator> {
        self.bindings.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.bindings.contains_key(field)
    }

    /// Record a binding. Returns `false` and leaves the registry untouched
    /// when the field is already bound.
    pub fn insert(&mut self, field: &str, generator: SharedGenerator) -> bool {
        if self.bindings.contains_key(field) {
            return false;
        }
        self.bindings.insert(field.to_string(), generator);
        true
    }

    pub fn remove(&mut self, field: &str) -> Option<SharedGenerator> {
        self.bindings.remove(field)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.bindings
                    .iter()
                    .map(|(field, generator)| (field, generator.id())),
            )
            .finish()
    }
}

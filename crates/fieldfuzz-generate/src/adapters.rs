//! Glue for generator consumers without an error channel.
//!
//! Both adapters turn a generator failure into a panic carrying the original
//! message, which is what property-testing runners expect.

use proptest::prelude::RngCore as _;
use proptest::strategy::{Just, NewTree, Strategy};
use proptest::test_runner::TestRunner;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use fieldfuzz_core::FieldValue;

use crate::generators::{Generator, SharedGenerator};

/// Size hint passed to the wrapped generator when driven by proptest.
pub const DEFAULT_STRATEGY_SIZE: usize = 10;

/// Single-value view of a [`Generator`]: failures panic instead of returning.
///
/// Also usable as a proptest [`Strategy`]; the runner's RNG seeds a ChaCha8
/// stream per case so runs replay under the same proptest seed.
pub struct QuickGenerator<G> {
    generator: G,
    size: usize,
}

impl<G: Generator> QuickGenerator<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            size: DEFAULT_STRATEGY_SIZE,
        }
    }

    /// Size hint used by the [`Strategy`] implementation.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Generate a value, panicking if the generator fails.
    pub fn generate(&self, rng: &mut dyn RngCore, size: usize) -> FieldValue {
        match self.generator.generate(rng, size) {
            Ok(value) => value,
            Err(err) => panic!("fuzz: {err}"),
        }
    }
}

impl<G: Generator> std::fmt::Debug for QuickGenerator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuickGenerator")
            .field("generator", &self.generator.id())
            .field("size", &self.size)
            .finish()
    }
}

impl<G: Generator> Strategy for QuickGenerator<G> {
    type Tree = Just<FieldValue>;
    type Value = FieldValue;

    fn new_tree(&self, runner: &mut TestRunner) -> NewTree<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(runner.rng().next_u64());
        Ok(Just(self.generate(&mut rng, self.size)))
    }
}

/// Positional bulk fill: slot `i` receives a value from generator `i`, with a
/// size hint of zero.
///
/// Panics when the slot count differs from the generator count, or when any
/// generator fails.
pub fn quick_values(
    generators: Vec<SharedGenerator>,
) -> impl Fn(&mut [FieldValue], &mut dyn RngCore) {
    move |slots: &mut [FieldValue], rng: &mut dyn RngCore| {
        if slots.len() != generators.len() {
            panic!(
                "fuzz: incongruent values and generators: {} slots, {} generators",
                slots.len(),
                generators.len()
            );
        }
        for (slot, generator) in slots.iter_mut().zip(&generators) {
            *slot = match generator.generate(rng, 0) {
                Ok(value) => value,
                Err(err) => panic!("fuzz: {err}"),
            };
        }
    }
}

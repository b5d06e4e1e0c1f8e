use std::sync::Arc;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fieldfuzz_core::{FieldType, FieldValue, RecordType};
use fieldfuzz_generate::generators::{Constant, IntRange, from_fn};
use fieldfuzz_generate::{
    ConfigOp, GeneratorError, QuickGenerator, Session, SharedGenerator, quick_values,
};

fn adult_strategy() -> QuickGenerator<Session> {
    let ty = FieldType::Record(
        RecordType::builder("Person")
            .field("name", FieldType::Text)
            .field("age", FieldType::int(64))
            .build(),
    );
    let mut session = Session::new(&ty).expect("session");
    session.must_apply([ConfigOp::bind_field("age", IntRange::new(18, 65))]);
    QuickGenerator::new(session).with_size(4)
}

proptest! {
    #[test]
    fn sessions_drive_proptest(value in adult_strategy()) {
        let record = value.as_record().expect("record value");
        let age = record.get("age").and_then(FieldValue::as_i64).expect("age");
        prop_assert!((18..=65).contains(&age));
        prop_assert!(matches!(record.get("name"), Some(FieldValue::Text(_))));
    }
}

#[test]
fn quick_values_fill_slots_positionally() {
    let generators: Vec<SharedGenerator> = vec![
        Arc::new(Constant(FieldValue::Int(1))),
        Arc::new(Constant(FieldValue::Text("two".to_string()))),
        Arc::new(Constant(FieldValue::Bool(true))),
    ];
    let fill = quick_values(generators);
    let mut slots = vec![FieldValue::Null; 3];
    fill(&mut slots, &mut ChaCha8Rng::seed_from_u64(1));
    assert_eq!(
        slots,
        vec![
            FieldValue::Int(1),
            FieldValue::Text("two".to_string()),
            FieldValue::Bool(true),
        ]
    );
}

#[test]
#[should_panic(expected = "incongruent")]
fn quick_values_reject_length_mismatch() {
    let generators: Vec<SharedGenerator> = vec![Arc::new(Constant(FieldValue::Int(1)))];
    let fill = quick_values(generators);
    let mut slots = vec![FieldValue::Null; 2];
    fill(&mut slots, &mut ChaCha8Rng::seed_from_u64(1));
}

#[test]
#[should_panic(expected = "fuzz: boom")]
fn quick_values_panic_on_generator_failure() {
    let generators: Vec<SharedGenerator> = vec![Arc::new(from_fn("failing", |_rng, _size| {
        Err(GeneratorError::new("boom"))
    }))];
    let fill = quick_values(generators);
    let mut slots = vec![FieldValue::Null];
    fill(&mut slots, &mut ChaCha8Rng::seed_from_u64(1));
}

#[test]
#[should_panic(expected = "fuzz: primitive.int.range min must be <= max")]
fn quick_generator_panics_with_original_message() {
    let generator = QuickGenerator::new(IntRange::new(5, 1));
    generator.generate(&mut ChaCha8Rng::seed_from_u64(1), 0);
}

#[test]
fn quick_generator_passes_values_through() {
    let generator = QuickGenerator::new(Constant(FieldValue::UInt(7)));
    assert_eq!(
        generator.generate(&mut ChaCha8Rng::seed_from_u64(1), 0),
        FieldValue::UInt(7)
    );
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use proptest::prelude::*;
use rand::RngCore;
use tracing::Level;

use fieldfuzz_core::{FieldType, FieldValue, RecordType};
use fieldfuzz_generate::generators::{Constant, IntRange};
use fieldfuzz_generate::{
    ConfigOp, FuzzError, Generator, GeneratorError, Session, SharedGenerator,
};

fn person_type() -> FieldType {
    FieldType::Record(
        RecordType::builder("Person")
            .field("name", FieldType::Text)
            .field("age", FieldType::int(64))
            .build(),
    )
}

fn person_session() -> Session {
    Session::new(&person_type()).expect("person is a record")
}

#[test]
fn rejects_non_record_handles() {
    assert!(matches!(
        Session::new(&FieldType::int(64)),
        Err(FuzzError::NotARecordType)
    ));
    assert!(matches!(
        Session::from_handle(None),
        Err(FuzzError::NotARecordType)
    ));
}

proptest! {
    #[test]
    fn bind_inverse_leaves_field_unbound(
        field in prop::sample::select(vec!["name", "age"]),
        constant in any::<i64>(),
    ) {
        let mut session = person_session();
        let inverse = session
            .option(ConfigOp::bind_field(field, Constant(FieldValue::Int(constant))))
            .expect("bind");
        prop_assert!(session.is_bound(field));
        prop_assert_eq!(&inverse, &ConfigOp::unbind_field(field));

        session.option(inverse).expect("unbind");
        prop_assert!(!session.is_bound(field));
        prop_assert!(session.bindings().is_empty());
    }

    #[test]
    fn fallthrough_inverse_restores_flag(start in any::<bool>(), target in any::<bool>()) {
        let mut session = person_session();
        session
            .option(ConfigOp::zero_value_fallthrough(start))
            .expect("seed flag");

        let inverse = session
            .option(ConfigOp::zero_value_fallthrough(target))
            .expect("set flag");
        prop_assert_eq!(session.zero_value_fallthrough(), target);

        session.option(inverse).expect("restore flag");
        prop_assert_eq!(session.zero_value_fallthrough(), start);
    }
}

#[test]
fn duplicate_binding_leaves_registry_unchanged() {
    let mut session = person_session();
    let first: SharedGenerator = Arc::new(Constant(FieldValue::Int(1)));
    session
        .option(ConfigOp::bind_shared("age", Arc::clone(&first)))
        .expect("first bind");

    let err = session
        .option(ConfigOp::bind_field("age", Constant(FieldValue::Int(2))))
        .expect_err("second bind must fail");
    assert!(matches!(err, FuzzError::DuplicateBinding(ref name) if name == "age"));

    assert_eq!(session.bindings().len(), 1);
    let kept = session.bindings().get("age").expect("age still bound");
    assert!(Arc::ptr_eq(kept, &first));
}

/// Generator whose `id()` panics once `armed` is set.
struct FragileId {
    armed: AtomicBool,
}

impl Generator for FragileId {
    fn id(&self) -> &str {
        if self.armed.load(Ordering::SeqCst) {
            panic!("id exploded");
        }
        "fragile"
    }

    fn generate(&self, _rng: &mut dyn RngCore, _size: usize) -> Result<FieldValue, GeneratorError> {
        Ok(FieldValue::Int(0))
    }
}

#[test]
fn panicking_unbind_leaves_registry_unchanged() {
    let mut session = person_session();
    let fragile = Arc::new(FragileId {
        armed: AtomicBool::new(false),
    });
    let shared: SharedGenerator = fragile.clone();
    session
        .option(ConfigOp::bind_shared("age", Arc::clone(&shared)))
        .expect("bind");
    fragile.armed.store(true, Ordering::SeqCst);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .finish();
    let failure = tracing::subscriber::with_default(subscriber, || {
        session
            .apply([ConfigOp::unbind_field("age")])
            .expect_err("id() panics while logging")
    });

    assert!(matches!(
        failure.error,
        FuzzError::Configuration(ref message) if message.contains("id exploded")
    ));
    assert!(failure.undo.is_empty());
    assert!(session.is_bound("age"));
    let kept = session.bindings().get("age").expect("age still bound");
    assert!(Arc::ptr_eq(kept, &shared));
}

#[test]
fn panic_while_applying_is_reported_with_partial_undo() {
    let mut session = person_session();
    let ops = (0..2).map(|index| {
        if index == 0 {
            ConfigOp::zero_value_fallthrough(true)
        } else {
            panic!("op source exploded")
        }
    });

    let failure = session.apply(ops).expect_err("panic is caught");
    assert!(matches!(
        failure.error,
        FuzzError::Configuration(ref message) if message.contains("op source exploded")
    ));
    assert_eq!(failure.undo.len(), 1);
    assert_eq!(
        failure.undo.last(),
        Some(&ConfigOp::zero_value_fallthrough(false))
    );
    assert!(session.zero_value_fallthrough());

    failure.undo.rollback(&mut session).expect("rollback");
    assert!(!session.zero_value_fallthrough());
}

#[test]
fn unmatched_binding_is_rejected() {
    let mut session = person_session();
    let err = session
        .option(ConfigOp::bind_field("nickname", Constant(FieldValue::Int(1))))
        .expect_err("nickname is not a field");
    assert!(matches!(err, FuzzError::UnmatchedBinding(ref name) if name == "nickname"));
    assert!(!session.is_bound("nickname"));
    assert!(session.bindings().is_empty());
}

#[test]
fn unbinding_requires_a_binding() {
    let mut session = person_session();
    let err = session
        .option(ConfigOp::unbind_field("age"))
        .expect_err("age was never bound");
    assert!(matches!(err, FuzzError::AbsentBinding(ref name) if name == "age"));
}

#[test]
fn unbind_inverse_rebinds_the_same_generator() {
    let mut session = person_session();
    let generator: SharedGenerator = Arc::new(IntRange::new(1, 9));
    session
        .option(ConfigOp::bind_shared("age", Arc::clone(&generator)))
        .expect("bind");

    let inverse = session.option(ConfigOp::unbind_field("age")).expect("unbind");
    assert_eq!(inverse, ConfigOp::bind_shared("age", Arc::clone(&generator)));

    session.option(inverse).expect("rebind");
    let bound = session.bindings().get("age").expect("bound again");
    assert!(Arc::ptr_eq(bound, &generator));
}

#[test]
fn sequence_stops_at_first_failure() {
    let mut session = person_session();
    let failure = session
        .apply([
            ConfigOp::bind_field("age", Constant(FieldValue::Int(42))),
            ConfigOp::bind_field("nickname", Constant(FieldValue::Text("x".to_string()))),
            ConfigOp::zero_value_fallthrough(true),
        ])
        .expect_err("second op fails");

    assert!(matches!(failure.error, FuzzError::UnmatchedBinding(_)));
    assert_eq!(failure.undo.len(), 1);
    assert_eq!(failure.undo.last(), Some(&ConfigOp::unbind_field("age")));

    assert!(session.is_bound("age"), "earlier ops are not rolled back");
    assert!(!session.zero_value_fallthrough(), "later ops are never attempted");
}

#[test]
fn undo_log_rolls_back_a_whole_sequence() {
    let mut session = person_session();
    session
        .option(ConfigOp::bind_field("name", Constant(FieldValue::Text("Ana".to_string()))))
        .expect("initial bind");

    let undo = session
        .apply([
            ConfigOp::unbind_field("name"),
            ConfigOp::bind_field("age", IntRange::new(0, 120)),
            ConfigOp::zero_value_fallthrough(true),
        ])
        .expect("apply");
    assert_eq!(undo.len(), 3);
    assert!(!session.is_bound("name"));
    assert!(session.is_bound("age"));
    assert!(session.zero_value_fallthrough());

    undo.rollback(&mut session).expect("rollback");
    assert!(session.is_bound("name"));
    assert!(!session.is_bound("age"));
    assert!(!session.zero_value_fallthrough());
}

#[test]
fn partial_undo_restores_state_before_failed_sequence() {
    let mut session = person_session();
    let failure = session
        .apply([
            ConfigOp::zero_value_fallthrough(true),
            ConfigOp::bind_field("age", Constant(FieldValue::Int(1))),
            ConfigOp::unbind_field("name"),
        ])
        .expect_err("name is not bound");
    assert!(matches!(failure.error, FuzzError::AbsentBinding(_)));

    failure.undo.rollback(&mut session).expect("rollback");
    assert!(session.bindings().is_empty());
    assert!(!session.zero_value_fallthrough());
}

#[test]
fn empty_sequence_yields_empty_log() {
    let mut session = person_session();
    let undo = session.apply(Vec::<ConfigOp>::new()).expect("nothing to apply");
    assert!(undo.is_empty());
    assert!(undo.last().is_none());
}

#[test]
#[should_panic(expected = "not a record type")]
fn must_new_panics_on_non_record_handle() {
    Session::must_new(&FieldType::Text);
}

#[test]
fn must_new_builds_record_sessions() {
    let session = Session::must_new(&person_type());
    assert_eq!(session.record_type().name, "Person");
}

#[test]
#[should_panic(expected = "unmatched binding")]
fn must_apply_panics_on_misconfiguration() {
    let mut session = person_session();
    session.must_apply([ConfigOp::bind_field(
        "nickname",
        Constant(FieldValue::Int(1)),
    )]);
}

#[test]
fn ops_describe_themselves() {
    let op = ConfigOp::bind_field("age", IntRange::new(1, 2));
    assert_eq!(op.to_string(), "bind age to primitive.int.range");
    assert_eq!(ConfigOp::unbind_field("age").to_string(), "unbind age");
    assert_eq!(
        format!("{:?}", ConfigOp::zero_value_fallthrough(true)),
        "SetZeroValueFallthrough { on: true }"
    );
}

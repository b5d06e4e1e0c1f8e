use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use fieldfuzz_core::{FieldValue, record};
use fieldfuzz_generate::generators::{IntRange, OneOf};
use fieldfuzz_generate::{ConfigOp, Session};

record! {
    #[derive(Debug)]
    struct Person {
        name: String,
        age: i64,
        email: Option<String>,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut session = Session::for_record::<Person>().expect("person is a record");
    let undo = session.must_apply([
        ConfigOp::bind_field("age", IntRange::new(18, 99)),
        ConfigOp::bind_field(
            "name",
            OneOf(vec![
                FieldValue::Text("Ana".to_string()),
                FieldValue::Text("Bruno".to_string()),
            ]),
        ),
        ConfigOp::zero_value_fallthrough(true),
    ]);

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..3 {
        let person: Person = session.produce_as(&mut rng, 10).expect("produce person");
        println!("{person:?}");
    }

    undo.rollback(&mut session).expect("rollback");
    let record = session.produce(&mut rng, 10).expect("produce record");
    println!("{}", serde_json::to_string(&record).expect("serialize record"));
}

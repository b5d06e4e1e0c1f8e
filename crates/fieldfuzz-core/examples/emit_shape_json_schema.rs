use fieldfuzz_core::RecordType;
use schemars::schema_for;

fn main() {
    let schema = schema_for!(RecordType);
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}

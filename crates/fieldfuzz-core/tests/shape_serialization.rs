use fieldfuzz_core::{FieldType, RecordType, validate_record_type};

fn person() -> RecordType {
    RecordType::builder("Person")
        .field("name", FieldType::Text)
        .field("age", FieldType::int(64))
        .build()
}

#[test]
fn serializes_shape_deterministically() {
    let json = serde_json::to_string_pretty(&person()).expect("serialize shape");
    let expected = r#"{
  "name": "Person",
  "fields": [
    {
      "name": "name",
      "type": {
        "kind": "text"
      }
    },
    {
      "name": "age",
      "type": {
        "kind": "int",
        "bits": 64
      }
    }
  ]
}"#;
    assert_eq!(json, expected);
}

#[test]
fn reads_nested_shape_from_toml() {
    let source = r#"
name = "Order"

[[fields]]
name = "id"
type = { kind = "uint", bits = 32 }

[[fields]]
name = "tags"
type = { kind = "list", element = { kind = "text" } }

[[fields]]
name = "customer"

[fields.type]
kind = "record"
name = "Customer"
fields = [{ name = "email", type = { kind = "optional", inner = { kind = "text" } } }]
"#;
    let shape: RecordType = toml::from_str(source).expect("parse shape");
    validate_record_type(&shape).expect("valid shape");

    assert_eq!(shape.fields.len(), 3);
    assert_eq!(
        shape.field("id").map(|field| &field.ty),
        Some(&FieldType::uint(32))
    );
    let customer = shape
        .field("customer")
        .and_then(|field| field.ty.as_record())
        .expect("nested record");
    assert_eq!(customer.name, "Customer");
    assert_eq!(
        customer.field("email").map(|field| &field.ty),
        Some(&FieldType::optional(FieldType::Text))
    );
}

#[test]
fn int_width_defaults_to_64_bits() {
    let ty: FieldType = serde_json::from_str(r#"{"kind": "int"}"#).expect("parse type");
    assert_eq!(ty, FieldType::int(64));
}

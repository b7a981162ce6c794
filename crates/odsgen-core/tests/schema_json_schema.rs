use odsgen_core::table_json_schema;

#[test]
fn json_schema_describes_columns_and_generators() {
    let schema = serde_json::to_value(table_json_schema()).expect("serialize json schema");

    let required = schema
        .get("required")
        .and_then(|value| value.as_array())
        .expect("required array");
    assert!(required.iter().any(|value| value == "columns"));

    let definitions = schema
        .get("definitions")
        .and_then(|value| value.as_object())
        .expect("definitions");
    assert!(definitions.contains_key("ColumnSpec"));
    assert!(definitions.contains_key("FieldGenerator"));
    assert!(definitions.contains_key("FieldType"));
}

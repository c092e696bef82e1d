use datafreeze_core::{ColumnDescriptor, TableDescriptor, ValueKind};

#[test]
fn serializes_descriptor_deterministically() {
    let mut table = TableDescriptor::new("app", "users");
    table.primary_key = vec!["id".to_string()];
    table.columns.push(ColumnDescriptor {
        ordinal_position: 1,
        name: "id".to_string(),
        data_type: "bigint".to_string(),
        udt_name: "int8".to_string(),
        kind: ValueKind::Integer,
        is_generated: false,
    });

    let json = serde_json::to_string_pretty(&table).expect("serialize descriptor");
    let expected = r#"{
  "schema": "app",
  "name": "users",
  "columns": [
    {
      "ordinal_position": 1,
      "name": "id",
      "data_type": "bigint",
      "udt_name": "int8",
      "kind": "integer",
      "is_generated": false
    }
  ],
  "primary_key": [
    "id"
  ]
}"#;
    assert_eq!(json, expected);

    let back: TableDescriptor = serde_json::from_str(&json).expect("deserialize descriptor");
    assert_eq!(back, table);
}

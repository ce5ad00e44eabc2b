use super::PerchConfig;

/// Generates a JSON Schema for the Perch configuration.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(PerchConfig);

    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "$id".to_string(),
            serde_json::json!("https://raw.githubusercontent.com/perch-wm/perch/main/perch.schema.json"),
        );
    }

    schema
}

/// Generates a pretty-printed JSON Schema string for the Perch configuration.
#[must_use]
pub fn generate_schema_json() -> String {
    let schema = generate_schema();
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

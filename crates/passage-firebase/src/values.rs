//! Firestore typed value encoding.
//!
//! The Firestore REST API does not accept plain JSON; every value is
//! wrapped in a type discriminator (`stringValue`, `booleanValue`,
//! `mapValue`, ...). This module converts a `serde_json::Value` tree into
//! that representation. Integers travel as strings per the API contract.

use serde_json::{json, Map, Value};

/// Encode one JSON value as a Firestore typed value.
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode a JSON object as a Firestore `fields` map.
pub fn encode_fields(map: &Map<String, Value>) -> Value {
    let fields: Map<String, Value> = map
        .iter()
        .map(|(key, value)| (key.clone(), encode(value)))
        .collect();
    Value::Object(fields)
}

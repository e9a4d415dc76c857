//! TOML documents as JSON values.
//!
//! Mapping from TOML:
//!   - TOML string          -> JSON string
//!   - TOML integer         -> JSON number
//!   - TOML float           -> JSON number (nan and inf become null)
//!   - TOML boolean         -> JSON bool
//!   - TOML datetime        -> JSON string (its TOML text)
//!   - TOML array           -> JSON array
//!   - TOML table           -> JSON object, keys in document order
//!   - TOML array of tables -> JSON array of objects

use serde_json::{Map, Number, Value as Json};
use toml_edit::DocumentMut;

/// Decode TOML text into a JSON value. The top level is always an object.
pub fn decode(input: &str) -> Result<Json, String> {
    let doc: DocumentMut = input
        .parse::<DocumentMut>()
        .map_err(|e| format!("TOML parse error: {}", e))?;
    Ok(table_to_json(doc.as_table()))
}

fn table_to_json(table: &toml_edit::Table) -> Json {
    let mut obj = Map::new();
    for (key, item) in table.iter() {
        obj.insert(key.to_string(), item_to_json(item));
    }
    Json::Object(obj)
}

fn item_to_json(item: &toml_edit::Item) -> Json {
    match item {
        toml_edit::Item::Value(v) => value_to_json(v),
        toml_edit::Item::Table(t) => table_to_json(t),
        toml_edit::Item::ArrayOfTables(arr) => Json::Array(arr.iter().map(table_to_json).collect()),
        toml_edit::Item::None => Json::Null,
    }
}

fn value_to_json(v: &toml_edit::Value) -> Json {
    match v {
        toml_edit::Value::String(s) => Json::String(s.value().clone()),
        toml_edit::Value::Integer(i) => Json::Number(Number::from(*i.value())),
        toml_edit::Value::Float(f) => Number::from_f64(*f.value())
            .map(Json::Number)
            .unwrap_or(Json::Null),
        toml_edit::Value::Boolean(b) => Json::Bool(*b.value()),
        toml_edit::Value::Datetime(dt) => Json::String(dt.value().to_string()),
        toml_edit::Value::Array(arr) => Json::Array(arr.iter().map(value_to_json).collect()),
        toml_edit::Value::InlineTable(table) => {
            let mut obj = Map::new();
            for (key, val) in table.iter() {
                obj.insert(key.to_string(), value_to_json(val));
            }
            Json::Object(obj)
        }
    }
}

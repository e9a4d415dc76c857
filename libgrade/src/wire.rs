//! Wire codec for values crossing the sandbox process boundary.
//!
//! The wire form is plain JSON. Values JSON cannot carry travel inside
//! strings with a `#` prefix, without altering strings that have no prefix.
//!
//! Encoding:
//! - Specials: `"#undefined"`, `"#NaN"`, `"#Infinity"`, `"#-Infinity"`, `"#-0"`
//! - Escaped strings: `"!#tag"`, `"!!bang"` (a leading `!` for strings that
//!   start with `#` or `!`)

use crate::value::{Map, Value};
use serde_json::{Number, Value as Json};

/// Largest integer a double holds exactly.
const MAX_SAFE_INTEGER: f64 = 9007199254740991.0;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value in wire form.
pub fn to_wire(value: &Value) -> Json {
    match value {
        Value::Undefined => Json::String("#undefined".to_string()),
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => encode_number(*n),
        Value::String(s) => Json::String(escape_string(s)),
        Value::Array(arr) => Json::Array(arr.iter().map(to_wire).collect()),
        Value::Object(obj) => Json::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), to_wire(v)))
                .collect(),
        ),
    }
}

fn encode_number(n: f64) -> Json {
    if n.is_nan() {
        return Json::String("#NaN".to_string());
    }
    if n.is_infinite() {
        let s = if n > 0.0 { "#Infinity" } else { "#-Infinity" };
        return Json::String(s.to_string());
    }
    if n == 0.0 && n.is_sign_negative() {
        return Json::String("#-0".to_string());
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Json::Number(Number::from(n as i64));
    }
    // Finite, so from_f64 cannot fail.
    Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
}

fn escape_string(s: &str) -> String {
    if s.starts_with(['#', '!']) {
        format!("!{}", s)
    } else {
        s.to_string()
    }
}

/// Encode an argument list as wire JSON text.
pub fn encode_args(args: &[Value]) -> String {
    Json::Array(args.iter().map(to_wire).collect()).to_string()
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a value from wire form.
pub fn from_wire(json: &Json) -> Result<Value, String> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => n
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| format!("Unsupported number: {}", n)),
        Json::String(s) => decode_string(s),
        Json::Array(arr) => {
            let items: Result<Vec<Value>, String> = arr.iter().map(from_wire).collect();
            Ok(Value::Array(items?))
        }
        Json::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), from_wire(v)?);
            }
            Ok(Value::Object(map))
        }
    }
}

fn decode_string(s: &str) -> Result<Value, String> {
    if let Some(special) = s.strip_prefix('#') {
        return match special {
            "undefined" => Ok(Value::Undefined),
            "NaN" => Ok(Value::Number(f64::NAN)),
            "Infinity" => Ok(Value::Number(f64::INFINITY)),
            "-Infinity" => Ok(Value::Number(f64::NEG_INFINITY)),
            "-0" => Ok(Value::Number(-0.0)),
            _ => Err(format!("Unknown special: #{}", special)),
        };
    }
    if let Some(escaped) = s.strip_prefix('!') {
        return Ok(Value::String(escaped.to_string()));
    }
    Ok(Value::String(s.to_string()))
}

/// Decode wire JSON text into a value.
pub fn decode(input: &str) -> Result<Value, String> {
    let json: Json = serde_json::from_str(input).map_err(|e| format!("Invalid wire JSON: {}", e))?;
    from_wire(&json)
}

//! Structural deep equality between an actual and an expected value.

use crate::value::Value;

/// Compare two values structurally. Never fails.
///
/// - arrays: same length, element-wise equal in order;
/// - objects: same key set, every value equal (key order is ignored);
/// - leaves: JavaScript `===`, so `NaN` never equals itself, `0` equals
///   `-0`, and `null` differs from `undefined`.
pub fn deep_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|bv| deep_equal(v, bv)))
        }
        _ => false,
    }
}

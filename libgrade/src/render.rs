//! Render values back to text.
//!
//! - [`render`] writes literal-grammar text that the parsers read back to an
//!   equal value (NaN excepted, which has no literal form).
//! - [`stringify`] follows JavaScript's `JSON.stringify`, and is what a
//!   grading result shows as the actual output.

use crate::value::{Map, Value};

// =============================================================================
// Numbers
// =============================================================================

/// Format a number the way JavaScript's `Number.prototype.toString` does.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }

    // Shortest round-trip digits and decimal exponent, e.g. "1.2345e2".
    let sci = format!("{:e}", n);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exp: i32 = exp.parse().unwrap_or(0);

    let k = digits.len() as i32;
    let point = exp + 1;

    if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let e = point - 1;
        let sign = if e < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, e.abs())
        }
    }
}

// =============================================================================
// Literal Renderer
// =============================================================================

/// Render a value as literal-grammar text.
pub fn render(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => encode_string(s),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(obj) => {
            if obj.is_empty() {
                return "{}".to_string();
            }
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| format!("{}: {}", render_key(k), render(v)))
                .collect();
            format!("{{ {} }}", items.join(", "))
        }
    }
}

fn render_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        encode_string(key)
    }
}

/// Check if s is a JavaScript identifier (`[A-Za-z_$][A-Za-z0-9_$]*`).
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

// =============================================================================
// JSON.stringify
// =============================================================================

/// Render a value as `JSON.stringify` would.
///
/// Non-finite numbers become `null`, `undefined` array items become `null`,
/// object members holding `undefined` are left out, and a top-level
/// `undefined` is written as `undefined`.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        _ => stringify_inner(value),
    }
}

fn stringify_inner(value: &Value) -> String {
    match value {
        Value::Undefined | Value::Null => "null".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Number(n) if n.is_finite() => format_number(*n),
        Value::Number(_) => "null".to_string(),
        Value::String(s) => encode_string(s),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(stringify_inner).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(obj) => stringify_object(obj),
    }
}

fn stringify_object(obj: &Map) -> String {
    let items: Vec<String> = obj
        .iter()
        .filter(|(_, v)| !v.is_undefined())
        .map(|(k, v)| format!("{}:{}", encode_string(k), stringify_inner(v)))
        .collect();
    format!("{{{}}}", items.join(","))
}

/// Double-quoted string with JSON escapes.
fn encode_string(s: &str) -> String {
    let mut result = String::from("\"");
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, "1")]
    #[case(-2.5, "-2.5")]
    #[case(0.1, "0.1")]
    #[case(123456789.0, "123456789")]
    #[case(1e21, "1e+21")]
    #[case(1.5e-7, "1.5e-7")]
    #[case(0.000001, "0.000001")]
    #[case(-0.0, "0")]
    #[case(f64::INFINITY, "Infinity")]
    #[case(f64::NAN, "NaN")]
    fn test_format_number(#[case] n: f64, #[case] expected: &str) {
        assert_eq!(format_number(n), expected);
    }

    #[test]
    fn test_render_nested() {
        let mut obj = Map::new();
        obj.insert("a".into(), Value::from(vec![Value::from(1), Value::Null]));
        obj.insert("two words".into(), Value::from("x\"y"));
        assert_eq!(
            render(&Value::Object(obj)),
            r#"{ a: [1, null], "two words": "x\"y" }"#
        );
    }

    #[test]
    fn test_stringify_matches_json_stringify() {
        let mut obj = Map::new();
        obj.insert("keep".into(), Value::from(vec![Value::Undefined, Value::Number(f64::NAN)]));
        obj.insert("drop".into(), Value::Undefined);
        obj.insert("s".into(), Value::from("line\nbreak"));
        assert_eq!(
            stringify(&Value::Object(obj)),
            r#"{"keep":[null,null],"s":"line\nbreak"}"#
        );
    }

    #[test]
    fn test_stringify_top_level_undefined() {
        assert_eq!(stringify(&Value::Undefined), "undefined");
        assert_eq!(stringify(&Value::from(vec![Value::from(0), Value::from(1)])), "[0,1]");
    }
}

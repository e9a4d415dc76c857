//! Lenient Container Parsers
//!
//! The tolerant path for testcase literals the strict grammar rejects:
//! barewords inside containers, doubled commas, unbalanced text. These
//! functions never fail; malformed pieces degrade to bareword strings or are
//! skipped.
//!
//! Known limitations, kept for compatibility with existing testcases:
//! - a flat array splits on every comma, so `['a,b']` yields two elements;
//! - quoted strings are unwrapped without escape processing;
//! - object pairs without a `:` are dropped.

use crate::parser::parse_literal;
use crate::primitive::{parse_value, unwrap_quotes};
use crate::split::split_top_level;
use crate::value::{Map, Value};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

// ============================================================================
// Value Dispatch
// ============================================================================

/// Parse any literal value. Never fails.
///
/// The strict grammar is tried first; when it rejects the text, the value is
/// routed by its outer bracket to [`parse_array`], [`parse_object`] or
/// [`parse_value`].
pub fn parse_complex_value(s: &str) -> Value {
    let s = s.trim();

    match parse_literal(s) {
        Ok(v) => return v,
        Err(e) => trace!(literal = s, error = %e, "strict parse rejected literal"),
    }

    if s.starts_with('[') || s.ends_with(']') {
        Value::Array(parse_array(s))
    } else if s.starts_with('{') || s.ends_with('}') {
        Value::Object(parse_object(s))
    } else {
        parse_value(s)
    }
}

/// Remove one leading `open` and one trailing `close`, where present.
fn strip_delimiters(s: &str, open: char, close: char) -> &str {
    let s = s.trim();
    let s = s.strip_prefix(open).unwrap_or(s);
    s.strip_suffix(close).unwrap_or(s)
}

// ============================================================================
// Array Parsing
// ============================================================================

/// Parse an array literal such as `[1, [2, 3], {a: 4}]`. Never fails.
pub fn parse_array(s: &str) -> Vec<Value> {
    let content = strip_delimiters(s, '[', ']').trim();
    if content.is_empty() {
        return Vec::new();
    }

    if content.contains(['[', '{']) {
        split_top_level(content)
            .iter()
            .map(|segment| parse_complex_value(segment))
            .collect()
    } else {
        content.split(',').map(|piece| parse_value(piece.trim())).collect()
    }
}

// ============================================================================
// Object Parsing
// ============================================================================

static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[{,])\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*:").expect("valid bare key pattern")
});
static DOUBLED_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*,").expect("valid doubled comma pattern"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]]|$)").expect("valid trailing comma pattern"));
static SINGLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']*)'").expect("valid single quote pattern"));

/// Parse an object literal such as `{ a: 1, b: 'hello' }`. Never fails.
///
/// The content is first repaired into strict form and parsed with the strict
/// grammar. If that fails, top-level `key: value` pairs are parsed one by
/// one and malformed pairs are skipped.
pub fn parse_object(s: &str) -> Map {
    let content = strip_delimiters(s, '{', '}').trim();
    if content.is_empty() {
        return Map::new();
    }

    let repaired = repair_object_content(content);
    match parse_literal(&format!("{{{}}}", repaired)) {
        Ok(Value::Object(map)) => return map,
        Ok(other) => debug!(kind = other.type_name(), "repaired object parsed as non-object"),
        Err(e) => debug!(repaired = %repaired, error = %e, "repaired object rejected, parsing pairs"),
    }

    parse_object_pairs(content)
}

/// Quote bare keys, drop doubled and trailing commas, and turn single-quoted
/// strings into double-quoted ones.
fn repair_object_content(content: &str) -> String {
    let mut out = BARE_KEY
        .replace_all(content, "$1\"$2\":")
        .into_owned();
    while DOUBLED_COMMA.is_match(&out) {
        out = DOUBLED_COMMA.replace_all(&out, ",").into_owned();
    }
    out = TRAILING_COMMA.replace_all(&out, "$1").into_owned();
    SINGLE_QUOTED.replace_all(&out, "\"$1\"").into_owned()
}

/// Fallback: split top-level pairs and parse each value on its own.
fn parse_object_pairs(content: &str) -> Map {
    let mut map = Map::new();

    for pair in split_top_level(content) {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((raw_key, raw_value)) = pair.split_once(':') else {
            debug!(pair, "skipping object pair without ':'");
            continue;
        };
        let raw_key = raw_key.trim();
        let key = unwrap_quotes(raw_key).unwrap_or(raw_key);
        if key.is_empty() {
            debug!(pair, "skipping object pair with empty key");
            continue;
        }
        map.insert(key.to_string(), parse_complex_value(raw_value));
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_flat_array() {
        assert_eq!(parse_array("[1, 2, 3]"), vec![num(1.0), num(2.0), num(3.0)]);
        assert!(parse_array("[  ]").is_empty());
    }

    #[test]
    fn test_nested_array() {
        let v = parse_array("[[1,2],[3,4]]");
        assert_eq!(
            v,
            vec![
                Value::from(vec![num(1.0), num(2.0)]),
                Value::from(vec![num(3.0), num(4.0)]),
            ]
        );
    }

    #[test]
    fn test_flat_array_barewords() {
        assert_eq!(
            parse_array("[a, 'b', true]"),
            vec![Value::from("a"), Value::from("b"), Value::Bool(true)]
        );
    }

    #[test]
    fn test_flat_array_splits_commas_in_strings() {
        assert_eq!(
            parse_array("['a,b']"),
            vec![Value::from("'a"), Value::from("b'")]
        );
    }

    #[test]
    fn test_flat_array_keeps_trailing_empty_piece() {
        assert_eq!(
            parse_array("[1,2,]"),
            vec![num(1.0), num(2.0), Value::from("")]
        );
    }

    #[test]
    fn test_nested_array_drops_trailing_empty_segment() {
        assert_eq!(
            parse_array("[[1],]"),
            vec![Value::from(vec![num(1.0)])]
        );
    }

    #[test]
    fn test_simple_object() {
        let obj = parse_object("{ a: 1, b: 'hello', c: true }");
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["a"], num(1.0));
        assert_eq!(obj["b"], Value::from("hello"));
        assert_eq!(obj["c"], Value::Bool(true));
    }

    #[test]
    fn test_nested_object() {
        let obj = parse_object("{ a: { b: 1 }, c: [2,3], d: true }");
        assert_eq!(obj["a"].as_object().unwrap()["b"], num(1.0));
        assert_eq!(obj["c"], Value::from(vec![num(2.0), num(3.0)]));
        assert_eq!(obj["d"], Value::Bool(true));
    }

    #[test]
    fn test_empty_object() {
        assert!(parse_object("{}").is_empty());
        assert!(parse_object("{   }").is_empty());
    }

    #[test]
    fn test_repair_doubled_and_trailing_commas() {
        let obj = parse_object("{a: 1,, b: 2,}");
        assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_repair_output() {
        assert_eq!(
            repair_object_content("a: 'x', b:[1,,2,]"),
            "\"a\": \"x\",\"b\":[1,2]"
        );
    }

    #[test]
    fn test_fallback_keeps_bareword_values() {
        let obj = parse_object("{ name: alice, 'age': 30 }");
        assert_eq!(obj["name"], Value::from("alice"));
        assert_eq!(obj["age"], num(30.0));
    }

    #[test]
    fn test_fallback_skips_pairs_without_colon() {
        let obj = parse_object("{ a: x, oops, b: 2 }");
        assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_dispatch_routes_by_bracket() {
        assert_eq!(
            parse_complex_value(" [x, y] "),
            Value::from(vec![Value::from("x"), Value::from("y")])
        );
        assert_eq!(parse_complex_value("{k: v}").as_object().unwrap()["k"], Value::from("v"));
        assert_eq!(parse_complex_value("plain"), Value::from("plain"));
    }

    #[test]
    fn test_dispatch_prefers_strict_grammar() {
        assert_eq!(
            parse_complex_value(r#"["a,b", "c\"d"]"#),
            Value::from(vec![Value::from("a,b"), Value::from("c\"d")])
        );
    }
}

//! Primitive Parser
//!
//! Classifies a single scalar token: keyword, number, quoted string, or
//! bareword. Numbers follow JavaScript's `Number(string)` coercion so that a
//! testcase written as `+5`, `.5`, `1e3`, `0x1F` or `Infinity` means what the
//! graded submission would see.

use crate::value::Value;

/// Parse a scalar token. Never fails: anything unrecognised is returned as a
/// bareword string.
pub fn parse_value(s: &str) -> Value {
    if let Some(v) = parse_keyword(s) {
        return v;
    }

    if !s.is_empty() {
        if let Some(n) = coerce_number(s) {
            return Value::Number(n);
        }
    }

    if let Some(inner) = unwrap_quotes(s) {
        return Value::String(inner.to_string());
    }

    Value::String(s.to_string())
}

/// Check if s is a literal keyword and return its value.
pub(crate) fn parse_keyword(s: &str) -> Option<Value> {
    match s {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        "null" => Some(Value::Null),
        "undefined" => Some(Value::Undefined),
        _ => None,
    }
}

/// Strip one pair of matching `'` or `"` quotes. No escape processing.
pub(crate) fn unwrap_quotes(s: &str) -> Option<&str> {
    if s.len() < 2 {
        return None;
    }
    let bytes = s.as_bytes();
    let first = bytes[0];
    if (first == b'"' || first == b'\'') && bytes[s.len() - 1] == first {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

// ============================================================================
// Number Coercion
// ============================================================================

/// JavaScript `Number(s)`; `None` where JavaScript yields `NaN`.
///
/// Surrounding whitespace is ignored and a blank string is `0`.
pub fn coerce_number(s: &str) -> Option<f64> {
    let t = s.trim_matches(is_js_whitespace);
    if t.is_empty() {
        return Some(0.0);
    }

    if let Some(n) = parse_radix_literal(t) {
        return Some(n);
    }

    let (sign, unsigned) = match t.as_bytes()[0] {
        b'-' => (-1.0, &t[1..]),
        b'+' => (1.0, &t[1..]),
        _ => (1.0, t),
    };

    if unsigned == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    if !is_decimal_pattern(unsigned) {
        return None;
    }
    unsigned.parse::<f64>().ok().map(|n| sign * n)
}

/// JavaScript's WhiteSpace and LineTerminator code points, which `Number()`
/// strips. Unlike Unicode White_Space this excludes U+0085 and includes the
/// byte order mark.
fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// `0x`, `0o` and `0b` integer literals. JavaScript does not allow a sign here.
fn parse_radix_literal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    let mut n = 0.0f64;
    for c in s[2..].chars() {
        let digit = c.to_digit(radix)?;
        n = n * f64::from(radix) + f64::from(digit);
    }
    Some(n)
}

/// Check if string matches `\d+(\.\d*)?([eE][+-]?\d+)?` or `\.\d+([eE][+-]?\d+)?`.
fn is_decimal_pattern(s: &str) -> bool {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };

    if let Some(exp) = exponent {
        let exp = exp
            .strip_prefix('+')
            .or_else(|| exp.strip_prefix('-'))
            .unwrap_or(exp);
        if exp.is_empty() || !exp.bytes().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }

    let (before, after) = match mantissa.split_once('.') {
        Some((b, a)) => (b, Some(a)),
        None => (mantissa, None),
    };
    let digits = |part: &str| part.bytes().all(|c| c.is_ascii_digit());

    match after {
        None => !before.is_empty() && digits(before),
        Some(after) => {
            (!before.is_empty() || !after.is_empty()) && digits(before) && digits(after)
        }
    }
}

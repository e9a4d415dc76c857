//! Argument List Parser
//!
//! Turns a testcase input such as `nums = [2,7,11,15], target = 9` into the
//! ordered argument list `[[2, 7, 11, 15], 9]`.
//!
//! A single left-to-right scan tracks bracket depth and quoted strings. A
//! comma ends an argument only when it is outside every bracket and string
//! and the text after it starts with `identifier =`. Labels are kept for
//! diagnostics but play no part in argument order.

use crate::lenient::parse_complex_value;
use crate::value::Value;

/// One parsed argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// The `name` in `name = value`, when present.
    pub name: Option<String>,
    pub value: Value,
}

/// Parse a testcase input into argument values, in order. Never fails.
pub fn parse_input_string(raw: &str) -> Vec<Value> {
    parse_arguments(raw).into_iter().map(|a| a.value).collect()
}

/// Parse a testcase input into labelled arguments, in order. Never fails.
pub fn parse_arguments(raw: &str) -> Vec<Argument> {
    split_arguments(raw)
        .into_iter()
        .map(|segment| {
            let (name, text) = split_label(segment.text);
            Argument {
                name: name.map(String::from),
                value: parse_complex_value(text),
            }
        })
        .collect()
}

/// A raw `name = value` segment and its byte offset in the trimmed input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment<'a> {
    pub offset: usize,
    pub text: &'a str,
}

/// Split the trimmed input into argument segments.
///
/// A quote that is never closed is read as an ordinary character, so it
/// cannot hide the argument boundaries after it.
pub(crate) fn split_arguments(raw: &str) -> Vec<Segment<'_>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let mut unclosed = Vec::new();
    loop {
        match scan_segments(raw, &unclosed) {
            Ok(segments) => return segments,
            Err(open) => unclosed.push(open),
        }
    }
}

/// One scan over `raw`, treating quotes at the byte offsets in `literal` as
/// plain text. Fails with the offset of a quote still open at the end.
fn scan_segments<'a>(raw: &'a str, literal: &[usize]) -> Result<Vec<Segment<'a>>, usize> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut depth: usize = 0;
    let mut quote: Option<(char, usize)> = None;
    let mut escape = false;
    let mut prev: Option<char> = None;

    for (i, c) in raw.char_indices() {
        if let Some((q, _)) = quote {
            if escape {
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else if c == q {
                quote = None;
            }
            prev = Some(c);
            continue;
        }

        match c {
            '"' | '\'' if opens_string(prev) && !literal.contains(&i) => quote = Some((c, i)),
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 && split_label(&raw[i + 1..]).0.is_some() => {
                segments.push(Segment {
                    offset: start,
                    text: &raw[start..i],
                });
                start = i + 1;
            }
            _ => {}
        }
        prev = Some(c);
    }

    if let Some((_, open)) = quote {
        return Err(open);
    }
    segments.push(Segment {
        offset: start,
        text: &raw[start..],
    });
    Ok(segments)
}

/// A quote starts a string only at the beginning of a value, so apostrophes
/// inside barewords such as `don't` stay literal.
fn opens_string(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(p) => p.is_whitespace() || matches!(p, '[' | '{' | ',' | ':' | '='),
    }
}

/// Split a leading `identifier =` label from a segment. Returns the label and
/// the trimmed value text; without a label the whole trimmed segment is the
/// value text.
pub(crate) fn split_label(segment: &str) -> (Option<&str>, &str) {
    let s = segment.trim_start();
    let ident_len = identifier_len(s);
    if ident_len == 0 {
        return (None, segment.trim());
    }

    let rest = s[ident_len..].trim_start();
    match rest.strip_prefix('=') {
        Some(value) if !value.starts_with('=') => (Some(&s[..ident_len]), value.trim()),
        _ => (None, segment.trim()),
    }
}

/// Byte length of a leading JavaScript identifier (`[A-Za-z_$][A-Za-z0-9_$]*`).
fn identifier_len(s: &str) -> usize {
    let mut len = 0;
    for (i, c) in s.char_indices() {
        let ok = if i == 0 {
            c.is_ascii_alphabetic() || c == '_' || c == '$'
        } else {
            c.is_ascii_alphanumeric() || c == '_' || c == '$'
        };
        if !ok {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

//! Bracket-Aware Splitter
//!
//! Splits on commas that sit outside every `[...]` and `{...}`. Bracket and
//! brace depth are tracked by two independent counters and are not checked
//! for balance, so interleaved input such as `[{]}` splits wherever both
//! counters happen to be zero.

/// Split `s` on top-level commas.
///
/// Segments are returned untrimmed. A trailing empty segment is dropped.
pub fn split_top_level(s: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut bracket_depth: i32 = 0;
    let mut brace_depth: i32 = 0;

    for c in s.chars() {
        match c {
            '[' => bracket_depth += 1,
            ']' => bracket_depth -= 1,
            '{' => brace_depth += 1,
            '}' => brace_depth -= 1,
            ',' if bracket_depth == 0 && brace_depth == 0 => {
                segments.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat() {
        assert_eq!(split_top_level("1, 2,3"), vec!["1", " 2", "3"]);
    }

    #[test]
    fn test_nested_commas_kept() {
        assert_eq!(
            split_top_level("[1,2],{a:1,b:2},3"),
            vec!["[1,2]", "{a:1,b:2}", "3"]
        );
    }

    #[test]
    fn test_trailing_empty_dropped() {
        assert_eq!(split_top_level("1,2,"), vec!["1", "2"]);
        assert!(split_top_level("").is_empty());
    }

    #[test]
    fn test_inner_empty_kept() {
        assert_eq!(split_top_level("1,,2"), vec!["1", "", "2"]);
    }

    #[test]
    fn test_interleaved_brackets_not_validated() {
        // Counters are independent: both return to zero after "[{]}".
        assert_eq!(split_top_level("[{]},1"), vec!["[{]}", "1"]);
    }
}

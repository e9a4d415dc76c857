//! Error types for literal parsing and submission execution.

use std::time::Duration;
use thiserror::Error;

/// Result type for strict literal parsing.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying a source label for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub source: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(source: Option<&str>) -> Self {
        Self {
            source: source.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self, col: usize) -> String {
        match &self.source {
            Some(name) => format!(" at column {} of <{}>", col + 1, name),
            None => format!(" at column {}", col + 1),
        }
    }
}

/// Error type for the strict literal grammar.
///
/// The trailing `String` of each variant is a location suffix filled in by
/// [`ParseError::with_location`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Input ended where a value was expected.
    #[error("Unexpected end of input{0}")]
    UnexpectedEnd(String),

    /// Unexpected character.
    #[error("Unexpected character \"{0}\"{1}")]
    UnexpectedChar(char, String),

    /// Unterminated string.
    #[error("Unterminated string{0}")]
    UnterminatedString(String),

    /// Bad escaped character.
    #[error("Bad escaped character{0}")]
    BadEscapedChar(String),

    /// Bad Unicode escape.
    #[error("Bad Unicode escape{0}")]
    BadUnicodeEscape(String),

    /// Unmatched bracket.
    #[error("Unmatched bracket{0}")]
    UnmatchedBracket(String),

    /// Unmatched brace.
    #[error("Unmatched brace{0}")]
    UnmatchedBrace(String),

    /// Expected colon after key.
    #[error("Expected colon after key{0}")]
    ExpectedColon(String),

    /// Invalid key.
    #[error("Invalid key{0}")]
    InvalidKey(String),

    /// A bareword that is neither a keyword nor a number.
    #[error("Unquoted string \"{0}\"{1}")]
    BareWord(String, String),

    /// Unexpected extra content after value.
    #[error("Unexpected extra content{0}")]
    ExtraContent(String),

    /// An argument segment without a `name =` label.
    #[error("Missing argument name{0}")]
    MissingArgumentName(String),
}

impl ParseError {
    /// Create an error with location information.
    pub fn with_location(self, ctx: &ParseContext, col: usize) -> Self {
        let suffix = ctx.loc_suffix(col);
        match self {
            ParseError::UnexpectedEnd(_) => ParseError::UnexpectedEnd(suffix),
            ParseError::UnexpectedChar(c, _) => ParseError::UnexpectedChar(c, suffix),
            ParseError::UnterminatedString(_) => ParseError::UnterminatedString(suffix),
            ParseError::BadEscapedChar(_) => ParseError::BadEscapedChar(suffix),
            ParseError::BadUnicodeEscape(_) => ParseError::BadUnicodeEscape(suffix),
            ParseError::UnmatchedBracket(_) => ParseError::UnmatchedBracket(suffix),
            ParseError::UnmatchedBrace(_) => ParseError::UnmatchedBrace(suffix),
            ParseError::ExpectedColon(_) => ParseError::ExpectedColon(suffix),
            ParseError::InvalidKey(_) => ParseError::InvalidKey(suffix),
            ParseError::BareWord(w, _) => ParseError::BareWord(w, suffix),
            ParseError::ExtraContent(_) => ParseError::ExtraContent(suffix),
            ParseError::MissingArgumentName(_) => ParseError::MissingArgumentName(suffix),
        }
    }
}

/// Why running a submission against one testcase produced no value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// The submission source failed to compile, or has no entry function.
    #[error("Compile error: {0}")]
    Compile(String),

    /// The entry function threw.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// The wall-clock limit elapsed.
    #[error("Time limit exceeded ({} ms)", .0.as_millis())]
    Timeout(Duration),

    /// The sandboxed process ran out of memory or another hard limit.
    #[error("Resource limit exceeded: {0}")]
    ResourceExhausted(String),

    /// The sandbox itself could not run (missing runtime, I/O failure).
    #[error("Sandbox unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_suffix() {
        let ctx = ParseContext::new(Some("testcase 3 output"));
        let err = ParseError::UnmatchedBracket(String::new()).with_location(&ctx, 4);
        assert_eq!(
            err.to_string(),
            "Unmatched bracket at column 5 of <testcase 3 output>"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = ExecutionError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Time limit exceeded (1500 ms)");
    }
}

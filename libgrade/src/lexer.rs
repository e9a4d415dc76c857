//! Literal Lexer
//!
//! Converts literal text into a flat token stream for the strict grammar:
//! - punctuation: `[` `]` `{` `}` `,` `:`
//! - `Str`: a single- or double-quoted string with escapes resolved
//! - `Word`: any other run of non-delimiter characters (keywords, numbers,
//!   bare object keys)
//!
//! Columns are zero-based character offsets into the source.

use crate::error::{ParseContext, ParseError, Result};

/// Token type in the lexer output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenType {
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    /// Quoted string, escapes already processed.
    Str(String),
    /// Unquoted run of characters.
    Word(String),
}

/// A single token in the token stream.
#[derive(Debug, Clone)]
pub struct Token {
    pub typ: TokenType,
    pub col: usize,
}

impl Token {
    fn new(typ: TokenType, col: usize) -> Self {
        Self { typ, col }
    }

    /// First character of the token as written, for error messages.
    pub fn lead_char(&self) -> char {
        match &self.typ {
            TokenType::LBracket => '[',
            TokenType::RBracket => ']',
            TokenType::LBrace => '{',
            TokenType::RBrace => '}',
            TokenType::Comma => ',',
            TokenType::Colon => ':',
            TokenType::Str(_) => '"',
            TokenType::Word(w) => w.chars().next().unwrap_or(' '),
        }
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '[' | ']' | '{' | '}' | ',' | ':' | '"' | '\'')
}

/// Tokenize literal source text.
pub fn lex(source: &str, ctx: &ParseContext) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let punct = match c {
            '[' => Some(TokenType::LBracket),
            ']' => Some(TokenType::RBracket),
            '{' => Some(TokenType::LBrace),
            '}' => Some(TokenType::RBrace),
            ',' => Some(TokenType::Comma),
            ':' => Some(TokenType::Colon),
            _ => None,
        };

        if let Some(typ) = punct {
            tokens.push(Token::new(typ, i));
            i += 1;
        } else if c.is_whitespace() {
            i += 1;
        } else if c == '"' || c == '\'' {
            let (s, end) = lex_string(&chars, i, ctx)?;
            tokens.push(Token::new(TokenType::Str(s), i));
            i = end;
        } else {
            let start = i;
            while i < chars.len() && !is_delimiter(chars[i]) {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            tokens.push(Token::new(TokenType::Word(word), start));
        }
    }

    Ok(tokens)
}

/// Lex a quoted string starting at `start`. Returns the content and the
/// index just past the closing quote.
fn lex_string(chars: &[char], start: usize, ctx: &ParseContext) -> Result<(String, usize)> {
    let quote = chars[start];
    let mut out = String::new();
    let mut i = start + 1;

    while i < chars.len() {
        let ch = chars[i];
        if ch == quote {
            return Ok((out, i + 1));
        }
        if ch == '\\' {
            let (escaped, advance) = lex_escape_sequence(chars, i, ctx)?;
            out.push(escaped);
            i += advance + 1;
            continue;
        }
        if ch == '\n' {
            break;
        }
        out.push(ch);
        i += 1;
    }

    Err(ParseError::UnterminatedString(String::new()).with_location(ctx, start))
}

/// Resolve a backslash escape at `i`. Returns the character and the number
/// of characters consumed after the backslash.
fn lex_escape_sequence(chars: &[char], i: usize, ctx: &ParseContext) -> Result<(char, usize)> {
    let Some(&esc) = chars.get(i + 1) else {
        return Err(ParseError::UnterminatedString(String::new()).with_location(ctx, i));
    };
    let simple = match esc {
        '"' => '"',
        '\'' => '\'',
        '\\' => '\\',
        '/' => '/',
        'b' => '\x08',
        'f' => '\x0C',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0B',
        '0' => '\0',
        'u' => return lex_unicode_escape(chars, i, ctx),
        _ => {
            return Err(ParseError::BadEscapedChar(String::new()).with_location(ctx, i + 1));
        }
    };
    Ok((simple, 1))
}

/// Parse a `\uXXXX` escape, combining a UTF-16 surrogate pair when a high
/// surrogate is immediately followed by `\uXXXX` low surrogate.
fn lex_unicode_escape(chars: &[char], i: usize, ctx: &ParseContext) -> Result<(char, usize)> {
    let bad = || ParseError::BadUnicodeEscape(String::new()).with_location(ctx, i + 1);

    let high = read_hex4(chars, i + 2).ok_or_else(bad)?;
    if !(0xD800..=0xDBFF).contains(&high) {
        return char::from_u32(high).map(|c| (c, 5)).ok_or_else(bad);
    }

    // High surrogate: require "\uXXXX" low surrogate next.
    if chars.get(i + 6) != Some(&'\\') || chars.get(i + 7) != Some(&'u') {
        return Err(bad());
    }
    let low = read_hex4(chars, i + 8).ok_or_else(bad)?;
    if !(0xDC00..=0xDFFF).contains(&low) {
        return Err(bad());
    }
    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
    char::from_u32(code).map(|c| (c, 11)).ok_or_else(bad)
}

fn read_hex4(chars: &[char], start: usize) -> Option<u32> {
    let digits = chars.get(start..start + 4)?;
    digits
        .iter()
        .try_fold(0u32, |acc, c| c.to_digit(16).map(|d| acc * 16 + d))
}

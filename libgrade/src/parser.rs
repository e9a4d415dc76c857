//! Strict Literal Parser
//!
//! Recursive descent over the lexer's token stream:
//!
//! ```text
//! literal := value EOF
//! value   := array | object | Str | Word
//! array   := '[' ( value ( ',' value )* ','? )? ']'
//! object  := '{' ( member ( ',' member )* ','? )? '}'
//! member  := ( Str | Word ) ':' value
//! ```
//!
//! A `Word` in value position must be a keyword or coerce to a number;
//! anything else is rejected so that callers can fall back to the lenient
//! parsers.

use crate::error::{ParseContext, ParseError, Result};
use crate::lexer::{lex, Token, TokenType};
use crate::primitive::{coerce_number, parse_keyword};
use crate::value::{Map, Value};

/// Parse literal text with the strict grammar.
pub fn parse_literal(source: &str) -> Result<Value> {
    parse_literal_with_context(source, &ParseContext::default())
}

/// Parse literal text with a source label for error messages.
pub fn parse_literal_with_context(source: &str, ctx: &ParseContext) -> Result<Value> {
    let tokens = lex(source, ctx)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end_col: source.chars().count(),
        ctx,
    };
    let value = parser.parse_value()?;
    parser.ensure_at_end()?;
    Ok(value)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end_col: usize,
    ctx: &'a ParseContext,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let t = self.tokens.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn unexpected(&self, t: &Token) -> ParseError {
        ParseError::UnexpectedChar(t.lead_char(), String::new()).with_location(self.ctx, t.col)
    }

    fn ensure_at_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(t) => Err(ParseError::ExtraContent(String::new()).with_location(self.ctx, t.col)),
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        let Some(t) = self.next() else {
            return Err(
                ParseError::UnexpectedEnd(String::new()).with_location(self.ctx, self.end_col)
            );
        };
        match &t.typ {
            TokenType::LBracket => self.parse_array(t.col),
            TokenType::LBrace => self.parse_object(t.col),
            TokenType::Str(s) => Ok(Value::String(s.clone())),
            TokenType::Word(w) => self.parse_word(w, t.col),
            _ => Err(self.unexpected(t)),
        }
    }

    fn parse_word(&self, w: &str, col: usize) -> Result<Value> {
        if let Some(v) = parse_keyword(w) {
            return Ok(v);
        }
        if let Some(n) = coerce_number(w) {
            return Ok(Value::Number(n));
        }
        Err(ParseError::BareWord(w.to_string(), String::new()).with_location(self.ctx, col))
    }

    /// Parse array items after the opening `[` at `open_col`.
    fn parse_array(&mut self, open_col: usize) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            match self.peek().map(|t| &t.typ) {
                None => {
                    return Err(ParseError::UnmatchedBracket(String::new())
                        .with_location(self.ctx, open_col));
                }
                Some(TokenType::RBracket) => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                _ => {}
            }

            items.push(self.parse_value()?);

            match self.next() {
                None => {
                    return Err(ParseError::UnmatchedBracket(String::new())
                        .with_location(self.ctx, open_col));
                }
                Some(t) => match t.typ {
                    TokenType::Comma => {}
                    TokenType::RBracket => return Ok(Value::Array(items)),
                    _ => return Err(self.unexpected(t)),
                },
            }
        }
    }

    /// Parse object members after the opening `{` at `open_col`.
    fn parse_object(&mut self, open_col: usize) -> Result<Value> {
        let mut map = Map::new();
        loop {
            let Some(t) = self.next() else {
                return Err(
                    ParseError::UnmatchedBrace(String::new()).with_location(self.ctx, open_col)
                );
            };
            let key = match &t.typ {
                TokenType::RBrace => return Ok(Value::Object(map)),
                TokenType::Str(s) => s.clone(),
                TokenType::Word(w) => w.clone(),
                _ => {
                    return Err(ParseError::InvalidKey(String::new()).with_location(self.ctx, t.col))
                }
            };

            match self.next() {
                Some(c) if c.typ == TokenType::Colon => {}
                Some(c) => {
                    return Err(
                        ParseError::ExpectedColon(String::new()).with_location(self.ctx, c.col)
                    );
                }
                None => {
                    return Err(ParseError::ExpectedColon(String::new())
                        .with_location(self.ctx, self.end_col));
                }
            }

            let value = self.parse_value()?;
            map.insert(key, value);

            match self.next() {
                None => {
                    return Err(
                        ParseError::UnmatchedBrace(String::new()).with_location(self.ctx, open_col)
                    );
                }
                Some(t) => match t.typ {
                    TokenType::Comma => {}
                    TokenType::RBrace => return Ok(Value::Object(map)),
                    _ => return Err(self.unexpected(t)),
                },
            }
        }
    }
}

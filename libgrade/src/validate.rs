//! Suite Validator
//!
//! An authoring-time check that a testcase is written in the strict literal
//! grammar: every input segment is `name = value`, and every value and the
//! expected output parse without falling back to the lenient parsers.
//! Grading never calls this; it stays tolerant of whatever was authored.

use crate::args::{split_arguments, split_label};
use crate::error::{ParseContext, ParseError, Result};
use crate::parser::parse_literal_with_context;
use crate::types::Testcase;

/// Check that a testcase parses under the strict grammar.
pub fn validate_testcase(testcase: &Testcase) -> Result<()> {
    validate_input(&testcase.input)?;
    let ctx = ParseContext::new(Some("expected output"));
    parse_literal_with_context(&testcase.output, &ctx)?;
    Ok(())
}

fn validate_input(input: &str) -> Result<()> {
    let input_ctx = ParseContext::new(Some("input"));
    let lead = input.len() - input.trim_start().len();

    for segment in split_arguments(input) {
        let (name, text) = split_label(segment.text);
        let Some(name) = name else {
            let skipped = segment.text.len() - segment.text.trim_start().len();
            let start = lead + segment.offset + skipped;
            let col = input[..start].chars().count();
            return Err(ParseError::MissingArgumentName(String::new()).with_location(&input_ctx, col));
        };
        let ctx = ParseContext::new(Some(&format!("argument {}", name)));
        parse_literal_with_context(text, &ctx)?;
    }
    Ok(())
}

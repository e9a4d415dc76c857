//! Testcase literal parser and grading engine.
//!
//! Testcases are authored as loose, JavaScript-like strings: an input such as
//! `nums = [2,7,11,15], target = 9` and an expected output such as `[0,1]`.
//! This crate turns those strings into [`Value`]s, runs a submitted
//! JavaScript function against them in a [`Sandbox`], and compares results.
//!
//! # Parsing Pipeline
//!
//! 1. **Argument Splitter**: Splits an input into `name = value` segments with
//!    a single bracket- and quote-aware scan.
//!
//! 2. **Strict Grammar**: A lexer and recursive descent parser for numbers,
//!    quoted strings, keywords, arrays and objects. Errors carry a column.
//!
//! 3. **Lenient Fallback**: When the strict grammar rejects a literal, the
//!    value is routed by its outer bracket to tolerant array, object and
//!    primitive parsers that never fail.
//!
//! # Grading
//!
//! [`Grader`] runs every testcase through the sandbox, compares the returned
//! value with the expected one using [`deep_equal`], and aggregates an
//! [`AssessmentSummary`].

mod args;
mod compare;
mod config;
mod engine;
mod error;
mod lenient;
mod lexer;
mod parser;
mod primitive;
mod render;
pub mod sandbox;
mod split;
mod types;
mod validate;
mod value;
pub mod wire;

pub use args::{parse_arguments, parse_input_string, Argument};
pub use compare::deep_equal;
pub use config::{ConfigError, GraderConfig, Isolation};
pub use engine::{grade, Grader};
pub use error::{ExecutionError, ParseContext, ParseError, Result};
pub use lenient::{parse_array, parse_complex_value, parse_object};
pub use parser::{parse_literal, parse_literal_with_context};
pub use primitive::{coerce_number, parse_value};
pub use render::{format_number, render, stringify};
pub use sandbox::{NodeSandbox, Sandbox};
pub use split::split_top_level;
pub use types::{AssessmentSummary, GradingResult, Submission, Testcase};
pub use validate::validate_testcase;
pub use value::{Map, Value};

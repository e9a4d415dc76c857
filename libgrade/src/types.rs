//! Testcases, submissions and grading reports.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::debug;

/// One authored testcase.
///
/// `input` is an argument list such as `nums = [2,7,11,15], target = 9`;
/// `output` is a single literal such as `[0,1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testcase {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub hidden: bool,
}

impl Testcase {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// The outcome of one testcase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    pub input: String,
    pub expected_output: String,
    /// `JSON.stringify` of the returned value, absent when execution failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub passed: bool,
    pub hidden: bool,
}

/// Aggregate outcome of a submission over a testcase list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub success: bool,
    pub total_testcases: usize,
    pub passed_testcases: usize,
    pub results: Vec<GradingResult>,
}

impl AssessmentSummary {
    /// Aggregate per-testcase results. An empty list counts as success.
    pub fn from_results(results: Vec<GradingResult>) -> Self {
        let total_testcases = results.len();
        let passed_testcases = results.iter().filter(|r| r.passed).count();
        Self {
            success: passed_testcases == total_testcases,
            total_testcases,
            passed_testcases,
            results,
        }
    }

    /// A copy safe to show to the submitter: hidden results keep only their
    /// `passed` and `hidden` flags.
    pub fn redacted(&self) -> Self {
        let results = self
            .results
            .iter()
            .map(|r| {
                if r.hidden {
                    GradingResult {
                        input: String::new(),
                        expected_output: String::new(),
                        actual_output: None,
                        error: None,
                        passed: r.passed,
                        hidden: true,
                    }
                } else {
                    r.clone()
                }
            })
            .collect();
        Self {
            results,
            ..self.clone()
        }
    }
}

// =============================================================================
// Submissions
// =============================================================================

static FUNCTION_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:export[ \t]+)?(?:async[ \t]+)?function[ \t]*\*?[ \t]*([A-Za-z_$][A-Za-z0-9_$]*)[ \t]*\(([^)]*)\)")
        .expect("valid function declaration pattern")
});

static BINDING_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^(?:export[ \t]+)?(?:const|let|var)[ \t]+([A-Za-z_$][A-Za-z0-9_$]*)[ \t]*=[ \t]*(?:async[ \t]+)?(?:function\b[^(]*\(([^)]*)\)|\(([^)]*)\)[ \t]*=>|([A-Za-z_$][A-Za-z0-9_$]*)[ \t]*=>)",
    )
    .expect("valid binding declaration pattern")
});

static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z_$][A-Za-z0-9_$]*)[ \t]*\(").expect("valid call pattern")
});

/// JavaScript source submitted for grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub source: String,
    /// Name of the function to call. Detected from the source when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

impl Submission {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            entry_point: None,
        }
    }

    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = Some(name.into());
        self
    }

    /// The function to call with `arity` arguments.
    ///
    /// The configured entry point wins. Otherwise candidates are the
    /// functions declared at the start of an unindented line. Candidates
    /// called from another candidate are helpers and are set aside; of the
    /// rest, those whose parameters fit `arity` are preferred, and the last
    /// one declared is chosen.
    pub fn resolve_entry_point(&self, arity: usize) -> Option<String> {
        if let Some(name) = &self.entry_point {
            return Some(name.clone());
        }

        let declarations = declarations(&self.source);
        let uncalled: Vec<&Declaration> = declarations
            .iter()
            .enumerate()
            .filter(|(i, d)| !called_by_others(&self.source, &declarations, *i, d.name))
            .map(|(_, d)| d)
            .collect();
        let pool = if uncalled.is_empty() {
            declarations.iter().collect()
        } else {
            uncalled
        };
        let fitting: Vec<&Declaration> = pool.iter().copied().filter(|d| d.accepts(arity)).collect();
        let pool = if fitting.is_empty() { pool } else { fitting };

        if pool.len() > 1 {
            let names: Vec<&str> = pool.iter().map(|d| d.name).collect();
            debug!(?names, arity, "several entry candidates, taking the last");
        }
        pool.last().map(|d| d.name.to_string())
    }
}

/// A top-level function declaration or function-valued binding.
#[derive(Debug)]
struct Declaration<'a> {
    name: &'a str,
    start: usize,
    required: usize,
    total: usize,
    variadic: bool,
}

impl Declaration<'_> {
    fn accepts(&self, arity: usize) -> bool {
        arity >= self.required && (self.variadic || arity <= self.total)
    }
}

/// Declarations in source order; a name declared twice keeps its last one.
fn declarations(source: &str) -> Vec<Declaration<'_>> {
    let mut found: Vec<Declaration> = Vec::new();
    for caps in FUNCTION_DECL
        .captures_iter(source)
        .chain(BINDING_DECL.captures_iter(source))
    {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let params = match (caps.get(2), caps.get(3), caps.get(4)) {
            (Some(p), _, _) | (None, Some(p), _) => p.as_str(),
            (None, None, Some(single)) => single.as_str(),
            (None, None, None) => "",
        };
        let (required, total, variadic) = count_params(params);
        found.push(Declaration {
            name: name.as_str(),
            start: whole.start(),
            required,
            total,
            variadic,
        });
    }
    found.sort_by_key(|d| d.start);

    let mut unique: Vec<Declaration> = Vec::new();
    for d in found {
        unique.retain(|u| u.name != d.name);
        unique.push(d);
    }
    unique
}

/// Required and total parameter counts, and whether a rest parameter ends
/// the list.
fn count_params(params: &str) -> (usize, usize, bool) {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in params.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(params[start..].trim());
    pieces.retain(|p| !p.is_empty());

    let variadic = pieces.last().is_some_and(|p| p.starts_with("..."));
    let total = pieces.len() - usize::from(variadic);
    let required = pieces
        .iter()
        .take(total)
        .position(|p| p.contains('='))
        .unwrap_or(total);
    (required, total, variadic)
}

/// Whether `name` is called outside the source span of declaration `index`,
/// which runs up to the next declaration.
fn called_by_others(source: &str, declarations: &[Declaration], index: usize, name: &str) -> bool {
    let own_start = declarations[index].start;
    let own_end = declarations
        .get(index + 1)
        .map_or(source.len(), |next| next.start);
    CALL.captures_iter(source).any(|caps| {
        caps.get(1).is_some_and(|m| {
            m.as_str() == name && (m.start() < own_start || m.start() >= own_end)
        })
    })
}

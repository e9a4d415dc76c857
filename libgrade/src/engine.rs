//! Grading Engine
//!
//! For each testcase: parse the input into arguments, run the submission in
//! a [`Sandbox`], parse the expected output, and compare. Testcases are
//! independent; an execution failure is recorded on its own result and never
//! affects the others.

use crate::args::parse_input_string;
use crate::compare::deep_equal;
use crate::config::GraderConfig;
use crate::lenient::parse_complex_value;
use crate::render::stringify;
use crate::sandbox::Sandbox;
use crate::types::{AssessmentSummary, GradingResult, Submission, Testcase};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

/// Grades submissions with a fixed sandbox, timeout and concurrency.
#[derive(Debug, Clone)]
pub struct Grader<S> {
    sandbox: S,
    timeout: Duration,
    max_concurrency: usize,
}

impl<S: Sandbox> Grader<S> {
    pub fn new(sandbox: S) -> Self {
        Self::from_config(sandbox, &GraderConfig::default())
    }

    pub fn from_config(sandbox: S, config: &GraderConfig) -> Self {
        Self {
            sandbox,
            timeout: config.timeout(),
            max_concurrency: config.max_concurrency,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn sandbox(&self) -> &S {
        &self.sandbox
    }

    /// Grade `submission` against every testcase. Results keep testcase
    /// order; up to `max_concurrency` testcases run at once.
    pub async fn grade(&self, submission: &Submission, testcases: &[Testcase]) -> AssessmentSummary {
        run_all(
            &self.sandbox,
            submission,
            testcases,
            self.timeout,
            self.max_concurrency,
        )
        .await
    }

    /// Grade a single testcase.
    pub async fn grade_testcase(&self, submission: &Submission, testcase: &Testcase) -> GradingResult {
        grade_one(&self.sandbox, submission, testcase, self.timeout).await
    }
}

/// Grade with the default timeout and concurrency.
pub async fn grade<S: Sandbox + ?Sized>(
    sandbox: &S,
    submission: &Submission,
    testcases: &[Testcase],
) -> AssessmentSummary {
    let config = GraderConfig::default();
    run_all(
        sandbox,
        submission,
        testcases,
        config.timeout(),
        config.max_concurrency,
    )
    .await
}

async fn run_all<S: Sandbox + ?Sized>(
    sandbox: &S,
    submission: &Submission,
    testcases: &[Testcase],
    timeout: Duration,
    max_concurrency: usize,
) -> AssessmentSummary {
    let results: Vec<GradingResult> = stream::iter(testcases.iter().enumerate())
        .map(|(index, testcase)| {
            let span = info_span!("testcase", index, hidden = testcase.hidden);
            grade_one(sandbox, submission, testcase, timeout).instrument(span)
        })
        .buffered(max_concurrency.max(1))
        .collect()
        .await;

    let summary = AssessmentSummary::from_results(results);
    info!(
        passed = summary.passed_testcases,
        total = summary.total_testcases,
        success = summary.success,
        "graded submission"
    );
    summary
}

async fn grade_one<S: Sandbox + ?Sized>(
    sandbox: &S,
    submission: &Submission,
    testcase: &Testcase,
    timeout: Duration,
) -> GradingResult {
    let args = parse_input_string(&testcase.input);
    debug!(args = args.len(), "parsed input");

    let outcome = sandbox.run(submission, &args, timeout).await;
    let expected = parse_complex_value(&testcase.output);

    let (actual_output, error, passed) = match outcome {
        Ok(actual) => {
            let passed = deep_equal(&actual, &expected);
            debug!(passed, "compared result");
            (Some(stringify(&actual)), None, passed)
        }
        Err(e) => {
            warn!(error = %e, "execution failed");
            (None, Some(e.to_string()), false)
        }
    };

    GradingResult {
        input: testcase.input.clone(),
        expected_output: testcase.output.clone(),
        actual_output,
        error,
        passed,
        hidden: testcase.hidden,
    }
}

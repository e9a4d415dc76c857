//! End-to-end tests that run submissions under a real `node`.
//!
//! Each test returns early when `node` cannot be started or has no
//! permission model.

use std::time::Duration;

use libgrade::{ExecutionError, Grader, NodeSandbox, Sandbox, Submission, Testcase, Value};

const LIMIT: Duration = Duration::from_millis(2000);

async fn node() -> Option<NodeSandbox> {
    let sandbox = NodeSandbox::default();
    if sandbox.is_available().await {
        Some(sandbox)
    } else {
        println!("node not available, skipping");
        None
    }
}

const TWO_SUM: &str = r#"
function twoSum(nums, target) {
  const seen = new Map();
  for (let i = 0; i < nums.length; i++) {
    const need = target - nums[i];
    if (seen.has(need)) return [seen.get(need), i];
    seen.set(nums[i], i);
  }
  return [];
}
"#;

#[tokio::test]
async fn test_two_sum_end_to_end() {
    let Some(sandbox) = node().await else { return };
    let testcases = vec![
        Testcase::new("nums = [2,7,11,15], target = 9", "[0,1]"),
        Testcase::new("nums = [3,2,4], target = 6", "[1,2]"),
        Testcase::new("nums = [3,3], target = 6", "[0,1]").hidden(),
    ];

    let summary = Grader::new(sandbox)
        .grade(&Submission::new(TWO_SUM), &testcases)
        .await;

    assert!(summary.success, "{:?}", summary);
    assert_eq!(summary.results[1].actual_output.as_deref(), Some("[1,2]"));
}

#[tokio::test]
async fn test_special_values_cross_the_boundary() {
    let Some(sandbox) = node().await else { return };
    let submission = Submission::new(
        "const echo = (x) => [x, undefined, NaN, -Infinity, '#tag', '!bang'];",
    );

    let value = sandbox
        .run(&submission, &[Value::from("#in")], LIMIT)
        .await
        .unwrap();

    let items = value.as_array().unwrap();
    assert_eq!(items[0], Value::from("#in"));
    assert!(items[1].is_undefined());
    assert!(items[2].as_f64().unwrap().is_nan());
    assert_eq!(items[3], Value::Number(f64::NEG_INFINITY));
    assert_eq!(items[4], Value::from("#tag"));
    assert_eq!(items[5], Value::from("!bang"));
}

#[tokio::test]
async fn test_arguments_are_arrays_in_the_submission_realm() {
    let Some(sandbox) = node().await else { return };
    let submission = Submission::new("function check(xs) { return xs instanceof Array; }");

    let value = sandbox
        .run(&submission, &[Value::from(vec![Value::from(1)])], LIMIT)
        .await
        .unwrap();

    assert_eq!(value, Value::Bool(true));
}

#[tokio::test]
async fn test_compile_error() {
    let Some(sandbox) = node().await else { return };
    let submission = Submission::new("function broken( {").with_entry_point("broken");

    let err = sandbox.run(&submission, &[], LIMIT).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Compile(_)), "{:?}", err);
}

#[tokio::test]
async fn test_runtime_error() {
    let Some(sandbox) = node().await else { return };
    let submission = Submission::new("function fail() { throw new Error('boom'); }");

    let err = sandbox.run(&submission, &[], LIMIT).await.unwrap_err();
    assert_eq!(err, ExecutionError::Runtime("Error: boom".into()));
}

#[tokio::test]
async fn test_infinite_loop_times_out() {
    let Some(sandbox) = node().await else { return };
    let submission = Submission::new("function spin() { while (true) {} }");
    let limit = Duration::from_millis(300);

    let err = sandbox.run(&submission, &[], limit).await.unwrap_err();
    assert_eq!(err, ExecutionError::Timeout(limit));
}

#[tokio::test]
async fn test_pending_promise_is_killed_after_grace() {
    let Some(sandbox) = node().await else { return };
    let sandbox = sandbox.with_grace(Duration::from_millis(200));
    let submission = Submission::new(
        "function wait() { return new Promise((resolve) => setTimeout(resolve, 60000)); }",
    );
    let limit = Duration::from_millis(200);

    let started = std::time::Instant::now();
    let err = sandbox.run(&submission, &[], limit).await.unwrap_err();
    assert_eq!(err, ExecutionError::Timeout(limit));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_heap_cap() {
    let Some(sandbox) = node().await else { return };
    let sandbox = sandbox.with_max_memory_mb(32);
    let submission = Submission::new(
        "function hog() { const xs = []; for (;;) xs.push(new Array(1e6).fill(Math.random())); }",
    );

    let err = sandbox
        .run(&submission, &[], Duration::from_secs(10))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::ResourceExhausted(_)), "{:?}", err);
}

#[tokio::test]
async fn test_no_host_globals() {
    let Some(sandbox) = node().await else { return };
    let submission =
        Submission::new("function globals() { return [typeof require, typeof process]; }");

    let value = sandbox.run(&submission, &[], LIMIT).await.unwrap();
    assert_eq!(
        value,
        Value::from(vec![Value::from("undefined"), Value::from("undefined")])
    );
}

const READ_HOST: &str = r#"
function readHost() {
  const attempts = [
    () => this.constructor.constructor('return process')().mainModule.require('fs'),
    () => this.constructor.constructor('return process')().getBuiltinModule('fs'),
    () => console.log.constructor('return process')().mainModule.require('fs'),
  ];
  for (const attempt of attempts) {
    try {
      if (attempt().readFileSync('/etc/hostname', 'utf8') !== undefined) return 'escaped';
    } catch (_) {}
  }
  return 'contained';
}
"#;

#[tokio::test]
async fn test_host_realm_escape_cannot_read_files() {
    let Some(sandbox) = node().await else { return };

    let value = sandbox
        .run(&Submission::new(READ_HOST), &[], LIMIT)
        .await
        .unwrap();
    assert_eq!(value, Value::from("contained"));
}

#[tokio::test]
async fn test_eval_still_works_inside_the_submission() {
    let Some(sandbox) = node().await else { return };
    let submission = Submission::new("function calc(expr) { return eval(expr); }");

    let value = sandbox
        .run(&submission, &[Value::from("6 * 7")], LIMIT)
        .await
        .unwrap();
    assert_eq!(value, Value::from(42));
}

const FORGED_RESULT: &str = r#"
function twoSum(nums, target) {
  try {
    const p = this.constructor.constructor('return process')();
    p.stdout.write('{"ok":[0,1]}
');
    p.exit(0);
  } catch (_) {}
  return [];
}
"#;

#[tokio::test]
async fn test_printed_result_cannot_stand_in_for_the_return_value() {
    let Some(sandbox) = node().await else { return };
    let testcases = vec![Testcase::new("nums = [3,2,4], target = 6", "[0,1]")];

    let summary = Grader::new(sandbox)
        .grade(&Submission::new(FORGED_RESULT), &testcases)
        .await;

    assert!(!summary.success);
    assert!(!summary.results[0].passed);
    assert_eq!(summary.results[0].actual_output.as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_helper_declared_before_solver() {
    let Some(sandbox) = node().await else { return };
    let source = format!("function add(a, b) {{ return a + b; }}\n{}", TWO_SUM);
    let testcases = vec![Testcase::new("nums = [2,7,11,15], target = 9", "[0,1]")];

    let summary = Grader::new(sandbox)
        .grade(&Submission::new(source), &testcases)
        .await;

    assert!(summary.success, "{:?}", summary);
}

#[tokio::test]
async fn test_missing_entry_point() {
    let Some(sandbox) = node().await else { return };
    let err = sandbox
        .run(&Submission::new("const answer = 42;"), &[], LIMIT)
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::Compile(_)));
}

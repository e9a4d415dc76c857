//! Tests that invoke the built `grade` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn grade(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grade"))
        .args(args)
        .env_remove("GRADE_LOG")
        .env_remove("GRADE_CONFIG")
        .env_remove("GRADE_ISOLATION")
        .output()
        .expect("failed to run grade")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

/// A `node` with a permission model (20.7 or later).
fn node_available() -> bool {
    let Ok(output) = Command::new("node").arg("--version").output() else {
        return false;
    };
    let version = String::from_utf8_lossy(&output.stdout);
    let mut parts = version.trim().trim_start_matches('v').split('.');
    let major: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    major > 20 || (major == 20 && minor >= 7)
}

#[test]
fn test_parse_literal() {
    let output = grade(&["parse", "[1, 'a', {b: null}]"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "[1, \"a\", { b: null }]\n");
}

#[test]
fn test_parse_arguments() {
    let output = grade(&["parse", "--args", "nums = [2,7], target = 9"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "nums = [2, 7]\ntarget = 9\n");
}

#[test]
fn test_parse_to_wire_json() {
    let output = grade(&["parse", "--to", "json", "[1, undefined, '#x']"]);
    assert_eq!(stdout(&output), "[1,\"#undefined\",\"!#x\"]\n");
}

#[test]
fn test_check_reports_each_testcase() {
    let dir = tempfile::tempdir().unwrap();
    let suite = write(
        dir.path(),
        "suite.json",
        r#"{"testcases": [
            {"input": "nums = [2,7,11,15], target = 9", "output": "[0,1]"},
            {"input": "s = hello", "output": "'olleh'"}
        ]}"#,
    );

    let output = grade(&["check", "--suite", &suite]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "0: ok\n1: Unquoted string \"hello\" at column 1 of <argument s>\n"
    );
}

#[test]
fn test_check_yaml_suite() {
    let dir = tempfile::tempdir().unwrap();
    let suite = write(
        dir.path(),
        "suite.yaml",
        "- input: 'a = 1, b = 2'\n  output: '3'\n- input: 'xs = []'\n  output: '0'\n  hidden: true\n",
    );

    let output = grade(&["check", "--suite", &suite]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "0: ok\n1: ok\n");
}

#[test]
fn test_missing_suite_is_a_usage_error() {
    let output = grade(&["run", "--suite", "no-such-suite.json", "--submission", "x.js"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
}

#[test]
fn test_unknown_isolation_is_a_usage_error() {
    let output = grade(&[
        "run",
        "--suite",
        "suite.json",
        "--submission",
        "x.js",
        "--isolation",
        "none",
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("permission"));
}

#[test]
fn test_run_two_sum() {
    if !node_available() {
        println!("node not available, skipping");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let suite = write(
        dir.path(),
        "suite.toml",
        "[[testcases]]\ninput = \"nums = [2,7,11,15], target = 9\"\noutput = \"[0,1]\"\n\n\
         [[testcases]]\ninput = \"nums = [3,3], target = 6\"\noutput = \"[0,1]\"\nhidden = true\n",
    );
    let submission = write(
        dir.path(),
        "solution.js",
        "function twoSum(nums, target) {\n  for (let i = 0; i < nums.length; i++)\n    for (let j = i + 1; j < nums.length; j++)\n      if (nums[i] + nums[j] === target) return [i, j];\n}\n",
    );

    let output = grade(&["run", "--suite", &suite, "--submission", &submission, "--redact"]);
    assert_eq!(output.status.code(), Some(0));

    let summary: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(summary["success"], true);
    assert_eq!(summary["passedTestcases"], 2);
    assert_eq!(summary["results"][0]["actualOutput"], "[0,1]");
    assert_eq!(summary["results"][1]["input"], "");
    assert_eq!(summary["results"][1]["hidden"], true);
}

//! CLI integration tests

use std::process::{Command, Output};

fn mce(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "mce-cli", "--"])
        .args(args)
        .env_remove("MCE_API_URL")
        .env_remove("MCE_CATALOG")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = mce(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Migration Cost Estimator"), "Should show app name");
    assert!(stdout.contains("estimate"), "Should show estimate command");
    assert!(stdout.contains("compare"), "Should show compare command");
    assert!(stdout.contains("catalog"), "Should show catalog command");
    assert!(stdout.contains("history"), "Should show history command");
    assert!(stdout.contains("sample"), "Should show sample command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = mce(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("mce"), "Should show binary name");
}

/// Test estimate command help
#[test]
fn test_estimate_help() {
    let output = mce(&["estimate", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Estimate help should succeed");
    assert!(stdout.contains("--scenario"), "Should show scenario option");
    assert!(stdout.contains("--state"), "Should show state option");
}

/// Test history command help
#[test]
fn test_history_help() {
    let output = mce(&["history", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "History help should succeed");
    assert!(stdout.contains("--clear"), "Should show clear option");
}

/// Test format and api-url options
#[test]
fn test_global_options() {
    let output = mce(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("MCE_API_URL"), "Should show env var");
    assert!(stdout.contains("--catalog"), "Should show catalog option");
}

/// Sample output feeds straight back into estimate
#[test]
fn test_sample_then_estimate() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("scenario.json");

    let sample = mce(&["sample"]);
    assert!(sample.status.success(), "Sample should succeed");
    std::fs::write(&scenario, &sample.stdout).unwrap();

    let output = mce(&[
        "--format",
        "json",
        "estimate",
        "--scenario",
        scenario.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Estimate should succeed");

    let estimate: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(estimate["total_monthly_cost"].as_f64().unwrap() > 0.0);
    assert!(estimate["target"]["sql_nodes"].as_u64().unwrap() >= 3);
}

/// Test local comparison as JSON
#[test]
fn test_compare_json() {
    let output = mce(&["--format", "json", "compare"]);
    assert!(output.status.success(), "Compare should succeed");

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 5);
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let output = mce(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}

/// Test missing required argument error handling
#[test]
fn test_missing_argument() {
    let output = mce(&["estimate"]);
    assert!(!output.status.success(), "Missing argument should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("required") || stderr.contains("error"),
        "Should show error about missing argument"
    );
}

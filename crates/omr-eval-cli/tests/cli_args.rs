//! CLI argument validation tests.
//!
//! Covers parsing, input checks that happen before any request is sent, and
//! the offline `prompt` command.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use omr_eval_test_support::SyntheticSheetBuilder;
use predicates::prelude::*;

/// Port 9 (discard) on localhost; nothing in these tests should reach it.
const UNUSED_ENDPOINT: &str = "http://127.0.0.1:9";

/// Command isolated from the user's config and credentials.
fn omr_eval(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("omr-eval").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("API_KEY");
    cmd
}

fn write_sheet(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, SyntheticSheetBuilder::png()).unwrap();
    path
}

// === Help and Version ===

#[test]
fn test_help_lists_subcommands() {
    let home = tempfile::tempdir().unwrap();
    omr_eval(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("interactive"))
        .stdout(predicate::str::contains("prompt"))
        .stdout(predicate::str::contains("--sample-key"));
}

#[test]
fn test_version() {
    let home = tempfile::tempdir().unwrap();
    omr_eval(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("omr-eval"));
}

// === Credentials ===

#[test]
fn test_missing_api_key_fails_fast() {
    let home = tempfile::tempdir().unwrap();
    let sheet = write_sheet(home.path(), "sheet.png");

    omr_eval(home.path())
        .arg(&sheet)
        .arg("--sample-key")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "API_KEY environment variable not set",
        ));
}

#[test]
fn test_missing_api_key_fails_before_inputs_are_checked() {
    let home = tempfile::tempdir().unwrap();

    omr_eval(home.path())
        .arg("evaluate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "API_KEY environment variable not set",
        ));
}

// === Missing or Invalid Inputs ===

#[test]
fn test_missing_answer_key_shows_notice() {
    let home = tempfile::tempdir().unwrap();
    let sheet = write_sheet(home.path(), "sheet.png");

    omr_eval(home.path())
        .env("API_KEY", "test-key")
        .args(["--endpoint", UNUSED_ENDPOINT])
        .arg(&sheet)
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Please upload an OMR sheet image and provide an answer key.",
        ));
}

#[test]
fn test_blank_answer_key_shows_notice() {
    let home = tempfile::tempdir().unwrap();
    let sheet = write_sheet(home.path(), "sheet.png");

    omr_eval(home.path())
        .env("API_KEY", "test-key")
        .args(["--endpoint", UNUSED_ENDPOINT, "--key", "   "])
        .arg(&sheet)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please upload an OMR sheet image"));
}

#[test]
fn test_missing_image_shows_notice() {
    let home = tempfile::tempdir().unwrap();

    omr_eval(home.path())
        .env("API_KEY", "test-key")
        .args(["evaluate", "--sample-key", "--endpoint", UNUSED_ENDPOINT])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Please upload an OMR sheet image"));
}

#[test]
fn test_nonexistent_image_rejected() {
    let home = tempfile::tempdir().unwrap();

    omr_eval(home.path())
        .env("API_KEY", "test-key")
        .args(["missing.png", "--sample-key", "--endpoint", UNUSED_ENDPOINT])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Image not found"));
}

#[test]
fn test_unsupported_image_type_rejected() {
    let home = tempfile::tempdir().unwrap();
    let gif = home.path().join("sheet.gif");
    std::fs::write(&gif, b"GIF89a").unwrap();

    omr_eval(home.path())
        .env("API_KEY", "test-key")
        .arg(&gif)
        .args(["--sample-key", "--endpoint", UNUSED_ENDPOINT])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported image type"));
}

#[test]
fn test_malformed_data_url_rejected() {
    let home = tempfile::tempdir().unwrap();

    omr_eval(home.path())
        .env("API_KEY", "test-key")
        .args(["data:image/gif;base64,AAEC", "--sample-key", "--endpoint", UNUSED_ENDPOINT])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid image data URL"));
}

#[test]
fn test_unreadable_key_file_rejected() {
    let home = tempfile::tempdir().unwrap();
    let sheet = write_sheet(home.path(), "sheet.png");

    omr_eval(home.path())
        .env("API_KEY", "test-key")
        .arg(&sheet)
        .args(["--key-file", "nope.txt", "--endpoint", UNUSED_ENDPOINT])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read answer key"));
}

// === Argument Parsing ===

#[test]
fn test_invalid_format_rejected() {
    let home = tempfile::tempdir().unwrap();
    omr_eval(home.path())
        .args(["sheet.png", "--sample-key", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_key_sources_conflict() {
    let home = tempfile::tempdir().unwrap();
    omr_eval(home.path())
        .args(["sheet.png", "--key", "1:A", "--sample-key"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// === Prompt Command ===

#[test]
fn test_prompt_needs_no_credentials() {
    let home = tempfile::tempdir().unwrap();
    omr_eval(home.path())
        .args(["prompt", "--sample-key"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1:A,2:B,3:C,4:D"))
        .stdout(predicate::str::contains("100:D"));
}

#[test]
fn test_prompt_schema() {
    let home = tempfile::tempdir().unwrap();
    let output = omr_eval(home.path())
        .args(["prompt", "--schema"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        schema["required"],
        serde_json::json!(["subjectScores", "totalScore", "studentAnswers"])
    );
}

#[test]
fn test_prompt_without_key_fails() {
    let home = tempfile::tempdir().unwrap();
    omr_eval(home.path())
        .arg("prompt")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No answer key given"));
}

// === Verbosity ===

#[test]
fn test_verbosity_flags_accepted() {
    let home = tempfile::tempdir().unwrap();
    for flag in ["-v", "-vv", "-vvv"] {
        omr_eval(home.path())
            .args([flag, "prompt", "--sample-key"])
            .assert()
            .success();
    }
}

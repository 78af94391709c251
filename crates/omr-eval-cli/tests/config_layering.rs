//! Integration tests for configuration layering.
//!
//! Tests the full priority chain: hardcoded defaults < XDG config < project config < CLI args

#![allow(clippy::unwrap_used)] // Test code uses unwrap for brevity
#![allow(deprecated)] // cargo_bin deprecation warning

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use omr_eval_test_support::{ResultBuilder, SyntheticSheetBuilder};
use predicates::prelude::*;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A workspace with its own home directory and a sheet to evaluate.
struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sheet.png"), SyntheticSheetBuilder::png()).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn sheet(&self) -> PathBuf {
        self.path().join("sheet.png")
    }

    fn write_project_config(&self, content: &str) {
        fs::write(self.path().join(".omr-eval.toml"), content).unwrap();
    }

    fn write_xdg_config(&self, content: &str) {
        let dir = self.path().join(".config").join("omr-eval");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), content).unwrap();
    }

    /// Command running inside the workspace, without an `API_KEY`.
    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("omr-eval").unwrap();
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env_remove("API_KEY");
        cmd
    }
}

async fn mock_model(server: &MockServer, model: &str, api_key: &str) {
    let text = ResultBuilder::uniform(5).build_json();
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{model}:generateContent")))
        .and(header("x-goog-api-key", api_key))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_project_config_applies_format() {
    let server = MockServer::start().await;
    mock_model(&server, "gemini-2.5-flash", "test-key").await;
    let ws = Workspace::new();
    ws.write_project_config("[output]\nformat = 'json'\n");

    let output = ws
        .command()
        .env("API_KEY", "test-key")
        .arg(ws.sheet())
        .args(["--sample-key", "--endpoint", server.uri().as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["totalScore"], 25);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_format_overrides_config() {
    let server = MockServer::start().await;
    mock_model(&server, "gemini-2.5-flash", "test-key").await;
    let ws = Workspace::new();
    ws.write_project_config("[output]\nformat = 'json'\n");

    ws.command()
        .env("API_KEY", "test-key")
        .arg(ws.sheet())
        .args(["--sample-key", "--format", "text"])
        .args(["--endpoint", server.uri().as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Score"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_supplies_endpoint_credential_and_key_file() {
    let server = MockServer::start().await;
    mock_model(&server, "gemini-2.5-flash", "from-config").await;
    let ws = Workspace::new();
    fs::write(ws.path().join("key.txt"), "1:A,2:B\n").unwrap();
    ws.write_project_config(&format!(
        "[model]\nendpoint = '{}'\napi_key = 'from-config'\n\n[evaluation]\nkey_file = 'key.txt'\n",
        server.uri()
    ));

    ws.command()
        .arg(ws.sheet())
        .assert()
        .success()
        .stdout(predicate::str::contains("25/100"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let text = body["contents"][0]["parts"][1]["text"].as_str().unwrap();
    assert!(text.contains("1:A,2:B"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_env_api_key_overrides_config() {
    let server = MockServer::start().await;
    mock_model(&server, "gemini-2.5-flash", "from-env").await;
    let ws = Workspace::new();
    ws.write_project_config("[model]\napi_key = 'from-config'\n");

    ws.command()
        .env("API_KEY", "from-env")
        .arg(ws.sheet())
        .args(["--sample-key", "--endpoint", server.uri().as_str()])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_project_config_overrides_xdg() {
    let server = MockServer::start().await;
    mock_model(&server, "gemini-2.5-pro", "test-key").await;
    let ws = Workspace::new();
    ws.write_xdg_config(&format!(
        "[model]\nname = 'gemini-1.5-flash'\nendpoint = '{}'\n",
        server.uri()
    ));
    ws.write_project_config("[model]\nname = 'gemini-2.5-pro'\n");

    ws.command()
        .env("API_KEY", "test-key")
        .arg(ws.sheet())
        .arg("--sample-key")
        .assert()
        .success();
}

#[test]
fn test_invalid_config_value_warns_and_falls_back() {
    let ws = Workspace::new();
    ws.write_project_config("[output]\nformat = 'xml'\n");

    ws.command()
        .args(["prompt", "--sample-key"])
        .assert()
        .success()
        .stderr(predicate::str::contains("output.format"));
}

#[test]
fn test_malformed_config_is_ignored() {
    let ws = Workspace::new();
    ws.write_project_config("[output\nformat = 'json'\n");

    ws.command()
        .args(["prompt", "--sample-key"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_config_key_file_used_by_prompt() {
    let ws = Workspace::new();
    fs::write(ws.path().join("paper-b.txt"), "1:D,2:D,3:D").unwrap();
    ws.write_project_config("[evaluation]\nkey_file = 'paper-b.txt'\n");

    ws.command()
        .arg("prompt")
        .assert()
        .success()
        .stdout(predicate::str::contains("1:D,2:D,3:D"));
}

//! Integration tests for the `holemon` CLI binary.
//!
//! Argument parsing, help output, shell completions, and exit codes, plus
//! end-to-end runs against a wiremock Pi-hole.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `holemon` binary with env isolation.
///
/// Clears all `HOLEMON_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn holemon_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("holemon");
    cmd.env("HOME", "/tmp/holemon-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/holemon-cli-test-nonexistent")
        .env("HOLEMON_CONFIG", "/tmp/holemon-cli-test-nonexistent/config.toml")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("HOLEMON_HOST")
        .env_remove("HOLEMON_PORT")
        .env_remove("HOLEMON_API_KEY")
        .env_remove("HOLEMON_API_KEY_ENV")
        .env_remove("HOLEMON_TIMEOUT")
        .env_remove("HOLEMON_TRANSPORT")
        .env_remove("HOLEMON_POLL_INTERVAL")
        .env_remove("HOLEMON_HTTPS")
        .env_remove("HOLEMON_INSECURE")
        .env_remove("HOLEMON_CA_CERT")
        .env_remove("HOLEMON_OUTPUT");
    cmd
}

/// `holemon_cmd` aimed at `server` with a valid key.
fn against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = holemon_cmd();
    cmd.args([
        "--host",
        "127.0.0.1",
        "--port",
        &server.address().port().to_string(),
        "--api-key",
        "key",
    ]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// A Pi-hole that accepts the key and serves every view.
async fn pihole() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ok(json!({ "session": { "valid": true, "sid": "XYZ" } })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .respond_with(ok(json!({
            "queries": { "total": 2048, "blocked": 256, "percent_blocked": 12.5 },
            "clients": { "active": 4, "total": 9 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/info/login"))
        .respond_with(ok(json!({ "dns": true })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats/top_clients"))
        .respond_with(ok(json!({
            "clients": [{ "ip": "10.0.0.5", "name": "laptop", "count": 42 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ok(json!({ "history": [{ "blocked": 3 }, { "blocked": 9 }] })))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = holemon_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    holemon_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Pi-hole")
            .and(predicate::str::contains("summary"))
            .and(predicate::str::contains("top-clients"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    holemon_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("holemon"));
}

#[test]
fn test_completions_zsh() {
    holemon_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_transport_is_usage_error() {
    holemon_cmd()
        .args(["--transport", "carrier-pigeon", "summary"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("http1"));
}

#[test]
fn test_zero_interval_is_rejected() {
    holemon_cmd()
        .args(["watch", "--interval", "0"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_host_is_config_error() {
    holemon_cmd()
        .args(["--api-key", "key", "summary"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("host"));
}

#[test]
fn test_missing_api_key_is_config_error() {
    holemon_cmd()
        .args(["--host", "pi.hole", "summary"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No API key"));
}

#[test]
fn test_config_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "host = \"pi.hole\"\nport = 8080\napi_key = \"hunter2\"\n").unwrap();

    let output = holemon_cmd()
        .env("HOLEMON_CONFIG", &file)
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["host"], "pi.hole");
    assert_eq!(shown["port"], 8080);
    assert_eq!(shown["api_key"], "(set)");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("hunter2"));
}

#[test]
fn test_config_path_honours_override() {
    holemon_cmd()
        .env("HOLEMON_CONFIG", "/etc/holemon/custom.toml")
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/holemon/custom.toml"));
}

// ── Server errors ───────────────────────────────────────────────────

#[test]
fn test_connection_refused_exit_code() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    holemon_cmd()
        .args(["--host", "127.0.0.1", "--port", &port.to_string()])
        .args(["--api-key", "key", "--timeout", "5", "summary"])
        .assert()
        .code(7);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_key_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    against(&server)
        .arg("summary")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Authentication failed"));
}

// ── End-to-end ──────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_summary_json() {
    let server = pihole().await;

    let output = against(&server)
        .args(["-o", "json", "summary"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let record: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["dns_queries_today"], "2048");
    assert_eq!(record["ads_percentage_today"], "12.5");
    assert_eq!(record["status"], "Blocking");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_top_clients_table() {
    let server = pihole().await;

    against(&server)
        .arg("top-clients")
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0.0.5").and(predicate::str::contains("42")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_json() {
    let server = pihole().await;

    let output = against(&server)
        .args(["-o", "json-compact", "history"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let history: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(history["counts"], json!([3, 9]));
    assert_eq!(history["high"], 9);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_count() {
    let server = pihole().await;

    against(&server)
        .args(["watch", "--interval", "1", "--count", "2"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Blocking")
                .and(predicate::str::contains("top 10.0.0.5 (42)"))
                .and(predicate::str::contains("peak 9")),
        );
}

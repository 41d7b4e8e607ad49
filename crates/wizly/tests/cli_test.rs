//! Integration tests for the `wizly` CLI binary.
//!
//! Parsing, help and completions run without a server. Commands that talk
//! to Wizarr run against a wiremock server, with the config directory
//! pointed at a fresh temp dir so the user's real configuration is never
//! read.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// `wizly` with env isolation: no `WIZLY_*` variables and a config home
/// inside `home`.
fn wizly_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("wizly");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("WIZLY_PROFILE")
        .env_remove("WIZLY_URL")
        .env_remove("WIZLY_API_KEY")
        .env_remove("WIZLY_OUTPUT")
        .env_remove("WIZLY_INSECURE")
        .env_remove("WIZLY_TIMEOUT");
    cmd
}

/// `wizly --url <server> --api-key test-key ...`.
fn against(server: &MockServer, home: &Path, args: &[&str]) -> assert_cmd::Command {
    let mut cmd = wizly_cmd(home);
    cmd.args(["--url", &server.uri(), "--api-key", "test-key"])
        .args(args);
    cmd
}

/// Run a blocking command without stalling the mock server.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("X-API-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = wizly_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    wizly_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("Wizarr")
            .and(predicate::str::contains("invitations"))
            .and(predicate::str::contains("users"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn version_flag() {
    let home = tempfile::tempdir().unwrap();
    wizly_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wizly"));
}

#[test]
fn completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    wizly_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn invitation_subcommands_exist() {
    let home = tempfile::tempdir().unwrap();
    wizly_cmd(home.path())
        .args(["invitations", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("create"))
                .and(predicate::str::contains("email"))
                .and(predicate::str::contains("delete")),
        );
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    let output = wizly_cmd(home.path())
        .args(["--output", "xml", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("possible values"));
}

#[test]
fn server_commands_need_a_server() {
    let home = tempfile::tempdir().unwrap();
    wizly_cmd(home.path())
        .args(["users", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No Wizarr server configured"));
}

#[test]
fn url_without_key_is_an_auth_error() {
    let home = tempfile::tempdir().unwrap();
    wizly_cmd(home.path())
        .args(["--url", "http://127.0.0.1:9", "status"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No API key"));
}

#[test]
fn unknown_profile_is_reported() {
    let home = tempfile::tempdir().unwrap();
    wizly_cmd(home.path())
        .args(["--profile", "nope", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'nope' not found"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn config_show_without_file_succeeds() {
    let home = tempfile::tempdir().unwrap();
    wizly_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile"));
}

#[test]
fn profile_from_config_file_is_used() {
    let home = tempfile::tempdir().unwrap();
    let output = wizly_cmd(home.path())
        .args(["config", "path"])
        .output()
        .unwrap();
    let config_path = String::from_utf8(output.stdout).unwrap();
    let config_path = Path::new(config_path.trim());
    assert!(config_path.starts_with(home.path()));

    std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    std::fs::write(
        config_path,
        r#"
default_profile = "home"

[profiles.home]
url = "http://127.0.0.1:9"
api_key_env = "WIZLY_TEST_KEY"
api_key = "plaintext-secret"
"#,
    )
    .unwrap();

    wizly_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.home]")
                .and(predicate::str::contains("plaintext-secret").not()),
        );
}

// ── Against a server ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn status_renders_views_as_json() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    mount_json(&server, "/api/status", json!({"version": "2025.1", "total_users": 2})).await;
    mount_json(
        &server,
        "/api/users",
        json!({"users": [{"id": 1, "username": "al", "server_type": "plex"}]}),
    )
    .await;
    mount_json(
        &server,
        "/api/invitations",
        json!([{"id": 7, "status": "pending", "used_by": "<User 1>"}]),
    )
    .await;
    mount_json(&server, "/api/libraries", json!({"data": []})).await;
    mount_json(&server, "/api/servers", json!({"servers": [], "count": 0})).await;
    Mock::given(method("GET"))
        .and(path("/api/api-keys"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let output = run(against(&server, home.path(), &["-o", "json", "status"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["available"], 5);
    let views = report["views"].as_array().unwrap();
    assert_eq!(views[0]["state"], "online");
    assert_eq!(views[0]["attributes"]["version"], "2025.1");
    assert_eq!(views[1]["attributes"]["users_by_server"], json!({"plex": 1}));
    assert_eq!(views[2]["attributes"]["invitations"][0]["used_by"], "al");
    assert_eq!(views[5]["state"], "unavailable");
}

#[tokio::test(flavor = "multi_thread")]
async fn users_list_plain_prints_ids() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    mount_json(
        &server,
        "/api/users",
        json!({"data": [{"id": 3, "username": "bob"}, {"id": 4, "email": "c@x.com"}]}),
    )
    .await;

    let output = run(against(&server, home.path(), &["-o", "plain", "users", "list"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3\n4");
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_key_exits_with_auth_code() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = run(against(&server, home.path(), &["config", "test"])).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("rejected the API key"));
}

#[tokio::test(flavor = "multi_thread")]
async fn invitations_create_posts_payload() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/invitations"))
        .and(body_json(json!({
            "server_ids": [1, 2],
            "expires_in_days": 7,
            "unlimited": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "invitation": {"id": 42, "code": "XYZ", "url": "http://wizarr.local/j/XYZ"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(against(
        &server,
        home.path(),
        &["-o", "json", "invitations", "create", "--servers", "1, 2,x", "-e", "7"],
    ))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "created");
    assert_eq!(report["id"], 42);
    assert_eq!(report["code"], "XYZ");
}

#[tokio::test(flavor = "multi_thread")]
async fn invitations_create_sends_explicit_false_permissions() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .and(path("/api/invitations"))
        .and(body_json(json!({
            "server_ids": [3],
            "unlimited": true,
            "allow_downloads": true,
            "allow_live_tv": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(against(
        &server,
        home.path(),
        &[
            "invitations",
            "create",
            "--servers",
            "3",
            "--allow-downloads",
            "--allow-live-tv=false",
        ],
    ))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_recipient_makes_no_requests() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(against(
        &server,
        home.path(),
        &["invitations", "email", "--servers", "1", "--to", "not-an-email"],
    ))
    .await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("invalid email format"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_without_tty_requires_yes() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(against(&server, home.path(), &["users", "delete", "9"])).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_with_yes_calls_the_api() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();
    Mock::given(method("DELETE"))
        .and(path("/api/invitations/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(against(&server, home.path(), &["-y", "invitations", "delete", "5"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Invitation 5 deleted"));
}

#[test]
fn watch_interval_below_floor_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    wizly_cmd(home.path())
        .args([
            "--url",
            "http://127.0.0.1:9",
            "--api-key",
            "k",
            "watch",
            "--interval",
            "5s",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("interval"));
}

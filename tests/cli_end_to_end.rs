#![deny(clippy::all, clippy::pedantic)]

use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use tempfile::TempDir;

fn cli(server: &MockServer, session_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("murales-cli"));
    cmd.env_remove("MURALES_CONFIG_FILE")
        .env_remove("MURALES_ADMIN_PASSWORD")
        .arg("--api-url")
        .arg(server.url("/api"))
        .arg("--session-file")
        .arg(session_dir.path().join("session.json"));
    cmd
}

#[test]
fn provinces_are_listed_one_per_line() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/api/filters/provinces");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":["Buenos Aires","Ciudad Autónoma de Buenos Aires"]}"#);
    });

    let dir = TempDir::new().expect("tempdir");
    let assert = cli(&server, &dir)
        .arg("filters")
        .arg("provinces")
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Buenos Aires\nCiudad Autónoma de Buenos Aires\n"));
    mock.assert();
}

#[test]
fn login_persists_session_for_later_commands() {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method("POST").path("/api/admin/auth/login");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":{"user":{"id":"u1","email":"admin@murales.ar","role":"admin"},"access_token":"a1","refresh_token":"r1"}}"#);
    });
    let summary = server.mock(|when, then| {
        when.method("GET")
            .path("/api/admin/murals/summary")
            .header("authorization", "Bearer a1");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":{"pending":2,"approved":5,"rejected":1}}"#);
    });

    let dir = TempDir::new().expect("tempdir");
    cli(&server, &dir)
        .env("MURALES_ADMIN_PASSWORD", "s3cret")
        .args(["admin", "login", "--email", "admin@murales.ar"])
        .assert()
        .success()
        .stdout(contains("Logged in as admin@murales.ar"));

    cli(&server, &dir)
        .args(["admin", "summary"])
        .assert()
        .success()
        .stdout(contains("\"pending\": 2"));

    login.assert();
    summary.assert();
}

#[test]
fn rejected_login_fails_with_backend_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/api/admin/auth/login");
        then.status(401)
            .header("content-type", "application/json")
            .body(r#"{"error":"Invalid email or password"}"#);
    });

    let dir = TempDir::new().expect("tempdir");
    cli(&server, &dir)
        .env("MURALES_ADMIN_PASSWORD", "wrong")
        .args(["admin", "login", "--email", "admin@murales.ar"])
        .assert()
        .failure()
        .stderr(contains("Invalid email or password"));
}

#[test]
fn non_http_api_url_fails_fast() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("murales-cli"));
    cmd.env_remove("MURALES_CONFIG_FILE")
        .args(["--api-url", "ftp://murales.example", "murals", "map"])
        .assert()
        .failure()
        .stderr(contains("api.base_url"));
}

#[test]
fn search_sends_only_the_settled_text() {
    let server = MockServer::start();
    let search = server.mock(|when, then| {
        when.method("GET")
            .path("/api/murals")
            .query_param("page", "1")
            .query_param("name", "puerta");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":[],"meta":{"page":1,"per_page":10,"total_pages":1,"total_count":0}}"#);
    });

    let dir = TempDir::new().expect("tempdir");
    cli(&server, &dir)
        .args(["murals", "search"])
        .write_stdin("p\npu\npuer\npuerta\n")
        .assert()
        .success()
        .stdout(contains("No murals found."));

    search.assert_calls(1);
}

//! Smoke tests to verify command wiring
//!
//! None of these reach a database.

use assert_cmd::Command;
use predicates::prelude::*;

fn quill(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("quill").unwrap();
    cmd.env("HOME", home)
        .env_remove("DATABASE_URL")
        .env_remove("QUILL_BIND")
        .env_remove("QUILL_SESSION_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

// === Help Tests ===

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    quill(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("routes"));
}

#[test]
fn test_serve_help() {
    let home = tempfile::tempdir().unwrap();
    quill(home.path())
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Address to bind to"))
        .stdout(predicate::str::contains("--cors-permissive"));
}

#[test]
fn test_user_promote_help() {
    let home = tempfile::tempdir().unwrap();
    quill(home.path())
        .args(["user", "promote", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Email the user registered with"));
}

// === Routes Command Tests ===

#[test]
fn test_routes_table() {
    let home = tempfile::tempdir().unwrap();
    quill(home.path())
        .arg("routes")
        .assert()
        .success()
        .stdout(predicate::str::contains("POST  /api/authenticate"))
        .stdout(predicate::str::contains("GET   /blog/{id}"))
        .stdout(predicate::str::contains("api_delete_blog"));
}

#[test]
fn test_routes_json() {
    let home = tempfile::tempdir().unwrap();
    let output = quill(home.path())
        .args(["routes", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let routes: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let routes = routes.as_array().unwrap();
    assert!(routes
        .iter()
        .any(|r| r["method"] == "GET" && r["path"] == "/health"));
}

// === Migrate Command Tests ===

#[test]
fn test_migrate_print() {
    let home = tempfile::tempdir().unwrap();
    quill(home.path())
        .args(["migrate", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"CREATE TABLE IF NOT EXISTS "users""#))
        .stdout(predicate::str::contains("idx_comments_blog_id"));
}

// === Config Command Tests ===

#[test]
fn test_config_path_under_home() {
    let home = tempfile::tempdir().unwrap();
    quill(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".quill/config.toml"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let home = tempfile::tempdir().unwrap();
    quill(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    assert!(home.path().join(".quill/config.toml").exists());

    quill(home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    quill(home.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_hides_secret() {
    let home = tempfile::tempdir().unwrap();
    quill(home.path()).args(["config", "init"]).assert().success();
    quill(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secret = \"<set>\""))
        .stdout(predicate::str::contains("[database]"));
}

// === Completions ===

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    quill(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quill"));
}

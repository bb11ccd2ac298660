//! Integration tests that drive the compiled `postcraft` binary.
//!
//! None of these need a database: they cover config writing and the
//! fail-fast paths that run before any connection is made.

use std::path::Path;
use std::process::{Command, Output};

fn postcraft(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_postcraft"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("GEMINI_API_KEY")
        .env_remove("GEMINI_MODEL")
        .env_remove("POSTCRAFT_DATABASE_URL")
        .output()
        .expect("failed to run postcraft binary")
}

#[test]
fn init_writes_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = postcraft(
        dir.path(),
        &[
            "init",
            "--db-url",
            "postgresql://db.internal:5432/posts",
            "--api-key",
            "AIzaSyTESTKEY1234567890",
        ],
    );
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let written = std::fs::read_to_string(dir.path().join("postcraft/config.toml")).unwrap();
    assert!(written.contains("postgresql://db.internal:5432/posts"));
    assert!(written.contains("AIzaSyTESTKEY1234567890"));
    assert!(written.contains("gemini-2.5-flash"));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("AIzaSyTEST..."));
    assert!(!stdout.contains("AIzaSyTESTKEY1234567890"));
}

#[cfg(unix)]
#[test]
fn init_config_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let out = postcraft(dir.path(), &["init"]);
    assert!(out.status.success());

    let meta = std::fs::metadata(dir.path().join("postcraft/config.toml")).unwrap();
    assert_eq!(meta.permissions().mode() & 0o777, 0o600);
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    assert!(postcraft(dir.path(), &["init"]).status.success());

    let out = postcraft(dir.path(), &["init"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--force"));

    let out = postcraft(dir.path(), &["init", "--force", "--model", "gemini-2.5-pro"]);
    assert!(out.status.success());
    let written = std::fs::read_to_string(dir.path().join("postcraft/config.toml")).unwrap();
    assert!(written.contains("gemini-2.5-pro"));
}

#[test]
fn generate_without_api_key_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let out = postcraft(
        dir.path(),
        &["generate", "--topic", "coffee", "--platform", "twitter"],
    );
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("GEMINI_API_KEY"));
}

#[test]
fn probe_without_api_key_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let out = postcraft(dir.path(), &["probe"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("GEMINI_API_KEY"));
}

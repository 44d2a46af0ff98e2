//! CLI contract tests
//!
//! Runs the built binary for the commands that need no network access.

use std::path::Path;
use std::process::Command;

fn draftmeta(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_draftmeta"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run draftmeta");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Working directory whose draftmeta.toml points the cache into a temp dir
fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");
    std::fs::write(
        dir.path().join("draftmeta.toml"),
        format!("[cache]\nttl_hours = 12\ndir = {:?}\n", cache.display().to_string()),
    )
    .unwrap();
    dir
}

#[test]
fn test_version() {
    let dir = workspace();
    let (code, stdout, _) = draftmeta(dir.path(), &["version"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), format!("draftmeta {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cache_stats_uses_configured_dir() {
    let dir = workspace();
    let responses = dir.path().join("cache").join("responses");
    std::fs::create_dir_all(&responses).unwrap();
    std::fs::write(responses.join("deadbeef.json"), "not an entry").unwrap();

    let (code, stdout, _) = draftmeta(dir.path(), &["cache", "stats"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("responses"));
    assert!(stdout.contains("Entries:   1"));
    assert!(stdout.contains("TTL:       12h"));
}

#[test]
fn test_cache_clear_removes_entries() {
    let dir = workspace();
    let responses = dir.path().join("cache").join("responses");
    std::fs::create_dir_all(&responses).unwrap();
    std::fs::write(responses.join("a.json"), "{}").unwrap();
    std::fs::write(responses.join("b.json"), "{}").unwrap();
    std::fs::write(
        dir.path().join("cache").join("FDN_PremierDraft_trophy_cache.json"),
        "{}",
    )
    .unwrap();

    let (code, stdout, _) = draftmeta(dir.path(), &["cache", "clear"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Cleared 3 cache entries"));
    assert_eq!(std::fs::read_dir(&responses).unwrap().count(), 0);
}

#[test]
fn test_invalid_report_format_rejected() {
    let dir = workspace();
    let (code, _, stderr) = draftmeta(dir.path(), &["analyze", "FDN", "--report", "sarif"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("sarif"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = workspace();
    let (code, _, stderr) = draftmeta(dir.path(), &["--config", "nope.toml", "cache", "stats"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("nope.toml"));
}

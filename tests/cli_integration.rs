//! CLI integration tests for Depot.
//!
//! Every test runs against its own home directory holding a config file and
//! a hand-written index, with `offline = true` so nothing is synced.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use depot::util::hash::sha256_bytes;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG: &str = r#"
default_source = "internal"

[net]
offline = true
timeout_secs = 2

[[sources]]
name = "public"
type = "official"
url = "http://127.0.0.1:9"
index_url = "http://127.0.0.1:9/index"
index_type = "http"

[[sources]]
name = "internal"
url = "http://127.0.0.1:9/internal"
index_url = "http://127.0.0.1:9/internal/index"
index_type = "http"
priority = 10

[[sources]]
name = "archive"
url = "http://127.0.0.1:9/archive"
index_url = "http://127.0.0.1:9/archive/index"
index_type = "http"
priority = 10
enabled = false
"#;

/// Get the depot binary command, isolated to a home directory.
fn depot(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("depot").unwrap();
    cmd.arg("--home").arg(home).current_dir(home).env_remove("RUST_LOG");
    cmd
}

/// Create a home directory with the standard config.
fn home() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), CONFIG).unwrap();
    tmp
}

/// Append raw index lines for a package of the `internal` source.
fn index_entry(home: &Path, id: &str, lines: &[String]) {
    let (owner, name) = id.split_once('/').unwrap();
    let dir = home.join("index").join("sources").join("internal").join(owner);
    fs::create_dir_all(&dir).unwrap();
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(dir.join(name), content).unwrap();
}

fn version_line(version: &str, checksum: &str, deps: &[&str], yanked: bool) -> String {
    let deps: Vec<String> = deps.iter().map(|d| format!("\"{}\":\"*\"", d)).collect();
    let yanked = if yanked { ",\"yanked\":true" } else { "" };
    format!(
        "{{\"version\":\"{}\",\"checksum\":\"{}\",\"deps\":{{{}}}{}}}",
        version,
        checksum,
        deps.join(","),
        yanked
    )
}

/// Place an archive in the cache.
fn cache_archive(home: &Path, id: &str, version: &str, body: &[u8]) {
    let dir = home.join("packages").join(id);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.zip", version)), body).unwrap();
}

fn sample_index(home: &Path) {
    index_entry(
        home,
        "acme/widget",
        &[
            version_line("1.0.0", &sha256_bytes(b"widget 1.0.0"), &["acme/base"], false),
            version_line("1.1.0", &sha256_bytes(b"widget 1.1.0"), &[], true),
            version_line("1.2.0", &sha256_bytes(b"widget 1.2.0"), &["acme/base", "other/dep"], false),
        ],
    );
    index_entry(
        home,
        "acme/base",
        &[version_line("0.1.0", &sha256_bytes(b"base 0.1.0"), &[], false)],
    );
    index_entry(
        home,
        "zeta/tool",
        &[version_line("3.0.0", &sha256_bytes(b"tool 3.0.0"), &[], false)],
    );
}

// ============================================================================
// depot sources
// ============================================================================

#[test]
fn test_sources_in_fallback_order() {
    let home = home();

    let output = depot(home.path()).arg("sources").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let internal = stdout.find("internal").unwrap();
    let public = stdout.find("public").unwrap();
    let archive = stdout.find("archive").unwrap();
    assert!(internal < public);
    assert!(public < archive);
    assert!(stdout.contains("* internal"));
    assert!(stdout.contains("disabled"));
}

#[test]
fn test_invalid_config_fails() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("config.toml"),
        "[[sources]]\nname = \"a\"\nurl = \"https://a\"\nindex_url = \"https://a/i\"\npriority = 5000\n",
    )
    .unwrap();

    // A broken global config is reported and defaults are used
    depot(home.path())
        .arg("sources")
        .assert()
        .success()
        .stderr(predicate::str::contains("no sources configured"));

    // A broken explicit config is fatal
    depot(home.path())
        .args(["sources", "--config"])
        .arg(home.path().join("config.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("priority"));
}

// ============================================================================
// depot list / info
// ============================================================================

#[test]
fn test_list_packages() {
    let home = home();
    sample_index(home.path());

    depot(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::diff("acme/base\nacme/widget\nzeta/tool\n"));
}

#[test]
fn test_list_matching_pattern() {
    let home = home();
    sample_index(home.path());

    depot(home.path())
        .args(["list", "acme/w*"])
        .assert()
        .success()
        .stdout(predicate::str::diff("acme/widget\n"));
}

#[test]
fn test_list_other_source_is_empty() {
    let home = home();
    sample_index(home.path());

    depot(home.path())
        .args(["list", "--source", "public"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_info_shows_versions() {
    let home = home();
    sample_index(home.path());
    cache_archive(home.path(), "acme/widget", "1.0.0", b"widget 1.0.0");

    depot(home.path())
        .args(["info", "acme/widget"])
        .assert()
        .success()
        .stdout(predicate::str::contains("latest: 1.2.0"))
        .stdout(predicate::str::contains("1.1.0 [yanked]"))
        .stdout(predicate::str::contains("1.0.0 [cached]"))
        .stdout(predicate::str::contains("other/dep"));
}

#[test]
fn test_info_unknown_package() {
    let home = home();
    sample_index(home.path());

    depot(home.path())
        .args(["info", "acme/missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_info_invalid_id() {
    let home = home();

    depot(home.path())
        .args(["info", "no-slash"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid package id"));
}

// ============================================================================
// depot mirror
// ============================================================================

#[test]
fn test_mirror_requires_patterns() {
    let home = home();

    depot(home.path())
        .arg("mirror")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no packages selected"));
}

#[test]
fn test_mirror_unknown_source_fails() {
    let home = home();
    sample_index(home.path());

    depot(home.path())
        .args(["mirror", "acme/*", "--source", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("source `nope` not found"));
}

#[test]
fn test_mirror_disabled_source_fails() {
    let home = home();

    depot(home.path())
        .args(["mirror", "acme/*", "--source", "archive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("disabled"));
}

#[test]
fn test_mirror_fully_cached_succeeds_offline() {
    let home = home();
    sample_index(home.path());
    cache_archive(home.path(), "acme/widget", "1.0.0", b"widget 1.0.0");
    cache_archive(home.path(), "acme/widget", "1.2.0", b"widget 1.2.0");
    cache_archive(home.path(), "acme/base", "0.1.0", b"base 0.1.0");

    depot(home.path())
        .args(["mirror", "acme/*"])
        .assert()
        .success()
        .stderr(predicate::str::contains("3 already cached, 0 failed"))
        .stderr(predicate::str::contains("other/dep is required by acme/widget"));
}

#[test]
fn test_mirror_quiet_suppresses_skip_warnings() {
    let home = home();
    sample_index(home.path());
    cache_archive(home.path(), "acme/widget", "1.0.0", b"widget 1.0.0");
    cache_archive(home.path(), "acme/widget", "1.2.0", b"widget 1.2.0");

    depot(home.path())
        .args(["--quiet", "mirror", "acme/widget"])
        .assert()
        .success()
        .stderr(predicate::str::contains("required by").not());
}

#[test]
fn test_mirror_cached_dependency_is_not_warned_about() {
    let home = home();
    sample_index(home.path());
    cache_archive(home.path(), "acme/widget", "1.0.0", b"widget 1.0.0");
    cache_archive(home.path(), "acme/widget", "1.2.0", b"widget 1.2.0");
    cache_archive(home.path(), "other/dep", "0.9.0", b"some older dep");

    depot(home.path())
        .args(["mirror", "acme/widget"])
        .assert()
        .success()
        .stderr(predicate::str::contains("acme/base is required by acme/widget"))
        .stderr(predicate::str::contains("other/dep is required by").not());
}

#[test]
fn test_mirror_pattern_without_slash_warns() {
    let home = home();
    sample_index(home.path());

    depot(home.path())
        .args(["mirror", "*"])
        .assert()
        .success()
        .stderr(predicate::str::contains("pattern `*` has no `/`"))
        .stderr(predicate::str::contains("0 packages"));
}

#[test]
fn test_mirror_reports_failures() {
    let home = home();
    sample_index(home.path());

    // Nothing is cached and every source refuses connections
    depot(home.path())
        .args(["mirror", "zeta/tool", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to mirror"));
    assert!(!home.path().join("packages/zeta/tool/3.0.0.zip").exists());
}

#[test]
fn test_mirror_replaces_corrupt_archive_or_fails() {
    let home = home();
    sample_index(home.path());
    cache_archive(home.path(), "zeta/tool", "3.0.0", b"corrupted");

    depot(home.path())
        .args(["mirror", "zeta/tool", "--source", "internal"])
        .assert()
        .failure();

    // The corrupt archive was purged and nothing replaced it
    assert!(!home.path().join("packages/zeta/tool/3.0.0.zip").exists());
}

// ============================================================================
// depot cache
// ============================================================================

#[test]
fn test_cache_list_and_size() {
    let home = home();
    cache_archive(home.path(), "acme/widget", "1.0.0", &[0u8; 2048]);

    depot(home.path())
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme/widget@1.0.0 (2.00 KB)"));

    depot(home.path())
        .args(["cache", "size"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2.00 KB (1 files)"));
}

#[test]
fn test_cache_path() {
    let home = home();

    depot(home.path())
        .args(["cache", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("packages"));
}

#[test]
fn test_cache_clean() {
    let home = home();
    sample_index(home.path());
    cache_archive(home.path(), "acme/widget", "1.0.0", b"widget 1.0.0");

    depot(home.path())
        .args(["cache", "clean"])
        .assert()
        .success();
    assert!(!home.path().join("packages").exists());
    assert!(home.path().join("index").exists());

    depot(home.path())
        .args(["cache", "clean", "--index"])
        .assert()
        .success();
    assert!(!home.path().join("index").exists());
}

// ============================================================================
// depot completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let home = home();

    depot(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("depot"));
}

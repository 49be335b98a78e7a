use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/containers.json")
}

/// A `dops` command reading the fixture, with an empty config dir and no colors.
fn dops(config_dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dops").unwrap();
    cmd.env("DOPS_CONFIG_DIR", config_dir.path())
        .env_remove("RUST_LOG")
        .arg("--no-color")
        .arg("--input")
        .arg(fixture());
    cmd
}

#[test]
fn test_default_table() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("CONTAINER ID"))
        .stdout(predicate::str::contains("3f4e8b2a9c1d"))
        .stdout(predicate::str::contains("web"))
        .stdout(predicate::str::contains("exited"))
        .stdout(predicate::str::contains("3f4e8b2a9c1d7").not());
}

#[test]
fn test_template_format() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .args(["--format", "{{.Names}} {{.State}}"])
        .assert()
        .success()
        .stdout("web running\ndb exited\n");
}

#[test]
fn test_first_format_wins_without_terminal() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .args(["--format", "{{.Names}}", "--format", "{{.ID}}"])
        .assert()
        .success()
        .stdout("web\ndb\n");
}

#[test]
fn test_table_format() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .args(["--format", "table {{.Names}}\t{{.State}}"])
        .assert()
        .success()
        .stdout("NAMES   STATE\n-----   -------\nweb     running\ndb      exited\n");
}

#[test]
fn test_literal_tab_escape_in_table_format() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .args(["--format", r"table {{.Names}}\t{{.State}}", "--simple-header"])
        .assert()
        .success()
        .stdout("NAMES   STATE\nweb     running\ndb      exited\n");
}

#[test]
fn test_no_header() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .args(["--format", "table {{.Names}}\t{{.State}}", "--no-header"])
        .assert()
        .success()
        .stdout("web   running\ndb    exited\n");
}

#[test]
fn test_quiet_lists_short_ids() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .arg("-q")
        .assert()
        .success()
        .stdout("3f4e8b2a9c1d\n9a8b7c6d5e4f\n");
}

#[test]
fn test_quiet_no_trunc_lists_full_ids() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .args(["-q", "--no-trunc"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "3f4e8b2a9c1d7e6f5a4b3c2d1e0f9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4d3e2f\n",
        ));
}

#[test]
fn test_sort_by_name() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .args(["--format", "{{.Names}}", "--sort", "Names"])
        .assert()
        .success()
        .stdout("db\nweb\n");

    dops(&temp_dir)
        .args(["--format", "{{.Names}}", "--sort", "CreatedAt", "--sort-direction", "desc"])
        .assert()
        .success()
        .stdout("web\ndb\n");
}

#[test]
fn test_config_formats_are_used() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("config.json"),
        r#"{"formats": ["{{.Names}}:{{.ImageName}}:{{.ImageTag}}"]}"#,
    )
    .unwrap();
    dops(&temp_dir)
        .assert()
        .success()
        .stdout("web:nginx:1.25\ndb:postgres:16\n");
}

#[test]
fn test_timezone_and_timeformat() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .args([
            "--format",
            "{{.CreatedAt}}",
            "--timezone",
            "UTC",
            "--timeformat",
            "%Y-%m-%d %H:%M",
        ])
        .assert()
        .success()
        .stdout("2023-11-14 22:13\n2023-07-22 04:26\n");
}

#[test]
fn test_silent_prints_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .arg("--silent")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_keys_listing() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .arg("--keys")
        .assert()
        .success()
        .stdout(predicate::str::contains("{{.ShortPublishedPorts}}"))
        .stdout(predicate::str::contains("Container ID"));
}

#[test]
fn test_help() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Options (docker ps):"))
        .stdout(predicate::str::contains("Options (extra):"))
        .stdout(predicate::str::contains("--watch [INTERVAL]"));
}

#[test]
fn test_version() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "dops {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_missing_input_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("dops").unwrap();
    cmd.env("DOPS_CONFIG_DIR", temp_dir.path())
        .args(["--no-color", "--input"])
        .arg(temp_dir.path().join("nope.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_malformed_input_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let input = temp_dir.path().join("bad.json");
    std::fs::write(&input, r#"{"message": "client version too old"}"#).unwrap();

    let mut cmd = Command::cargo_bin("dops").unwrap();
    cmd.env("DOPS_CONFIG_DIR", temp_dir.path())
        .args(["--no-color", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("client version too old"));
}

#[test]
fn test_invalid_timezone_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    dops(&temp_dir)
        .args(["--timezone", "Mars/Olympus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn test_stdin_input() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("dops").unwrap();
    cmd.env("DOPS_CONFIG_DIR", temp_dir.path())
        .args(["--no-color", "--input", "-", "--format", "{{.Names}}"])
        .write_stdin(std::fs::read_to_string(fixture()).unwrap())
        .assert()
        .success()
        .stdout("web\ndb\n");
}

#[test]
fn test_stdin_input_with_watch_renders_every_cycle() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("dops").unwrap();
    cmd.env("DOPS_CONFIG_DIR", temp_dir.path())
        .env_remove("RUST_LOG")
        .args(["--no-color", "--input", "-", "--format", "{{.Names}}", "--watch", "100ms"])
        .write_stdin(std::fs::read_to_string(fixture()).unwrap())
        .timeout(std::time::Duration::from_secs(3))
        .assert()
        .interrupted()
        .stdout(predicate::function(|out: &[u8]| {
            String::from_utf8_lossy(out).matches("web\ndb\n").count() >= 2
        }))
        .stderr(predicate::str::contains("Error").not());
}

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn annotateit_cmd() -> Command {
    Command::cargo_bin("annotateit").expect("binary exists")
}

#[test]
fn help_prints_usage() {
    annotateit_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Multi-monitor screen annotation overlay",
        ))
        .stdout(predicate::str::contains("--all-monitors"));
}

#[test]
fn overlay_requires_wayland_env() {
    annotateit_cmd()
        .env_remove("WAYLAND_DISPLAY")
        .assert()
        .failure()
        .stderr(predicate::str::contains("WAYLAND_DISPLAY not set"));
}

#[test]
fn list_monitors_requires_wayland_env() {
    annotateit_cmd()
        .env_remove("WAYLAND_DISPLAY")
        .arg("--list-monitors")
        .assert()
        .failure()
        .stderr(predicate::str::contains("WAYLAND_DISPLAY not set"));
}

#[test]
fn monitor_and_all_monitors_conflict() {
    annotateit_cmd()
        .args(["--monitor", "DP-1", "--all-monitors"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unknown_tool_is_rejected() {
    annotateit_cmd()
        .args(["--tool", "spraycan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'spraycan'"));
}

#[test]
fn init_config_writes_once() {
    let temp = TempDir::new().unwrap();

    annotateit_cmd()
        .env_remove("WAYLAND_DISPLAY")
        .env("XDG_CONFIG_HOME", temp.path())
        .arg("--init-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote example configuration"));

    let written = temp.path().join("annotateit").join("config.toml");
    let contents = std::fs::read_to_string(&written).unwrap();
    assert!(contents.contains("[effects]"));

    annotateit_cmd()
        .env_remove("WAYLAND_DISPLAY")
        .env("XDG_CONFIG_HOME", temp.path())
        .arg("--init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn schema_binary_prints_json() {
    Command::cargo_bin("annotateit-config-schema")
        .expect("binary exists")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"keybindings\""));
}

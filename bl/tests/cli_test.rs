//! CLI tests for the bl binary

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_config(dir: &TempDir, yaml: &str) -> PathBuf {
    let path = dir.path().join("batch.yml");
    fs::write(&path, yaml).expect("Failed to write config");
    path
}

fn bl(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bl").expect("bl binary is built");
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn test_once_runs_command() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
handlers:
  touch:
    command: "touch done"
report:
  handler: touch
  mode: once
"#,
    );

    bl(&dir)
        .args(["--config", config.to_str().unwrap(), "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ran once after 1 run(s)"));

    assert!(dir.path().join("done").exists());
}

#[test]
fn test_default_config_in_working_dir() {
    let dir = TempDir::new().unwrap();
    write_config(
        &dir,
        r#"
handlers:
  ok:
    command: "true"
report:
  handler: ok
  mode: once
"#,
    );

    bl(&dir).arg("report").assert().success();
}

#[test]
fn test_complete_reruns_until_done() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
handlers:
  drain:
    command: "if [ -f second ]; then exit 0; elif [ -f first ]; then touch second; exit 75; else touch first; exit 75; fi"
drain:
  handler: drain
  mode: complete
"#,
    );

    bl(&dir)
        .args(["--config", config.to_str().unwrap(), "drain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed after 3 run(s)"));
}

#[test]
fn test_invalid_mode_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
handlers:
  touch:
    command: "touch ran"
purge:
  handler: touch
  mode: bogus
"#,
    );

    bl(&dir)
        .args(["--config", config.to_str().unwrap(), "purge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid mode=bogus"));

    assert!(!dir.path().join("ran").exists());
}

#[test]
fn test_unknown_handler_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
purge:
  handler: nope
  mode: once
"#,
    );

    bl(&dir)
        .args(["--config", config.to_str().unwrap(), "purge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown handler nope"));
}

#[test]
fn test_handler_failure_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
handlers:
  broken:
    command: "exit 3"
purge:
  handler: broken
"#,
    );

    bl(&dir)
        .args(["--config", config.to_str().unwrap(), "purge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("handler broken failed"));
}

#[test]
fn test_heartbeat_written_on_ping() {
    let dir = TempDir::new().unwrap();
    let heartbeat = dir.path().join("alive");
    let config = write_config(
        &dir,
        r#"
handlers:
  ok:
    command: "true"
report:
  handler: ok
  mode: once
  ping: true
"#,
    );

    bl(&dir)
        .args([
            "--config",
            config.to_str().unwrap(),
            "--heartbeat",
            heartbeat.to_str().unwrap(),
            "report",
        ])
        .assert()
        .success();

    assert!(heartbeat.exists());
}

#[cfg(unix)]
#[test]
fn test_sigterm_stops_gracefully() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
handlers:
  busy:
    command: "sleep 0.2; exit 75"
busy:
  handler: busy
"#,
    );

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("bl"))
        .current_dir(dir.path())
        .args(["--config", config.to_str().unwrap(), "busy"])
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .spawn()
        .expect("Failed to spawn bl");

    thread::sleep(Duration::from_secs(1));
    let status = std::process::Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .expect("Failed to run kill");
    assert!(status.success());

    let output = child.wait_with_output().expect("Failed to wait for bl");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("terminated"));
}

#[cfg(unix)]
#[test]
fn test_sigint_to_process_group_stops_gracefully() {
    use std::os::unix::process::CommandExt;

    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
handlers:
  slow:
    command: "sleep 3"
slow:
  handler: slow
"#,
    );

    // Own process group, as a terminal's Ctrl+C or a cgroup-wide stop would hit it
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("bl"))
        .current_dir(dir.path())
        .args(["--config", config.to_str().unwrap(), "slow"])
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .process_group(0)
        .spawn()
        .expect("Failed to spawn bl");

    thread::sleep(Duration::from_secs(1));
    let group = format!("-{}", child.id());
    let status = std::process::Command::new("kill")
        .args(["-INT", "--", &group])
        .status()
        .expect("Failed to run kill");
    assert!(status.success());

    let output = child.wait_with_output().expect("Failed to wait for bl");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "bl failed: {}", stderr);
    assert!(String::from_utf8_lossy(&output.stdout).contains("terminated"));
    assert!(!stderr.contains("handler slow failed"));
}

#[test]
fn test_broken_unrelated_section_is_ignored() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        r#"
handlers:
  ok:
    command: "true"
report:
  handler: ok
  mode: once
other:
  handler: ok
  sleepSeconds: soon
"#,
    );

    bl(&dir)
        .args(["--config", config.to_str().unwrap(), "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ran once after 1 run(s)"));

    bl(&dir)
        .args(["--config", config.to_str().unwrap(), "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch other has an invalid section"));
}

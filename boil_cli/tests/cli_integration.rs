use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use assert_cmd::Command;
use tempfile::tempdir;

// Sim config that reaches the target within a few ticks
fn write_config(dir: &tempfile::TempDir, timer_minutes: u32) -> PathBuf {
    let toml = format!(
        r#"
[step]
timer_minutes = {timer_minutes}
temp = 99.0
sensor = "probe"
kettle = "kettle"
lid_alert = true
hops = [1, 0]

[hop_dropper]
gpio = 17

[sim]
start_temp = 96.0
rise_per_tick = 1.0
max_temp = 100.0
kettle_on = true
"#
    );
    let path = dir.path().join("boil.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn boil(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("boil").unwrap();
    // 1 s ticks become 1 ms
    cmd.env("BOIL_SIM_SPEEDUP", "1000");
    cmd.env_remove("RUST_LOG");
    cmd.arg("--config").arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["run"], 0, "Boiling completed", "stdout")]
#[case(&["run"], 0, "Adding Hop 2", "stdout")]
#[case(&["run"], 0, "Please remove lid!", "stdout")]
#[case(&["self-check"], 0, "ok", "stdout")]
#[case(&["bogus"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 1);

    let mut cmd = boil(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn json_run_ends_with_report() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, 1);

    let out = boil(&cfg).arg("--json").arg("run").output().unwrap();
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8(out.stdout).unwrap();
    let last = stdout.lines().last().expect("report line");
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["event"], "report");
    assert_eq!(v["outcome"], "done");
    assert_eq!(v["hops_fired"], serde_json::json!([1, 2]));
    assert_eq!(v["lid_alerted"], true);

    // Every notification line is JSON too.
    for line in stdout.lines() {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(v["event"] == "notification" || v["event"] == "report");
    }
}

#[rstest]
fn stop_on_stdin_exits_with_stopped_code() {
    let dir = tempdir().unwrap();
    // Long enough that the run cannot finish before the command lands.
    let cfg = write_config(&dir, 30);

    boil(&cfg)
        .arg("run")
        .write_stdin("stop\n")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("boil stopped"))
        .stdout(predicate::str::contains("Boiling completed").not());
}

#[rstest]
fn missing_config_is_explained() {
    let mut cmd = Command::cargo_bin("boil").unwrap();
    cmd.arg("--config").arg("/nonexistent/boil.toml").arg("run");
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Could not read the config file"));
}

#[rstest]
fn invalid_config_reports_json_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        "[step]\ntimer_minutes = 0\ntemp = 99.0\nsensor = \"p\"\nkettle = \"k\"\n",
    )
    .unwrap();

    let out = Command::cargo_bin("boil")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("--json")
        .arg("run")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let v: serde_json::Value = serde_json::from_str(stderr.lines().last().unwrap()).unwrap();
    assert_eq!(v["reason"], "Error");
    assert!(v["message"].as_str().unwrap().contains("step.timer_minutes"));
}

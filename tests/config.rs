use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use todos::config::{Config, ConfigSource, LOCAL_CONFIG_FILE};

/// Run `todos` in `cwd` with the user config dir redirected into `home`.
fn todos(cwd: &Path, home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("todos").expect("binary");
    cmd.current_dir(cwd)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("TODOS_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn config_json(cmd: &mut Command) -> Value {
    let output = cmd.args(["--json", "config"]).output().expect("run config");
    assert!(
        output.status.success(),
        "config failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let envelope: Value = serde_json::from_slice(&output.stdout).expect("json");
    envelope["data"].clone()
}

#[test]
fn defaults_when_nothing_is_found() {
    let cwd = tempfile::tempdir().expect("cwd");
    let home = tempfile::tempdir().expect("home");

    let data = config_json(&mut todos(cwd.path(), home.path()));
    assert_eq!(data["source"]["kind"], "defaults");
    assert_eq!(data["config"]["attention"]["delay"], "15s");
    assert_eq!(data["config"]["ranks"]["refresh"], "every_mutation");
    assert_eq!(data["config"]["view"]["default_route"], "/");
}

#[test]
fn local_file_wins_over_user_file() {
    let cwd = tempfile::tempdir().expect("cwd");
    let home = tempfile::tempdir().expect("home");
    fs::write(cwd.path().join(LOCAL_CONFIG_FILE), "[attention]\ndelay = \"30s\"\n")
        .expect("write local");
    let user_dir = home.path().join(".config").join("todos");
    fs::create_dir_all(&user_dir).expect("user dir");
    fs::write(user_dir.join("config.toml"), "[attention]\ndelay = \"1m\"\n").expect("write user");

    let data = config_json(&mut todos(cwd.path(), home.path()));
    assert_eq!(data["source"]["kind"], "local");
    assert_eq!(data["config"]["attention"]["delay"], "30s");
}

#[test]
fn user_file_is_used_without_a_local_one() {
    let cwd = tempfile::tempdir().expect("cwd");
    let home = tempfile::tempdir().expect("home");
    let user_dir = home.path().join(".config").join("todos");
    fs::create_dir_all(&user_dir).expect("user dir");
    fs::write(user_dir.join("config.toml"), "[ranks]\nrefresh = \"toggle\"\n").expect("write user");

    let data = config_json(&mut todos(cwd.path(), home.path()));
    assert_eq!(data["source"]["kind"], "user");
    assert_eq!(data["config"]["ranks"]["refresh"], "toggle");
}

#[test]
fn invalid_discovered_file_falls_back_to_defaults() {
    let cwd = tempfile::tempdir().expect("cwd");
    let home = tempfile::tempdir().expect("home");
    fs::write(cwd.path().join(LOCAL_CONFIG_FILE), "[attention]\ndelay = \"never\"\n")
        .expect("write local");

    let data = config_json(&mut todos(cwd.path(), home.path()));
    assert_eq!(data["source"]["kind"], "local");
    assert_eq!(data["config"]["attention"]["delay"], "15s");
}

#[test]
fn explicit_config_must_exist() {
    let cwd = tempfile::tempdir().expect("cwd");
    let home = tempfile::tempdir().expect("home");
    todos(cwd.path(), home.path())
        .args(["--config", "missing.toml", "config"])
        .assert()
        .code(2)
        .stderr(contains("Config file not found"));
}

#[test]
fn explicit_invalid_config_is_a_user_error() {
    let cwd = tempfile::tempdir().expect("cwd");
    let home = tempfile::tempdir().expect("home");
    let path = cwd.path().join("bad.toml");
    fs::write(&path, "[attention]\ndelay = \"0s\"\n").expect("write config");

    todos(cwd.path(), home.path())
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .code(2)
        .stderr(contains("attention.delay"));
}

#[test]
fn env_var_names_the_config() {
    let cwd = tempfile::tempdir().expect("cwd");
    let home = tempfile::tempdir().expect("home");
    let path = home.path().join("chosen.toml");
    fs::write(&path, "[view]\ndefault_route = \"/completed\"\n").expect("write config");

    let mut cmd = todos(cwd.path(), home.path());
    cmd.env("TODOS_CONFIG", &path);
    let data = config_json(&mut cmd);
    assert_eq!(data["source"]["kind"], "explicit");
    assert_eq!(data["config"]["view"]["default_route"], "/completed");
}

#[test]
fn default_route_drives_replay_output() {
    let cwd = tempfile::tempdir().expect("cwd");
    let home = tempfile::tempdir().expect("home");
    fs::write(
        cwd.path().join(LOCAL_CONFIG_FILE),
        "[view]\ndefault_route = \"/active\"\n",
    )
    .expect("write local");

    let output = todos(cwd.path(), home.path())
        .args(["--json", "replay"])
        .write_stdin("{\"type\": \"ADD_ITEM\", \"payload\": {\"title\": \"a\"}}\n")
        .output()
        .expect("run replay");
    assert!(output.status.success());
    let envelope: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(envelope["data"]["route"], "active");
}

#[test]
fn explicit_defaults_file_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let explicit = dir.path().join("todos.toml");
    let content = toml::to_string_pretty(&Config::default()).expect("serialize");
    fs::write(&explicit, content).expect("write config");

    let (cfg, source) = Config::discover(Some(&explicit), dir.path()).expect("discover");
    assert_eq!(cfg, Config::default());
    assert_eq!(source, ConfigSource::Explicit(explicit));
}

#[test]
fn out_of_range_local_delay_does_not_crash() {
    let cwd = tempfile::tempdir().expect("cwd");
    let home = tempfile::tempdir().expect("home");
    fs::write(
        cwd.path().join(LOCAL_CONFIG_FILE),
        "[attention]\ndelay = \"9999999999999999h\"\n",
    )
    .expect("write local");

    let data = config_json(&mut todos(cwd.path(), home.path()));
    assert_eq!(data["source"]["kind"], "local");
    assert_eq!(data["config"]["attention"]["delay"], "15s");

    todos(cwd.path(), home.path())
        .arg("--config")
        .arg(cwd.path().join(LOCAL_CONFIG_FILE))
        .arg("config")
        .assert()
        .code(2)
        .stderr(contains("out of range"));
}

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;

const SCRIPT: &str = r#"
# two tasks, first one done
{"type": "ADD_ITEM", "payload": {"title": "buy milk"}}
{"type": "ADD_ITEM", "payload": {"title": "walk dog"}}

{"type": "TOGGLE_ITEM", "payload": {"id": "@1"}}
"#;

fn todos() -> Command {
    let mut cmd = Command::cargo_bin("todos").expect("binary");
    cmd.env_remove("TODOS_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn replay_json(args: &[&str], script: &str) -> Value {
    let output = todos()
        .arg("--json")
        .arg("replay")
        .args(args)
        .write_stdin(script)
        .output()
        .expect("run replay");
    assert!(
        output.status.success(),
        "replay failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json envelope")
}

#[test]
fn replay_reports_tasks_ranks_and_counts() {
    let envelope = replay_json(&["--seed", "7", "--start-ms", "1000"], SCRIPT);
    assert_eq!(envelope["schema_version"], "todos.v1");
    assert_eq!(envelope["command"], "replay");
    assert_eq!(envelope["status"], "success");

    let data = &envelope["data"];
    assert_eq!(data["route"], "all");
    assert_eq!(data["applied"], 3);
    assert_eq!(data["ignored"], 0);
    assert_eq!(data["counts"]["total"], 2);
    assert_eq!(data["counts"]["active"], 1);
    assert_eq!(data["counts"]["completed"], 1);

    let tasks = data["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 2);
    let milk = &tasks[0];
    assert_eq!(milk["title"], "buy milk");
    assert_eq!(milk["completed"], true);
    assert_eq!(milk["addedTime"], 1000);
    assert_eq!(milk["completedTime"], 3000);
    assert_eq!(milk["isLastCompleted"], 1);
    assert_eq!(milk["id"].as_str().map(str::len), Some(21));

    let dog = &tasks[1];
    assert_eq!(dog["completed"], false);
    assert_eq!(dog["completedTime"], Value::Null);
    assert_eq!(dog["colorChanged"], false);

    assert_eq!(data["top_completed"], serde_json::json!([milk["id"].clone()]));
}

#[test]
fn same_seed_gives_same_ids() {
    let first = replay_json(&["--seed", "42"], SCRIPT);
    let second = replay_json(&["--seed", "42"], SCRIPT);
    assert_eq!(
        first["data"]["tasks"][0]["id"],
        second["data"]["tasks"][0]["id"]
    );
    assert_ne!(
        first["data"]["tasks"][0]["id"],
        first["data"]["tasks"][1]["id"]
    );
}

#[test]
fn route_filters_printed_tasks() {
    let envelope = replay_json(&["--seed", "1", "--route", "#/active"], SCRIPT);
    let data = &envelope["data"];
    assert_eq!(data["route"], "active");
    let tasks = data["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "walk dog");
    assert_eq!(data["counts"]["total"], 2);
}

#[test]
fn human_output_lists_tasks() {
    todos()
        .args(["replay", "--seed", "1", "--route", "/completed"])
        .write_stdin(SCRIPT)
        .assert()
        .success()
        .stdout(contains("todos replay: 1 of 2 task(s) shown (completed)"))
        .stdout(contains("[x] buy milk  #1"));
}

#[test]
fn unknown_actions_are_counted_and_ignored() {
    let script = r#"{"type": "ADD_ITEM", "payload": {"title": "a"}}
{"type": "FROB_ITEM", "payload": {}}
{"type": "REMOVE_ITEM"}
{"type": "REMOVE_ITEM", "payload": {"id": "nope"}}"#;
    let envelope = replay_json(&["--seed", "3"], script);
    let data = &envelope["data"];
    assert_eq!(data["applied"], 4);
    assert_eq!(data["ignored"], 2);
    assert_eq!(data["counts"]["total"], 1);
    let warnings = envelope["warnings"].as_array().expect("warnings");
    assert!(warnings[0]
        .as_str()
        .is_some_and(|w| w.contains("2 unrecognized")));
}

#[test]
fn update_merges_and_remove_completed_prunes() {
    let script = r#"{"type": "ADD_ITEM", "payload": {"title": "a"}}
{"type": "ADD_ITEM", "payload": {"title": "b"}}
{"type": "ADD_ITEM", "payload": {"title": "c"}}
{"type": "UPDATE_ITEM", "payload": {"id": "@2", "title": "b!", "colorChanged": true}}
{"type": "TOGGLE_ITEM", "payload": {"id": "@1"}}
{"type": "REMOVE_COMPLETED_ITEMS"}"#;
    let envelope = replay_json(&["--seed", "9"], script);
    let tasks = envelope["data"]["tasks"].as_array().expect("tasks");
    let titles: Vec<_> = tasks.iter().map(|t| t["title"].clone()).collect();
    assert_eq!(titles, vec!["b!", "c"]);
    assert_eq!(tasks[0]["colorChanged"], true);
}

#[test]
fn toggle_refresh_leaves_stale_ranks() {
    let script = r#"{"type": "ADD_ITEM", "payload": {"title": "a"}}
{"type": "ADD_ITEM", "payload": {"title": "b"}}
{"type": "TOGGLE_ITEM", "payload": {"id": "@1"}}
{"type": "TOGGLE_ITEM", "payload": {"id": "@2"}}
{"type": "REMOVE_ITEM", "payload": {"id": "@2"}}"#;

    let fresh = replay_json(&["--seed", "5", "--start-ms", "0"], script);
    assert_eq!(fresh["data"]["tasks"][0]["isLastCompleted"], 1);

    let stale = replay_json(
        &["--seed", "5", "--start-ms", "0", "--refresh", "toggle"],
        script,
    );
    assert_eq!(stale["data"]["tasks"][0]["isLastCompleted"], 2);
    // The derived ranking is always current.
    assert_eq!(
        stale["data"]["top_completed"],
        serde_json::json!([stale["data"]["tasks"][0]["id"].clone()])
    );
}

#[test]
fn malformed_line_is_a_user_error() {
    let script = "{\"type\": \"ADD_ITEM\", \"payload\": {\"title\": \"a\"}}\n{oops\n";
    todos()
        .arg("replay")
        .write_stdin(script)
        .assert()
        .code(2)
        .stderr(contains("line 2"));

    let output = todos()
        .args(["--json", "replay"])
        .write_stdin(script)
        .output()
        .expect("run replay");
    assert_eq!(output.status.code(), Some(2));
    let envelope: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["error"]["kind"], "user_error");
    assert_eq!(envelope["error"]["details"]["line"], 2);
}

#[test]
fn dangling_reference_is_a_user_error() {
    todos()
        .arg("replay")
        .write_stdin("{\"type\": \"TOGGLE_ITEM\", \"payload\": {\"id\": \"@1\"}}\n")
        .assert()
        .code(2)
        .stderr(contains("@1"));
}

#[test]
fn missing_input_file_is_a_user_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    todos()
        .arg("replay")
        .arg(dir.path().join("absent.jsonl"))
        .assert()
        .code(2)
        .stderr(contains("does not exist"));
}

#[test]
fn replay_reads_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("actions.jsonl");
    std::fs::write(&path, SCRIPT).expect("write script");

    let output = todos()
        .args(["--json", "replay", "--seed", "2"])
        .arg(&path)
        .output()
        .expect("run replay");
    assert!(output.status.success());
    let envelope: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(envelope["data"]["counts"]["total"], 2);
}

#[test]
fn bad_refresh_value_is_rejected() {
    todos()
        .args(["replay", "--refresh", "sometimes"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(contains("every_mutation or toggle"));
}

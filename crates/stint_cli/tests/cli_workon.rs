use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("stint-{nanos}-{file_name}"))
}

fn run(store_path: &PathBuf, args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_stint");
    Command::new(exe)
        .args(args)
        .env("STINT_STORE_PATH", store_path)
        .output()
        .expect("failed to run stint")
}

fn load_tasks(store_path: &PathBuf) -> serde_json::Value {
    let content = std::fs::read_to_string(store_path).expect("store exists");
    serde_json::from_str::<serde_json::Value>(&content).expect("store is JSON")["tasks"].clone()
}

#[test]
fn workon_then_stop_records_one_interval() {
    let store_path = temp_path("cli-workon.json");

    assert!(run(&store_path, &["create", "demo"]).status.success());
    assert!(run(&store_path, &["workon", "demo"]).status.success());

    let tasks = load_tasks(&store_path);
    assert_eq!(tasks[0]["status"], "current");
    assert_eq!(tasks[0]["history"].as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["history"][0]["is_start"], true);

    let output = run(&store_path, &["stop"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Stopped working on: demo (1)"));

    let tasks = load_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(tasks[0]["status"], "in_progress");
    let history = tasks[0]["history"].as_array().unwrap().clone();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["is_start"], false);
    assert!(history[0]["time"].as_i64().unwrap() < history[1]["time"].as_i64().unwrap());
}

#[test]
fn workon_switches_the_current_task() {
    let store_path = temp_path("cli-workon-switch.json");

    assert!(run(&store_path, &["create", "first"]).status.success());
    assert!(run(&store_path, &["create", "second"]).status.success());
    assert!(run(&store_path, &["workon", "first"]).status.success());
    assert!(run(&store_path, &["workon", "second"]).status.success());

    let tasks = load_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(tasks[0]["name"], "first");
    assert_eq!(tasks[0]["status"], "in_progress");
    assert_eq!(tasks[0]["history"].as_array().unwrap().len(), 2);
    assert_eq!(tasks[1]["name"], "second");
    assert_eq!(tasks[1]["status"], "current");
    assert_eq!(tasks[1]["history"].as_array().unwrap().len(), 1);
}

#[test]
fn workon_twice_reports_already_working() {
    let store_path = temp_path("cli-workon-twice.json");

    assert!(run(&store_path, &["create", "demo"]).status.success());
    assert!(run(&store_path, &["workon", "demo"]).status.success());
    let output = run(&store_path, &["workon", "demo"]);

    std::fs::remove_file(&store_path).ok();
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: already_working"));
}

#[test]
fn workon_create_builds_the_task_first() {
    let store_path = temp_path("cli-workon-create.json");

    let output = run(&store_path, &["workon", "brand new", "--create", "-e", "2"]);
    let tasks = load_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert_eq!(tasks[0]["name"], "brand new");
    assert_eq!(tasks[0]["estimate"], 2);
    assert_eq!(tasks[0]["status"], "current");
}

#[test]
fn workon_unknown_task_exits_not_found() {
    let store_path = temp_path("cli-workon-missing.json");

    let output = run(&store_path, &["workon", "ghost"]);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: not_found"));
}

#[test]
fn ambiguous_identifier_exits_ambiguous() {
    let store_path = temp_path("cli-workon-ambiguous.json");

    assert!(run(&store_path, &["create", "write docs"]).status.success());
    assert!(run(&store_path, &["create", "write tests"]).status.success());
    let output = run(&store_path, &["workon", "write"]);

    std::fs::remove_file(&store_path).ok();
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: ambiguous"));
}

#[test]
fn stop_without_current_task_exits_no_current() {
    let store_path = temp_path("cli-stop-none.json");

    assert!(run(&store_path, &["create", "demo"]).status.success());
    let output = run(&store_path, &["stop"]);

    std::fs::remove_file(&store_path).ok();
    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: no_current_task"));
}

#[test]
fn finish_and_restart_round_trip() {
    let store_path = temp_path("cli-finish-restart.json");

    assert!(run(&store_path, &["create", "demo"]).status.success());
    assert!(run(&store_path, &["workon", "demo"]).status.success());

    let output = run(&store_path, &["finish"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Finished: demo (1)"));

    let tasks = load_tasks(&store_path);
    assert_eq!(tasks[0]["status"], "finished");
    assert_eq!(tasks[0]["history"].as_array().unwrap().len(), 2);

    let output = run(&store_path, &["restart", "demo"]);
    assert!(output.status.success());

    let tasks = load_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(tasks[0]["status"], "current");
    assert_eq!(tasks[0]["history"].as_array().unwrap().len(), 3);
}

#[test]
fn finish_rejects_a_task_never_worked_on() {
    let store_path = temp_path("cli-finish-todo.json");

    assert!(run(&store_path, &["create", "demo"]).status.success());
    let output = run(&store_path, &["finish", "demo"]);

    std::fs::remove_file(&store_path).ok();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("never worked on"));
}

#[test]
fn estimate_updates_the_current_task() {
    let store_path = temp_path("cli-estimate.json");

    assert!(run(&store_path, &["create", "demo"]).status.success());
    assert!(run(&store_path, &["workon", "demo"]).status.success());
    let output = run(&store_path, &["estimate", "4"]);

    let tasks = load_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("4 hrs"));
    assert_eq!(tasks[0]["estimate"], 4);
}

#[test]
fn rm_force_deletes_without_prompting() {
    let store_path = temp_path("cli-rm.json");

    assert!(run(&store_path, &["create", "demo"]).status.success());
    let output = run(&store_path, &["rm", "demo", "--force"]);

    let tasks = load_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Removed task: demo (1)"));
    assert!(tasks.as_array().unwrap().is_empty());
}

#[test]
fn rm_without_confirmation_keeps_the_task() {
    let store_path = temp_path("cli-rm-keep.json");

    assert!(run(&store_path, &["create", "demo"]).status.success());
    // Stdin is closed, so the y/N prompt reads EOF and defaults to no.
    let output = run(&store_path, &["rm", "demo"]);

    let tasks = load_tasks(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Kept task: demo (1)"));
    assert_eq!(tasks.as_array().unwrap().len(), 1);
}

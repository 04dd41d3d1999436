//! `todos replay`: apply a JSONL action script and print the result.
//!
//! Lines are applied in order. Blank lines and lines starting with `#`
//! are skipped. A payload id written as `@N` refers to the task created
//! by the N-th `ADD_ITEM` of the script, since ids are only known once
//! the action has run.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::action::Action;
use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::id::RandomIds;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::reducer::RankRefresh;
use crate::selector::{self, Counts, Route};
use crate::store::{SteppedClock, TaskStore};
use crate::task::{format_clock_time, Task};

pub struct ReplayOptions {
    pub input: PathBuf,
    pub route: Route,
    pub seed: Option<u64>,
    pub start_ms: Option<i64>,
    pub step_ms: i64,
    pub refresh: RankRefresh,
    pub events: Option<EventSink>,
    pub output: OutputOptions,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    route: Route,
    applied: usize,
    ignored: usize,
    tasks: Vec<Task>,
    top_completed: Vec<String>,
    counts: Counts,
}

pub fn run(opts: ReplayOptions) -> Result<()> {
    info!(input = %opts.input.display(), route = %opts.route, "command replay");
    let script = read_script(&opts.input)?;

    let mut store = TaskStore::new()
        .with_refresh(opts.refresh)
        .with_events(opts.events);
    if let Some(seed) = opts.seed {
        store = store.with_ids(RandomIds::seeded(seed));
    }
    if let Some(start) = opts.start_ms {
        if opts.step_ms < 0 {
            return Err(Error::InvalidArgument(
                "--step-ms cannot be negative".to_string(),
            ));
        }
        store = store.with_clock(SteppedClock::new(start, opts.step_ms));
    }

    let mut added: Vec<String> = Vec::new();
    let mut applied = 0;
    let mut ignored = 0;
    for (idx, line) in script.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut value = decode_line(trimmed, line_no)?;
        resolve_refs(&mut value, &added, line_no)?;
        let action = Action::from_value(&value);
        if let Action::Unrecognized { reason, .. } = &action {
            warn!(line = line_no, reason = %reason, "ignoring unrecognized action");
            ignored += 1;
        }

        let outcome = store.dispatch(&action)?;
        if let Some(id) = outcome.added {
            added.push(id);
        }
        applied += 1;
    }

    let tasks = store.tasks();
    let report = ReplayReport {
        route: opts.route,
        applied,
        ignored,
        tasks: selector::visible(tasks, opts.route)
            .into_iter()
            .cloned()
            .collect(),
        top_completed: selector::top_completed(tasks),
        counts: selector::counts(tasks),
    };

    let human = render_human(&report);
    emit_success(opts.output, "replay", &report, Some(&human))
}

fn read_script(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    if !input.exists() {
        return Err(Error::InvalidArgument(format!(
            "replay input '{}' does not exist",
            input.display()
        )));
    }
    Ok(std::fs::read_to_string(input)?)
}

fn decode_line(line: &str, line_no: usize) -> Result<Value> {
    serde_json::from_str(line).map_err(|err| Error::MalformedInput {
        line: line_no,
        reason: err.to_string(),
    })
}

/// Replace a `payload.id` of the form `@N` with the N-th added id.
fn resolve_refs(value: &mut Value, added: &[String], line_no: usize) -> Result<()> {
    let Some(id) = value.pointer_mut("/payload/id") else {
        return Ok(());
    };
    let Some(reference) = id.as_str().and_then(|raw| raw.strip_prefix('@')) else {
        return Ok(());
    };
    let Ok(index) = reference.parse::<usize>() else {
        return Ok(());
    };

    match index.checked_sub(1).and_then(|pos| added.get(pos)) {
        Some(resolved) => {
            *id = Value::String(resolved.clone());
            Ok(())
        }
        None => Err(Error::MalformedInput {
            line: line_no,
            reason: format!(
                "@{index} does not name an added task ({} added so far)",
                added.len()
            ),
        }),
    }
}

fn render_human(report: &ReplayReport) -> HumanOutput {
    let mut human = HumanOutput::new(format!(
        "todos replay: {} of {} task(s) shown ({})",
        report.tasks.len(),
        report.counts.total,
        report.route.label().to_lowercase()
    ));
    human.push_summary("applied", report.applied.to_string());
    if report.ignored > 0 {
        human.push_summary("ignored", report.ignored.to_string());
    }
    human.push_summary("active", report.counts.active.to_string());
    human.push_summary("completed", report.counts.completed.to_string());

    for task in &report.tasks {
        let rank = selector::rank_of(&report.top_completed, &task.id);
        human.push_line(task_line(task, rank));
    }
    if report.ignored > 0 {
        human.push_warning(format!(
            "{} unrecognized action(s) had no effect",
            report.ignored
        ));
        human.push_hint("rerun with RUST_LOG=todos=warn to see which lines were skipped");
    }
    human
}

/// `[x] buy milk  #1  added 3:04:05 PM  completed 3:05:00 PM`
fn task_line(task: &Task, rank: u8) -> String {
    let marker = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{marker} {}", task.title);
    if rank > 0 {
        line.push_str(&format!("  #{rank}"));
    }
    if task.is_new() {
        line.push_str("  (new)");
    }
    line.push_str(&format!("  added {}", format_clock_time(task.added_time)));
    if let Some(completed) = task.completed_time {
        line.push_str(&format!("  completed {}", format_clock_time(completed)));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_line_reports_line_number() {
        let err = decode_line("{not json", 7).expect_err("malformed");
        match err {
            Error::MalformedInput { line, .. } => assert_eq!(line, 7),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn refs_resolve_to_added_ids() {
        let added = vec!["first".to_string(), "second".to_string()];
        let mut value = json!({"type": "TOGGLE_ITEM", "payload": {"id": "@2"}});
        resolve_refs(&mut value, &added, 1).expect("resolve");
        assert_eq!(value["payload"]["id"], "second");

        let mut literal = json!({"type": "TOGGLE_ITEM", "payload": {"id": "plain"}});
        resolve_refs(&mut literal, &added, 1).expect("literal");
        assert_eq!(literal["payload"]["id"], "plain");

        let mut missing = json!({"type": "TOGGLE_ITEM", "payload": {"id": "@3"}});
        assert!(matches!(
            resolve_refs(&mut missing, &added, 4),
            Err(Error::MalformedInput { line: 4, .. })
        ));

        let mut zero = json!({"type": "TOGGLE_ITEM", "payload": {"id": "@0"}});
        assert!(resolve_refs(&mut zero, &added, 1).is_err());
    }

    #[test]
    fn task_line_marks_rank_and_newness() {
        let mut task = Task::new("a", "buy milk", 0);
        assert!(task_line(&task, 0).starts_with("[ ] buy milk  (new)"));

        task.completed = true;
        task.completed_time = Some(1_000);
        let line = task_line(&task, 2);
        assert!(line.starts_with("[x] buy milk  #2  added"));
        assert!(line.contains("completed"));
    }
}

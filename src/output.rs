//! Command output: a plain-text report or the `todos.v1` JSON envelope.
//!
//! Human reports look like
//!
//! ```text
//! todos replay: 1 of 2 task(s) shown (completed)
//! applied 3, active 1, completed 1
//!
//!   [x] buy milk  #1  added 3:04:05 PM  completed 3:04:07 PM
//! warning: 1 unrecognized action(s) had no effect
//! hint: rerun with RUST_LOG=todos=warn to see which lines were skipped
//! ```

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "todos.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    lines: Vec<String>,
    warnings: Vec<String>,
    hints: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            lines: Vec::new(),
            warnings: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// One `key value` pair of the summary line.
    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    /// One indented body line, e.g. a task.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn push_hint(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut text = output.header.clone();

    if !output.summary.is_empty() {
        let summary: Vec<String> = output
            .summary
            .iter()
            .map(|(key, value)| format!("{key} {value}"))
            .collect();
        text.push('\n');
        text.push_str(&summary.join(", "));
    }
    if !output.lines.is_empty() {
        text.push('\n');
        for line in &output.lines {
            text.push_str("\n  ");
            text.push_str(line);
        }
    }
    for warning in &output.warnings {
        text.push_str("\nwarning: ");
        text.push_str(warning);
    }
    for hint in &output.hints {
        text.push_str("\nhint: ");
        text.push_str(hint);
    }
    text
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hints: Vec<String>,
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let envelope = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data: Some(data),
            error: None,
            warnings: human.map(|h| h.warnings.clone()).unwrap_or_default(),
            hints: human.map(|h| h.hints.clone()).unwrap_or_default(),
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if let Some(human) = human.filter(|_| !options.quiet) {
        println!("{}", format_human(human));
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hints = error_hints(err);
    if json {
        let envelope: Envelope<'_, ()> = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            data: None,
            error: Some(ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            }),
            warnings: Vec::new(),
            hints,
        };
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    for hint in &hints {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

/// First positional argument, or `tui` when none is given.
pub fn infer_command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "--events" {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return arg;
    }
    "tui".to_string()
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        crate::error::exit_codes::USER_ERROR => "user_error",
        _ => "operation_failed",
    }
}

fn error_hints(err: &Error) -> Vec<String> {
    match err {
        Error::InvalidConfig(_) | Error::TomlParse(_) => {
            vec!["fix the config file then retry".to_string()]
        }
        Error::ConfigNotFound(_) => vec!["check --config or TODOS_CONFIG".to_string()],
        Error::MalformedInput { .. } => {
            vec!["each line must be one JSON action, e.g. {\"type\": \"ADD_ITEM\", \"payload\": {\"title\": \"...\"}}".to_string()]
        }
        _ => Vec::new(),
    }
}

//! Error types for todos
//!
//! The reducer itself never fails. Errors only come from the edges:
//! configuration, replay input, and the terminal.
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, invalid or unparsable config, malformed replay input)
//! - 4: Operation failed (io, serialization, terminal)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the todos CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for todos operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed action on line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::ConfigNotFound(_)
            | Error::InvalidArgument(_)
            | Error::MalformedInput { .. }
            | Error::TomlParse(_) => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlSerialize(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::MalformedInput { line, .. } => Some(serde_json::json!({ "line": line })),
            Error::ConfigNotFound(path) => {
                Some(serde_json::json!({ "path": path.to_string_lossy() }))
            }
            _ => None,
        }
    }
}

/// Result type alias for todos operations
pub type Result<T> = std::result::Result<T, Error>;

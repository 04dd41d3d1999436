use std::path::PathBuf;

use serde_json::Value;
use todos::error::{exit_codes, Error};

#[test]
fn exit_code_user_error() {
    let err = Error::InvalidArgument("bad input".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn exit_code_config_errors() {
    assert_eq!(
        Error::InvalidConfig("attention.delay must be > 0".to_string()).exit_code(),
        exit_codes::USER_ERROR
    );
    assert_eq!(
        Error::ConfigNotFound(PathBuf::from("missing.toml")).exit_code(),
        exit_codes::USER_ERROR
    );
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn details_include_line_and_path() {
    let err = Error::MalformedInput {
        line: 4,
        reason: "expected value".to_string(),
    };
    let details = err.details().expect("details");
    assert_eq!(details["line"], Value::from(4));

    let err = Error::ConfigNotFound(PathBuf::from("conf/todos.toml"));
    let details = err.details().expect("details");
    assert_eq!(details["path"], Value::String("conf/todos.toml".to_string()));
}

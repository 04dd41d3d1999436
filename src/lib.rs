//! todos - a to-do list with a pure reducer at its core
//!
//! The list lives in an immutable [`task::TaskList`]. Every change is an
//! [`action::Action`] applied by [`reducer::reduce`], which returns either
//! the very same list (nothing changed) or a new one. Everything the UI
//! shows is derived by the functions in [`selector`].
//!
//! # Module Organization
//!
//! - `task`: the task record and the shared list snapshot
//! - `action`: actions, patches and their JSON wire form
//! - `reducer`: the state transition function and rank assignment
//! - `selector`: routes, visibility, completion ranking and counts
//! - `id`: random task ids
//! - `store`: clock, id source and event sink around the reducer
//! - `attention`: per-task countdowns that fade new tasks
//! - `events`: JSONL event stream of applied actions
//! - `config`: `.todos.toml` discovery and loading
//! - `output`: human and JSON command output
//! - `cli`: command-line interface using clap
//! - `ui`: interactive terminal list

pub mod action;
pub mod attention;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod id;
pub mod output;
pub mod reducer;
pub mod selector;
pub mod store;
pub mod task;
pub mod ui;

pub use error::{Error, Result};

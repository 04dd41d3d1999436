//! Task records and the shared task list value.
//!
//! A `TaskList` is never mutated in place. Every transition builds a new
//! list, and a transition that changes nothing hands back the same value,
//! so `TaskList::ptr_eq` is a cheap "did anything happen" check.

use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Highest rank handed out to recently completed tasks.
pub const MAX_RANK: u8 = 3;

/// A single to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    pub added_time: Millis,
    #[serde(default)]
    pub completed_time: Option<Millis>,
    #[serde(default)]
    pub color_changed: bool,
    /// 1..=3 for the most recently completed tasks, 0 otherwise.
    #[serde(default)]
    pub is_last_completed: u8,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, added_time: Millis) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            added_time,
            completed_time: None,
            color_changed: false,
            is_last_completed: 0,
        }
    }

    /// A task is "new" until its attention period has elapsed.
    pub fn is_new(&self) -> bool {
        !self.completed && !self.color_changed
    }

    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.added_time).single()
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

/// Render a timestamp as local wall-clock time, e.g. `3:04:05 PM`.
pub fn format_clock_time(ms: Millis) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(at) => at.format("%-I:%M:%S %p").to_string(),
        None => "-".to_string(),
    }
}

/// Immutable, shareable ordered list of tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskList(Arc<Vec<Task>>);

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when both handles point at the same list value.
    pub fn ptr_eq(&self, other: &TaskList) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.0.iter().find(|task| task.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<Task> {
        self.0.as_ref().clone()
    }
}

impl Deref for TaskList {
    type Target = [Task];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Task>> for TaskList {
    fn from(tasks: Vec<Task>) -> Self {
        Self(Arc::new(tasks))
    }
}

impl FromIterator<Task> for TaskList {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl PartialEq for TaskList {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0 == other.0
    }
}

impl Eq for TaskList {}

impl Serialize for TaskList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<Task>::deserialize(deserializer).map(TaskList::from)
    }
}

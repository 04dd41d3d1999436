//! Derived views over a task list.
//!
//! Nothing here is stored: route filtering, the recently-completed ranking
//! and the footer counts are recomputed from the list on every call.

use std::cmp::Reverse;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::{Task, MAX_RANK};

/// View filter chosen by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    #[default]
    All,
    Active,
    Completed,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::All, Route::Active, Route::Completed];

    /// Lenient parse: `/active`, `#/active`, `active` and `ACTIVE` all
    /// select the active view. Anything unknown is the default view.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        match trimmed.to_ascii_lowercase().as_str() {
            "active" => Route::Active,
            "completed" => Route::Completed,
            _ => Route::All,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::All => "/",
            Route::Active => "/active",
            Route::Completed => "/completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Route::All => "All",
            Route::Active => "Active",
            Route::Completed => "Completed",
        }
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Route::All => true,
            Route::Active => !task.completed,
            Route::Completed => task.completed,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Tasks visible under `route`, in list order.
pub fn visible(tasks: &[Task], route: Route) -> Vec<&Task> {
    tasks.iter().filter(|task| route.matches(task)).collect()
}

/// Indices of completed tasks, most recently completed first.
///
/// The sort is stable, so equal completion times keep list order. A
/// completed task without a completion time sorts after all timed ones.
pub fn completion_order(tasks: &[Task]) -> Vec<usize> {
    let mut order: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.completed)
        .map(|(idx, _)| idx)
        .collect();
    order.sort_by_key(|&idx| Reverse(tasks[idx].completed_time));
    order
}

/// Ids of the (up to) three most recently completed tasks.
pub fn top_completed(tasks: &[Task]) -> Vec<String> {
    completion_order(tasks)
        .into_iter()
        .take(MAX_RANK as usize)
        .map(|idx| tasks[idx].id.clone())
        .collect()
}

/// Rank of `id` within `top`, 1-based, or 0 when it is not ranked.
pub fn rank_of(top: &[String], id: &str) -> u8 {
    top.iter()
        .position(|candidate| candidate == id)
        .map(|pos| pos as u8 + 1)
        .unwrap_or(0)
}

/// State of the toggle-all control.
pub fn all_completed(tasks: &[Task]) -> bool {
    !tasks.is_empty() && tasks.iter().all(|task| task.completed)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

pub fn counts(tasks: &[Task]) -> Counts {
    let completed = tasks.iter().filter(|task| task.completed).count();
    Counts {
        total: tasks.len(),
        active: tasks.len() - completed,
        completed,
    }
}

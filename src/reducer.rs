//! The task store reducer.
//!
//! `reduce` maps (list, action) to a new list. It performs no I/O; the
//! only inputs besides the list and the action are the current time and
//! a source of fresh ids, both supplied by the caller through
//! [`ReduceContext`].

use serde::{Deserialize, Serialize};

use crate::action::{Action, TaskPatch};
use crate::id::{fresh_id, IdSource};
use crate::selector::completion_order;
use crate::task::{Millis, Task, TaskList, MAX_RANK};

/// When the stored `isLastCompleted` ranks are refreshed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankRefresh {
    /// After every action that changes the list.
    #[default]
    EveryMutation,
    /// Only after `TOGGLE_ITEM`; other actions leave ranks stale.
    Toggle,
}

impl std::str::FromStr for RankRefresh {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "every_mutation" | "every-mutation" => Ok(RankRefresh::EveryMutation),
            "toggle" => Ok(RankRefresh::Toggle),
            _ => Err(crate::error::Error::InvalidArgument(format!(
                "invalid rank refresh '{}': must be every_mutation or toggle",
                s
            ))),
        }
    }
}

/// Everything a transition may depend on besides the list itself.
pub struct ReduceContext<'a> {
    pub now: Millis,
    pub ids: &'a mut dyn IdSource,
    pub refresh: RankRefresh,
}

impl<'a> ReduceContext<'a> {
    pub fn new(now: Millis, ids: &'a mut dyn IdSource) -> Self {
        Self {
            now,
            ids,
            refresh: RankRefresh::default(),
        }
    }

    pub fn with_refresh(mut self, refresh: RankRefresh) -> Self {
        self.refresh = refresh;
        self
    }
}

/// Apply one action. Never fails. Unknown actions, and REMOVE or UPDATE
/// of an unknown id, return `tasks` itself.
pub fn reduce(tasks: &TaskList, action: &Action, ctx: &mut ReduceContext<'_>) -> TaskList {
    let mut next = match action {
        Action::AddItem { title } => {
            let id = fresh_id(ctx.ids, |candidate| tasks.contains(candidate));
            let mut next = tasks.to_vec();
            next.push(Task::new(id, title.clone(), ctx.now));
            next
        }
        Action::RemoveItem { id } => {
            if !tasks.contains(id) {
                return tasks.clone();
            }
            tasks.iter().filter(|task| task.id != *id).cloned().collect()
        }
        Action::UpdateItem { id, patch } => {
            if !tasks.contains(id) {
                return tasks.clone();
            }
            tasks
                .iter()
                .map(|task| {
                    if task.id == *id {
                        merge(task, patch)
                    } else {
                        task.clone()
                    }
                })
                .collect()
        }
        Action::ToggleItem { id } => {
            let mut next: Vec<Task> = tasks
                .iter()
                .map(|task| {
                    if task.id == *id {
                        toggled(task, ctx.now)
                    } else {
                        task.clone()
                    }
                })
                .collect();
            assign_ranks(&mut next);
            return TaskList::from(next);
        }
        Action::ToggleAll { .. } => {
            let all_done = tasks.iter().all(|task| task.completed);
            tasks
                .iter()
                .map(|task| Task {
                    completed: !all_done,
                    ..task.clone()
                })
                .collect()
        }
        Action::RemoveAllItems => Vec::new(),
        Action::RemoveCompletedItems => tasks
            .iter()
            .filter(|task| !task.completed)
            .cloned()
            .collect(),
        Action::Unrecognized { .. } => return tasks.clone(),
    };

    if ctx.refresh == RankRefresh::EveryMutation {
        assign_ranks(&mut next);
    }
    TaskList::from(next)
}

/// Shallow merge. `colorChanged` never goes back to false.
fn merge(task: &Task, patch: &TaskPatch) -> Task {
    let mut merged = task.clone();
    if let Some(title) = &patch.title {
        merged.title = title.clone();
    }
    if let Some(completed) = patch.completed {
        merged.completed = completed;
    }
    if let Some(added_time) = patch.added_time {
        merged.added_time = added_time;
    }
    if let Some(completed_time) = patch.completed_time {
        merged.completed_time = completed_time;
    }
    if let Some(color_changed) = patch.color_changed {
        merged.color_changed = task.color_changed || color_changed;
    }
    merged
}

fn toggled(task: &Task, now: Millis) -> Task {
    let completed = !task.completed;
    Task {
        completed,
        completed_time: completed.then_some(now),
        ..task.clone()
    }
}

/// Rank the three most recently completed tasks 1, 2, 3; everyone else 0.
pub fn assign_ranks(tasks: &mut [Task]) {
    let order = completion_order(tasks);
    for task in tasks.iter_mut() {
        task.is_last_completed = 0;
    }
    for (pos, idx) in order.into_iter().take(MAX_RANK as usize).enumerate() {
        tasks[idx].is_last_completed = pos as u8 + 1;
    }
}

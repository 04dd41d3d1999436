//! Attention countdowns for newly added tasks.
//!
//! New tasks are drawn in an attention color until a fixed delay has
//! passed, after which the presentation layer dispatches one
//! `UPDATE_ITEM {colorChanged: true}` for them. The reducer knows nothing
//! about time passing; this registry is driven by whoever owns the loop.

use std::collections::HashMap;

use chrono::Duration;

use crate::action::{Action, TaskPatch};
use crate::task::{Millis, Task};

pub const DEFAULT_DELAY_SECS: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    started: Millis,
    due: Millis,
}

#[derive(Debug, Clone)]
pub struct AttentionTimers {
    delay: Millis,
    timers: HashMap<String, Countdown>,
}

impl Default for AttentionTimers {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_DELAY_SECS))
    }
}

impl AttentionTimers {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay: delay.num_milliseconds().max(0),
            timers: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn is_running(&self, id: &str) -> bool {
        self.timers.contains_key(id)
    }

    /// Reconcile timers with the current list: start one for every new
    /// task that has none, and drop timers whose task was removed,
    /// completed or already faded.
    pub fn sync(&mut self, tasks: &[Task], now: Millis) {
        let live: HashMap<&str, &Task> = tasks
            .iter()
            .filter(|task| task.is_new())
            .map(|task| (task.id.as_str(), task))
            .collect();

        let before = self.timers.len();
        self.timers.retain(|id, _| live.contains_key(id.as_str()));
        let cancelled = before - self.timers.len();

        let mut started = 0;
        for id in live.keys() {
            if !self.timers.contains_key(*id) {
                self.timers.insert(
                    (*id).to_string(),
                    Countdown {
                        started: now,
                        due: now.saturating_add(self.delay),
                    },
                );
                started += 1;
            }
        }

        if started > 0 || cancelled > 0 {
            tracing::debug!(started, cancelled, running = self.timers.len(), "attention timers synced");
        }
    }

    /// Expire every timer due at `now`. Each expired timer yields exactly
    /// one action and is forgotten.
    pub fn fire_due(&mut self, now: Millis) -> Vec<Action> {
        let mut due: Vec<(String, Millis)> = self
            .timers
            .iter()
            .filter(|(_, countdown)| countdown.due <= now)
            .map(|(id, countdown)| (id.clone(), countdown.due))
            .collect();
        due.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        due.into_iter()
            .map(|(id, _)| {
                self.timers.remove(&id);
                Action::update(id, TaskPatch::color_changed())
            })
            .collect()
    }

    /// Whole seconds left, rounded up, for "Changes in Ns".
    pub fn remaining(&self, id: &str, now: Millis) -> Option<u64> {
        let countdown = self.timers.get(id)?;
        let left = (countdown.due - now).max(0);
        Some(((left + 999) / 1000) as u64)
    }

    /// Elapsed fraction of the countdown, 0.0 to 1.0.
    pub fn progress(&self, id: &str, now: Millis) -> Option<f64> {
        let countdown = self.timers.get(id)?;
        let total = countdown.due - countdown.started;
        if total <= 0 {
            return Some(1.0);
        }
        let elapsed = (now - countdown.started).clamp(0, total);
        Some(elapsed as f64 / total as f64)
    }

    /// Earliest pending deadline.
    pub fn next_due(&self) -> Option<Millis> {
        self.timers.values().map(|countdown| countdown.due).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(id: &str) -> Task {
        Task::new(id, id, 0)
    }

    fn timers() -> AttentionTimers {
        AttentionTimers::new(Duration::seconds(15))
    }

    #[test]
    fn fires_once_and_not_before_delay() {
        let mut timers = timers();
        let tasks = vec![fresh("a")];
        timers.sync(&tasks, 1_000);
        assert!(timers.is_running("a"));

        assert!(timers.fire_due(15_999).is_empty());
        let fired = timers.fire_due(16_000);
        assert_eq!(fired, vec![Action::update("a", TaskPatch::color_changed())]);
        assert!(timers.fire_due(30_000).is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn sync_cancels_completed_and_removed_tasks() {
        let mut timers = timers();
        let mut tasks = vec![fresh("a"), fresh("b"), fresh("c")];
        timers.sync(&tasks, 0);
        assert_eq!(timers.len(), 3);

        tasks[0].completed = true;
        tasks[1].color_changed = true;
        tasks.pop();
        timers.sync(&tasks, 100);
        assert!(timers.is_empty());
        assert!(timers.fire_due(100_000).is_empty());
    }

    #[test]
    fn sync_does_not_restart_running_timers() {
        let mut timers = timers();
        let tasks = vec![fresh("a")];
        timers.sync(&tasks, 0);
        timers.sync(&tasks, 10_000);
        assert_eq!(timers.next_due(), Some(15_000));
    }

    #[test]
    fn uncompleting_restarts_the_countdown() {
        let mut timers = timers();
        let mut tasks = vec![fresh("a")];
        timers.sync(&tasks, 0);
        tasks[0].completed = true;
        timers.sync(&tasks, 5_000);
        tasks[0].completed = false;
        timers.sync(&tasks, 6_000);
        assert_eq!(timers.next_due(), Some(21_000));
    }

    #[test]
    fn remaining_and_progress() {
        let mut timers = timers();
        timers.sync(&[fresh("a")], 0);
        assert_eq!(timers.remaining("a", 0), Some(15));
        assert_eq!(timers.remaining("a", 14_001), Some(1));
        assert_eq!(timers.remaining("a", 20_000), Some(0));
        assert_eq!(timers.progress("a", 0), Some(0.0));
        assert_eq!(timers.progress("a", 7_500), Some(0.5));
        assert_eq!(timers.progress("a", 99_000), Some(1.0));
        assert_eq!(timers.remaining("missing", 0), None);
    }

    #[test]
    fn fire_due_orders_by_deadline() {
        let mut timers = timers();
        timers.sync(&[fresh("late")], 5_000);
        timers.sync(&[fresh("late"), fresh("early")], 1_000);
        let fired = timers.fire_due(60_000);
        let ids: Vec<_> = fired.iter().filter_map(|a| a.target()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }
}

//! Task store: owns the current list and applies actions to it.
//!
//! The store is the only place the list is replaced. Each dispatch runs
//! the pure reducer, swaps in the resulting list wholesale, logs the
//! transition and, when an event sink is attached, emits one event.

use std::cell::Cell;

use chrono::{TimeZone, Utc};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::action::Action;
use crate::error::Result;
use crate::events::{Event, EventKind, EventSink};
use crate::id::{IdSource, RandomIds};
use crate::reducer::{reduce, RankRefresh, ReduceContext};
use crate::task::{Millis, TaskList};

/// Wall-clock source for creation and completion timestamps.
pub trait Clock {
    fn now(&self) -> Millis;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        Utc::now().timestamp_millis()
    }
}

/// Clock that starts at a fixed instant and advances by `step` on every
/// reading. Used by replays that need reproducible output.
#[derive(Debug)]
pub struct SteppedClock {
    next: Cell<Millis>,
    step: Millis,
}

impl SteppedClock {
    pub fn new(start: Millis, step: Millis) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> Millis {
        let now = self.next.get();
        self.next.set(now.saturating_add(self.step));
        now
    }
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    /// False when the reducer handed back the same list value.
    pub changed: bool,
    /// Id assigned by an `ADD_ITEM`.
    pub added: Option<String>,
}

pub struct TaskStore {
    tasks: TaskList,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdSource>,
    refresh: RankRefresh,
    events: Option<EventSink>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: TaskList::new(),
            clock: Box::new(SystemClock),
            ids: Box::new(RandomIds::from_entropy()),
            refresh: RankRefresh::default(),
            events: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_ids(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_refresh(mut self, refresh: RankRefresh) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_events(mut self, sink: Option<EventSink>) -> Self {
        self.events = sink;
        self
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn refresh(&self) -> RankRefresh {
        self.refresh
    }

    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    /// Apply `action`. Only a failing event sink can make this fail; the
    /// list has already been replaced by then.
    #[instrument(level = "debug", skip(self, action), fields(action = action.kind()))]
    pub fn dispatch(&mut self, action: &Action) -> Result<Dispatched> {
        let now = self.clock.now();
        let previous = self.tasks.clone();
        let next = {
            let mut ctx = ReduceContext::new(now, self.ids.as_mut()).with_refresh(self.refresh);
            reduce(&previous, action, &mut ctx)
        };
        let changed = !next.ptr_eq(&previous);
        self.tasks = next;

        let added = match action {
            Action::AddItem { .. } if changed => self.tasks.last().map(|task| task.id.clone()),
            _ => None,
        };

        if let Action::Unrecognized { reason, .. } = action {
            warn!(reason = %reason, "ignored unrecognized action");
        } else if !changed {
            debug!(target_id = ?action.target(), "action matched no task");
        } else {
            debug!(
                before = previous.len(),
                after = self.tasks.len(),
                "applied action"
            );
        }

        if self.events.is_some() {
            let event = self.describe(action, &previous, now)?;
            if let Some(sink) = self.events.as_mut() {
                sink.emit(&event)?;
            }
        }

        Ok(Dispatched { changed, added })
    }

    fn describe(
        &self,
        action: &Action,
        previous: &TaskList,
        now: Millis,
    ) -> Result<Event> {
        let timestamp = Utc
            .timestamp_millis_opt(now)
            .single()
            .unwrap_or_else(Utc::now);
        let target_found = action.target().map(|id| previous.contains(id));

        let (kind, data) = match action {
            Action::Unrecognized { kind, reason } => (
                EventKind::ActionIgnored,
                json!({ "type": kind, "reason": reason }),
            ),
            _ if target_found == Some(false) => (
                EventKind::ActionIgnored,
                json!({ "type": action.kind(), "id": action.target(), "reason": "no task with this id" }),
            ),
            Action::AddItem { .. } => (
                EventKind::TaskAdded,
                serde_json::to_value(self.tasks.last())?,
            ),
            Action::RemoveItem { id } => (EventKind::TaskRemoved, json!({ "id": id })),
            Action::UpdateItem { id, patch } => (
                EventKind::TaskUpdated,
                json!({ "id": id, "patch": patch, "task": self.tasks.find(id) }),
            ),
            Action::ToggleItem { id } => (
                EventKind::TaskToggled,
                serde_json::to_value(self.tasks.find(id))?,
            ),
            Action::ToggleAll { completed } => (
                EventKind::AllToggled,
                json!({
                    "requested": completed,
                    "completed": self.tasks.iter().all(|task| task.completed),
                    "count": self.tasks.len(),
                }),
            ),
            Action::RemoveAllItems => (
                EventKind::AllRemoved,
                json!({ "removed": previous.len() }),
            ),
            Action::RemoveCompletedItems => (
                EventKind::CompletedRemoved,
                json!({ "removed": previous.len() - self.tasks.len() }),
            ),
        };

        Event::new(kind, timestamp).with_data(data)
    }
}

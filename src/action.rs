//! The action protocol: tagged requests to transition the task list.
//!
//! Actions travel as JSON objects of the form
//! `{"type": "ADD_ITEM", "payload": {"title": "buy milk"}}`. Decoding is
//! total. Anything that does not name a known action with a fitting
//! payload becomes [`Action::Unrecognized`], which the reducer ignores.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::task::Millis;

pub const ADD_ITEM: &str = "ADD_ITEM";
pub const REMOVE_ITEM: &str = "REMOVE_ITEM";
pub const UPDATE_ITEM: &str = "UPDATE_ITEM";
pub const TOGGLE_ITEM: &str = "TOGGLE_ITEM";
pub const TOGGLE_ALL: &str = "TOGGLE_ALL";
pub const REMOVE_ALL_ITEMS: &str = "REMOVE_ALL_ITEMS";
pub const REMOVE_COMPLETED_ITEMS: &str = "REMOVE_COMPLETED_ITEMS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddItem { title: String },
    RemoveItem { id: String },
    UpdateItem { id: String, patch: TaskPatch },
    ToggleItem { id: String },
    /// `completed` is carried on the wire but has no effect.
    ToggleAll { completed: bool },
    RemoveAllItems,
    RemoveCompletedItems,
    Unrecognized { kind: Option<String>, reason: String },
}

/// Partial task fields for `UPDATE_ITEM`. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_time: Option<Millis>,
    /// `Some(None)` clears the completion time, `None` leaves it alone.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_time: Option<Option<Millis>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_changed: Option<bool>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn color_changed() -> Self {
        Self {
            color_changed: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn present_or_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<Millis>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Millis>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
struct TitlePayload {
    title: String,
}

#[derive(Deserialize)]
struct IdPayload {
    id: String,
}

#[derive(Deserialize)]
struct UpdatePayload {
    id: String,
    #[serde(flatten)]
    patch: TaskPatch,
}

#[derive(Deserialize)]
struct ToggleAllPayload {
    #[serde(default)]
    completed: bool,
}

impl Action {
    pub fn add(title: impl Into<String>) -> Self {
        Action::AddItem {
            title: title.into(),
        }
    }

    pub fn remove(id: impl Into<String>) -> Self {
        Action::RemoveItem { id: id.into() }
    }

    pub fn update(id: impl Into<String>, patch: TaskPatch) -> Self {
        Action::UpdateItem {
            id: id.into(),
            patch,
        }
    }

    pub fn toggle(id: impl Into<String>) -> Self {
        Action::ToggleItem { id: id.into() }
    }

    /// Map an edit submission: an empty title deletes the task.
    pub fn from_edit(id: impl Into<String>, text: &str) -> Self {
        let title = text.trim();
        if title.is_empty() {
            Action::remove(id)
        } else {
            Action::update(id, TaskPatch::title(title))
        }
    }

    /// Wire name of the action, e.g. `TOGGLE_ITEM`.
    pub fn kind(&self) -> &str {
        match self {
            Action::AddItem { .. } => ADD_ITEM,
            Action::RemoveItem { .. } => REMOVE_ITEM,
            Action::UpdateItem { .. } => UPDATE_ITEM,
            Action::ToggleItem { .. } => TOGGLE_ITEM,
            Action::ToggleAll { .. } => TOGGLE_ALL,
            Action::RemoveAllItems => REMOVE_ALL_ITEMS,
            Action::RemoveCompletedItems => REMOVE_COMPLETED_ITEMS,
            Action::Unrecognized { kind, .. } => kind.as_deref().unwrap_or("UNKNOWN"),
        }
    }

    /// Id the action targets, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Action::RemoveItem { id }
            | Action::UpdateItem { id, .. }
            | Action::ToggleItem { id } => Some(id),
            _ => None,
        }
    }

    /// Decode a JSON value. Never fails.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::unrecognized(None, "action must be a JSON object");
        };
        let Some(kind) = object.get("type").and_then(Value::as_str) else {
            return Self::unrecognized(None, "missing string field 'type'");
        };
        let payload = match object.get("payload") {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(payload) => payload.clone(),
        };

        let decoded = match kind {
            ADD_ITEM => serde_json::from_value::<TitlePayload>(payload)
                .map(|p| Action::AddItem { title: p.title }),
            REMOVE_ITEM => {
                serde_json::from_value::<IdPayload>(payload).map(|p| Action::RemoveItem { id: p.id })
            }
            UPDATE_ITEM => serde_json::from_value::<UpdatePayload>(payload).map(|p| {
                Action::UpdateItem {
                    id: p.id,
                    patch: p.patch,
                }
            }),
            TOGGLE_ITEM => {
                serde_json::from_value::<IdPayload>(payload).map(|p| Action::ToggleItem { id: p.id })
            }
            TOGGLE_ALL => serde_json::from_value::<ToggleAllPayload>(payload)
                .map(|p| Action::ToggleAll {
                    completed: p.completed,
                }),
            REMOVE_ALL_ITEMS => Ok(Action::RemoveAllItems),
            REMOVE_COMPLETED_ITEMS => Ok(Action::RemoveCompletedItems),
            other => {
                return Self::unrecognized(Some(other), format!("unknown action type '{other}'"))
            }
        };

        decoded.unwrap_or_else(|err| Self::unrecognized(Some(kind), format!("bad payload: {err}")))
    }

    /// Encode into the wire form.
    pub fn to_value(&self) -> Value {
        use serde_json::json;

        let payload = match self {
            Action::AddItem { title } => json!({ "title": title }),
            Action::RemoveItem { id } | Action::ToggleItem { id } => json!({ "id": id }),
            Action::UpdateItem { id, patch } => {
                let mut payload = serde_json::to_value(patch).unwrap_or_else(|_| json!({}));
                if let Some(object) = payload.as_object_mut() {
                    object.insert("id".to_string(), json!(id));
                }
                payload
            }
            Action::ToggleAll { completed } => json!({ "completed": completed }),
            Action::RemoveAllItems | Action::RemoveCompletedItems => json!({}),
            Action::Unrecognized { reason, .. } => json!({ "reason": reason }),
        };
        json!({ "type": self.kind(), "payload": payload })
    }

    fn unrecognized(kind: Option<&str>, reason: impl Into<String>) -> Self {
        Action::Unrecognized {
            kind: kind.map(str::to_string),
            reason: reason.into(),
        }
    }
}

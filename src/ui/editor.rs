use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorKind {
    NewTask,
    EditTask { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Cancel,
    Submit,
}

/// Single-line title input.
#[derive(Debug, Clone)]
pub struct EditorState {
    kind: EditorKind,
    value: String,
}

impl EditorState {
    pub fn new_task() -> Self {
        Self {
            kind: EditorKind::NewTask,
            value: String::new(),
        }
    }

    pub fn edit_task(id: impl Into<String>, title: &str) -> Self {
        Self {
            kind: EditorKind::EditTask { id: id.into() },
            value: title.to_string(),
        }
    }

    pub fn kind(&self) -> &EditorKind {
        &self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            EditorKind::NewTask => "New task",
            EditorKind::EditTask { .. } => "Edit task",
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('u') => self.value.clear(),
                KeyCode::Char('w') => self.delete_word(),
                _ => {}
            }
            return EditorAction::None;
        }

        match key.code {
            KeyCode::Esc => return EditorAction::Cancel,
            KeyCode::Enter => return EditorAction::Submit,
            KeyCode::Backspace => {
                self.value.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => self.value.push(ch),
            _ => {}
        }
        EditorAction::None
    }

    /// Action for the submitted text. A new task with an empty title
    /// yields nothing; an emptied edit removes the task.
    pub fn submit(&self) -> Option<Action> {
        match &self.kind {
            EditorKind::NewTask => {
                let title = self.value.trim();
                if title.is_empty() {
                    None
                } else {
                    Some(Action::add(title))
                }
            }
            EditorKind::EditTask { id } => Some(Action::from_edit(id.clone(), &self.value)),
        }
    }

    fn delete_word(&mut self) {
        let trimmed = self.value.trim_end_matches(' ');
        let cut = trimmed.rfind(' ').map(|idx| idx + 1).unwrap_or(0);
        self.value.truncate(cut);
    }
}

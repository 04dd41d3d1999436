use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{debug, info};

use crate::action::Action;
use crate::attention::AttentionTimers;
use crate::config::Config;
use crate::error::Result;
use crate::events::EventSink;
use crate::selector::{self, Route};
use crate::store::TaskStore;
use crate::task::{Millis, Task};

use super::editor::{EditorAction, EditorState};
use super::view;

const EVENT_POLL_MS: u64 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

pub struct AppState {
    pub(crate) route: Route,
    pub(crate) selected: usize,
    pub(crate) editor: Option<EditorState>,
    pub(crate) confirm_remove_all: bool,
    pub(crate) show_help: bool,
    pub(crate) status: Option<(StatusKind, String)>,
    pub(crate) timers: AttentionTimers,
    store: TaskStore,
}

impl AppState {
    pub(crate) fn new(store: TaskStore, timers: AttentionTimers, route: Route) -> Self {
        let mut app = Self {
            route,
            selected: 0,
            editor: None,
            confirm_remove_all: false,
            show_help: false,
            status: None,
            timers,
            store,
        };
        let now = app.now();
        app.timers.sync(app.store.tasks(), now);
        app
    }

    pub(crate) fn now(&self) -> Millis {
        self.store.now()
    }

    pub(crate) fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub(crate) fn visible(&self) -> Vec<&Task> {
        selector::visible(self.store.tasks(), self.route)
    }

    pub(crate) fn selected_task(&self) -> Option<&Task> {
        self.visible().get(self.selected).copied()
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_task().map(|task| task.id.clone())
    }

    pub(crate) fn set_route(&mut self, route: Route) {
        if self.route != route {
            let previous = self.selected_id();
            self.route = route;
            self.reselect(previous);
        }
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    /// Keep the cursor on `id` when it is still visible, otherwise clamp.
    fn reselect(&mut self, id: Option<String>) {
        let visible = self.visible();
        let position = id.and_then(|id| visible.iter().position(|task| task.id == id));
        let len = visible.len();
        self.selected = match position {
            Some(pos) => pos,
            None => self.selected.min(len.saturating_sub(1)),
        };
    }

    pub(crate) fn dispatch(&mut self, action: Action) {
        let previous = self.selected_id();
        let added = match self.store.dispatch(&action) {
            Ok(outcome) => outcome.added,
            Err(err) => {
                self.set_error(err.to_string());
                None
            }
        };
        let now = self.now();
        self.timers.sync(self.store.tasks(), now);
        self.reselect(added.or(previous));
    }

    /// Fire expired attention timers. Returns true when anything changed.
    pub(crate) fn tick(&mut self) -> bool {
        let now = self.now();
        let due = self.timers.fire_due(now);
        if due.is_empty() {
            return false;
        }
        debug!(count = due.len(), "attention timers fired");
        for action in due {
            self.dispatch(action);
        }
        true
    }

    pub(crate) fn set_error(&mut self, message: String) {
        self.status = Some((StatusKind::Error, message));
    }

    pub(crate) fn set_info(&mut self, message: String) {
        self.status = Some((StatusKind::Info, message));
    }
}

pub fn run(config: &Config, route: Route, events: Option<EventSink>) -> Result<()> {
    let delay = config.attention_delay()?;
    let store = TaskStore::new()
        .with_refresh(config.ranks.refresh)
        .with_events(events);
    let mut app = AppState::new(store, AttentionTimers::new(delay), route);
    info!(route = %route, "starting terminal ui");
    run_terminal(&mut app)
}

fn run_terminal(app: &mut AppState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let mut dirty = true;
    loop {
        if app.tick() {
            dirty = true;
        }
        // Countdown labels change every second while timers run.
        if !app.timers.is_empty() {
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Returns true when the app should exit.
pub(crate) fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(mut editor) = app.editor.take() {
        match editor.handle_key(key) {
            EditorAction::None => app.editor = Some(editor),
            EditorAction::Cancel => app.set_info("cancelled".to_string()),
            EditorAction::Submit => match editor.submit() {
                Some(action) => app.dispatch(action),
                None => app.set_info("empty title, nothing added".to_string()),
            },
        }
        return false;
    }

    if app.confirm_remove_all {
        app.confirm_remove_all = false;
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                app.dispatch(Action::RemoveAllItems);
                app.set_info("removed all tasks".to_string());
            }
            _ => app.set_info("cancelled".to_string()),
        }
        return false;
    }

    if app.show_help {
        app.show_help = false;
        return false;
    }

    app.status = None;
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Home | KeyCode::Char('g') => app.selected = 0,
        KeyCode::End | KeyCode::Char('G') => app.move_selection(isize::MAX / 2),
        KeyCode::Char('n') => app.editor = Some(EditorState::new_task()),
        KeyCode::Char('e') | KeyCode::Enter => match app.selected_task() {
            Some(task) => app.editor = Some(EditorState::edit_task(task.id.clone(), &task.title)),
            None => app.set_error("no task selected".to_string()),
        },
        KeyCode::Char(' ') => match app.selected_id() {
            Some(id) => app.dispatch(Action::toggle(id)),
            None => app.set_error("no task selected".to_string()),
        },
        KeyCode::Char('d') | KeyCode::Delete => match app.selected_id() {
            Some(id) => app.dispatch(Action::remove(id)),
            None => app.set_error("no task selected".to_string()),
        },
        KeyCode::Char('a') => {
            let completed = !selector::all_completed(app.tasks());
            app.dispatch(Action::ToggleAll { completed });
        }
        KeyCode::Char('c') => app.dispatch(Action::RemoveCompletedItems),
        KeyCode::Char('X') => {
            if app.tasks().is_empty() {
                app.set_info("nothing to remove".to_string());
            } else {
                app.confirm_remove_all = true;
            }
        }
        KeyCode::Char('1') => app.set_route(Route::All),
        KeyCode::Char('2') => app.set_route(Route::Active),
        KeyCode::Char('3') => app.set_route(Route::Completed),
        _ => {}
    }
    false
}

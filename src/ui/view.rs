use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::selector::{self, Route};
use crate::task::{format_clock_time, Task};

use super::app::{AppState, StatusKind};
use super::editor::EditorState;

const HELP_KEY_WIDTH: usize = 10;
const PROGRESS_WIDTH: usize = 10;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);
const COLOR_MAGENTA: Color = Color::Rgb(214, 140, 230);
const COLOR_NEW: Color = Color::Rgb(235, 87, 87);

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_tabs(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);

    if let Some(editor) = app.editor.as_ref() {
        render_editor_modal(frame, area, editor);
    }
    if app.confirm_remove_all {
        render_confirm_modal(frame, area, app.tasks().len());
    }
    if app.show_help {
        render_help_modal(frame, area);
    }
}

fn render_tabs(frame: &mut Frame, app: &AppState, area: Rect) {
    let counts = selector::counts(app.tasks());
    let tabs = [
        (Route::All, counts.total, COLOR_INFO),
        (Route::Active, counts.active, COLOR_ACCENT),
        (Route::Completed, counts.completed, COLOR_SUCCESS),
    ];

    let mut spans = Vec::new();
    for (idx, (route, count, color)) in tabs.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(COLOR_MUTED_DARK)));
        }
        let text = format!("{} {} ({count})", idx + 1, route.label());
        let style = if route == app.route {
            Style::default()
                .fg(color)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        spans.push(Span::styled(text, style));
    }

    let toggle = if selector::all_completed(app.tasks()) {
        "[x] all"
    } else {
        "[ ] all"
    };
    spans.push(Span::styled("    ", Style::default()));
    spans.push(Span::styled(toggle, Style::default().fg(COLOR_MUTED_DARK)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let content_width = area.width.saturating_sub(2) as usize;
    let visible = app.visible();
    let top = selector::top_completed(app.tasks());
    let now = app.now();

    let mut lines = Vec::new();
    if visible.is_empty() {
        let empty = match app.route {
            Route::All => "No tasks. Press n to add one.",
            Route::Active => "Nothing active",
            Route::Completed => "Nothing completed",
        };
        lines.push(Line::from(Span::styled(
            empty,
            Style::default().fg(COLOR_MUTED_DARK),
        )));
    } else {
        let height = area.height.saturating_sub(2) as usize;
        let (start, end) = list_window(visible.len(), app.selected, height);
        for (pos, task) in visible.iter().enumerate().take(end).skip(start) {
            let rank = selector::rank_of(&top, &task.id);
            let countdown = app
                .timers
                .remaining(&task.id, now)
                .zip(app.timers.progress(&task.id, now));
            lines.push(render_row(
                task,
                rank,
                countdown,
                pos == app.selected,
                content_width,
            ));
        }
    }

    let title = format!("todos {}", app.route.path());
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(COLOR_BORDER_LIST)),
    );
    frame.render_widget(widget, area);
}

/// `[x] title  added 3:04 PM  done 3:05 PM` with rank or countdown decoration.
fn render_row(
    task: &Task,
    rank: u8,
    countdown: Option<(u64, f64)>,
    selected: bool,
    width: usize,
) -> Line<'static> {
    let marker = if task.completed { "[x] " } else { "[ ] " };
    let style = title_style(task, rank);

    let mut tail = format!("  added {}", format_clock_time(task.added_time));
    if let Some(completed) = task.completed_time {
        tail.push_str(&format!("  done {}", format_clock_time(completed)));
    }
    let countdown_text = countdown.map(|(secs, fraction)| {
        format!("  Changes in {secs}s {}", progress_bar(fraction, PROGRESS_WIDTH))
    });
    let rank_text = (rank > 0).then(|| format!(" #{rank}"));

    let used = marker.len()
        + tail.chars().count()
        + countdown_text.as_ref().map_or(0, |text| text.chars().count())
        + rank_text.as_ref().map_or(0, |text| text.len());
    let title = truncate_text(&task.title, width.saturating_sub(used).max(8));

    let mut marker_span = Span::styled(marker, Style::default().fg(COLOR_MUTED));
    let mut title_span = Span::styled(title, style);
    if selected {
        marker_span.style = marker_span.style.add_modifier(Modifier::REVERSED);
        title_span.style = title_span.style.add_modifier(Modifier::REVERSED);
    }

    let mut spans = vec![marker_span, title_span];
    if let Some(text) = rank_text {
        spans.push(Span::styled(text, style.add_modifier(Modifier::BOLD)));
    }
    spans.push(Span::styled(tail, Style::default().fg(COLOR_MUTED_DARK)));
    if let Some(text) = countdown_text {
        spans.push(Span::styled(text, Style::default().fg(COLOR_NEW)));
    }
    Line::from(spans)
}

/// Ranked completions get their own color; other completed tasks are
/// grey; new active tasks stay red until their timer fades them.
fn title_style(task: &Task, rank: u8) -> Style {
    match (task.completed, rank) {
        (true, 1) => Style::default().fg(COLOR_SUCCESS),
        (true, 2) => Style::default().fg(COLOR_MAGENTA),
        (true, 3) => Style::default().fg(COLOR_WARNING),
        (true, _) => Style::default()
            .fg(COLOR_MUTED_DARK)
            .add_modifier(Modifier::CROSSED_OUT),
        (false, _) if task.is_new() => Style::default().fg(COLOR_NEW).add_modifier(Modifier::BOLD),
        (false, _) => Style::default().fg(COLOR_TEXT),
    }
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint = "n new  e edit  space toggle  d remove  a all  c clear done  ? help  q quit";
    let hint_span = Span::styled(hint, Style::default().fg(COLOR_INFO));
    let line = match app.status.as_ref() {
        Some((kind, message)) => {
            let status_style = match kind {
                StatusKind::Error => Style::default()
                    .fg(COLOR_ERROR)
                    .add_modifier(Modifier::BOLD),
                StatusKind::Info => Style::default().fg(COLOR_WARNING),
            };
            Line::from(vec![
                hint_span,
                Span::raw("  |  "),
                Span::styled(message.clone(), status_style),
            ])
        }
        None => Line::from(hint_span),
    };

    let counts = selector::counts(app.tasks());
    let item_word = if counts.active == 1 { "item" } else { "items" };
    let counts_line = Line::from(Span::styled(
        format!("{} {item_word} left, {} completed", counts.active, counts.completed),
        Style::default().fg(COLOR_ACCENT),
    ));
    let widget = Paragraph::new(vec![line, counts_line])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_editor_modal(frame: &mut Frame, area: Rect, editor: &EditorState) {
    let content_width = area.width.saturating_sub(8).min(64);
    let modal = centered_rect(content_width, 5, area);
    frame.render_widget(Clear, modal);

    let inner = (content_width as usize).saturating_sub(4);
    let value = tail_text(editor.value(), inner);
    let lines = vec![
        Line::from(vec![
            Span::styled(value, Style::default().fg(COLOR_TEXT)),
            Span::styled("_", Style::default().fg(COLOR_ACCENT)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "enter save  esc cancel  ctrl+u clear",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(editor.label())
            .border_style(Style::default().fg(COLOR_ACCENT)),
    );
    frame.render_widget(widget, modal);
}

fn render_confirm_modal(frame: &mut Frame, area: Rect, total: usize) {
    let content_width = area.width.saturating_sub(8).min(48);
    let modal = centered_rect(content_width, 6, area);
    frame.render_widget(Clear, modal);

    let lines = vec![
        Line::from(Span::styled(
            format!("Remove all {total} task(s)?"),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "y/enter confirm  any other key cancels",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Remove All"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn render_help_modal(frame: &mut Frame, area: Rect) {
    let content_width = area.width.saturating_sub(8).min(48);
    let lines = build_help_lines(content_width.saturating_sub(2) as usize);
    let modal = centered_rect(content_width, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, modal);

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn build_help_lines(width: usize) -> Vec<Line<'static>> {
    vec![
        help_line("j/k", "move selection", width),
        help_line("g/G", "first or last task", width),
        help_line("n", "new task", width),
        help_line("e/enter", "edit title (empty removes)", width),
        help_line("space", "toggle completed", width),
        help_line("d/del", "remove task", width),
        help_line("a", "toggle all", width),
        help_line("c", "remove completed", width),
        help_line("X", "remove all", width),
        help_line("1/2/3", "all, active, completed", width),
        help_line("q/esc", "quit", width),
    ]
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let key_text = pad_text(keys, HELP_KEY_WIDTH.min(width));
    let desc_text = truncate_text(desc, width.saturating_sub(HELP_KEY_WIDTH + 1));
    Line::from(vec![
        Span::styled(
            key_text,
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(desc_text, Style::default().fg(COLOR_MUTED)),
    ])
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn list_window(total: usize, selected: usize, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

/// Remaining-time bar: filled cells shrink as the countdown elapses.
fn progress_bar(elapsed: f64, width: usize) -> String {
    let left = (1.0 - elapsed.clamp(0.0, 1.0)) * width as f64;
    let filled = left.ceil() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled.min(width)))
}

fn pad_text(value: &str, width: usize) -> String {
    let text = truncate_text(value, width);
    format!("{text:width$}")
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

/// Keep the end of a long input visible while typing.
fn tail_text(value: &str, max: usize) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    chars[chars.len() - max..].iter().collect()
}

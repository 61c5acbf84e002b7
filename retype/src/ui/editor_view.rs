//! Editor panel renderer for retype.
//!
//! Draws the replay buffer with a line-number gutter and syntax highlighting.
//! Only `lines[editor_scroll..editor_scroll + viewport]` are materialized per
//! frame, so long files render in O(viewport).

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};
use retype_core::{OperationKind, Phase, Replay};

use crate::app::{AppState, Playback};
use crate::theme::Theme;
use crate::ui::highlight::highlight_window;
use crate::ui::layout::{inner_rect, panel_block};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const CARET: &str = "▏";

/// Renders the editor panel.
///
/// Before anything is loaded the panel shows a spinner, the load error, or
/// an empty-history message instead of the buffer.
pub fn render_editor(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let language = state.session.language();
    let label = state
        .request
        .as_ref()
        .map(|r| r.file_path())
        .unwrap_or_default();
    let title = Line::from(format!(" {label} · {} ", language.name()));
    let is_active = state.playback() == Playback::Playing;

    frame.render_widget(panel_block(title, is_active, theme), area);
    let inner = inner_rect(area);

    let Some(replay) = state.session.replay() else {
        frame.render_widget(List::new(vec![ListItem::new(status_message(state, theme))]), inner);
        return;
    };

    let height = usize::from(inner.height);
    let lines = editor_lines(replay, state.editor_scroll, height, theme, language);
    frame.render_widget(List::new(lines.into_iter().map(ListItem::new)), inner);
}

fn status_message(state: &AppState, theme: &Theme) -> Line<'static> {
    match state.playback() {
        Playback::Failed => Line::styled(
            format!("Could not load history: {}", state.load_error.as_deref().unwrap_or("")),
            Style::default().fg(theme.error),
        ),
        Playback::Empty => Line::styled(
            "No commits touch this file.",
            Style::default().fg(theme.message),
        ),
        _ => {
            let frame = SPINNER[state.spinner % SPINNER.len()];
            let source = state.request.as_ref().map(|r| r.label()).unwrap_or_default();
            Line::styled(
                format!("{frame} Loading history from {source}…"),
                Style::default().fg(theme.message),
            )
        }
    }
}

/// Builds the visible editor rows: gutter, highlighted code, caret, notice.
fn editor_lines(
    replay: &Replay,
    scroll: usize,
    height: usize,
    theme: &Theme,
    language: retype_core::Language,
) -> Vec<Line<'static>> {
    let buffer = replay.buffer();
    let state = replay.state();
    let total = buffer.len();
    let start = scroll.min(total.saturating_sub(1));
    let end = (start + height).min(total);
    let gutter = total.max(1).to_string().len();

    let window = &buffer.lines()[start..end];
    let highlighted = highlight_window(window, language, theme.syntax_theme);

    let active_line = state.reveal_line.checked_sub(1);
    let typing = state.phase == Phase::Running
        && replay
            .current_operation()
            .is_some_and(|op| op.kind == OperationKind::Add);

    let mut rows: Vec<Line<'static>> = highlighted
        .into_iter()
        .enumerate()
        .map(|(offset, spans)| {
            let index = start + offset;
            let is_active = active_line == Some(index);
            let number_style = if is_active {
                Style::default()
                    .fg(theme.line_number_active)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.line_number)
            };
            let mut row = vec![Span::styled(format!("{:>gutter$} ", index + 1), number_style)];
            row.extend(spans);
            if is_active && typing {
                row.push(Span::styled(CARET, Style::default().fg(theme.caret)));
            }
            Line::from(row)
        })
        .collect();

    if let Some(notice) = &state.notice {
        let ghost = Line::from(vec![
            Span::raw(" ".repeat(gutter + 1)),
            Span::styled(
                notice.clone(),
                Style::default()
                    .fg(theme.notice)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]);
        if rows.len() >= height && height > 0 {
            rows.truncate(height - 1);
        }
        rows.push(ghost);
    }

    rows
}

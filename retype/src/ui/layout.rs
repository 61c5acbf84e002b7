//! Responsive layout for retype.
//!
//! Pure layout arithmetic plus the shared panel chrome. Called inside
//! `terminal.draw()` on every render, so each frame reflects the live size.
//!
//! # Panel geometry
//!
//! At `>= 100` columns the commit card sits to the right of the editor. Below
//! that it is stacked under the editor. Adjacent borders share one cell via
//! `Spacing::Overlap(1)` and `MergeStrategy::Fuzzy`.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Playback};
use crate::theme::Theme;

/// Width of the commit card when shown beside the editor.
const CARD_WIDTH: u16 = 40;
/// Height of the commit card when stacked below the editor.
const CARD_HEIGHT: u16 = 9;
/// Narrowest terminal that still gets a side-by-side layout.
const SIDE_BY_SIDE_MIN: u16 = 100;

/// Returns `[editor, card, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame) -> [Rect; 3] {
    let area = frame.area();
    let [main_area, status_bar] =
        area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let split = if area.width >= SIDE_BY_SIDE_MIN {
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(CARD_WIDTH)])
    } else {
        Layout::vertical([Constraint::Fill(1), Constraint::Length(CARD_HEIGHT)])
    };
    let [editor, card] = main_area.layout(&split.spacing(Spacing::Overlap(1)));

    [editor, card, status_bar]
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border on each side.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// Active panels get a thick border. `Fuzzy` merging is required because
/// `Exact` draws wrong junctions where thick and plain borders meet.
pub fn panel_block<'a>(title: Line<'a>, is_active: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_active {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_active { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Mode label and color for the status bar.
fn mode_indicator(playback: Playback, theme: &Theme) -> (&'static str, ratatui::style::Color) {
    match playback {
        Playback::Loading => (" LOADING ", theme.status_paused),
        Playback::Failed => (" ERROR ", theme.error),
        Playback::Empty => (" EMPTY ", theme.status_finished),
        Playback::Waiting => (" READY ", theme.status_playing),
        Playback::Playing => (" PLAYING ", theme.status_playing),
        Playback::Paused => (" PAUSED ", theme.status_paused),
        Playback::Finished => (" FINISHED ", theme.status_finished),
    }
}

/// Renders the 1-row status bar at the bottom of the terminal.
///
/// Shows the playback mode, speed, commit progress, keystroke count, the sound
/// and follow toggles, and the history source. A load error that arrived while
/// a replay was already on screen is shown at the end in the error color.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = mode_indicator(state.playback(), theme);
    let speed = state.session.pacing().speed;

    let mut spans = vec![
        Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {speed} ({} cps) ", speed.chars_per_second())),
    ];

    if let Some(replay) = state.session.replay() {
        let total = replay.timeline().len();
        let current = replay.state().active.map_or(0, |i| i + 1);
        spans.push(Span::raw(format!("│ commit {current}/{total} ")));
    }
    spans.push(Span::raw(format!("│ {} keys ", state.keystrokes.total())));
    spans.push(Span::raw(if state.sound { "│ ♪ on " } else { "│ ♪ off " }));
    if !state.follow {
        spans.push(Span::raw("│ follow off "));
    }
    if let Some(request) = &state.request {
        spans.push(Span::raw(format!("│ {} ", request.label())));
    }
    if state.loading && state.session.replay().is_some() {
        spans.push(Span::raw("│ reloading… "));
    }
    if let (Some(err), true) = (&state.load_error, state.session.replay().is_some()) {
        spans.push(Span::styled(format!("│ {err} "), Style::default().fg(theme.error)));
    }
    spans.push(Span::raw("│ ? help"));

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn layout_for(width: u16, height: u16) -> [Rect; 3] {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("test backend");
        let mut rects = [Rect::default(); 3];
        terminal
            .draw(|frame| rects = compute_layout(frame))
            .expect("draw");
        rects
    }

    #[test]
    fn wide_terminal_puts_card_beside_editor() {
        let [editor, card, status] = layout_for(140, 40);
        assert_eq!(card.width, CARD_WIDTH);
        assert_eq!(editor.y, card.y);
        assert_eq!(editor.right(), card.x + 1, "borders overlap by one column");
        assert_eq!(status.height, 1);
        assert_eq!(status.y, 39);
    }

    #[test]
    fn narrow_terminal_stacks_card_below_editor() {
        let [editor, card, _] = layout_for(80, 40);
        assert_eq!(card.height, CARD_HEIGHT);
        assert_eq!(card.width, 80);
        assert_eq!(editor.bottom(), card.y + 1);
    }
}

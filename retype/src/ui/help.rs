//! Help overlay renderer for retype.
//!
//! Draws a centred modal over the panels. `Clear` erases the background inside
//! the same `terminal.draw()` closure, so no second draw call is needed.

use ratatui::{
    Frame,
    layout::Constraint,
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 50 columns, where the centred area
/// would collapse to zero height.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 50 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(70), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help · j/k scroll, ? or Esc to close ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .style(Style::default().bg(theme.background))
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Playback"),
        Line::from("  Space         Pause / resume (restart when finished)"),
        Line::from("  + / -         Faster / slower typing"),
        Line::from("  1 2 3 4       Zen / Flow / Blitz / Quantum speed"),
        Line::from("  r             Restart from the first commit"),
        Line::from("  R             Reload the history"),
        Line::from("  s             Toggle the line bell"),
        Line::from(""),
        Line::from("Editor"),
        Line::from("  j / k         Scroll down / up one line"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Scroll half page down / up"),
        Line::from("  Ctrl-f / b    Scroll full page down / up"),
        Line::from("  f             Follow the line being edited"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help"),
        Line::from("  q / Esc       Quit"),
    ])
}

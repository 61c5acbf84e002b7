//! Commit card renderer: who changed the file, when, and why.

use chrono::DateTime;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};
use retype_core::CommitMeta;

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Formats an RFC 3339 commit date for display, keeping its own offset.
///
/// Anything that does not parse is shown as received.
pub fn format_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_owned())
}

pub fn render_commit_card(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (title, body) = match state.session.replay() {
        Some(replay) => {
            let total = replay.timeline().len();
            match (replay.state().active, replay.active_commit()) {
                (Some(index), Some(meta)) => (
                    format!(" Commit {} of {total} ", index + 1),
                    card_text(meta, theme),
                ),
                _ => (
                    format!(" {total} commits "),
                    Text::styled("Starting…", Style::default().fg(theme.message)),
                ),
            }
        }
        None => (" Commit ".to_owned(), Text::default()),
    };

    frame.render_widget(panel_block(Line::from(title), false, theme), area);
    frame.render_widget(
        Paragraph::new(body).wrap(Wrap { trim: true }),
        inner_rect(area),
    );
}

fn card_text(meta: &CommitMeta, theme: &Theme) -> Text<'static> {
    let avatar = Span::styled(
        format!(" {} ", meta.initials()),
        Style::default()
            .fg(theme.avatar_fg)
            .bg(theme.avatar_bg)
            .add_modifier(Modifier::BOLD),
    );
    let author = Span::styled(
        meta.author.clone(),
        Style::default().fg(theme.card_author).add_modifier(Modifier::BOLD),
    );

    let mut lines = vec![
        Line::from(vec![avatar, Span::raw(" "), author]),
        Line::styled(format_date(&meta.date), Style::default().fg(theme.card_date)),
        Line::default(),
    ];
    lines.extend(
        meta.message
            .lines()
            .map(|l| Line::styled(l.to_owned(), Style::default().fg(theme.card_message))),
    );
    if !meta.comment.is_empty() {
        lines.push(Line::default());
        lines.extend(meta.comment.lines().map(|l| {
            Line::styled(
                l.to_owned(),
                Style::default()
                    .fg(theme.card_comment)
                    .add_modifier(Modifier::ITALIC),
            )
        }));
    }
    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_dates_are_humanized() {
        assert_eq!(format_date("2023-11-14T22:14:20+00:00"), "Nov 14, 2023 22:14");
        assert_eq!(format_date("2024-03-05T09:07:00-05:00"), "Mar 5, 2024 09:07");
    }

    #[test]
    fn other_dates_pass_through() {
        assert_eq!(format_date("yesterday"), "yesterday");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn card_omits_empty_comment() {
        let meta = CommitMeta {
            author: "Grace Hopper".into(),
            date: "2023-11-14T22:14:20Z".into(),
            message: "Add compiler\n\nFirst pass".into(),
            comment: String::new(),
        };
        let text = card_text(&meta, &Theme::dark());
        let rendered: Vec<String> = text
            .lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(
            rendered,
            vec![" GH  Grace Hopper", "Nov 14, 2023 22:14", "", "Add compiler", "", "First pass"]
        );
    }
}

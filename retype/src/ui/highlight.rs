//! Syntax highlighting for the editor panel.
//!
//! Only the visible window is highlighted, with a fresh highlighter each
//! frame. Constructs that open above the window (a block comment, a raw
//! string) are not seen, which is acceptable for a moving replay.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use retype_core::Language;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Forces the syntax and theme sets to load so the first frame does not stall.
pub fn warm_up() {
    LazyLock::force(&PS);
    LazyLock::force(&TS);
}

fn syntax_for(language: Language) -> &'static SyntaxReference {
    PS.find_syntax_by_extension(language.syntax_extension())
        .unwrap_or_else(|| PS.find_syntax_plain_text())
}

/// Highlights `lines` as one contiguous region of `language` source.
///
/// Returns one span list per input line. Falls back to unstyled spans when the
/// syntect theme is missing or a line fails to highlight.
pub fn highlight_window(
    lines: &[String],
    language: Language,
    theme_name: &str,
) -> Vec<Vec<Span<'static>>> {
    let Some(theme) = TS.themes.get(theme_name).or_else(|| TS.themes.values().next()) else {
        return lines.iter().map(|l| vec![Span::raw(l.clone())]).collect();
    };
    let mut h = HighlightLines::new(syntax_for(language), theme);

    lines
        .iter()
        .map(|line| {
            // The newline-aware syntax set expects a terminator on every line.
            let with_newline = format!("{line}\n");
            let spans: Vec<Span<'static>> = match h.highlight_line(&with_newline, &PS) {
                Ok(ranges) => ranges
                    .into_iter()
                    .map(|(style, text)| syntect_to_span(style, text.trim_end_matches('\n')))
                    .filter(|span| !span.content.is_empty())
                    .collect(),
                Err(_) => Vec::new(),
            };
            if spans.is_empty() && !line.is_empty() {
                vec![Span::raw(line.clone())]
            } else {
                spans
            }
        })
        .collect()
}

/// Converts a syntect (Style, &str) pair to an owned ratatui Span.
///
/// Background colors are dropped so the panel background shows through.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    let fg = style.foreground;
    let mut ratatui_style = Style::default();
    if fg.a > 0 {
        ratatui_style = ratatui_style.fg(Color::Rgb(fg.r, fg.g, fg.b));
    }
    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(content.to_owned(), ratatui_style)
}

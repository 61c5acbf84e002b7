//! UI rendering module for retype.
//!
//! `render()` is the single entry point, called from the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each
//! panel has its own renderer.

pub mod commit_card;
pub mod editor_view;
pub mod help;
pub mod highlight;
pub mod keybindings;
mod layout;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame: editor, commit card, status bar, and the help
/// overlay when it is open.
///
/// The editor viewport height is written back into `state` before drawing so
/// that page-wise scrolling on the next keypress uses the live size, and the
/// scroll offset is re-synced to follow the line being edited.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [editor, card, status_bar] = compute_layout(frame);

    let height = inner_rect(editor).height;
    state.editor_viewport_height = height;
    state.sync_scroll(usize::from(height));

    editor_view::render_editor(frame, editor, state, theme);
    commit_card::render_commit_card(frame, card, state, theme);
    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}

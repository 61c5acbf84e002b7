//! Color theme system for retype.
//!
//! A `Theme` holds named `ratatui::style::Color` fields for every surface
//! retype draws, plus the name of the syntect theme the editor highlights
//! with. Two built-in themes are provided:
//!
//! - `dark`: ANSI 16 colors, works on any terminal including 256-color SSH
//!   sessions without truecolor support.
//! - `catppuccin_mocha`: Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;

/// All color values used across retype's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border of the editor panel while the replay is running.
    pub border_active: Color,
    /// Border of the commit card and of a paused or finished editor.
    pub border_inactive: Color,

    // Editor
    /// Gutter line numbers.
    pub line_number: Color,
    /// Gutter number of the line being typed.
    pub line_number_active: Color,
    /// Block caret drawn after the last typed character.
    pub caret: Color,
    /// Placeholder notice for a commit without code changes.
    pub notice: Color,
    /// Loading and error messages inside the editor panel.
    pub message: Color,
    pub error: Color,

    // Commit card
    pub avatar_fg: Color,
    pub avatar_bg: Color,
    pub card_author: Color,
    pub card_date: Color,
    pub card_message: Color,
    pub card_comment: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator while playing.
    pub status_playing: Color,
    /// Mode indicator while paused.
    pub status_paused: Color,
    /// Mode indicator once the replay finished.
    pub status_finished: Color,

    // General
    pub background: Color,

    /// Name of the syntect theme used for syntax highlighting.
    pub syntax_theme: &'static str,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    ///
    /// Suitable as the default when no config is present or color capability
    /// is unknown.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            line_number: Color::DarkGray,
            line_number_active: Color::Yellow,
            caret: Color::White,
            notice: Color::DarkGray,
            message: Color::Gray,
            error: Color::Red,

            avatar_fg: Color::Black,
            avatar_bg: Color::Cyan,
            card_author: Color::White,
            card_date: Color::DarkGray,
            card_message: Color::Yellow,
            card_comment: Color::Gray,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_playing: Color::Green,
            status_paused: Color::Yellow,
            status_finished: Color::Cyan,

            background: Color::Reset,

            syntax_theme: "base16-ocean.dark",
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let peach = Color::Rgb(250, 179, 135); // #fab387
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay0 = Color::Rgb(108, 112, 134); // #6c7086
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let subtext0 = Color::Rgb(166, 173, 200); // #a6adc8
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let base = Color::Rgb(30, 30, 46); // #1e1e2e
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            line_number: overlay0,
            line_number_active: peach,
            caret: text,
            notice: overlay1,
            message: subtext0,
            error: red,

            avatar_fg: base,
            avatar_bg: mauve,
            card_author: text,
            card_date: overlay1,
            card_message: yellow,
            card_comment: subtext0,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_playing: green,
            status_paused: yellow,
            status_finished: lavender,

            background: base,

            syntax_theme: "base16-mocha.dark",
        }
    }

    /// Resolves a theme name to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` with a warning in the log, so a
    /// typo in config never prevents startup.
    ///
    /// # Arguments
    ///
    /// * `name` — theme name from config or `--theme`, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}

//! Color theme system for threadpost.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI surface
//! the composer renders. Two built-in themes are provided:
//!
//! - `dark` — ANSI 16 colors, so it works on any terminal including 256-color
//!   SSH sessions with no truecolor support.
//! - `catppuccin_mocha` — Catppuccin Mocha palette in RGB; requires truecolor.

use ratatui::style::Color;

/// All color values used across threadpost's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the selected segment and modal dialogs.
    pub border_active: Color,
    /// Border color for everything else.
    pub border_inactive: Color,

    // Thread view
    /// Author handle above each segment.
    pub author: Color,
    /// Segment body text.
    pub text: Color,
    /// Placeholder and "Add to thread" hints.
    pub hint: Color,
    /// Attachment lines.
    pub attachment: Color,
    /// Location line.
    pub location: Color,
    /// The "×" remove marker on follow-up segments.
    pub remove_marker: Color,
    /// The vertical chain connector between segments.
    pub connector: Color,

    // Footer
    /// Reply-audience label.
    pub audience: Color,
    /// Post button when the thread can be submitted.
    pub post_enabled: Color,
    /// Post button when it cannot.
    pub post_disabled: Color,

    // Prompts
    /// Permission-denied prompt title.
    pub warning: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator color when in NORMAL mode.
    pub status_mode_normal: Color,
    /// Mode indicator color when in INSERT mode.
    pub status_mode_insert: Color,
    /// Mode indicator color while a prompt is open.
    pub status_mode_prompt: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            author: Color::White,
            text: Color::Reset,
            hint: Color::DarkGray,
            attachment: Color::Blue,
            location: Color::Green,
            remove_marker: Color::Red,
            connector: Color::DarkGray,

            audience: Color::Cyan,
            post_enabled: Color::White,
            post_disabled: Color::DarkGray,

            warning: Color::Yellow,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,
            status_mode_prompt: Color::Yellow,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        // Catppuccin Mocha palette (selected subset)
        let green = Color::Rgb(166, 227, 161);    // #a6e3a1
        let red = Color::Rgb(243, 139, 168);      // #f38ba8
        let yellow = Color::Rgb(249, 226, 175);   // #f9e2af
        let blue = Color::Rgb(137, 180, 250);     // #89b4fa
        let teal = Color::Rgb(148, 226, 213);     // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90);    // #45475a
        let text = Color::Rgb(205, 214, 244);     // #cdd6f4
        let peach = Color::Rgb(250, 179, 135);    // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            author: text,
            text,
            hint: overlay1,
            attachment: blue,
            location: teal,
            remove_marker: red,
            connector: surface1,

            audience: lavender,
            post_enabled: text,
            post_disabled: overlay1,

            warning: peach,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,
            status_mode_prompt: yellow,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup. The fallback is logged, not treated as an error.
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

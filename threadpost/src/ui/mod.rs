//! UI rendering module for threadpost.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; the
//! segment chain in `thread_view.rs`; modal dialogs in `prompt.rs` and
//! `help.rs`.

mod layout;
mod prompt;
mod thread_view;
pub mod help;
pub mod keybindings;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, render_footer, render_status_bar};

/// Renders one complete frame.
///
/// The thread panel caches its viewport height and scroll offset back into
/// `state`, so the next keypress sees the geometry of the last frame.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [thread, footer, status_bar] = compute_layout(frame);

    thread_view::render_thread(frame, thread, state, theme);
    render_footer(frame, footer, state, theme);
    render_status_bar(frame, status_bar, state, theme);

    // Overlays last so they sit on top.
    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::ConfirmDiscard => prompt::render_discard_confirm(frame, theme),
        Mode::Prompt => {
            if let Some(p) = &state.prompt {
                prompt::render_permission_prompt(frame, p, theme);
            }
        }
        Mode::Normal | Mode::Insert => {}
    }
}

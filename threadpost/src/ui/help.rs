//! Help overlay renderer for threadpost.
//!
//! Draws a centred modal over the thread panel, erasing the background with
//! ratatui's `Clear` widget first. Rendered inside the same `terminal.draw()`
//! closure as everything else.

use ratatui::{
    Frame,
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped on terminals narrower than 50 columns.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 50 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  — j/k scroll, ? or Esc to dismiss ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Thread"),
        Line::from("  j / k         Select next / previous post"),
        Line::from("  g / G         Select first / last post"),
        Line::from("  i / Enter     Edit the selected post (Esc to stop)"),
        Line::from("  a             Add a post to the thread"),
        Line::from("  d             Remove the selected post (not the first)"),
        Line::from(""),
        Line::from("Attachments  (up to 5 per post)"),
        Line::from("  p             Pick from the photo library"),
        Line::from("  c             Take a photo with the camera"),
        Line::from("  l             Attach current location"),
        Line::from("  [ / ]         Highlight previous / next attachment"),
        Line::from("  x             Remove the highlighted attachment"),
        Line::from(""),
        Line::from("Posting"),
        Line::from("  Tab           Cycle who can reply & quote"),
        Line::from("  P / Ctrl-s    Post the thread"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Discard the draft (asks first if not empty)"),
        Line::from("  Ctrl-c        Quit immediately"),
    ])
}

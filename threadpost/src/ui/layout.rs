//! Screen layout for the composer.
//!
//! Pure layout arithmetic plus the small fixed-height bars. Called inside
//! `terminal.draw()` on every render so every frame reflects the current
//! terminal size.
//!
//! ```text
//! ┌ New thread ─────────────────┐
//! │ thread panel                │
//! └─────────────────────────────┘
//!  Anyone can reply & quote  Post   <- footer
//!  NORMAL  status                   <- status bar
//! ```

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode};
use crate::theme::Theme;

/// Returns `[thread, footer, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame) -> [Rect; 3] {
    frame.area().layout(&Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ]))
}

/// Inner `Rect` of a panel after removing the 1-cell border on each side.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// Thick border when `is_active`, plain otherwise.
pub fn panel_block<'a>(title: &'a str, is_active: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_active {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_active { BorderType::Thick } else { BorderType::Plain };

    Block::bordered().title(title).border_type(border_type).border_style(border_style)
}

/// Reply-audience label on the left, the Post button on the right.
pub fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let snapshot = &state.snapshot;
    let audience = Span::styled(
        format!(" {} can reply & quote", snapshot.reply_audience.label()),
        Style::default().fg(theme.audience),
    );

    let (post_label, post_style) = if snapshot.is_submitting {
        ("Posting… ", Style::default().fg(theme.post_disabled))
    } else if snapshot.can_submit {
        ("Post ", Style::default().fg(theme.post_enabled).add_modifier(Modifier::BOLD))
    } else {
        ("Post ", Style::default().fg(theme.post_disabled))
    };

    let [left, right] = area.layout(&Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(post_label.chars().count() as u16),
    ]));
    frame.render_widget(Paragraph::new(Line::from(audience)), left);
    frame.render_widget(Paragraph::new(Line::from(Span::styled(post_label, post_style))), right);
}

/// Mode indicator, pending-request spinner, and the latest status message.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert => (" INSERT ", theme.status_mode_insert),
        Mode::Prompt | Mode::ConfirmDiscard => (" PROMPT ", theme.status_mode_prompt),
        Mode::Normal | Mode::HelpOverlay => (" NORMAL ", theme.status_mode_normal),
    };

    let mut spans = vec![Span::styled(
        mode_text,
        Style::default().fg(mode_fg).add_modifier(Modifier::BOLD),
    )];
    if let Some(glyph) = state.spinner() {
        spans.push(Span::raw(format!(" {glyph}")));
    }
    if let Some(status) = &state.status {
        spans.push(Span::raw(format!(" {status}")));
    } else {
        spans.push(Span::raw(" ? for help"));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}

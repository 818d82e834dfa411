//! Modal dialogs: the permission-denied prompt and the discard confirmation.
//!
//! Both are drawn last inside the same `terminal.draw()` closure, with `Clear`
//! erasing the area underneath first.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};
use threadpost_core::composer::PermissionPrompt;

use crate::theme::Theme;

pub fn render_permission_prompt(frame: &mut Frame, prompt: &PermissionPrompt, theme: &Theme) {
    let body = Text::from(vec![
        Line::from(Span::styled(
            prompt.title.clone(),
            Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw(prompt.message.clone()),
        Line::raw(""),
        Line::from(vec![
            Span::styled("[o]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Open settings    "),
            Span::styled("[Esc]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Cancel"),
        ]),
    ]);
    render_modal(frame, " Permission needed ", body, theme);
}

pub fn render_discard_confirm(frame: &mut Frame, theme: &Theme) {
    let body = Text::from(vec![
        Line::raw("Discard this thread?"),
        Line::raw(""),
        Line::from(vec![
            Span::styled("[y]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Discard    "),
            Span::styled("[n]", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" Keep editing"),
        ]),
    ]);
    render_modal(frame, " Discard ", body, theme);
}

fn render_modal(frame: &mut Frame, title: &str, body: Text<'_>, theme: &Theme) {
    let area = modal_area(frame.area());
    if area.height < 3 {
        return;
    }
    frame.render_widget(Clear, area);
    let block = Block::bordered()
        .title(title)
        .border_style(Style::default().fg(theme.border_active));
    frame.render_widget(Paragraph::new(body).block(block).wrap(Wrap { trim: true }), area);
}

fn modal_area(screen: Rect) -> Rect {
    let width = screen.width.min(60);
    screen.centered(Constraint::Length(width), Constraint::Length(9))
}

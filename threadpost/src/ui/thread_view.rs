//! Thread panel: the chain of segments being composed.
//!
//! Each segment renders as an author line, its text (or a placeholder), one
//! line per attachment and an optional location line. The attachment under
//! the cursor of the selected segment is highlighted. Follow-up segments carry
//! a "×" marker showing they can be removed. Below the chain a dimmed
//! "Add to thread" line appears once the last segment has content.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};
use threadpost_core::types::{AttachmentSource, Segment};

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use super::layout::{inner_rect, panel_block};

const PLACEHOLDER_HEAD: &str = "What's new?";
const PLACEHOLDER_FOLLOW_UP: &str = "Say more...";

pub fn render_thread(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let block = panel_block(" New thread ", true, theme);
    let inner = inner_rect(area);
    state.thread_viewport_height = inner.height;

    let (text, selected_top) = build_thread_text(state, theme);
    state.thread_scroll =
        follow_selection(state.thread_scroll, selected_top, state.thread_viewport_height);

    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: false }).scroll((state.thread_scroll, 0)),
        inner,
    );
}

/// Builds the panel text and returns it with the first row of the selected
/// segment.
fn build_thread_text(state: &AppState, theme: &Theme) -> (Text<'static>, u16) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut selected_top = 0u16;

    for (idx, segment) in state.snapshot.segments.iter().enumerate() {
        let is_selected = idx == state.selected;
        if is_selected {
            selected_top = lines.len() as u16;
        }
        segment_lines(&mut lines, idx, segment, is_selected, state, theme);
        lines.push(Line::raw(""));
    }

    if state.snapshot.can_add_segment {
        lines.push(Line::from(Span::styled(
            "  Add to thread  (a)",
            Style::default().fg(theme.hint),
        )));
    }

    (Text::from(lines), selected_top)
}

fn segment_lines(
    lines: &mut Vec<Line<'static>>,
    idx: usize,
    segment: &Segment,
    is_selected: bool,
    state: &AppState,
    theme: &Theme,
) {
    let gutter = if is_selected { "▌ " } else { "  " };
    let gutter_style = Style::default().fg(if is_selected {
        theme.border_active
    } else {
        theme.connector
    });

    let mut header = vec![
        Span::styled(gutter, gutter_style),
        Span::styled(
            state.author.clone(),
            Style::default().fg(theme.author).add_modifier(Modifier::BOLD),
        ),
    ];
    if idx > 0 {
        header.push(Span::styled("  ×", Style::default().fg(theme.remove_marker)));
    }
    lines.push(Line::from(header));

    let editing = is_selected && state.mode == Mode::Insert;
    if segment.text.is_empty() && !editing {
        let placeholder = if idx == 0 { PLACEHOLDER_HEAD } else { PLACEHOLDER_FOLLOW_UP };
        lines.push(Line::from(vec![
            Span::styled("│ ", Style::default().fg(theme.connector)),
            Span::styled(placeholder, Style::default().fg(theme.hint)),
        ]));
    } else {
        let body: Vec<&str> = segment.text.split('\n').collect();
        let last = body.len() - 1;
        for (n, row) in body.into_iter().enumerate() {
            let mut spans = vec![
                Span::styled("│ ", Style::default().fg(theme.connector)),
                Span::styled(row.to_owned(), Style::default().fg(theme.text)),
            ];
            if editing && n == last {
                spans.push(Span::styled("▏", Style::default().fg(theme.status_mode_insert)));
            }
            lines.push(Line::from(spans));
        }
    }

    let highlighted = if is_selected { state.selected_attachment() } else { None };
    for (n, attachment) in segment.attachments.iter().enumerate() {
        let icon = match attachment.source {
            AttachmentSource::Library => "▣",
            AttachmentSource::Camera => "◉",
        };
        let mut style = Style::default().fg(theme.attachment);
        let marker = if highlighted == Some(n) {
            style = style.add_modifier(Modifier::REVERSED);
            "› "
        } else {
            "  "
        };
        lines.push(Line::from(vec![
            Span::styled("│ ", Style::default().fg(theme.connector)),
            Span::styled(marker, Style::default().fg(theme.border_active)),
            Span::styled(format!("{icon} {}", attachment.uri), style),
        ]));
    }

    if let Some(location) = segment.location {
        lines.push(Line::from(vec![
            Span::styled("│ ", Style::default().fg(theme.connector)),
            Span::styled(format!("⌖ {location}"), Style::default().fg(theme.location)),
        ]));
    }
}

/// Adjusts `scroll` so the selected segment's first row is visible.
fn follow_selection(scroll: u16, selected_top: u16, viewport: u16) -> u16 {
    if viewport == 0 {
        return scroll;
    }
    if selected_top < scroll {
        selected_top
    } else if selected_top >= scroll.saturating_add(viewport) {
        selected_top.saturating_sub(viewport.saturating_sub(2))
    } else {
        scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_follows_selection() {
        assert_eq!(follow_selection(0, 3, 10), 0);
        assert_eq!(follow_selection(5, 2, 10), 2);
        assert_eq!(follow_selection(0, 20, 10), 12);
        assert_eq!(follow_selection(4, 4, 0), 4);
    }
}

use std::ops::Range;

use edit_playback_engine::Document;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Splits `text` into display lines, styling the bytes in `highlight`.
///
/// A highlight that does not fall on character boundaries is dropped.
pub fn highlighted_lines(text: &str, highlight: Range<usize>) -> Vec<Line<'static>> {
    let highlight_style = Style::default().bg(Color::Yellow).fg(Color::Black);
    let segments = match (
        text.get(..highlight.start),
        text.get(highlight.clone()),
        text.get(highlight.end..),
    ) {
        (Some(before), Some(inside), Some(after)) => [
            (before, Style::default()),
            (inside, highlight_style),
            (after, Style::default()),
        ],
        _ => [
            (text, Style::default()),
            ("", highlight_style),
            ("", Style::default()),
        ],
    };

    let mut lines = vec![Line::default()];
    for (segment, style) in segments {
        for (i, part) in segment.split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            if !part.is_empty()
                && let Some(line) = lines.last_mut()
            {
                line.push_span(Span::styled(part.to_string(), style));
            }
        }
    }
    lines
}

pub fn ui(f: &mut Frame, title: &str, doc: &Document, highlight: Range<usize>, status: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    // Keep the end of the typed text in view
    let cursor_line = doc
        .transformer()
        .position(highlight.end)
        .map(|p| p.line)
        .unwrap_or(1);
    let visible = usize::from(chunks[0].height.saturating_sub(2)).max(1);
    let scroll = u16::try_from(cursor_line.saturating_sub(visible)).unwrap_or(u16::MAX);

    let text = doc.text();
    let content = Paragraph::new(highlighted_lines(&text, highlight))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .scroll((scroll, 0));
    f.render_widget(content, chunks[0]);

    f.render_widget(Paragraph::new(Line::from(status.to_string())), chunks[1]);
}

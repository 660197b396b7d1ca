use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

/// App name, campaign title, then Hijri and Gregorian dates.
pub fn render(frame: &mut Frame, area: Rect, title: &str, hijri: Option<&str>, gregorian: &str) {
    let title_line = Line::from(vec![
        Span::styled("  عبادة  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("ibadah", theme::gold()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(title, theme::bold()),
    ]);

    let mut date_spans = Vec::new();
    if let Some(hijri) = hijri {
        date_spans.push(Span::styled(hijri, theme::amber()));
        date_spans.push(Span::styled("  ·  ", theme::dim()));
    }
    date_spans.push(Span::styled(gregorian, theme::dim()));

    let text = vec![title_line, Line::from(""), Line::from(date_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::DayScore;
use crate::tui::theme;
use crate::utils::format::progress_bar;

pub fn render(frame: &mut Frame, area: Rect, score: &DayScore, total_checks: usize) {
    let block = Block::default()
        .title(Span::styled(" Today ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::panel(false))
        .style(theme::surface());

    let style = theme::heat(score.heat);
    let line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(
            progress_bar(score.completed as u32, total_checks as u32, 16),
            style,
        ),
        Span::styled(
            format!("  {}/{}  ", score.completed, total_checks),
            style.add_modifier(Modifier::BOLD),
        ),
        Span::raw(score.heat.symbol()),
    ]);

    let paragraph = Paragraph::new(vec![Line::from(""), line]).block(block);
    frame.render_widget(paragraph, area);
}

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{Heat, Streak};
use crate::tracker::heatmap_symbols;
use crate::tui::theme;
use crate::utils::format::progress_bar;

pub fn render(frame: &mut Frame, area: Rect, streak: &Streak, heatmap: &[Heat]) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::panel(false))
        .style(theme::surface());

    // Full bar at 30 days, one month of fasting.
    let bar = progress_bar(streak.current, 30, 12);

    let streak_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(bar, theme::green()),
        Span::styled(
            format!("  {} days", streak.current),
            theme::green().add_modifier(Modifier::BOLD),
        ),
    ]);

    let high_days = heatmap.iter().filter(|h| **h == Heat::High).count();
    let meta_line = Line::from(Span::styled(
        format!(
            "  Best: {}  ·  Strong days: {}/{}",
            streak.best,
            high_days,
            heatmap.len()
        ),
        theme::dim(),
    ));

    let heat_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::raw(heatmap_symbols(heatmap)),
    ]);

    let text = vec![
        Line::from(""),
        streak_line,
        meta_line,
        Line::from(""),
        heat_line,
    ];
    let paragraph = Paragraph::new(text).block(block);
    frame.render_widget(paragraph, area);
}

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{Counter, DayRecord, Goals};
use crate::tui::theme;
use crate::utils::format::{pad_display, progress_bar};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    record: &DayRecord,
    goals: &Goals,
    focus_idx: usize,
    focused: bool,
) {
    let block = Block::default()
        .title(Span::styled(" Goals ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::panel(focused))
        .style(theme::surface());

    let bar_width = (area.width.saturating_sub(40) as usize).clamp(5, 16);

    let items: Vec<ListItem> = Counter::ALL
        .iter()
        .enumerate()
        .map(|(i, counter)| {
            let is_focused = focused && i == focus_idx;
            let value = record.counter(*counter);
            let goal = goals.get(*counter);
            let done = value >= goal;

            let name_style = if is_focused {
                theme::gold().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };
            let bar_style = if done { theme::green() } else { theme::amber() };

            let label = format!("{} {}", counter.icon(), counter.display_name());
            ListItem::new(Line::from(vec![
                Span::styled(format!("  {}", pad_display(&label, 14)), name_style),
                Span::styled(progress_bar(value, goal, bar_width), bar_style),
                Span::styled(format!("  {}/{} {}", value, goal, counter.unit()), theme::dim()),
            ]))
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

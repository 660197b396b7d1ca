use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{DayRecord, Flag, Prayer};
use crate::tui::theme;
use crate::utils::format::pad_display;

/// A row that toggles on Enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecklistItem {
    Mosque(Prayer),
    Flag(Flag),
}

impl ChecklistItem {
    pub fn label(&self) -> String {
        match self {
            ChecklistItem::Mosque(p) => format!("🕌 {}", p.display_name()),
            ChecklistItem::Flag(f) => format!("{} {}", f.icon(), f.display_name()),
        }
    }

    pub fn is_done(&self, record: &DayRecord) -> bool {
        match self {
            ChecklistItem::Mosque(p) => record.attended(*p),
            ChecklistItem::Flag(f) => record.flag(*f),
        }
    }
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    items: &[ChecklistItem],
    record: &DayRecord,
    focus_idx: usize,
    focused: bool,
) {
    let block = Block::default()
        .title(Span::styled(
            format!(" Checklist · mosque {}/5 ", record.mosque_count()),
            theme::gold(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::panel(focused))
        .style(theme::surface());

    let list_items: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let is_focused = focused && i == focus_idx;
            let done = item.is_done(record);

            let name_style = if is_focused {
                theme::gold().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };
            let (icon, label) = if done { ("●", "done") } else { ("○", "") };

            ListItem::new(Line::from(vec![
                Span::styled(format!("  {}", pad_display(&item.label(), 22)), name_style),
                Span::styled(icon, theme::done(done)),
                Span::styled(format!("  {}", label), theme::dim()),
            ]))
        })
        .collect();

    let list = List::new(list_items).block(block);
    frame.render_widget(list, area);
}

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

const HINTS: [(&str, &str); 7] = [
    ("[Enter]", " toggle/add  "),
    ("[Tab]", " switch  "),
    ("[a]", " add  "),
    ("[R]", " reset day  "),
    ("[s]", " stats  "),
    ("[?]", " help  "),
    ("[q]", " quit"),
];

/// Key hints, or the outcome of the last action when there is one.
pub fn render(frame: &mut Frame, area: Rect, message: Option<&str>) {
    let line = match message {
        Some(msg) => Line::from(Span::styled(msg, theme::amber())),
        None => {
            let mut spans = Vec::new();
            for (key, label) in HINTS {
                spans.push(Span::styled(key, theme::gold()));
                spans.push(Span::styled(label, theme::dim()));
            }
            Line::from(spans)
        }
    };

    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

use ratatui::style::{Color, Modifier, Style};

use crate::models::Heat;

pub const BG: Color = Color::Rgb(14, 16, 22);
pub const SURFACE: Color = Color::Rgb(22, 25, 34);
pub const BORDER: Color = Color::Rgb(46, 52, 70);
pub const BORDER_FOCUS: Color = Color::Rgb(196, 160, 68);
pub const TEXT: Color = Color::Rgb(226, 222, 208);
pub const TEXT_DIM: Color = Color::Rgb(120, 124, 138);
pub const GOLD: Color = Color::Rgb(196, 160, 68);
pub const GREEN: Color = Color::Rgb(92, 160, 104);
pub const AMBER: Color = Color::Rgb(214, 170, 60);
pub const RED: Color = Color::Rgb(186, 84, 70);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

/// Matches the heat symbols: green, yellow, red.
pub fn heat(heat: Heat) -> Style {
    match heat {
        Heat::High => green(),
        Heat::Medium => amber(),
        Heat::Low => red(),
    }
}

pub fn done(done: bool) -> Style {
    if done { green() } else { dim() }
}

pub fn panel(focused: bool) -> Style {
    Style::default().fg(if focused { BORDER_FOCUS } else { BORDER })
}

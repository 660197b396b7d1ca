use unicode_width::UnicodeWidthStr;

use crate::models::Counter;

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "█".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

pub fn mark(done: bool) -> &'static str {
    if done { "✅" } else { "❌" }
}

/// "20 pages", "500"
pub fn format_amount(counter: Counter, value: u64) -> String {
    match counter.unit() {
        "" => value.to_string(),
        unit => format!("{} {}", value, unit),
    }
}

/// Per-day average with the precision that reads naturally for the metric.
pub fn format_average(counter: Counter, avg: f64) -> String {
    match counter {
        Counter::QuranPages | Counter::Dua => format!("{:.1}", avg),
        _ => format!("{:.0}", avg),
    }
}

/// Pad to a display width, counting emoji and wide glyphs correctly.
pub fn pad_display(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(w)))
}

pub mod checklist;
pub mod counters;
pub mod header;
pub mod score;
pub mod statusbar;
pub mod streak;

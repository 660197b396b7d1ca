//! Scoring, streaks and statistics over immutable snapshots of day records.
//! Nothing here touches storage or the terminal.

pub mod checks;
pub mod heatmap;
pub mod remaining;
pub mod report;
pub mod score;
pub mod streak;

pub use checks::{ChecklistPreset, DimensionSet, HeatThresholds};
pub use heatmap::{heatmap_symbols, render_heatmap, DEFAULT_HEATMAP_WINDOW};
pub use remaining::{remaining, Outstanding};
pub use report::{aggregate_statistics, aggregate_statistics_with_window};
pub use score::{completed_count, heat_for, score_day};
pub use streak::compute_streaks;

use crate::models::{DayMap, Goals, Heat};
use crate::tracker::{score::completed_count, score::heat_for, DimensionSet};

pub const DEFAULT_HEATMAP_WINDOW: usize = 14;
pub const EMPTY_HEATMAP: &str = "—";

/// Heat of the trailing `window` recorded days, oldest first.
pub fn render_heatmap(days: &DayMap, goals: &Goals, dims: &DimensionSet, window: usize) -> Vec<Heat> {
    let skip = days.len().saturating_sub(window);
    days.values()
        .skip(skip)
        .map(|record| heat_for(completed_count(record, goals, dims), dims))
        .collect()
}

pub fn heatmap_symbols(heat: &[Heat]) -> String {
    if heat.is_empty() {
        return EMPTY_HEATMAP.to_string();
    }
    heat.iter().map(|h| h.symbol()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayRecord;

    fn goals() -> Goals {
        Goals::default()
    }

    #[test]
    fn short_history_uses_every_day_most_recent_last() {
        let mut days = DayMap::new();
        days.insert("2026-02-18".into(), DayRecord::default());
        days.insert(
            "2026-02-19".into(),
            DayRecord {
                taraweeh: true,
                tahajjud: true,
                morning_adhkar: true,
                evening_adhkar: true,
                duha: true,
                dua: 3,
                ..DayRecord::default()
            },
        );
        days.insert(
            "2026-02-20".into(),
            DayRecord {
                taraweeh: true,
                ..DayRecord::default()
            },
        );
        let heat = render_heatmap(&days, &goals(), &DimensionSet::extended(), 14);
        assert_eq!(heat, vec![Heat::Low, Heat::Medium, Heat::Low]);
        assert_eq!(heatmap_symbols(&heat), "🟥🟨🟥");
    }

    #[test]
    fn window_keeps_trailing_days() {
        let mut days = DayMap::new();
        for d in 1..=20 {
            days.insert(format!("2026-03-{:02}", d), DayRecord::default());
        }
        let heat = render_heatmap(&days, &goals(), &DimensionSet::base(), 14);
        assert_eq!(heat.len(), 14);
    }

    #[test]
    fn empty_history_renders_placeholder() {
        let heat = render_heatmap(&DayMap::new(), &goals(), &DimensionSet::base(), 14);
        assert!(heat.is_empty());
        assert_eq!(heatmap_symbols(&heat), EMPTY_HEATMAP);
    }
}

use chrono::NaiveDate;
use log::warn;

use crate::models::{day_key, parse_day_key, DayMap, Goals, Streak};
use crate::tracker::{score::is_active, DimensionSet};

/// How far back the current streak is followed.
pub const MAX_STREAK_SCAN_DAYS: u32 = 400;

/// Current streak counts back from `today` while every day is recorded and
/// active; an inactive or missing today gives 0. Best streak is the longest
/// run of consecutive active calendar days anywhere in the history.
pub fn compute_streaks(days: &DayMap, today: NaiveDate, goals: &Goals, dims: &DimensionSet) -> Streak {
    Streak {
        current: current_streak(days, today, goals, dims),
        best: best_streak(days, goals, dims),
    }
}

fn current_streak(days: &DayMap, today: NaiveDate, goals: &Goals, dims: &DimensionSet) -> u32 {
    let mut streak = 0u32;
    let mut cursor = today;
    for _ in 0..MAX_STREAK_SCAN_DAYS {
        match days.get(&day_key(cursor)) {
            Some(record) if is_active(record, goals, dims) => streak += 1,
            _ => break,
        }
        cursor = match cursor.pred_opt() {
            Some(prev) => prev,
            None => break,
        };
    }
    streak
}

fn best_streak(days: &DayMap, goals: &Goals, dims: &DimensionSet) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for (key, record) in days {
        let Some(date) = parse_day_key(key) else {
            warn!("Skipping malformed day key '{}'", key);
            run = 0;
            prev = None;
            continue;
        };
        // A gap in the calendar is a missing day and breaks the run.
        if prev.and_then(|p| p.succ_opt()) != Some(date) {
            run = 0;
        }
        if is_active(record, goals, dims) {
            run += 1;
        } else {
            run = 0;
        }
        best = best.max(run);
        prev = Some(date);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DayRecord;

    fn active() -> DayRecord {
        DayRecord {
            taraweeh: true,
            ..DayRecord::default()
        }
    }

    fn date(s: &str) -> NaiveDate {
        parse_day_key(s).unwrap()
    }

    fn goals() -> Goals {
        Goals {
            quran_pages: 20,
            istighfar: 500,
            dhikr: 100,
            charity: 100,
            dua: 3,
        }
    }

    fn history(entries: &[(&str, DayRecord)]) -> DayMap {
        entries
            .iter()
            .map(|(k, r)| (k.to_string(), r.clone()))
            .collect()
    }

    #[test]
    fn empty_history_has_no_streaks() {
        let streak = compute_streaks(
            &DayMap::new(),
            date("2026-03-01"),
            &goals(),
            &DimensionSet::base(),
        );
        assert_eq!(streak, Streak::default());
    }

    #[test]
    fn inactive_today_breaks_current_streak() {
        let days = history(&[
            ("2026-02-27", active()),
            ("2026-02-28", active()),
            ("2026-03-01", DayRecord::default()),
        ]);
        let streak = compute_streaks(&days, date("2026-03-01"), &goals(), &DimensionSet::base());
        assert_eq!(streak.current, 0);
        assert_eq!(streak.best, 2);
    }

    #[test]
    fn three_active_days_ending_today() {
        let days = history(&[
            ("2026-02-27", active()),
            ("2026-02-28", active()),
            ("2026-03-01", active()),
        ]);
        let streak = compute_streaks(&days, date("2026-03-01"), &goals(), &DimensionSet::base());
        assert_eq!(streak.current, 3);
        assert_eq!(streak.best, 3);
    }

    #[test]
    fn missing_today_gives_zero_current() {
        let days = history(&[("2026-02-28", active())]);
        let streak = compute_streaks(&days, date("2026-03-01"), &goals(), &DimensionSet::base());
        assert_eq!(streak.current, 0);
        assert_eq!(streak.best, 1);
    }

    #[test]
    fn calendar_gap_resets_best_run() {
        let days = history(&[
            ("2026-02-01", active()),
            ("2026-02-02", active()),
            ("2026-02-04", active()),
            ("2026-02-05", active()),
            ("2026-02-06", active()),
        ]);
        let streak = compute_streaks(&days, date("2026-02-06"), &goals(), &DimensionSet::base());
        assert_eq!(streak.best, 3);
        assert_eq!(streak.current, 3);
    }

    #[test]
    fn current_streak_is_capped() {
        let start = date("2024-01-01");
        let mut days = DayMap::new();
        let mut cursor = start;
        for _ in 0..(MAX_STREAK_SCAN_DAYS + 20) {
            days.insert(day_key(cursor), active());
            cursor = cursor.succ_opt().unwrap();
        }
        let today = cursor.pred_opt().unwrap();
        let streak = compute_streaks(&days, today, &goals(), &DimensionSet::base());
        assert_eq!(streak.current, MAX_STREAK_SCAN_DAYS);
        assert_eq!(streak.best, MAX_STREAK_SCAN_DAYS + 20);
    }

    #[test]
    fn malformed_keys_are_skipped() {
        let days = history(&[
            ("2026-02-01", active()),
            ("2026-02-02", active()),
            ("garbage", active()),
        ]);
        let streak = compute_streaks(&days, date("2026-02-02"), &goals(), &DimensionSet::base());
        assert_eq!(streak.best, 2);
        assert_eq!(streak.current, 2);
    }
}

use chrono::NaiveDate;

use crate::models::{
    BestDay, CheckKind, Counter, CounterTotal, DayMap, FlagDays, GoalHit, Goals,
    StatisticsReport,
};
use crate::tracker::heatmap::{render_heatmap, DEFAULT_HEATMAP_WINDOW};
use crate::tracker::score::{check_satisfied, completed_count};
use crate::tracker::streak::compute_streaks;
use crate::tracker::DimensionSet;

/// Aggregates a user's full history. Returns `None` when there are no
/// recorded days, so no averages are ever divided by zero.
pub fn aggregate_statistics(
    days: &DayMap,
    goals: &Goals,
    dims: &DimensionSet,
    today: NaiveDate,
) -> Option<StatisticsReport> {
    aggregate_statistics_with_window(days, goals, dims, today, DEFAULT_HEATMAP_WINDOW)
}

pub fn aggregate_statistics_with_window(
    days: &DayMap,
    goals: &Goals,
    dims: &DimensionSet,
    today: NaiveDate,
    heatmap_window: usize,
) -> Option<StatisticsReport> {
    if days.is_empty() {
        return None;
    }
    let total_days = days.len() as u32;
    let total_checks = dims.total_checks();

    let mut counter_totals = [0u64; Counter::ALL.len()];
    let mut mosque_prayers = 0u64;
    let mut goal_hits = vec![0u32; total_checks];
    let mut completed_sum = 0usize;
    let mut perfect_days = 0u32;
    let mut best_day: Option<BestDay> = None;

    for (key, record) in days {
        for (i, counter) in Counter::ALL.iter().enumerate() {
            counter_totals[i] += record.counter(*counter) as u64;
        }
        mosque_prayers += record.mosque_count() as u64;

        for (i, check) in dims.checks().iter().enumerate() {
            if check_satisfied(*check, record, goals) {
                goal_hits[i] += 1;
            }
        }

        let completed = completed_count(record, goals, dims);
        completed_sum += completed;
        if completed == total_checks {
            perfect_days += 1;
        }
        // Strictly greater keeps the earliest day on ties.
        if best_day.as_ref().is_none_or(|b| completed > b.completed) {
            best_day = Some(BestDay {
                date: key.clone(),
                completed,
            });
        }
    }

    let per_day = |total: u64| total as f64 / total_days as f64;
    let average = completed_sum as f64 / total_days as f64;

    let counters = Counter::ALL
        .iter()
        .zip(counter_totals)
        .map(|(counter, total)| CounterTotal {
            counter: *counter,
            total,
            per_day: per_day(total),
        })
        .collect();

    // Flag day counts coincide with the flag's check hits.
    let flag_days = dims
        .checks()
        .iter()
        .zip(&goal_hits)
        .filter_map(|(check, hits)| match check {
            CheckKind::Flag(flag) => Some(FlagDays {
                flag: *flag,
                days: *hits,
            }),
            _ => None,
        })
        .collect();

    let goal_hits = dims
        .checks()
        .iter()
        .zip(goal_hits)
        .map(|(check, hits)| GoalHit {
            check: *check,
            hits,
        })
        .collect();

    Some(StatisticsReport {
        total_days,
        total_checks,
        streak: compute_streaks(days, today, goals, dims),
        perfect_days,
        average_completion: (average * 10.0).round() / 10.0,
        best_day: best_day?,
        heatmap: render_heatmap(days, goals, dims, heatmap_window),
        counters,
        mosque_prayers,
        mosque_per_day: per_day(mosque_prayers),
        flag_days,
        goal_hits,
    })
}

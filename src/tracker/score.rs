use crate::models::{CheckKind, DayRecord, DayScore, Goals, Heat};
use crate::tracker::DimensionSet;

pub fn check_satisfied(check: CheckKind, record: &DayRecord, goals: &Goals) -> bool {
    match check {
        CheckKind::Goal(counter) => record.counter(counter) >= goals.get(counter),
        CheckKind::Mosque => record.mosque.all_attended(),
        CheckKind::Flag(flag) => record.flag(flag),
    }
}

pub fn completed_count(record: &DayRecord, goals: &Goals, dims: &DimensionSet) -> usize {
    dims.checks()
        .iter()
        .filter(|c| check_satisfied(**c, record, goals))
        .count()
}

pub fn heat_for(completed: usize, dims: &DimensionSet) -> Heat {
    let t = dims.thresholds();
    if completed >= t.high {
        Heat::High
    } else if completed >= t.medium {
        Heat::Medium
    } else {
        Heat::Low
    }
}

pub fn score_day(record: &DayRecord, goals: &Goals, dims: &DimensionSet) -> DayScore {
    let checks: Vec<bool> = dims
        .checks()
        .iter()
        .map(|c| check_satisfied(*c, record, goals))
        .collect();
    let completed = checks.iter().filter(|c| **c).count();
    DayScore {
        heat: heat_for(completed, dims),
        checks,
        completed,
    }
}

/// At least one check satisfied.
pub fn is_active(record: &DayRecord, goals: &Goals, dims: &DimensionSet) -> bool {
    dims.checks()
        .iter()
        .any(|c| check_satisfied(*c, record, goals))
}

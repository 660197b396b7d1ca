use crate::models::{Counter, DayRecord, Flag, Goals};
use crate::tracker::DimensionSet;

/// Something still open today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outstanding {
    Counter { counter: Counter, left: u32 },
    Flag(Flag),
}

/// What is left toward today's goals. Mosque attendance and night prayers
/// are not nagged about; they cannot be caught up on later in the day.
pub fn remaining(record: &DayRecord, goals: &Goals, dims: &DimensionSet) -> Vec<Outstanding> {
    let mut out = Vec::new();
    for counter in Counter::ALL {
        let left = goals.get(counter).saturating_sub(record.counter(counter));
        if left > 0 {
            out.push(Outstanding::Counter { counter, left });
        }
    }
    for flag in dims.flags() {
        if matches!(flag, Flag::Taraweeh | Flag::Tahajjud) {
            continue;
        }
        if !record.flag(flag) {
            out.push(Outstanding::Flag(flag));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_counters_short_of_goal_and_open_adhkar() {
        let record = DayRecord {
            quran_pages: 15,
            istighfar: 600,
            morning_adhkar: true,
            ..DayRecord::default()
        };
        let out = remaining(&record, &Goals::default(), &DimensionSet::extended());
        assert!(out.contains(&Outstanding::Counter {
            counter: Counter::QuranPages,
            left: 5
        }));
        assert!(!out
            .iter()
            .any(|o| matches!(o, Outstanding::Counter { counter: Counter::Istighfar, .. })));
        assert!(out.contains(&Outstanding::Flag(Flag::EveningAdhkar)));
        assert!(!out.contains(&Outstanding::Flag(Flag::MorningAdhkar)));
        assert!(!out.contains(&Outstanding::Flag(Flag::Tahajjud)));
    }

    #[test]
    fn nothing_left_when_all_goals_met() {
        let goals = Goals::default();
        let record = DayRecord {
            quran_pages: goals.quran_pages,
            istighfar: goals.istighfar,
            dhikr: goals.dhikr,
            charity: goals.charity,
            dua: goals.dua,
            ..DayRecord::default()
        };
        assert!(remaining(&record, &goals, &DimensionSet::base()).is_empty());
    }
}

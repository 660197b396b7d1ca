use serde::{Deserialize, Serialize};

use crate::models::{CheckKind, Counter, Flag};

/// Three-tier summary of a day's completion count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heat {
    Low,
    Medium,
    High,
}

impl Heat {
    pub fn symbol(&self) -> &'static str {
        match self {
            Heat::High => "🟩",
            Heat::Medium => "🟨",
            Heat::Low => "🟥",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

/// Result of scoring one day against a dimension set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayScore {
    /// One entry per check, in dimension-set order.
    pub checks: Vec<bool>,
    pub completed: usize,
    pub heat: Heat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterTotal {
    pub counter: Counter,
    pub total: u64,
    pub per_day: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDays {
    pub flag: Flag,
    pub days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalHit {
    pub check: CheckKind,
    pub hits: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestDay {
    pub date: String,
    pub completed: usize,
}

/// Aggregate statistics over a user's whole history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub total_days: u32,
    pub total_checks: usize,
    pub streak: Streak,
    pub perfect_days: u32,
    /// Mean completed checks per day, rounded to one decimal place.
    pub average_completion: f64,
    pub best_day: BestDay,
    pub heatmap: Vec<Heat>,
    pub counters: Vec<CounterTotal>,
    pub mosque_prayers: u64,
    pub mosque_per_day: f64,
    pub flag_days: Vec<FlagDays>,
    pub goal_hits: Vec<GoalHit>,
}

impl StatisticsReport {
    pub fn mosque_possible(&self) -> u64 {
        self.total_days as u64 * 5
    }

    pub fn counter(&self, counter: Counter) -> Option<&CounterTotal> {
        self.counters.iter().find(|c| c.counter == counter)
    }
}

pub mod day;
pub mod goals;
pub mod habit;
pub mod prayer;
pub mod stats;

pub use day::{day_key, parse_day_key, DayMap, DayRecord};
pub use goals::{Goals, StoredGoals};
pub use habit::{CheckKind, Counter, Flag};
pub use prayer::{MosqueAttendance, Prayer};
pub use stats::{
    BestDay, CounterTotal, DayScore, FlagDays, GoalHit, Heat, StatisticsReport, Streak,
};

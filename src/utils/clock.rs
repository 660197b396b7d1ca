use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::models::day_key;

/// Time source bound to one fixed UTC offset.
#[derive(Debug, Clone)]
pub struct Clock {
    offset: FixedOffset,
    campaign_start: Option<NaiveDate>,
    pinned: Option<NaiveDate>,
}

impl Clock {
    pub fn new(offset_minutes: i32, campaign_start: Option<NaiveDate>) -> Result<Self> {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("Invalid timezone offset: {} minutes", offset_minutes))?;
        Ok(Self {
            offset,
            campaign_start,
            pinned: None,
        })
    }

    /// A clock whose "today" never moves.
    pub fn pinned(today: NaiveDate, campaign_start: Option<NaiveDate>) -> Self {
        Self {
            offset: Utc.fix(),
            campaign_start,
            pinned: Some(today),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned
            .unwrap_or_else(|| Utc::now().with_timezone(&self.offset).date_naive())
    }

    pub fn today_key(&self) -> String {
        day_key(self.today())
    }

    pub fn days_since(&self, reference: NaiveDate) -> i64 {
        (self.today() - reference).num_days()
    }

    /// 1-based day of the campaign, `None` before it starts or when unset.
    pub fn campaign_day(&self) -> Option<i64> {
        let start = self.campaign_start?;
        let day = self.days_since(start) + 1;
        (day >= 1).then_some(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn campaign_day_is_one_based() {
        let start = Some(date(2026, 2, 18));
        assert_eq!(Clock::pinned(date(2026, 2, 18), start).campaign_day(), Some(1));
        assert_eq!(Clock::pinned(date(2026, 3, 1), start).campaign_day(), Some(12));
        assert_eq!(Clock::pinned(date(2026, 2, 17), start).campaign_day(), None);
        assert_eq!(Clock::pinned(date(2026, 2, 20), None).campaign_day(), None);
    }

    #[test]
    fn pinned_clock_reports_its_key() {
        let clock = Clock::pinned(date(2026, 2, 18), None);
        assert_eq!(clock.today_key(), "2026-02-18");
        assert_eq!(clock.days_since(date(2026, 2, 8)), 10);
    }

    #[test]
    fn rejects_out_of_range_offset() {
        assert!(Clock::new(24 * 60, None).is_err());
        assert!(Clock::new(-300, None).is_ok());
        assert!(Clock::new(i32::MAX, None).is_err());
        assert!(Clock::new(i32::MIN, None).is_err());
    }
}

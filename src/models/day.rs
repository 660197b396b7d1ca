use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Counter, Flag, MosqueAttendance, Prayer};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// All of a user's records keyed by date. Iteration order is chronological.
pub type DayMap = BTreeMap<String, DayRecord>;

pub fn day_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// One user's observations for one calendar day. Every field is always
/// populated; missing values deserialize to zero/false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayRecord {
    pub quran_pages: u32,
    pub mosque: MosqueAttendance,
    pub taraweeh: bool,
    pub tahajjud: bool,
    pub morning_adhkar: bool,
    pub evening_adhkar: bool,
    pub duha: bool,
    pub istighfar: u32,
    pub dhikr: u32,
    pub charity: u32,
    pub dua: u32,
    pub updated_at: DateTime<Utc>,
}

impl DayRecord {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            ..Self::default()
        }
    }

    pub fn counter(&self, counter: Counter) -> u32 {
        match counter {
            Counter::QuranPages => self.quran_pages,
            Counter::Istighfar => self.istighfar,
            Counter::Dhikr => self.dhikr,
            Counter::Charity => self.charity,
            Counter::Dua => self.dua,
        }
    }

    pub fn flag(&self, flag: Flag) -> bool {
        match flag {
            Flag::Taraweeh => self.taraweeh,
            Flag::Tahajjud => self.tahajjud,
            Flag::MorningAdhkar => self.morning_adhkar,
            Flag::EveningAdhkar => self.evening_adhkar,
            Flag::Duha => self.duha,
        }
    }

    pub fn mosque_count(&self) -> u32 {
        self.mosque.count()
    }

    pub fn attended(&self, prayer: Prayer) -> bool {
        self.mosque.get(prayer)
    }

    pub fn add(&mut self, counter: Counter, amount: u32) {
        let slot = match counter {
            Counter::QuranPages => &mut self.quran_pages,
            Counter::Istighfar => &mut self.istighfar,
            Counter::Dhikr => &mut self.dhikr,
            Counter::Charity => &mut self.charity,
            Counter::Dua => &mut self.dua,
        };
        *slot = slot.saturating_add(amount);
    }

    pub fn toggle_flag(&mut self, flag: Flag) {
        let slot = match flag {
            Flag::Taraweeh => &mut self.taraweeh,
            Flag::Tahajjud => &mut self.tahajjud,
            Flag::MorningAdhkar => &mut self.morning_adhkar,
            Flag::EveningAdhkar => &mut self.evening_adhkar,
            Flag::Duha => &mut self.duha,
        };
        *slot = !*slot;
    }

    pub fn toggle_prayer(&mut self, prayer: Prayer) {
        let current = self.mosque.get(prayer);
        self.mosque.set(prayer, !current);
    }
}

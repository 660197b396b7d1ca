use serde::{Deserialize, Serialize};

use crate::models::Counter;

fn default_quran_pages() -> u32 {
    20
}
fn default_istighfar() -> u32 {
    500
}
fn default_dhikr() -> u32 {
    100
}
fn default_charity() -> u32 {
    100
}
fn default_dua() -> u32 {
    3
}

/// Daily targets for the quantitative habits. A goal of 0 is always met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    #[serde(default = "default_quran_pages")]
    pub quran_pages: u32,
    #[serde(default = "default_istighfar")]
    pub istighfar: u32,
    #[serde(default = "default_dhikr")]
    pub dhikr: u32,
    #[serde(default = "default_charity")]
    pub charity: u32,
    #[serde(default = "default_dua")]
    pub dua: u32,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            quran_pages: default_quran_pages(),
            istighfar: default_istighfar(),
            dhikr: default_dhikr(),
            charity: default_charity(),
            dua: default_dua(),
        }
    }
}

impl Goals {
    pub fn get(&self, counter: Counter) -> u32 {
        match counter {
            Counter::QuranPages => self.quran_pages,
            Counter::Istighfar => self.istighfar,
            Counter::Dhikr => self.dhikr,
            Counter::Charity => self.charity,
            Counter::Dua => self.dua,
        }
    }

    pub fn set(&mut self, counter: Counter, value: u32) {
        match counter {
            Counter::QuranPages => self.quran_pages = value,
            Counter::Istighfar => self.istighfar = value,
            Counter::Dhikr => self.dhikr = value,
            Counter::Charity => self.charity = value,
            Counter::Dua => self.dua = value,
        }
    }
}

/// Goals as stored for a user: any field may still be unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGoals {
    pub quran_pages: Option<u32>,
    pub istighfar: Option<u32>,
    pub dhikr: Option<u32>,
    pub charity: Option<u32>,
    pub dua: Option<u32>,
}

impl StoredGoals {
    pub fn get(&self, counter: Counter) -> Option<u32> {
        match counter {
            Counter::QuranPages => self.quran_pages,
            Counter::Istighfar => self.istighfar,
            Counter::Dhikr => self.dhikr,
            Counter::Charity => self.charity,
            Counter::Dua => self.dua,
        }
    }

    pub fn resolve(&self, defaults: &Goals) -> Goals {
        let mut goals = *defaults;
        for counter in Counter::ALL {
            if let Some(v) = self.get(counter) {
                goals.set(counter, v);
            }
        }
        goals
    }
}

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cumulative, additive quantities tracked per day. Each one has a daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    QuranPages,
    Istighfar,
    Dhikr,
    Charity,
    Dua,
}

impl Counter {
    /// Also the order in which the setup wizard asks for goals.
    pub const ALL: [Counter; 5] = [
        Counter::QuranPages,
        Counter::Istighfar,
        Counter::Dhikr,
        Counter::Charity,
        Counter::Dua,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Counter::QuranPages => "quran",
            Counter::Istighfar => "istighfar",
            Counter::Dhikr => "dhikr",
            Counter::Charity => "charity",
            Counter::Dua => "dua",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Counter::QuranPages => "Quran",
            Counter::Istighfar => "Istighfar",
            Counter::Dhikr => "Dhikr",
            Counter::Charity => "Charity",
            Counter::Dua => "Dua",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Counter::QuranPages => "📖",
            Counter::Istighfar => "🤍",
            Counter::Dhikr => "📿",
            Counter::Charity => "💰",
            Counter::Dua => "🤲",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Counter::QuranPages => "pages",
            Counter::Charity => "units",
            Counter::Dua => "times",
            Counter::Istighfar | Counter::Dhikr => "",
        }
    }

    pub fn setup_question(&self) -> &'static str {
        match self {
            Counter::QuranPages => "How many pages of Quran per day?",
            Counter::Istighfar => "Istighfar per day (count)?",
            Counter::Dhikr => "Dhikr per day (count)?",
            Counter::Charity => "Charity per day (currency units)?",
            Counter::Dua => "Dua per day (times)?",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Counter::QuranPages => "quran_pages",
            Counter::Istighfar => "istighfar",
            Counter::Dhikr => "dhikr",
            Counter::Charity => "charity",
            Counter::Dua => "dua",
        }
    }
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Counter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quran" | "quran_pages" | "pages" => Ok(Counter::QuranPages),
            "istighfar" => Ok(Counter::Istighfar),
            "dhikr" | "zikr" => Ok(Counter::Dhikr),
            "charity" | "sadaqa" | "sadaqah" => Ok(Counter::Charity),
            "dua" => Ok(Counter::Dua),
            _ => Err(anyhow::anyhow!("Unknown metric: {}", s)),
        }
    }
}

/// Simple checklist items with no numeric goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    Taraweeh,
    Tahajjud,
    MorningAdhkar,
    EveningAdhkar,
    Duha,
}

impl Flag {
    pub const ALL: [Flag; 5] = [
        Flag::Taraweeh,
        Flag::Tahajjud,
        Flag::MorningAdhkar,
        Flag::EveningAdhkar,
        Flag::Duha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Taraweeh => "taraweeh",
            Flag::Tahajjud => "tahajjud",
            Flag::MorningAdhkar => "morning",
            Flag::EveningAdhkar => "evening",
            Flag::Duha => "duha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Flag::Taraweeh => "Taraweeh",
            Flag::Tahajjud => "Tahajjud",
            Flag::MorningAdhkar => "Morning Adhkar",
            Flag::EveningAdhkar => "Evening Adhkar",
            Flag::Duha => "Duha",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Flag::Taraweeh => "🌙",
            Flag::Tahajjud => "🕯",
            Flag::MorningAdhkar => "🌅",
            Flag::EveningAdhkar => "🌆",
            Flag::Duha => "☀️",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Flag::Taraweeh => "taraweeh",
            Flag::Tahajjud => "tahajjud",
            Flag::MorningAdhkar => "morning_adhkar",
            Flag::EveningAdhkar => "evening_adhkar",
            Flag::Duha => "duha",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Flag {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "taraweeh" | "tarawih" => Ok(Flag::Taraweeh),
            "tahajjud" => Ok(Flag::Tahajjud),
            "morning" | "morning_adhkar" | "azkar_morning" => Ok(Flag::MorningAdhkar),
            "evening" | "evening_adhkar" | "azkar_evening" => Ok(Flag::EveningAdhkar),
            "duha" | "dhuha" => Ok(Flag::Duha),
            _ => Err(anyhow::anyhow!("Unknown habit: {}", s)),
        }
    }
}

/// One dimension contributing to a day's completion score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum CheckKind {
    /// Counter value reached the user's goal.
    Goal(Counter),
    /// All five prayers attended at the mosque.
    Mosque,
    Flag(Flag),
}

impl CheckKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            CheckKind::Goal(c) => c.display_name(),
            CheckKind::Mosque => "Mosque 5/5",
            CheckKind::Flag(f) => f.display_name(),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            CheckKind::Goal(c) => c.icon(),
            CheckKind::Mosque => "🕌",
            CheckKind::Flag(f) => f.icon(),
        }
    }
}

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::models::{CheckKind, Counter, Flag};

/// Fixed completion counts at which a day turns medium or high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatThresholds {
    pub high: usize,
    pub medium: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistPreset {
    /// Goals, mosque 5/5, taraweeh and tahajjud.
    Base,
    /// Base plus morning/evening adhkar and duha.
    #[default]
    Extended,
}

/// The ordered set of checks a day is scored against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSet {
    checks: Vec<CheckKind>,
    thresholds: HeatThresholds,
}

impl DimensionSet {
    pub fn new(checks: Vec<CheckKind>, thresholds: HeatThresholds) -> Result<Self> {
        if checks.is_empty() {
            bail!("A checklist needs at least one check");
        }
        if thresholds.medium > thresholds.high {
            bail!(
                "Medium threshold ({}) is above the high threshold ({})",
                thresholds.medium,
                thresholds.high
            );
        }
        if thresholds.high > checks.len() {
            bail!(
                "High threshold ({}) exceeds the number of checks ({})",
                thresholds.high,
                checks.len()
            );
        }
        Ok(Self { checks, thresholds })
    }

    pub fn preset(preset: ChecklistPreset) -> Self {
        match preset {
            ChecklistPreset::Base => Self::base(),
            ChecklistPreset::Extended => Self::extended(),
        }
    }

    /// 8 checks: high at 7, medium at 4.
    pub fn base() -> Self {
        Self {
            checks: vec![
                CheckKind::Goal(Counter::QuranPages),
                CheckKind::Mosque,
                CheckKind::Flag(Flag::Taraweeh),
                CheckKind::Flag(Flag::Tahajjud),
                CheckKind::Goal(Counter::Istighfar),
                CheckKind::Goal(Counter::Dhikr),
                CheckKind::Goal(Counter::Charity),
                CheckKind::Goal(Counter::Dua),
            ],
            thresholds: HeatThresholds { high: 7, medium: 4 },
        }
    }

    /// 11 checks: high at 9, medium at 6.
    pub fn extended() -> Self {
        Self {
            checks: vec![
                CheckKind::Goal(Counter::QuranPages),
                CheckKind::Mosque,
                CheckKind::Flag(Flag::Taraweeh),
                CheckKind::Flag(Flag::Tahajjud),
                CheckKind::Flag(Flag::MorningAdhkar),
                CheckKind::Flag(Flag::EveningAdhkar),
                CheckKind::Flag(Flag::Duha),
                CheckKind::Goal(Counter::Istighfar),
                CheckKind::Goal(Counter::Dhikr),
                CheckKind::Goal(Counter::Charity),
                CheckKind::Goal(Counter::Dua),
            ],
            thresholds: HeatThresholds { high: 9, medium: 6 },
        }
    }

    pub fn with_thresholds(self, thresholds: HeatThresholds) -> Result<Self> {
        Self::new(self.checks, thresholds)
    }

    pub fn checks(&self) -> &[CheckKind] {
        &self.checks
    }

    pub fn total_checks(&self) -> usize {
        self.checks.len()
    }

    pub fn thresholds(&self) -> HeatThresholds {
        self.thresholds
    }

    /// Boolean checklist items in this set, in check order.
    pub fn flags(&self) -> impl Iterator<Item = Flag> + '_ {
        self.checks.iter().filter_map(|c| match c {
            CheckKind::Flag(f) => Some(*f),
            _ => None,
        })
    }

    pub fn contains(&self, check: CheckKind) -> bool {
        self.checks.contains(&check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_expected_sizes() {
        assert_eq!(DimensionSet::base().total_checks(), 8);
        assert_eq!(DimensionSet::extended().total_checks(), 11);
        assert_eq!(DimensionSet::base().flags().count(), 2);
        assert_eq!(DimensionSet::extended().flags().count(), 5);
    }

    #[test]
    fn rejects_inconsistent_thresholds() {
        let base = DimensionSet::base();
        assert!(base
            .clone()
            .with_thresholds(HeatThresholds { high: 9, medium: 4 })
            .is_err());
        assert!(base
            .clone()
            .with_thresholds(HeatThresholds { high: 5, medium: 6 })
            .is_err());
        let tuned = base
            .with_thresholds(HeatThresholds { high: 8, medium: 5 })
            .unwrap();
        assert_eq!(tuned.thresholds().high, 8);
    }

    #[test]
    fn rejects_empty_checklist() {
        assert!(DimensionSet::new(vec![], HeatThresholds { high: 0, medium: 0 }).is_err());
    }
}

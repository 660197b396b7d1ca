use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::Goals;
use crate::tracker::{ChecklistPreset, DimensionSet, HeatThresholds, DEFAULT_HEATMAP_WINDOW};
use crate::utils::clock::Clock;

fn default_timezone_offset() -> i32 {
    180
}
fn default_campaign_name() -> String {
    "Ramadan".to_string()
}
fn default_campaign_start() -> Option<String> {
    Some("2026-02-18".to_string())
}
fn default_heatmap_window() -> usize {
    DEFAULT_HEATMAP_WINDOW
}
fn default_user_id() -> String {
    "local".to_string()
}
fn default_hijri_offset() -> i32 {
    0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Minutes east of UTC used to decide which day "today" is.
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset: i32,
    #[serde(default = "default_campaign_name")]
    pub campaign_name: String,
    /// YYYY-MM-DD; day 1 of the campaign. Display only.
    #[serde(default = "default_campaign_start")]
    pub campaign_start: Option<String>,
    #[serde(default)]
    pub checklist: ChecklistPreset,
    /// Overrides the preset's heat tiers when both are set.
    #[serde(default)]
    pub heat_high: Option<usize>,
    #[serde(default)]
    pub heat_medium: Option<usize>,
    #[serde(default = "default_heatmap_window")]
    pub heatmap_window: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            timezone_offset: default_timezone_offset(),
            campaign_name: default_campaign_name(),
            campaign_start: default_campaign_start(),
            checklist: ChecklistPreset::default(),
            heat_high: None,
            heat_medium: None,
            heatmap_window: default_heatmap_window(),
        }
    }
}

impl TrackerConfig {
    pub fn dimension_set(&self) -> Result<DimensionSet> {
        let dims = DimensionSet::preset(self.checklist);
        match (self.heat_high, self.heat_medium) {
            (Some(high), Some(medium)) => dims
                .with_thresholds(HeatThresholds { high, medium })
                .context("Invalid heat thresholds in config.toml"),
            (None, None) => Ok(dims),
            _ => anyhow::bail!("Set both heat_high and heat_medium, or neither"),
        }
    }

    pub fn campaign_start_date(&self) -> Result<Option<NaiveDate>> {
        self.campaign_start
            .as_deref()
            .map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .with_context(|| format!("Bad campaign_start '{}', expected YYYY-MM-DD", s))
            })
            .transpose()
    }

    pub fn clock(&self) -> Result<Clock> {
        Clock::new(self.timezone_offset, self.campaign_start_date()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Profile used when `--user` is not given.
    #[serde(default = "default_user_id")]
    pub default_id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            default_id: default_user_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Days to add/subtract from Hijri date for local moon sighting.
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hijri_offset: default_hijri_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    /// Goals used for anything a user has not configured.
    #[serde(default)]
    pub goals: Goals,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "ibadah")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("ibadah.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.tracker.timezone_offset, 180);
        assert_eq!(config.goals, Goals::default());
        assert_eq!(config.user.default_id, "local");
        assert_eq!(config.tracker.dimension_set().unwrap().total_checks(), 11);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[tracker]\nchecklist = \"base\"\n\n[goals]\nquran_pages = 10\n",
        )
        .unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.tracker.checklist, ChecklistPreset::Base);
        assert_eq!(config.goals.quran_pages, 10);
        assert_eq!(config.goals.istighfar, 500);
        assert_eq!(config.tracker.heatmap_window, 14);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.tracker.campaign_start = Some("2027-02-08".to_string());
        config.goals.dua = 7;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.goals.dua, 7);
        assert_eq!(loaded.tracker.campaign_start.as_deref(), Some("2027-02-08"));
    }

    #[test]
    fn half_set_thresholds_are_rejected() {
        let mut tracker = TrackerConfig::default();
        tracker.heat_high = Some(8);
        assert!(tracker.dimension_set().is_err());
        tracker.heat_medium = Some(5);
        assert_eq!(tracker.dimension_set().unwrap().thresholds().medium, 5);
    }

    #[test]
    fn bad_campaign_start_is_an_error() {
        let tracker = TrackerConfig {
            campaign_start: Some("18/02/2026".into()),
            ..TrackerConfig::default()
        };
        assert!(tracker.clock().is_err());
    }
}

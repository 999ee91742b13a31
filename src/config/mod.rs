use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::core::services::{overview_service::MAX_EVENT_WINDOW_DAYS, MaintenancePolicy};
use crate::errors::HouseholdError;
use crate::utils::paths;

const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

pub const MAX_HORIZON_COUNT: u32 = 520;
pub const MAX_PRUNE_AFTER_MONTHS: u32 = 1_200;
pub const MAX_DUE_SOON_DAYS: i64 = 366;
pub const MAX_SHARE_CODE_TTL_HOURS: i64 = 24 * 366;
pub const MAX_SYNC_INTERVAL_SECS: i64 = 86_400;
pub const MAX_MAINTENANCE_INTERVAL_HOURS: i64 = 24 * 366;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

impl From<ConfigError> for HouseholdError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => HouseholdError::Storage(io.to_string()),
            ConfigError::Serde(message) | ConfigError::Invalid(message) => {
                HouseholdError::Configuration(message)
            }
        }
    }
}

/// Tunables for the recurrence horizon, sync cadence and presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Instances generated per recurring bill in one pass.
    pub horizon_count: u32,
    /// Originals with fewer future instances than this are topped up.
    pub replenish_below: usize,
    pub prune_after_months: u32,
    pub due_soon_days: i64,
    pub upcoming_window_days: i64,
    pub share_code_ttl_hours: i64,
    pub sync_interval_secs: i64,
    pub maintenance_interval_hours: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for household data. Defaults to `<home>/data`.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            horizon_count: 12,
            replenish_below: 6,
            prune_after_months: 6,
            due_soon_days: 3,
            upcoming_window_days: 7,
            share_code_ttl_hours: 24,
            sync_interval_secs: 5,
            maintenance_interval_hours: 24,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn maintenance_policy(&self) -> MaintenancePolicy {
        MaintenancePolicy {
            prune_after_months: self.prune_after_months,
            replenish_below: self.replenish_below,
            horizon: self.horizon_count,
        }
    }

    /// Real-time broadcast cadence, clamped to the accepted range.
    pub fn sync_interval(&self) -> Duration {
        Duration::seconds(self.sync_interval_secs.clamp(0, MAX_SYNC_INTERVAL_SECS))
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::hours(
            self.maintenance_interval_hours
                .clamp(0, MAX_MAINTENANCE_INTERVAL_HOURS),
        )
    }

    pub fn share_code_ttl(&self) -> Duration {
        Duration::hours(self.share_code_ttl_hours.clamp(0, MAX_SHARE_CODE_TTL_HOURS))
    }

    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        match &self.data_dir {
            Some(path) => path.clone(),
            None => paths::data_dir_in(base),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_count == 0 {
            return Err(ConfigError::Invalid("horizon_count must be at least 1".into()));
        }
        if self.replenish_below as u64 > u64::from(self.horizon_count) {
            return Err(ConfigError::Invalid(format!(
                "replenish_below ({}) cannot exceed horizon_count ({})",
                self.replenish_below, self.horizon_count
            )));
        }
        if self.horizon_count > MAX_HORIZON_COUNT {
            return Err(ConfigError::Invalid(format!(
                "horizon_count must be at most {MAX_HORIZON_COUNT}"
            )));
        }
        if self.prune_after_months > MAX_PRUNE_AFTER_MONTHS {
            return Err(ConfigError::Invalid(format!(
                "prune_after_months must be at most {MAX_PRUNE_AFTER_MONTHS}"
            )));
        }
        let bounded = [
            ("due_soon_days", self.due_soon_days, MAX_DUE_SOON_DAYS),
            (
                "upcoming_window_days",
                self.upcoming_window_days,
                MAX_EVENT_WINDOW_DAYS,
            ),
            (
                "share_code_ttl_hours",
                self.share_code_ttl_hours,
                MAX_SHARE_CODE_TTL_HOURS,
            ),
            ("sync_interval_secs", self.sync_interval_secs, MAX_SYNC_INTERVAL_SECS),
            (
                "maintenance_interval_hours",
                self.maintenance_interval_hours,
                MAX_MAINTENANCE_INTERVAL_HOURS,
            ),
        ];
        for (name, value, max) in bounded {
            if value < 0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative")));
            }
            if value > max {
                return Err(ConfigError::Invalid(format!("{name} must be at most {max}")));
            }
        }
        Ok(())
    }
}

/// Loads and saves [`Config`] as JSON under the application home.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        let path = base.join(CONFIG_FILE);
        Ok(Self { base, path })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config =
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = self.path.with_extension(format!("json.{TMP_SUFFIX}"));
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

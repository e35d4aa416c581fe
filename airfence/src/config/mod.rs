//! Persistent configuration file.
//!
//! Settings live in an INI file at `<config dir>/airfence/config.ini`:
//!
//! ```text
//! [engine]
//! track_timeout_secs = 180
//! notify_classes = uav, manned_ac
//!
//! [scheduler]
//! sweep_interval_secs = 30
//!
//! [feed]
//! adsb_url = https://adsbexchange-com1.p.rapidapi.com/v2
//! adsb_api_key =
//! poll_interval_secs = 120
//! ```
//!
//! A missing file yields defaults. Values that fail to parse are errors;
//! unknown sections and keys are ignored.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::engine::{EngineConfig, DEFAULT_NOTIFY_CLASSES};
use crate::reaper::DEFAULT_TRACK_TIMEOUT_SECS;
use crate::scheduler::{SchedulerConfig, DEFAULT_SWEEP_INTERVAL_SECS};
use crate::track::AircraftClass;

/// Default ADS-B Exchange v2 endpoint.
pub const DEFAULT_ADSB_URL: &str = "https://adsbexchange-com1.p.rapidapi.com/v2";

/// Default time between ADS-B polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 120;

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSection {
    pub track_timeout_secs: u64,
    pub notify_classes: Vec<AircraftClass>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            track_timeout_secs: DEFAULT_TRACK_TIMEOUT_SECS,
            notify_classes: DEFAULT_NOTIFY_CLASSES.to_vec(),
        }
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSection {
    pub sweep_interval_secs: u64,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

/// `[feed]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSection {
    pub adsb_url: String,
    pub adsb_api_key: Option<String>,
    pub poll_interval_secs: u64,
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            adsb_url: DEFAULT_ADSB_URL.to_string(),
            adsb_api_key: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

/// Parsed contents of `config.ini`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub scheduler: SchedulerSection,
    pub feed: FeedSection,
}

impl ConfigFile {
    /// Load from the default location, or defaults if the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Write to the default location, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Engine settings described by this file.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_track_timeout(Duration::from_secs(self.engine.track_timeout_secs))
            .with_notify_classes(self.engine.notify_classes.iter().copied())
    }

    /// Scheduler settings described by this file.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_sweep_interval(Duration::from_secs(self.scheduler.sweep_interval_secs))
    }
}

/// Directory holding `config.ini`.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airfence")
}

/// Full path of `config.ini`.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// Every setting addressable as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    EngineTrackTimeoutSecs,
    EngineNotifyClasses,
    SchedulerSweepIntervalSecs,
    FeedAdsbUrl,
    FeedAdsbApiKey,
    FeedPollIntervalSecs,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::EngineTrackTimeoutSecs,
            ConfigKey::EngineNotifyClasses,
            ConfigKey::SchedulerSweepIntervalSecs,
            ConfigKey::FeedAdsbUrl,
            ConfigKey::FeedAdsbApiKey,
            ConfigKey::FeedPollIntervalSecs,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::EngineTrackTimeoutSecs | ConfigKey::EngineNotifyClasses => "engine",
            ConfigKey::SchedulerSweepIntervalSecs => "scheduler",
            ConfigKey::FeedAdsbUrl | ConfigKey::FeedAdsbApiKey | ConfigKey::FeedPollIntervalSecs => {
                "feed"
            }
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::EngineTrackTimeoutSecs => "track_timeout_secs",
            ConfigKey::EngineNotifyClasses => "notify_classes",
            ConfigKey::SchedulerSweepIntervalSecs => "sweep_interval_secs",
            ConfigKey::FeedAdsbUrl => "adsb_url",
            ConfigKey::FeedAdsbApiKey => "adsb_api_key",
            ConfigKey::FeedPollIntervalSecs => "poll_interval_secs",
        }
    }

    /// `section.key`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as written to the file. Unset values are empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::EngineTrackTimeoutSecs => config.engine.track_timeout_secs.to_string(),
            ConfigKey::EngineNotifyClasses => config
                .engine
                .notify_classes
                .iter()
                .map(AircraftClass::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            ConfigKey::SchedulerSweepIntervalSecs => {
                config.scheduler.sweep_interval_secs.to_string()
            }
            ConfigKey::FeedAdsbUrl => config.feed.adsb_url.clone(),
            ConfigKey::FeedAdsbApiKey => config.feed.adsb_api_key.clone().unwrap_or_default(),
            ConfigKey::FeedPollIntervalSecs => config.feed.poll_interval_secs.to_string(),
        }
    }

    /// Parse `value` and store it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::EngineTrackTimeoutSecs => {
                config.engine.track_timeout_secs = self.parse_secs(value)?;
            }
            ConfigKey::EngineNotifyClasses => {
                config.engine.notify_classes = self.parse_classes(value)?;
            }
            ConfigKey::SchedulerSweepIntervalSecs => {
                config.scheduler.sweep_interval_secs = self.parse_secs(value)?;
            }
            ConfigKey::FeedAdsbUrl => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.feed.adsb_url = value.trim_end_matches('/').to_string();
            }
            ConfigKey::FeedAdsbApiKey => {
                config.feed.adsb_api_key = (!value.is_empty()).then(|| value.to_string());
            }
            ConfigKey::FeedPollIntervalSecs => {
                config.feed.poll_interval_secs = self.parse_secs(value)?;
            }
        }
        Ok(())
    }

    fn parse_secs(&self, value: &str) -> Result<u64, ConfigError> {
        match value.parse::<u64>() {
            Ok(0) => Err(self.invalid(value, "must be greater than zero")),
            Ok(secs) => Ok(secs),
            Err(e) => Err(self.invalid(value, &e.to_string())),
        }
    }

    fn parse_classes(&self, value: &str) -> Result<Vec<AircraftClass>, ConfigError> {
        let mut seen = HashSet::new();
        let mut classes = Vec::new();
        for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let class =
                AircraftClass::from_str(name).map_err(|e| self.invalid(value, &e.to_string()))?;
            if seen.insert(class) {
                classes.push(class);
            }
        }
        Ok(classes)
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name() == s.trim())
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.engine_config(), EngineConfig::default());
        assert_eq!(config.scheduler_config(), SchedulerConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.engine.track_timeout_secs = 90;
        config.engine.notify_classes = vec![AircraftClass::Uav];
        config.feed.adsb_api_key = Some("secret".to_string());
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.engine_config().track_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[scheduler]\nsweep_interval_secs = 5\n[other]\nx = 1\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.scheduler.sweep_interval_secs, 5);
        assert_eq!(config.engine, EngineSection::default());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[engine]\nnotify_classes = uav, glider\n").unwrap();
        assert!(matches!(
            ConfigFile::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut config = ConfigFile::default();
        assert!(ConfigKey::EngineTrackTimeoutSecs.set(&mut config, "0").is_err());
        assert!(ConfigKey::FeedPollIntervalSecs.set(&mut config, "soon").is_err());
    }

    #[test]
    fn test_key_parse_and_get_set() {
        let key: ConfigKey = "engine.notify_classes".parse().unwrap();
        assert_eq!(key, ConfigKey::EngineNotifyClasses);
        assert!("engine.nope".parse::<ConfigKey>().is_err());

        let mut config = ConfigFile::default();
        key.set(&mut config, "Manned AC, uav, uav").unwrap();
        assert_eq!(key.get(&config), "manned_ac, uav");
    }

    #[test]
    fn test_empty_api_key_is_unset() {
        let mut config = ConfigFile::default();
        ConfigKey::FeedAdsbApiKey.set(&mut config, "  ").unwrap();
        assert_eq!(config.feed.adsb_api_key, None);
        assert_eq!(ConfigKey::FeedAdsbApiKey.get(&config), "");
    }
}

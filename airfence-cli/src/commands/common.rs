//! Common types and utilities shared across CLI commands.

use std::path::Path;
use std::sync::Arc;

use airfence::alert::{AlertSink, SinkError};
use airfence::config::ConfigFile;
use airfence::{AlertDispatcher, AlertEvent, EngineConfig, SchedulerConfig, Topic, ZoneDefinition};
use tokio_util::sync::CancellationToken;

use crate::error::CliError;

/// Prints every alert to stdout, one per line.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    json: bool,
}

impl ConsoleSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl AlertSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn deliver(&self, event: &AlertEvent) -> Result<(), SinkError> {
        if self.json {
            let line = serde_json::to_string(event).map_err(|e| SinkError::new(e.to_string()))?;
            println!("{}", line);
        } else {
            println!("{}", event);
        }
        Ok(())
    }
}

/// Dispatcher with a console sink on the general topic.
pub fn console_dispatcher(json: bool) -> Arc<AlertDispatcher> {
    let dispatcher = Arc::new(AlertDispatcher::new());
    dispatcher.subscribe(Topic::General, Arc::new(ConsoleSink::new(json)));
    dispatcher
}

/// Cancel `token` on Ctrl+C.
pub fn cancel_on_ctrlc(token: &CancellationToken) -> Result<(), CliError> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, stopping...");
        token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))
}

/// Engine and scheduler settings from the config file with CLI overrides.
pub fn resolve_settings(
    config: &ConfigFile,
    track_timeout_secs: Option<u64>,
    sweep_interval_secs: Option<u64>,
) -> (EngineConfig, SchedulerConfig) {
    // CLI takes precedence, then config
    let mut engine = config.engine_config();
    if let Some(secs) = track_timeout_secs {
        engine = engine.with_track_timeout(std::time::Duration::from_secs(secs));
    }
    let mut scheduler = config.scheduler_config();
    if let Some(secs) = sweep_interval_secs {
        scheduler = scheduler.with_sweep_interval(std::time::Duration::from_secs(secs));
    }
    (engine, scheduler)
}

/// Read a JSON array of zone definitions.
pub fn load_zones(path: &Path) -> Result<Vec<ZoneDefinition>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_resolve_settings_cli_overrides_config() {
        let mut config = ConfigFile::default();
        config.engine.track_timeout_secs = 60;
        config.scheduler.sweep_interval_secs = 10;

        let (engine, scheduler) = resolve_settings(&config, None, None);
        assert_eq!(engine.track_timeout, Duration::from_secs(60));
        assert_eq!(scheduler.sweep_interval, Duration::from_secs(10));

        let (engine, scheduler) = resolve_settings(&config, Some(5), Some(1));
        assert_eq!(engine.track_timeout, Duration::from_secs(5));
        assert_eq!(scheduler.sweep_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_zero_sweep_interval_override_is_clamped() {
        let (_, scheduler) = resolve_settings(&ConfigFile::default(), None, Some(0));
        assert_eq!(
            scheduler.sweep_interval,
            airfence::scheduler::MIN_SWEEP_INTERVAL
        );
    }

    #[test]
    fn test_load_zones_reads_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "Z1", "start_time": 0, "end_time": 600,
                 "center_lat": 35.0, "center_lon": 135.0, "radius": 10000}}]"#
        )
        .unwrap();

        let zones = load_zones(file.path()).unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].id, "Z1");
    }

    #[test]
    fn test_load_zones_reports_path_on_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_zones(file.path()).unwrap_err();
        assert!(matches!(err, CliError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_console_sink_accepts_events() {
        let sink = ConsoleSink::new(true);
        assert!(sink.deliver(&AlertEvent::zone_created("Z1", 0.0)).is_ok());
    }
}

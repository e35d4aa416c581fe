//! CLI error type.

use std::fmt;

use airfence::config::ConfigError;
use airfence::feed::FeedError;
use airfence::sim::ScenarioError;
use airfence::GeofenceError;

/// Errors surfaced to the user by a command.
#[derive(Debug)]
pub enum CliError {
    /// Bad configuration or arguments.
    Config(String),
    /// Scenario failed to load or run.
    Scenario(ScenarioError),
    /// Feed could not be set up.
    Feed(FeedError),
    /// Engine or scheduler failure.
    Geofence(GeofenceError),
    /// File could not be read.
    Io { path: String, source: std::io::Error },
    /// Zone file could not be parsed.
    Parse { path: String, source: serde_json::Error },
    /// Background task failed.
    Task(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::Scenario(e) => write!(f, "{}", e),
            CliError::Feed(e) => write!(f, "{}", e),
            CliError::Geofence(e) => write!(f, "{}", e),
            CliError::Io { path, source } => write!(f, "failed to read {}: {}", path, source),
            CliError::Parse { path, source } => write!(f, "failed to parse {}: {}", path, source),
            CliError::Task(msg) => write!(f, "background task failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Scenario(e) => Some(e),
            CliError::Feed(e) => Some(e),
            CliError::Geofence(e) => Some(e),
            CliError::Io { source, .. } => Some(source),
            CliError::Parse { source, .. } => Some(source),
            CliError::Config(_) | CliError::Task(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ScenarioError> for CliError {
    fn from(e: ScenarioError) -> Self {
        CliError::Scenario(e)
    }
}

impl From<FeedError> for CliError {
    fn from(e: FeedError) -> Self {
        CliError::Feed(e)
    }
}

impl From<GeofenceError> for CliError {
    fn from(e: GeofenceError) -> Self {
        CliError::Geofence(e)
    }
}

impl From<tokio::task::JoinError> for CliError {
    fn from(e: tokio::task::JoinError) -> Self {
        CliError::Task(e.to_string())
    }
}

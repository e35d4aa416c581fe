//! Configuration management CLI commands.
//!
//! `config get`, `config set`, `config list` and `config path` read and
//! write `config.ini` from the command line. A file that fails to parse is
//! reported and never overwritten.

use std::path::Path;

use airfence::config::{config_file_path, ConfigFile, ConfigKey};
use clap::Subcommand;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Key as section.key (e.g., engine.track_timeout_secs)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Key as section.key (e.g., engine.track_timeout_secs)
        key: String,

        /// Value to set
        value: String,
    },

    /// List every setting, marking the ones left at their default
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the default config file.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    match command {
        ConfigCommands::Get { key } => {
            println!("{}", get_value(&path, &key)?);
        }
        ConfigCommands::Set { key, value } => {
            let key = set_value(&path, &key, &value)?;
            println!("Set {} = {}", key.name(), value);
        }
        ConfigCommands::List => {
            for line in list_lines(&path)? {
                println!("{}", line);
            }
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Run 'airfence config list' for the available keys.",
            key
        ))
    })
}

fn display_value(value: String) -> String {
    if value.is_empty() {
        "(not set)".to_string()
    } else {
        value
    }
}

fn get_value(path: &Path, key: &str) -> Result<String, CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load_from(path)?;
    Ok(display_value(config_key.get(&config)))
}

/// Validate and store one value. The file is only rewritten when it loaded
/// cleanly and the new value parses.
fn set_value(path: &Path, key: &str, value: &str) -> Result<ConfigKey, CliError> {
    let config_key = parse_key(key)?;
    let mut config = ConfigFile::load_from(path)?;
    config_key.set(&mut config, value)?;
    config.save_to(path)?;
    Ok(config_key)
}

fn list_lines(path: &Path) -> Result<Vec<String>, CliError> {
    let config = ConfigFile::load_from(path)?;
    let defaults = ConfigFile::default();

    let mut lines = vec![format!("# {}", path.display())];
    let mut current_section = "";
    for key in ConfigKey::all() {
        if key.section() != current_section {
            current_section = key.section();
            lines.push(String::new());
            lines.push(format!("[{}]", current_section));
        }

        let value = key.get(&config);
        let marker = if value == key.get(&defaults) {
            "  (default)"
        } else {
            ""
        };
        lines.push(format!(
            "  {} = {}{}",
            key.key_name(),
            display_value(value),
            marker
        ));
    }
    Ok(lines)
}

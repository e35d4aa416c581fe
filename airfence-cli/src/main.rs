//! Airfence CLI - Command-line interface
//!
//! Runs the geofence engine against simulated UAV traffic or a live ADS-B
//! feed, and manages the configuration file.

mod commands;
mod error;
mod logging;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::monitor::MonitorArgs;
use commands::simulate::SimulateArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "airfence", version, about = "Geofence notifications for aircraft tracks")]
struct Cli {
    /// More output (-v debug, -vv trace). Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a simulated scenario
    Simulate(SimulateArgs),

    /// Watch zones against the live ADS-B feed
    Monitor(MonitorArgs),

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result: Result<(), CliError> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args).await,
        Commands::Monitor(args) => commands::monitor::run(args).await,
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

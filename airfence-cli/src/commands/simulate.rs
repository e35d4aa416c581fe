//! `airfence simulate` - run a scenario file against the engine.
//!
//! ```text
//! scenario.json ──► UavGenerator ──► SimulationRunner ──┐
//!                                                       ▼
//!                        (optional) AdsbPoller ──► SweepScheduler ──► ConsoleSink
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use airfence::clock::{Clock, ScaledClock};
use airfence::config::ConfigFile;
use airfence::feed::{AdsbPoller, ReqwestFeedClient};
use airfence::scheduler::MIN_SWEEP_INTERVAL;
use airfence::sim::{Scenario, SimulationRunner, SimulationSummary, UavGenerator};
use airfence::{GeofenceEngine, SweepScheduler};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::common::{cancel_on_ctrlc, console_dispatcher, resolve_settings};
use crate::error::CliError;

/// Arguments for the simulate command.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Scenario file (JSON)
    pub scenario: PathBuf,

    /// Simulated seconds per real second
    #[arg(long, default_value_t = 60.0)]
    pub speed: f64,

    /// RNG seed (overrides the scenario's seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Seconds between sweeps (overrides config)
    #[arg(long)]
    pub sweep_interval: Option<u64>,

    /// Seconds without an update before a track is stale (overrides config)
    #[arg(long)]
    pub track_timeout: Option<u64>,

    /// Also poll ADS-B Exchange for the scenario's `adsb` area
    #[arg(long)]
    pub with_adsb: bool,

    /// Print alerts as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Run the simulate command.
pub async fn run(args: SimulateArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let scenario = Scenario::load(&args.scenario)?;
    let (engine_config, mut scheduler_config) =
        resolve_settings(&config, args.track_timeout, args.sweep_interval);

    // The sweep interval is in simulated seconds; the scheduler ticks on
    // real time.
    let speed = ScaledClock::new(args.speed).speed();
    scheduler_config.sweep_interval = scheduler_config
        .sweep_interval
        .div_f64(speed)
        .max(MIN_SWEEP_INTERVAL);

    let clock: Arc<dyn Clock> = Arc::new(ScaledClock::new(speed));
    let engine = GeofenceEngine::with_dispatcher(engine_config, console_dispatcher(args.json));
    let (scheduler, handle) = SweepScheduler::new(engine, Arc::clone(&clock), scheduler_config);

    let shutdown = CancellationToken::new();
    cancel_on_ctrlc(&shutdown)?;
    let scheduler_token = CancellationToken::new();
    let scheduler_task = scheduler.spawn(scheduler_token.clone());

    let poller_task = match (args.with_adsb, scenario.adsb) {
        (true, Some(area)) => {
            let client = ReqwestFeedClient::new(config.feed.adsb_api_key.clone())?;
            let poller = AdsbPoller::new(
                client,
                config.feed.adsb_url.clone(),
                area,
                handle.clone(),
                Arc::clone(&clock),
            )
            .with_poll_interval(Duration::from_secs(config.feed.poll_interval_secs));
            Some(tokio::spawn(poller.run(shutdown.child_token())))
        }
        (true, None) => {
            warn!("--with-adsb given but the scenario has no adsb area");
            None
        }
        (false, _) => None,
    };

    info!(
        scenario = %args.scenario.display(),
        duration = scenario.duration,
        speed,
        "Starting simulation"
    );

    let mut generator = UavGenerator::new(&scenario, args.seed)?;
    let mut runner = SimulationRunner::new(scenario, &mut generator, handle.clone(), clock);
    let outcome = runner.run(shutdown.clone()).await;

    shutdown.cancel();
    if let Some(task) = poller_task {
        task.await?;
    }
    let final_sweep = handle.sweep_now().await;
    scheduler_token.cancel();
    let engine = scheduler_task.await?;

    let summary = outcome?;
    if let Err(e) = final_sweep {
        warn!(error = %e, "Final sweep failed");
    }
    print_summary(&summary, &engine);
    Ok(())
}

fn print_summary(summary: &SimulationSummary, engine: &GeofenceEngine) {
    let snapshot = engine.snapshot();
    let active_tracks = snapshot.tracks.iter().filter(|t| t.is_active()).count();

    println!();
    println!("Simulation Summary");
    println!("==================");
    println!("  Zones created:    {}", summary.zones_created);
    println!("  UAVs launched:    {}", summary.launched);
    println!("  UAVs landed:      {}", summary.landed);
    println!("  Updates sent:     {}", summary.updates_sent);
    println!("  Updates rejected: {}", summary.updates_rejected);
    println!(
        "  Tracks:           {} ({} active)",
        snapshot.tracks.len(),
        active_tracks
    );
    for zone in &snapshot.zones {
        println!(
            "  Zone {:<12} {:?} ({} inside)",
            zone.id,
            zone.status,
            zone.members.len()
        );
    }
}

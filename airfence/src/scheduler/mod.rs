//! Sweep scheduler.
//!
//! [`SweepScheduler`] is a single-writer actor. One task owns the
//! [`GeofenceEngine`] and multiplexes inbound commands with a periodic sweep
//! timer. Each command or sweep runs to completion before the next one is
//! polled, so evaluations never interleave and shutdown never lands in the
//! middle of a membership update.
//!
//! ```text
//!   SchedulerHandle ──► Command channel ──┐
//!   (cloneable)                           │
//!                                         ▼
//!   interval tick ────────────────► ┌───────────┐
//!                                   │ scheduler │──► GeofenceEngine ──► alerts
//!   CancellationToken ────────────► └───────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use airfence::clock::ScaledClock;
//! use airfence::scheduler::{SchedulerConfig, SweepScheduler};
//!
//! let clock = Arc::new(ScaledClock::wall());
//! let (scheduler, handle) = SweepScheduler::new(engine, clock, SchedulerConfig::default());
//! let shutdown = CancellationToken::new();
//! let task = scheduler.spawn(shutdown.clone());
//!
//! handle.create_zone(zone_def).await?;
//! handle.submit_track(update).await?;
//!
//! shutdown.cancel();
//! let engine = task.await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::alert::AlertEvent;
use crate::clock::Clock;
use crate::engine::{EngineSnapshot, GeofenceEngine, SweepReport};
use crate::error::{GeofenceError, Result};
use crate::track::TrackUpdate;
use crate::zone::ZoneDefinition;

// =============================================================================
// Configuration
// =============================================================================

/// Default time between periodic sweeps.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Default command channel capacity.
pub const DEFAULT_COMMAND_CAPACITY: usize = 1024;

/// Shortest accepted sweep interval. Shorter values, zero included, are
/// raised to this.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// Configuration for the sweep scheduler.
#[derive(Clone, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Real time between periodic sweeps.
    pub sweep_interval: Duration,

    /// Command channel capacity. Senders wait when it is full.
    pub command_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            command_capacity: DEFAULT_COMMAND_CAPACITY,
        }
    }
}

impl SchedulerConfig {
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval.max(MIN_SWEEP_INTERVAL);
        self
    }

    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity.max(1);
        self
    }
}

// =============================================================================
// Commands
// =============================================================================

enum Command {
    SubmitTrack {
        update: TrackUpdate,
        reply: oneshot::Sender<Result<Vec<AlertEvent>>>,
    },
    CreateZone {
        def: ZoneDefinition,
        reply: oneshot::Sender<Result<()>>,
    },
    DeleteZone {
        id: String,
        reply: oneshot::Sender<Result<()>>,
    },
    SweepNow {
        reply: oneshot::Sender<SweepReport>,
    },
    Snapshot {
        reply: oneshot::Sender<EngineSnapshot>,
    },
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable front end to a running [`SweepScheduler`].
///
/// Every method fails with [`GeofenceError::SchedulerStopped`] once the
/// scheduler has shut down.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<Command>,
}

impl SchedulerHandle {
    /// Submit a track update for immediate evaluation.
    pub async fn submit_track(&self, update: TrackUpdate) -> Result<Vec<AlertEvent>> {
        self.request(|reply| Command::SubmitTrack { update, reply }).await?
    }

    pub async fn create_zone(&self, def: ZoneDefinition) -> Result<()> {
        self.request(|reply| Command::CreateZone { def, reply }).await?
    }

    pub async fn delete_zone(&self, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        self.request(|reply| Command::DeleteZone { id, reply }).await?
    }

    /// Run a sweep now, outside the periodic schedule.
    pub async fn sweep_now(&self) -> Result<SweepReport> {
        self.request(|reply| Command::SweepNow { reply }).await
    }

    pub async fn snapshot(&self) -> Result<EngineSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Whether the scheduler has stopped accepting commands.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| GeofenceError::SchedulerStopped)?;
        rx.await.map_err(|_| GeofenceError::SchedulerStopped)
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Owns a [`GeofenceEngine`] and drives it from commands and a timer.
pub struct SweepScheduler {
    engine: GeofenceEngine,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    command_rx: mpsc::Receiver<Command>,
}

impl SweepScheduler {
    /// Create a scheduler and the handle used to reach it.
    pub fn new(
        engine: GeofenceEngine,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> (Self, SchedulerHandle) {
        let (tx, command_rx) = mpsc::channel(config.command_capacity.max(1));
        let scheduler = Self {
            engine,
            clock,
            config,
            command_rx,
        };
        (scheduler, SchedulerHandle { tx })
    }

    /// Run on a new tokio task.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<GeofenceEngine> {
        tokio::spawn(self.run(shutdown))
    }

    /// Run until `shutdown` is cancelled, then hand the engine back.
    ///
    /// The first sweep happens immediately. If every handle is dropped the
    /// scheduler keeps sweeping until cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> GeofenceEngine {
        let Self {
            mut engine,
            clock,
            config,
            mut command_rx,
        } = self;

        // `sweep_interval` is public and can be set without the builder.
        let sweep_interval = config.sweep_interval.max(MIN_SWEEP_INTERVAL);
        info!(
            sweep_interval_ms = sweep_interval.as_millis() as u64,
            "Sweep scheduler starting"
        );

        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commands_open = true;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Sweep scheduler shutting down");
                    break;
                }

                command = command_rx.recv(), if commands_open => {
                    match command {
                        Some(command) => Self::handle_command(&mut engine, clock.as_ref(), command),
                        None => {
                            debug!("All scheduler handles dropped");
                            commands_open = false;
                        }
                    }
                }

                _ = ticker.tick() => {
                    engine.sweep(clock.now());
                }
            }
        }

        command_rx.close();
        info!("Sweep scheduler stopped");
        engine
    }

    fn handle_command(engine: &mut GeofenceEngine, clock: &dyn Clock, command: Command) {
        // A dropped reply receiver means the caller gave up; the command
        // has still been applied.
        match command {
            Command::SubmitTrack { update, reply } => {
                let _ = reply.send(engine.handle_track_update(&update));
            }
            Command::CreateZone { def, reply } => {
                let _ = reply.send(engine.create_zone(&def, clock.now()));
            }
            Command::DeleteZone { id, reply } => {
                let result = engine.delete_zone(&id, clock.now()).map(|_| ());
                let _ = reply.send(result);
            }
            Command::SweepNow { reply } => {
                let _ = reply.send(engine.sweep(clock.now()));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(engine.snapshot());
            }
        }
    }
}

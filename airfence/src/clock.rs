//! Time sources injected into the geofence core.
//!
//! The core never reads a global clock. The host supplies a [`Clock`], and
//! all timestamps are plain seconds on that clock's timeline (simulation
//! seconds or wall seconds since start).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic time source returning seconds.
pub trait Clock: Send + Sync {
    /// Current time in seconds.
    fn now(&self) -> f64;
}

/// A clock that only moves when told to.
///
/// Used by tests and by discrete simulations. The current value is stored
/// as raw `f64` bits so the clock can be shared without a lock.
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    /// Create a clock starting at `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            bits: AtomicU64::new(start.to_bits()),
        }
    }

    /// Jump to an absolute time. Rewinding is allowed.
    pub fn set(&self, now: f64) {
        self.bits.store(now.to_bits(), Ordering::SeqCst);
    }

    /// Move forward by `secs` and return the new time.
    pub fn advance(&self, secs: f64) -> f64 {
        let mut current = self.bits.load(Ordering::SeqCst);
        loop {
            let next = f64::from_bits(current) + secs;
            match self.bits.compare_exchange_weak(
                current,
                next.to_bits(),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// Wall time since construction, multiplied by a speed factor.
///
/// A speed of `1.0` is an ordinary wall clock; `60.0` runs one simulated
/// minute per real second.
#[derive(Debug, Clone)]
pub struct ScaledClock {
    origin: Instant,
    speed: f64,
}

impl ScaledClock {
    /// Create a clock running at `speed` times real time, starting at zero.
    ///
    /// Non-positive or non-finite speeds fall back to real time.
    pub fn new(speed: f64) -> Self {
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            1.0
        };
        Self {
            origin: Instant::now(),
            speed,
        }
    }

    /// A plain wall clock (speed 1.0).
    pub fn wall() -> Self {
        Self::new(1.0)
    }

    /// The configured speed factor.
    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl Clock for ScaledClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * self.speed
    }
}

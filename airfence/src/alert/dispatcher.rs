//! Alert dispatching and delivery.
//!
//! Delivery is synchronous and best-effort. A sink that returns an error or
//! panics is logged and skipped; the remaining sinks still receive the
//! event and the caller never sees the failure except in the returned
//! [`DeliveryReport`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::warn;

use super::event::{AlertEvent, Topic};
use crate::error::GeofenceError;

/// Error returned by a sink that could not accept an event.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct SinkError(pub String);

impl SinkError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Receiver of alerts.
///
/// Implementations must not block for long: delivery happens inline with
/// evaluation.
pub trait AlertSink: Send + Sync {
    /// Sink name, used in logs and failure reports.
    fn name(&self) -> &str;

    /// Accept one event.
    fn deliver(&self, event: &AlertEvent) -> Result<(), SinkError>;
}

/// Handle returned by [`AlertDispatcher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of a single publish.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    /// Sinks that accepted the event.
    pub delivered: usize,
    /// One `SinkFailure` per sink that did not.
    pub failures: Vec<GeofenceError>,
}

impl DeliveryReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    sink: Arc<dyn AlertSink>,
}

/// Typed publish/subscribe registry for alerts.
///
/// Subscriptions can be added or removed at any time from any thread.
pub struct AlertDispatcher {
    subscriptions: RwLock<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher")
            .field("subscriptions", &self.subscriptions.read().len())
            .finish_non_exhaustive()
    }
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `sink` for `topic`.
    pub fn subscribe(&self, topic: Topic, sink: Arc<dyn AlertSink>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .write()
            .push(Subscription { id, topic, sink });
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscriptions.write();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Number of sinks registered directly on `topic`.
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.subscriptions
            .read()
            .iter()
            .filter(|s| &s.topic == topic)
            .count()
    }

    /// Deliver `event` to every sink on `topic` and every general sink.
    ///
    /// Sinks are called outside the registry lock, so a sink may itself
    /// subscribe or unsubscribe.
    pub fn publish(&self, topic: &Topic, event: &AlertEvent) -> DeliveryReport {
        let targets: Vec<Arc<dyn AlertSink>> = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.topic == Topic::General || &s.topic == topic)
            .map(|s| Arc::clone(&s.sink))
            .collect();

        let mut report = DeliveryReport::default();
        for sink in targets {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.deliver(event)));
            let reason = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(e)) => e.0,
                Err(_) => "sink panicked".to_string(),
            };
            warn!(
                sink = %sink.name(),
                topic = %topic,
                kind = ?event.kind,
                error = %reason,
                "Alert sink failed"
            );
            report.failures.push(GeofenceError::SinkFailure {
                sink: sink.name().to_string(),
                reason,
            });
        }
        report
    }

    /// Publish on the event's own topic.
    pub fn dispatch(&self, event: &AlertEvent) -> DeliveryReport {
        self.publish(&event.topic(), event)
    }
}

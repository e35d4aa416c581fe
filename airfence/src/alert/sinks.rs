//! Built-in alert sinks.

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::info;

use super::dispatcher::{AlertSink, SinkError};
use super::event::{AlertEvent, AlertKind};

/// Writes every alert to the `tracing` log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn deliver(&self, event: &AlertEvent) -> Result<(), SinkError> {
        info!(
            kind = ?event.kind,
            zone_id = event.zone_id.as_deref().unwrap_or("-"),
            track_id = event.track_id.as_deref().unwrap_or("-"),
            t = event.time,
            "{}",
            event.message
        );
        Ok(())
    }
}

/// Keeps every delivered alert in memory.
#[derive(Debug)]
pub struct CollectingSink {
    name: String,
    events: Mutex<Vec<AlertEvent>>,
}

impl CollectingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Copy of everything received so far.
    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().clone()
    }

    /// Kinds of everything received so far, in order.
    pub fn kinds(&self) -> Vec<AlertKind> {
        self.events.lock().iter().map(|e| e.kind).collect()
    }

    /// Drain and return everything received so far.
    pub fn take(&self) -> Vec<AlertEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl AlertSink for CollectingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, event: &AlertEvent) -> Result<(), SinkError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Forwards alerts into a tokio channel for async consumers.
#[derive(Debug)]
pub struct ChannelSink {
    name: String,
    tx: mpsc::UnboundedSender<AlertEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiving half of its channel.
    pub fn new(name: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<AlertEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                name: name.into(),
                tx,
            },
            rx,
        )
    }
}

impl AlertSink for ChannelSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, event: &AlertEvent) -> Result<(), SinkError> {
        self.tx
            .send(event.clone())
            .map_err(|_| SinkError::new("receiver closed"))
    }
}

//! Typed alerts and their in-process delivery.
//!
//! Alerts travel on one of two channels:
//!
//! - **General** ([`Topic::General`]): every alert, plus operator-facing
//!   failures such as rejected updates or duplicate zone ids.
//! - **Per-zone** ([`Topic::Zone`]): alerts scoped to a single zone.
//!
//! A sink subscribed to the general channel receives everything published
//! on any zone channel as well.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use airfence::alert::{AlertDispatcher, CollectingSink, LogSink, Topic};
//!
//! let dispatcher = AlertDispatcher::new();
//! dispatcher.subscribe(Topic::General, Arc::new(LogSink));
//!
//! let zone_sink = Arc::new(CollectingSink::new("ops"));
//! dispatcher.subscribe(Topic::zone("Z1"), zone_sink.clone());
//! ```

mod dispatcher;
mod event;
mod sinks;

pub use dispatcher::{AlertDispatcher, AlertSink, DeliveryReport, SinkError, SubscriptionId};
pub use event::{AlertEvent, AlertKind, Topic};
pub use sinks::{ChannelSink, CollectingSink, LogSink};

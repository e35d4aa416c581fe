//! Live track feeds.
//!
//! Feeds translate an external surveillance source into
//! [`TrackUpdate`](crate::track::TrackUpdate)s and push them into a
//! running scheduler. All network I/O happens here, never inside the
//! engine.

mod adsb;
mod http;

pub use adsb::{AdsbAircraft, AdsbArea, AdsbPoller, AdsbResponse, PollSummary};
pub use http::{FeedClient, ReqwestFeedClient, DEFAULT_FEED_TIMEOUT_SECS};

use thiserror::Error;

use crate::error::GeofenceError;

/// Errors raised while polling a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to decode feed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Geofence(#[from] GeofenceError),
}

//! Stale track eviction.
//!
//! A track whose last update is older than the timeout is marked inactive
//! and silently removed from every zone it occupied. No departure is
//! reported for those zones; the caller emits a single stale alert per
//! track instead.

use tracing::info;

use crate::track::TrackStore;
use crate::zone::ZoneStore;

/// Default time without updates before a track is considered stale.
pub const DEFAULT_TRACK_TIMEOUT_SECS: u64 = 180;

/// A track evicted by [`reap`].
#[derive(Debug, Clone, PartialEq)]
pub struct StaleTrack {
    pub track_id: String,
    /// Time of the track's final update.
    pub last_update: f64,
    /// Zones the track was removed from.
    pub evicted_from: Vec<String>,
}

/// Evict active tracks with `now - last_update > timeout`.
pub fn reap(
    tracks: &mut TrackStore,
    zones: &mut ZoneStore,
    now: f64,
    timeout: f64,
) -> Vec<StaleTrack> {
    let mut reaped = Vec::new();

    for track_id in tracks.stale_ids(now, timeout) {
        let last_update = match tracks.get(&track_id) {
            Ok(track) => track.last_update,
            Err(_) => continue,
        };
        if !matches!(tracks.mark_inactive(&track_id), Ok(true)) {
            continue;
        }
        let evicted_from = zones.remove_member_everywhere(&track_id);
        info!(
            track_id = %track_id,
            last_update,
            zones = evicted_from.len(),
            "Track stale, marked inactive"
        );
        reaped.push(StaleTrack {
            track_id,
            last_update,
            evicted_from,
        });
    }

    reaped
}

//! Track store.

use std::collections::HashMap;

use tracing::trace;

use super::model::{Track, TrackStatus, TrackUpdate};
use crate::error::{GeofenceError, Result};

/// Owns the latest known state of every track.
#[derive(Debug, Default)]
pub struct TrackStore {
    tracks: HashMap<String, Track>,
}

impl TrackStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the track named by `update`.
    ///
    /// The last-update timestamp is taken from the update's event time and
    /// the track becomes active.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the identifier is empty or any numeric field is
    /// non-finite or out of range. The store is left untouched.
    pub fn upsert(&mut self, update: &TrackUpdate) -> Result<&Track> {
        update.validate()?;

        let track = self
            .tracks
            .entry(update.id.clone())
            .and_modify(|t| t.apply(update))
            .or_insert_with(|| Track::from_update(update));

        trace!(track_id = %track.id, t = track.last_update, "Track upserted");
        Ok(track)
    }

    /// Look up a track by identifier.
    pub fn get(&self, id: &str) -> Result<&Track> {
        self.tracks
            .get(id)
            .ok_or_else(|| GeofenceError::track_not_found(id))
    }

    /// Mark a track inactive without removing it.
    ///
    /// Idempotent. Returns `true` if the track was active before the call.
    pub fn mark_inactive(&mut self, id: &str) -> Result<bool> {
        let track = self
            .tracks
            .get_mut(id)
            .ok_or_else(|| GeofenceError::track_not_found(id))?;
        let was_active = track.is_active();
        track.status = TrackStatus::Inactive;
        Ok(was_active)
    }

    /// Iterate over all tracks, active or not.
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Iterate over active tracks only.
    pub fn active(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values().filter(|t| t.is_active())
    }

    /// Identifiers of active tracks whose last update is older than `timeout`
    /// seconds at `now`.
    pub fn stale_ids(&self, now: f64, timeout: f64) -> Vec<String> {
        let mut ids: Vec<String> = self
            .active()
            .filter(|t| t.age(now) > timeout)
            .map(|t| t.id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

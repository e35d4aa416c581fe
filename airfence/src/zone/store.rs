//! Zone store.

use std::collections::BTreeMap;

use super::model::{Zone, ZoneDefinition};
use crate::error::{GeofenceError, Result};

/// Owns zone definitions and their membership sets.
///
/// Zones are kept in identifier order so sweeps visit them deterministically.
#[derive(Debug, Default)]
pub struct ZoneStore {
    zones: BTreeMap<String, Zone>,
}

impl ZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zone in `Created` state with an empty membership set.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the definition fails validation
    /// - `DuplicateId` if a zone with the same identifier exists; the
    ///   existing zone is left untouched
    pub fn create(&mut self, def: &ZoneDefinition) -> Result<&Zone> {
        def.validate()?;
        if self.zones.contains_key(&def.id) {
            return Err(GeofenceError::DuplicateId(def.id.clone()));
        }
        Ok(self
            .zones
            .entry(def.id.clone())
            .or_insert_with(|| Zone::from_definition(def)))
    }

    /// Remove a zone along with its membership set.
    pub fn delete(&mut self, id: &str) -> Result<Zone> {
        self.zones
            .remove(id)
            .ok_or_else(|| GeofenceError::zone_not_found(id))
    }

    pub fn get(&self, id: &str) -> Result<&Zone> {
        self.zones
            .get(id)
            .ok_or_else(|| GeofenceError::zone_not_found(id))
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Result<&mut Zone> {
        self.zones
            .get_mut(id)
            .ok_or_else(|| GeofenceError::zone_not_found(id))
    }

    /// Iterate over all zones in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Zone> {
        self.zones.values_mut()
    }

    /// Identifiers of zones currently active.
    pub fn active_ids(&self) -> Vec<String> {
        self.zones
            .values()
            .filter(|z| z.is_active())
            .map(|z| z.id().to_string())
            .collect()
    }

    /// Remove a track from every membership set.
    ///
    /// Returns the identifiers of zones it was removed from.
    pub(crate) fn remove_member_everywhere(&mut self, track_id: &str) -> Vec<String> {
        self.zones
            .values_mut()
            .filter_map(|z| z.remove_member(track_id).then(|| z.id().to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::properties::{OccupancyPatch, PropertyRef, PropertyStore};

use super::domain::Tenant;
use super::index::OccupancyIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    Failed,
}

/// Result of one occupancy write against the property store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySync {
    pub property: PropertyRef,
    pub occupied: bool,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PropertySync {
    pub fn is_synced(&self) -> bool {
        self.status == SyncStatus::Synced
    }
}

/// Keeps unit occupancy flags and back-references in step with tenant writes.
///
/// Runs strictly after the tenant write it follows. A failed property write is
/// reported in the returned `PropertySync` and never undoes the tenant write.
pub struct OccupancySynchronizer<P> {
    properties: Arc<P>,
}

impl<P> Clone for OccupancySynchronizer<P> {
    fn clone(&self) -> Self {
        Self {
            properties: self.properties.clone(),
        }
    }
}

impl<P> OccupancySynchronizer<P>
where
    P: PropertyStore + 'static,
{
    pub fn new(properties: Arc<P>) -> Self {
        Self { properties }
    }

    pub fn apply(&self, property: &PropertyRef, patch: OccupancyPatch) -> PropertySync {
        let occupied = patch.marks_occupied();
        match self.properties.update(property, patch) {
            Ok(()) => {
                debug!(%property, occupied, "occupancy updated");
                PropertySync {
                    property: property.clone(),
                    occupied,
                    status: SyncStatus::Synced,
                    error: None,
                }
            }
            Err(err) => {
                warn!(%property, occupied, error = %err, "occupancy update failed");
                PropertySync {
                    property: property.clone(),
                    occupied,
                    status: SyncStatus::Failed,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    pub fn occupy(&self, property: &PropertyRef, tenant: &Tenant) -> PropertySync {
        self.apply(property, OccupancyPatch::occupy(tenant))
    }

    pub fn vacate(&self, property: &PropertyRef) -> PropertySync {
        self.apply(property, OccupancyPatch::Vacate)
    }

    /// Follow-up writes for a created (`previous == None`) or edited tenant.
    ///
    /// The previously occupied unit is vacated when the tenant moved away from it,
    /// lost its assignment, or went inactive; the current unit is always refreshed.
    pub fn after_save(&self, previous: Option<&Tenant>, saved: &Tenant) -> Vec<PropertySync> {
        let mut writes = Vec::new();
        let current = saved.occupied_property();

        if let Some(before) = previous.and_then(Tenant::occupied_property) {
            if current.as_ref() != Some(&before) {
                writes.push(self.vacate(&before));
            }
        }

        if let Some(property) = current {
            writes.push(self.occupy(&property, saved));
        }

        writes
    }

    /// Bring `property` in line with the tenants still on record: the first active
    /// tenant assigned to it becomes the occupant, otherwise the unit is vacated.
    pub fn settle(&self, property: &PropertyRef, remaining: &[Tenant]) -> PropertySync {
        let index = OccupancyIndex::from_tenants(remaining);
        let occupant = index
            .current_tenant(property)
            .and_then(|id| remaining.iter().find(|tenant| &tenant.id == id));
        match occupant {
            Some(tenant) => self.occupy(property, tenant),
            None => self.vacate(property),
        }
    }

    /// Follow-up write for a tenant that has already been removed from the tenant store.
    ///
    /// `remaining` is every other tenant on record. A unit shared with another active
    /// tenant stays occupied by them.
    pub fn after_delete(&self, removed: &Tenant, remaining: &[Tenant]) -> Vec<PropertySync> {
        removed
            .property_ref()
            .map(|property| vec![self.settle(&property, remaining)])
            .unwrap_or_default()
    }
}

use family_estate::error::AppError;
use family_estate::properties::{
    Apartment, Building, Flat, Land, Occupiable, OccupancyPatch, PropertyCatalog, PropertyStore,
    StoreError,
};
use family_estate::tenancy::{Notification, Notifier, Tenant, TenantId, TenantStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) notifications: Arc<InMemoryNotifier>,
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPropertyStore {
    catalog: Arc<Mutex<PropertyCatalog>>,
}

impl InMemoryPropertyStore {
    pub(crate) fn seeded(catalog: PropertyCatalog) -> Self {
        Self {
            catalog: Arc::new(Mutex::new(catalog)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PropertyCatalog>, StoreError> {
        self.catalog.lock().map_err(poisoned)
    }

    fn patch_unit<U, F>(&self, find: F, patch: OccupancyPatch) -> Result<(), StoreError>
    where
        U: Occupiable + ?Sized,
        F: FnOnce(&mut PropertyCatalog) -> Option<&mut U>,
    {
        let mut guard = self.lock()?;
        let unit = find(&mut *guard).ok_or(StoreError::NotFound)?;
        unit.apply(patch);
        Ok(())
    }
}

impl PropertyStore for InMemoryPropertyStore {
    fn buildings(&self) -> Result<Vec<Building>, StoreError> {
        Ok(self.lock()?.buildings.clone())
    }

    fn building(&self, id: &str) -> Result<Option<Building>, StoreError> {
        Ok(self.lock()?.building(id).cloned())
    }

    fn apartments_for_building(&self, building_id: &str) -> Result<Vec<Apartment>, StoreError> {
        Ok(self
            .lock()?
            .building(building_id)
            .map(|building| building.apartments.clone())
            .unwrap_or_default())
    }

    fn flats(&self) -> Result<Vec<Flat>, StoreError> {
        Ok(self.lock()?.flats.clone())
    }

    fn lands(&self) -> Result<Vec<Land>, StoreError> {
        Ok(self.lock()?.lands.clone())
    }

    fn update_apartment(&self, id: &str, patch: OccupancyPatch) -> Result<(), StoreError> {
        self.patch_unit(
            |catalog| {
                catalog
                    .buildings
                    .iter_mut()
                    .flat_map(|building| building.apartments.iter_mut())
                    .find(|apartment| apartment.id == id)
            },
            patch,
        )
    }

    fn update_flat(&self, id: &str, patch: OccupancyPatch) -> Result<(), StoreError> {
        self.patch_unit(
            |catalog| catalog.flats.iter_mut().find(|flat| flat.id == id),
            patch,
        )
    }

    fn update_land(&self, id: &str, patch: OccupancyPatch) -> Result<(), StoreError> {
        self.patch_unit(
            |catalog| catalog.lands.iter_mut().find(|land| land.id == id),
            patch,
        )
    }

    fn catalog(&self) -> Result<PropertyCatalog, StoreError> {
        Ok(self.lock()?.clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryTenantStore {
    records: Arc<Mutex<HashMap<TenantId, Tenant>>>,
}

impl TenantStore for InMemoryTenantStore {
    fn save(&self, tenant: Tenant) -> Result<Tenant, StoreError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&tenant.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(tenant.id.clone(), tenant.clone());
        Ok(tenant)
    }

    fn update(&self, tenant: Tenant) -> Result<Tenant, StoreError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        match guard.get_mut(&tenant.id) {
            Some(slot) => {
                *slot = tenant.clone();
                Ok(tenant)
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete(&self, id: &TenantId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn fetch(&self, id: &TenantId) -> Result<Option<Tenant>, StoreError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    /// Oldest first, so listings and derived occupancy are stable across calls.
    fn list(&self) -> Result<Vec<Tenant>, StoreError> {
        let guard = self.records.lock().map_err(poisoned)?;
        let mut tenants: Vec<Tenant> = guard.values().cloned().collect();
        tenants.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tenants)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notification: Notification) {
        info!(kind = ?notification.kind, level = ?notification.level, "{}", notification.message);
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

impl InMemoryNotifier {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Read a property catalog from a JSON file shaped like `PropertyCatalog`.
pub(crate) fn load_seed(path: &Path) -> Result<PropertyCatalog, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let catalog: PropertyCatalog = serde_json::from_str(&raw)?;
    info!(
        path = %path.display(),
        buildings = catalog.buildings.len(),
        flats = catalog.flats.len(),
        lands = catalog.lands.len(),
        "property catalog seeded"
    );
    Ok(catalog)
}

pub(crate) fn catalog_from(path: Option<&Path>) -> Result<PropertyCatalog, AppError> {
    match path {
        Some(path) => load_seed(path),
        None => Ok(demo_catalog()),
    }
}

fn demo_apartment(id: &str, building_id: &str, number: &str, floor: i16, rent: u32) -> Apartment {
    Apartment {
        id: id.to_string(),
        building_id: building_id.to_string(),
        number: number.to_string(),
        floor: Some(floor),
        bedrooms: Some(2),
        rent_amount: Some(rent),
        is_occupied: false,
        current_tenant: None,
    }
}

/// Small family portfolio used when no seed file is configured.
pub(crate) fn demo_catalog() -> PropertyCatalog {
    PropertyCatalog {
        buildings: vec![Building {
            id: "B1".to_string(),
            name: "Lakeview Residency".to_string(),
            address: Some("12 Lake Road".to_string()),
            apartments: vec![
                demo_apartment("A11", "B1", "11", 1, 14000),
                demo_apartment("A12", "B1", "12", 1, 15000),
                demo_apartment("A21", "B1", "21", 2, 16500),
            ],
        }],
        flats: vec![Flat {
            id: "F1".to_string(),
            name: "Garden flat".to_string(),
            address: Some("4 Orchard Lane".to_string()),
            rent_amount: Some(9000),
            is_occupied: false,
            current_tenant: None,
        }],
        lands: vec![Land {
            id: "L1".to_string(),
            name: "North field".to_string(),
            location: Some("Village road".to_string()),
            area_sq_ft: Some(43560),
            lease_amount: Some(5000),
            is_leased: false,
            current_tenant: None,
        }],
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::properties::{
    Apartment, Building, Flat, Land, Occupiable, OccupancyPatch, PropertyCatalog, PropertyRef,
    PropertyStore, StoreError,
};
use crate::tenancy::domain::{Tenant, TenantId};
use crate::tenancy::form::{PropertyChoice, TenantForm};
use crate::tenancy::repository::{Notification, NotificationKind, Notifier, TenantStore};
use crate::tenancy::service::{Clock, TenancyService};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn instant(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, hour, 0, 0)
        .single()
        .expect("valid instant")
}

fn apartment(id: &str, number: &str, rent: Option<u32>) -> Apartment {
    Apartment {
        id: id.to_string(),
        building_id: "B1".to_string(),
        number: number.to_string(),
        floor: Some(1),
        bedrooms: Some(2),
        rent_amount: rent,
        is_occupied: false,
        current_tenant: None,
    }
}

pub(super) fn catalog() -> PropertyCatalog {
    PropertyCatalog {
        buildings: vec![Building {
            id: "B1".to_string(),
            name: "Lakeview Residency".to_string(),
            address: Some("12 Lake Road".to_string()),
            apartments: vec![
                apartment("A12", "12", Some(15000)),
                apartment("A13", "13", Some(16000)),
                apartment("A14", "14", None),
            ],
        }],
        flats: vec![Flat {
            id: "F1".to_string(),
            name: "Garden flat".to_string(),
            address: None,
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

pub(super) fn form() -> TenantForm {
    TenantForm {
        full_name: "Asha Verma".to_string(),
        phone: "9800000001".to_string(),
        occupation: "Teacher".to_string(),
        agreement_number: "AGR-2025-01".to_string(),
        start_date: "2025-04-01".to_string(),
        end_date: "2026-03-31".to_string(),
        ..TenantForm::default()
    }
}

pub(super) fn apartment_form() -> TenantForm {
    TenantForm {
        property: PropertyChoice::apartment("B1", "A12"),
        ..form()
    }
}

pub(super) fn flat_form() -> TenantForm {
    TenantForm {
        property: PropertyChoice::flat("F1"),
        ..form()
    }
}

#[derive(Default)]
pub(super) struct MemoryProperties {
    pub(super) catalog: Mutex<PropertyCatalog>,
    pub(super) fail_updates: AtomicBool,
}

impl MemoryProperties {
    pub(super) fn seeded() -> Self {
        Self {
            catalog: Mutex::new(catalog()),
            fail_updates: AtomicBool::new(false),
        }
    }

    pub(super) fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub(super) fn snapshot(&self) -> PropertyCatalog {
        self.catalog.lock().expect("catalog mutex poisoned").clone()
    }

    pub(super) fn is_occupied(&self, property: &PropertyRef) -> bool {
        self.snapshot()
            .unit(property)
            .map(|unit| unit.is_occupied())
            .expect("unit present")
    }

    pub(super) fn current_tenant(&self, property: &PropertyRef) -> Option<TenantId> {
        self.snapshot()
            .unit(property)
            .and_then(|unit| unit.current_tenant().map(|tenant| tenant.id.clone()))
    }

    pub(super) fn patch(&self, property: &PropertyRef, patch: OccupancyPatch) {
        self.update(property, patch).expect("seed patch applies");
    }

    fn with_unit<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut PropertyCatalog) -> Option<()>,
    {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("property store offline".to_string()));
        }
        let mut catalog = self.catalog.lock().expect("catalog mutex poisoned");
        apply(&mut catalog).ok_or(StoreError::NotFound)
    }
}

impl PropertyStore for MemoryProperties {
    fn buildings(&self) -> Result<Vec<Building>, StoreError> {
        Ok(self.snapshot().buildings)
    }

    fn building(&self, id: &str) -> Result<Option<Building>, StoreError> {
        Ok(self.snapshot().building(id).cloned())
    }

    fn apartments_for_building(&self, building_id: &str) -> Result<Vec<Apartment>, StoreError> {
        Ok(self
            .snapshot()
            .building(building_id)
            .map(|building| building.apartments.clone())
            .unwrap_or_default())
    }

    fn flats(&self) -> Result<Vec<Flat>, StoreError> {
        Ok(self.snapshot().flats)
    }

    fn lands(&self) -> Result<Vec<Land>, StoreError> {
        Ok(self.snapshot().lands)
    }

    fn update_apartment(&self, id: &str, patch: OccupancyPatch) -> Result<(), StoreError> {
        self.with_unit(|catalog| {
            catalog
                .buildings
                .iter_mut()
                .flat_map(|building| building.apartments.iter_mut())
                .find(|apartment| apartment.id == id)
                .map(|apartment| apartment.apply(patch))
        })
    }

    fn update_flat(&self, id: &str, patch: OccupancyPatch) -> Result<(), StoreError> {
        self.with_unit(|catalog| {
            catalog
                .flats
                .iter_mut()
                .find(|flat| flat.id == id)
                .map(|flat| flat.apply(patch))
        })
    }

    fn update_land(&self, id: &str, patch: OccupancyPatch) -> Result<(), StoreError> {
        self.with_unit(|catalog| {
            catalog
                .lands
                .iter_mut()
                .find(|land| land.id == id)
                .map(|land| land.apply(patch))
        })
    }
}

#[derive(Default)]
pub(super) struct MemoryTenants {
    pub(super) records: Mutex<Vec<Tenant>>,
    pub(super) fail_writes: AtomicBool,
    pub(super) undeletable: Mutex<Option<TenantId>>,
}

impl MemoryTenants {
    pub(super) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(super) fn refuse_delete_of(&self, id: &TenantId) {
        *self.undeletable.lock().expect("tenant mutex poisoned") = Some(id.clone());
    }

    pub(super) fn list_all(&self) -> Vec<Tenant> {
        self.list().expect("list succeeds")
    }

    pub(super) fn contains(&self, id: &TenantId) -> bool {
        self.fetch(id).expect("fetch succeeds").is_some()
    }

    fn guard_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("tenant store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl TenantStore for MemoryTenants {
    fn save(&self, tenant: Tenant) -> Result<Tenant, StoreError> {
        self.guard_writes()?;
        let mut records = self.records.lock().expect("tenant mutex poisoned");
        if records.iter().any(|record| record.id == tenant.id) {
            return Err(StoreError::Conflict);
        }
        records.push(tenant.clone());
        Ok(tenant)
    }

    fn update(&self, tenant: Tenant) -> Result<Tenant, StoreError> {
        self.guard_writes()?;
        let mut records = self.records.lock().expect("tenant mutex poisoned");
        let slot = records
            .iter_mut()
            .find(|record| record.id == tenant.id)
            .ok_or(StoreError::NotFound)?;
        *slot = tenant.clone();
        Ok(tenant)
    }

    fn delete(&self, id: &TenantId) -> Result<(), StoreError> {
        self.guard_writes()?;
        if self.undeletable.lock().expect("tenant mutex poisoned").as_ref() == Some(id) {
            return Err(StoreError::Unavailable("tenant store rejected delete".to_string()));
        }
        let mut records = self.records.lock().expect("tenant mutex poisoned");
        let before = records.len();
        records.retain(|record| &record.id != id);
        if records.len() == before {
            Err(StoreError::NotFound)
        } else {
            Ok(())
        }
    }

    fn fetch(&self, id: &TenantId) -> Result<Option<Tenant>, StoreError> {
        let records = self.records.lock().expect("tenant mutex poisoned");
        Ok(records.iter().find(|record| &record.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<Tenant>, StoreError> {
        Ok(self.records.lock().expect("tenant mutex poisoned").clone())
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    events: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn kinds(&self) -> Vec<NotificationKind> {
        self.events().into_iter().map(|event| event.kind).collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
    }
}

/// Clock that only moves when told to.
pub(super) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(super) fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(super) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub(super) type TestService = TenancyService<MemoryProperties, MemoryTenants, MemoryNotifier>;

pub(super) struct Harness {
    pub(super) service: Arc<TestService>,
    pub(super) properties: Arc<MemoryProperties>,
    pub(super) tenants: Arc<MemoryTenants>,
    pub(super) notifier: Arc<MemoryNotifier>,
    pub(super) clock: Arc<ManualClock>,
}

pub(super) fn harness() -> Harness {
    let properties = Arc::new(MemoryProperties::seeded());
    let tenants = Arc::new(MemoryTenants::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let clock = Arc::new(ManualClock::starting_at(instant(9)));
    let service = Arc::new(TenancyService::with_clock(
        properties.clone(),
        tenants.clone(),
        notifier.clone(),
        clock.clone(),
    ));

    Harness {
        service,
        properties,
        tenants,
        notifier,
        clock,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

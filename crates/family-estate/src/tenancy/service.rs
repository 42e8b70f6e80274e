use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::dashboard::{roster_csv, DashboardSummary, RosterError};
use crate::properties::{
    Apartment, Occupiable, PropertyCatalog, PropertyRef, PropertyStore, StoreError,
};

use super::builder::TenantRecordBuilder;
use super::domain::{Tenant, TenantId};
use super::form::{FormError, TenantForm};
use super::index::{audit, OccupancyDrift};
use super::occupancy::{OccupancySynchronizer, PropertySync};
use super::repository::{Notification, NotificationKind, Notifier, TenantStore};
use super::resolver::resolve_assignment;

/// Source of "now" for record timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Saved tenant plus the occupancy writes that followed it.
#[derive(Debug, Clone, Serialize)]
pub struct TenancyOutcome {
    pub tenant: Tenant,
    pub occupancy: Vec<PropertySync>,
}

impl TenancyOutcome {
    pub fn occupancy_synced(&self) -> bool {
        self.occupancy.iter().all(PropertySync::is_synced)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovalOutcome {
    pub removed: Vec<TenantId>,
    pub occupancy: Vec<PropertySync>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub drifts: Vec<OccupancyDrift>,
    pub repairs: Vec<PropertySync>,
}

/// Orchestrates tenant writes and the occupancy updates that follow them.
pub struct TenancyService<P, T, N> {
    properties: Arc<P>,
    tenants: Arc<T>,
    notifier: Arc<N>,
    synchronizer: OccupancySynchronizer<P>,
    clock: Arc<dyn Clock>,
}

impl<P, T, N> TenancyService<P, T, N>
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(properties: Arc<P>, tenants: Arc<T>, notifier: Arc<N>) -> Self {
        Self::with_clock(properties, tenants, notifier, Arc::new(SystemClock))
    }

    pub fn with_clock(
        properties: Arc<P>,
        tenants: Arc<T>,
        notifier: Arc<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let synchronizer = OccupancySynchronizer::new(properties.clone());
        Self {
            properties,
            tenants,
            notifier,
            synchronizer,
            clock,
        }
    }

    fn notify(&self, kind: NotificationKind, message: impl Into<String>) {
        self.notifier.notify(Notification::new(kind, message));
    }

    fn report_sync_failures(&self, tenant: &Tenant, writes: &[PropertySync]) {
        for write in writes.iter().filter(|write| !write.is_synced()) {
            self.notify(
                NotificationKind::OccupancySyncFailed,
                format!(
                    "{} was saved, but occupancy for {} could not be updated",
                    tenant.personal_info.full_name, write.property
                ),
            );
        }
    }

    fn load_catalog(&self, failure: NotificationKind) -> Result<PropertyCatalog, TenancyError> {
        self.properties.catalog().map_err(|err| {
            warn!(error = %err, "property catalog unavailable");
            self.notify(failure, format!("Property list could not be loaded: {err}"));
            TenancyError::Store(err)
        })
    }

    /// Validate, resolve, build and save a new tenant, then mark its unit occupied.
    pub fn create_tenant(&self, form: &TenantForm) -> Result<TenancyOutcome, TenancyError> {
        let validated = form.validate()?;
        let catalog = self.load_catalog(NotificationKind::TenantSaveFailed)?;
        let resolved = resolve_assignment(&validated.property, validated.rent_amount, &catalog);
        let tenant = TenantRecordBuilder::at(self.clock.now()).create(validated, resolved);

        let saved = self.tenants.save(tenant).map_err(|err| {
            warn!(error = %err, "tenant save failed");
            self.notify(
                NotificationKind::TenantSaveFailed,
                format!("Tenant could not be saved: {err}"),
            );
            TenancyError::Store(err)
        })?;

        let occupancy = self.synchronizer.after_save(None, &saved);
        self.report_sync_failures(&saved, &occupancy);
        self.notify(
            NotificationKind::TenantCreated,
            format!("{} added", saved.personal_info.full_name),
        );
        info!(tenant_id = %saved.id, property = ?saved.property_ref(), "tenant created");

        Ok(TenancyOutcome {
            tenant: saved,
            occupancy,
        })
    }

    /// Apply an edit to an existing tenant and move occupancy along with it.
    pub fn update_tenant(
        &self,
        id: &TenantId,
        form: &TenantForm,
    ) -> Result<TenancyOutcome, TenancyError> {
        let validated = form.validate()?;
        let existing = self
            .tenants
            .fetch(id)?
            .ok_or_else(|| TenancyError::TenantNotFound(id.clone()))?;
        let catalog = self.load_catalog(NotificationKind::TenantSaveFailed)?;
        let resolved = resolve_assignment(&validated.property, validated.rent_amount, &catalog);
        let tenant = TenantRecordBuilder::at(self.clock.now()).rebuild(&existing, validated, resolved);

        let saved = self.tenants.update(tenant).map_err(|err| {
            warn!(tenant_id = %id, error = %err, "tenant update failed");
            self.notify(
                NotificationKind::TenantSaveFailed,
                format!("Tenant could not be updated: {err}"),
            );
            TenancyError::Store(err)
        })?;

        let occupancy = self.synchronizer.after_save(Some(&existing), &saved);
        self.report_sync_failures(&saved, &occupancy);
        self.notify(
            NotificationKind::TenantUpdated,
            format!("{} updated", saved.personal_info.full_name),
        );
        info!(tenant_id = %saved.id, property = ?saved.property_ref(), "tenant updated");

        Ok(TenancyOutcome {
            tenant: saved,
            occupancy,
        })
    }

    fn delete_record(&self, tenant: &Tenant) -> Result<(), TenancyError> {
        self.tenants.delete(&tenant.id).map_err(|err| {
            warn!(tenant_id = %tenant.id, error = %err, "tenant delete failed");
            self.notify(
                NotificationKind::TenantDeleteFailed,
                format!(
                    "{} could not be removed: {err}",
                    tenant.personal_info.full_name
                ),
            );
            TenancyError::Store(err)
        })
    }

    /// Remove a tenant record and release the unit it was assigned to.
    pub fn delete_tenant(&self, id: &TenantId) -> Result<RemovalOutcome, TenancyError> {
        let existing = self
            .tenants
            .fetch(id)?
            .ok_or_else(|| TenancyError::TenantNotFound(id.clone()))?;

        let remaining: Vec<Tenant> = self
            .tenants
            .list()?
            .into_iter()
            .filter(|tenant| tenant.id != existing.id)
            .collect();

        self.delete_record(&existing)?;
        let occupancy = self.synchronizer.after_delete(&existing, &remaining);
        self.report_sync_failures(&existing, &occupancy);
        self.notify(
            NotificationKind::TenantRemoved,
            format!("{} removed", existing.personal_info.full_name),
        );
        info!(tenant_id = %id, "tenant deleted");

        Ok(RemovalOutcome {
            removed: vec![existing.id],
            occupancy,
        })
    }

    /// "Remove tenant" from a unit: delete whoever occupies it, then mark it vacant.
    ///
    /// Occupants are the active tenants assigned to the unit plus the tenant held in
    /// its back-reference, when that record still exists.
    pub fn remove_tenant_from_property(
        &self,
        property: &PropertyRef,
    ) -> Result<RemovalOutcome, TenancyError> {
        let catalog = self.load_catalog(NotificationKind::TenantDeleteFailed)?;
        let unit = catalog
            .unit(property)
            .ok_or_else(|| TenancyError::PropertyNotFound(property.clone()))?;
        let recorded = unit.current_tenant().map(|tenant| tenant.id.clone());

        let (occupants, mut remaining): (Vec<Tenant>, Vec<Tenant>) =
            self.tenants.list()?.into_iter().partition(|tenant| {
                (tenant.is_active && tenant.is_assigned_to(property))
                    || recorded.as_ref() == Some(&tenant.id)
            });

        let mut removed = Vec::with_capacity(occupants.len());
        let mut failure = None;
        for tenant in occupants {
            match self.delete_record(&tenant) {
                Ok(()) => removed.push(tenant),
                Err(err) => {
                    remaining.push(tenant);
                    failure = Some(err);
                    break;
                }
            }
        }

        let label = unit.label();
        if let Some(err) = failure {
            // Records deleted before the failure must not stay referenced by the unit.
            if !removed.is_empty() {
                let write = self.synchronizer.settle(property, &remaining);
                if !write.is_synced() {
                    self.notify(
                        NotificationKind::OccupancySyncFailed,
                        format!("{label} could not be updated after a partial removal"),
                    );
                }
                warn!(%property, removed = removed.len(), "tenant removal stopped part way");
            }
            return Err(err);
        }

        let occupancy = vec![self.synchronizer.vacate(property)];
        match removed.first() {
            Some(tenant) => self.report_sync_failures(tenant, &occupancy),
            None if !occupancy[0].is_synced() => self.notify(
                NotificationKind::OccupancySyncFailed,
                format!("{label} could not be marked vacant"),
            ),
            None => {}
        }
        self.notify(
            NotificationKind::TenantRemoved,
            format!("Tenant removed from {label}"),
        );
        info!(%property, removed = removed.len(), "property vacated");

        Ok(RemovalOutcome {
            removed: removed.into_iter().map(|tenant| tenant.id).collect(),
            occupancy,
        })
    }

    pub fn get_tenant(&self, id: &TenantId) -> Result<Tenant, TenancyError> {
        self.tenants
            .fetch(id)?
            .ok_or_else(|| TenancyError::TenantNotFound(id.clone()))
    }

    pub fn list_tenants(&self) -> Result<Vec<Tenant>, TenancyError> {
        Ok(self.tenants.list()?)
    }

    pub fn catalog(&self) -> Result<PropertyCatalog, TenancyError> {
        Ok(self.properties.catalog()?)
    }

    /// Apartments of one building, for the building-then-apartment picker.
    pub fn building_apartments(&self, building_id: &str) -> Result<Vec<Apartment>, TenancyError> {
        if self.properties.building(building_id)?.is_none() {
            return Err(TenancyError::BuildingNotFound(building_id.to_string()));
        }
        Ok(self.properties.apartments_for_building(building_id)?)
    }

    pub fn audit(&self) -> Result<Vec<OccupancyDrift>, TenancyError> {
        let catalog = self.properties.catalog()?;
        let tenants = self.tenants.list()?;
        Ok(audit(&catalog, &tenants))
    }

    /// Rewrite stored occupancy wherever it disagrees with tenant assignments.
    pub fn reconcile(&self) -> Result<ReconcileReport, TenancyError> {
        let catalog = self.properties.catalog()?;
        let tenants = self.tenants.list()?;
        let drifts = audit(&catalog, &tenants);

        let repairs: Vec<PropertySync> = drifts
            .iter()
            .filter_map(|drift| {
                drift
                    .repair(&tenants)
                    .map(|patch| self.synchronizer.apply(drift.property(), patch))
            })
            .collect();

        if !repairs.is_empty() {
            let fixed = repairs.iter().filter(|write| write.is_synced()).count();
            self.notify(
                NotificationKind::OccupancyReconciled,
                format!("{fixed} of {} occupancy records repaired", repairs.len()),
            );
        }
        info!(drifts = drifts.len(), repairs = repairs.len(), "occupancy reconciled");

        Ok(ReconcileReport { drifts, repairs })
    }

    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardSummary, TenancyError> {
        let catalog = self.properties.catalog()?;
        let tenants = self.tenants.list()?;
        Ok(DashboardSummary::compute(&catalog, &tenants, today))
    }

    pub fn roster(&self) -> Result<String, TenancyError> {
        let catalog = self.properties.catalog()?;
        let tenants = self.tenants.list()?;
        Ok(roster_csv(&catalog, &tenants)?)
    }
}

/// Error raised by the tenancy service.
#[derive(Debug, thiserror::Error)]
pub enum TenancyError {
    #[error(transparent)]
    Validation(#[from] FormError),
    #[error("tenant {0} not found")]
    TenantNotFound(TenantId),
    #[error("property {0} not found")]
    PropertyNotFound(PropertyRef),
    #[error("building {0} not found")]
    BuildingNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

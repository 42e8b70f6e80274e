use std::collections::BTreeMap;

use serde::Serialize;

use crate::properties::{Occupiable, OccupancyPatch, PropertyCatalog, PropertyKind, PropertyRef};

use super::domain::{Tenant, TenantId};

/// Occupancy derived from tenant assignments alone: which active tenants point at which unit.
#[derive(Debug, Clone, Default)]
pub struct OccupancyIndex {
    by_property: BTreeMap<PropertyRef, Vec<TenantId>>,
}

impl OccupancyIndex {
    pub fn from_tenants<'a>(tenants: impl IntoIterator<Item = &'a Tenant>) -> Self {
        let mut by_property: BTreeMap<PropertyRef, Vec<TenantId>> = BTreeMap::new();
        for tenant in tenants {
            if let Some(property) = tenant.occupied_property() {
                by_property
                    .entry(property)
                    .or_default()
                    .push(tenant.id.clone());
            }
        }
        Self { by_property }
    }

    pub fn tenants_for(&self, property: &PropertyRef) -> &[TenantId] {
        self.by_property
            .get(property)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn current_tenant(&self, property: &PropertyRef) -> Option<&TenantId> {
        self.tenants_for(property).first()
    }

    pub fn is_occupied(&self, property: &PropertyRef) -> bool {
        !self.tenants_for(property).is_empty()
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyRef> {
        self.by_property.keys()
    }
}

/// Disagreement between a unit's stored occupancy and the tenant assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "drift", rename_all = "snake_case")]
pub enum OccupancyDrift {
    FlaggedWithoutTenant {
        property: PropertyRef,
    },
    TenantWithoutFlag {
        property: PropertyRef,
        tenant_id: TenantId,
    },
    MultipleActiveTenants {
        property: PropertyRef,
        tenant_ids: Vec<TenantId>,
    },
    StaleBackReference {
        property: PropertyRef,
        recorded: Option<TenantId>,
        expected: Option<TenantId>,
    },
    UnknownProperty {
        property: PropertyRef,
        tenant_id: TenantId,
    },
}

impl OccupancyDrift {
    pub fn property(&self) -> &PropertyRef {
        match self {
            OccupancyDrift::FlaggedWithoutTenant { property }
            | OccupancyDrift::TenantWithoutFlag { property, .. }
            | OccupancyDrift::MultipleActiveTenants { property, .. }
            | OccupancyDrift::StaleBackReference { property, .. }
            | OccupancyDrift::UnknownProperty { property, .. } => property,
        }
    }

    /// Patch that makes the stored state match the assignments, if one exists.
    ///
    /// Double bookings and dangling assignments need a human decision and yield `None`.
    pub fn repair(&self, tenants: &[Tenant]) -> Option<OccupancyPatch> {
        let occupy = |id: &TenantId| {
            tenants
                .iter()
                .find(|tenant| &tenant.id == id)
                .map(OccupancyPatch::occupy)
        };

        match self {
            OccupancyDrift::FlaggedWithoutTenant { .. } => Some(OccupancyPatch::Vacate),
            OccupancyDrift::TenantWithoutFlag { tenant_id, .. } => occupy(tenant_id),
            OccupancyDrift::StaleBackReference {
                expected: Some(tenant_id),
                ..
            } => occupy(tenant_id),
            OccupancyDrift::StaleBackReference { expected: None, .. } => {
                Some(OccupancyPatch::Vacate)
            }
            OccupancyDrift::MultipleActiveTenants { .. }
            | OccupancyDrift::UnknownProperty { .. } => None,
        }
    }
}

fn recorded_tenant(unit: &dyn Occupiable) -> Option<TenantId> {
    unit.current_tenant().map(|tenant| tenant.id.clone())
}

fn audit_leased_land(unit: &dyn Occupiable, drifts: &mut Vec<OccupancyDrift>) {
    let property = unit.reference();
    match (unit.is_occupied(), recorded_tenant(unit)) {
        (true, None) => drifts.push(OccupancyDrift::FlaggedWithoutTenant { property }),
        (false, Some(recorded)) => drifts.push(OccupancyDrift::StaleBackReference {
            property,
            recorded: Some(recorded),
            expected: None,
        }),
        _ => {}
    }
}

fn audit_rented_unit(
    unit: &dyn Occupiable,
    index: &OccupancyIndex,
    drifts: &mut Vec<OccupancyDrift>,
) {
    let property = unit.reference();
    let assigned = index.tenants_for(&property);
    let recorded = recorded_tenant(unit);

    if assigned.len() > 1 {
        drifts.push(OccupancyDrift::MultipleActiveTenants {
            property: property.clone(),
            tenant_ids: assigned.to_vec(),
        });
    }

    match (unit.is_occupied(), assigned.first()) {
        (true, None) => drifts.push(OccupancyDrift::FlaggedWithoutTenant { property }),
        (false, Some(tenant_id)) => drifts.push(OccupancyDrift::TenantWithoutFlag {
            property,
            tenant_id: tenant_id.clone(),
        }),
        (true, Some(expected)) => {
            let matches = recorded
                .as_ref()
                .is_some_and(|recorded| assigned.contains(recorded));
            if !matches {
                drifts.push(OccupancyDrift::StaleBackReference {
                    property,
                    recorded,
                    expected: Some(expected.clone()),
                });
            }
        }
        (false, None) => {
            if recorded.is_some() {
                drifts.push(OccupancyDrift::StaleBackReference {
                    property,
                    recorded,
                    expected: None,
                });
            }
        }
    }
}

/// Compare every unit's stored flag and back-reference against tenant assignments.
///
/// Land has no assignment path, so a parcel is only checked for a flag that disagrees
/// with its own back-reference.
pub fn audit(catalog: &PropertyCatalog, tenants: &[Tenant]) -> Vec<OccupancyDrift> {
    let index = OccupancyIndex::from_tenants(tenants);
    let mut drifts = Vec::new();

    for unit in catalog.units() {
        match unit.kind() {
            PropertyKind::Land => audit_leased_land(unit, &mut drifts),
            PropertyKind::Apartment | PropertyKind::Flat => {
                audit_rented_unit(unit, &index, &mut drifts)
            }
        }
    }

    for property in index.properties() {
        if catalog.unit(property).is_none() {
            for tenant_id in index.tenants_for(property) {
                drifts.push(OccupancyDrift::UnknownProperty {
                    property: property.clone(),
                    tenant_id: tenant_id.clone(),
                });
            }
        }
    }

    drifts
}

use super::common::*;
use crate::properties::{Occupiable, OccupancyPatch, PropertyRef};
use crate::tenancy::builder::TenantRecordBuilder;
use crate::tenancy::domain::{Tenant, TenantAssignment, TenantId};
use crate::tenancy::index::{audit, OccupancyDrift, OccupancyIndex};
use crate::tenancy::resolver::ResolvedAssignment;

fn tenant_in(assignment: Option<TenantAssignment>) -> Tenant {
    TenantRecordBuilder::at(instant(9)).create(
        form().validate().expect("valid form"),
        ResolvedAssignment {
            assignment,
            rent_amount: Some(10000),
        },
    )
}

fn in_flat(flat_id: &str) -> Tenant {
    tenant_in(Some(TenantAssignment::Flat {
        flat_id: flat_id.to_string(),
    }))
}

#[test]
fn index_ignores_inactive_and_unassigned_tenants() {
    let active = in_flat("F1");
    let mut former = in_flat("F1");
    former.is_active = false;
    let floating = tenant_in(None);

    let index = OccupancyIndex::from_tenants([&active, &former, &floating]);

    let f1 = PropertyRef::flat("F1");
    assert_eq!(index.tenants_for(&f1), &[active.id.clone()]);
    assert_eq!(index.current_tenant(&f1), Some(&active.id));
    assert!(!index.is_occupied(&PropertyRef::apartment("A12")));
}

#[test]
fn consistent_catalog_has_no_drift() {
    let tenant = in_flat("F1");
    let mut catalog = catalog();
    catalog.flats[0].apply(OccupancyPatch::occupy(&tenant));

    assert!(audit(&catalog, &[tenant]).is_empty());
}

#[test]
fn flag_without_tenant_is_reported_and_repaired_by_vacating() {
    let mut catalog = catalog();
    catalog.flats[0].is_occupied = true;

    let drifts = audit(&catalog, &[]);
    assert_eq!(
        drifts,
        vec![OccupancyDrift::FlaggedWithoutTenant {
            property: PropertyRef::flat("F1"),
        }]
    );
    assert_eq!(drifts[0].repair(&[]), Some(OccupancyPatch::Vacate));
}

#[test]
fn double_booking_is_reported_without_repair() {
    let first = in_flat("F1");
    let second = in_flat("F1");
    let mut catalog = catalog();
    catalog.flats[0].apply(OccupancyPatch::occupy(&first));
    let tenants = vec![first.clone(), second.clone()];

    let drifts = audit(&catalog, &tenants);
    assert_eq!(drifts.len(), 1);
    match &drifts[0] {
        OccupancyDrift::MultipleActiveTenants { tenant_ids, .. } => {
            assert_eq!(tenant_ids, &vec![first.id.clone(), second.id.clone()]);
        }
        other => panic!("expected double booking, got {other:?}"),
    }
    assert_eq!(drifts[0].repair(&tenants), None);
}

#[test]
fn stale_back_reference_points_repair_at_assigned_tenant() {
    let current = in_flat("F1");
    let previous = tenant_in(None);
    let mut catalog = catalog();
    catalog.flats[0].apply(OccupancyPatch::occupy(&previous));
    let tenants = vec![current.clone()];

    let drifts = audit(&catalog, &tenants);
    assert_eq!(
        drifts,
        vec![OccupancyDrift::StaleBackReference {
            property: PropertyRef::flat("F1"),
            recorded: Some(previous.id.clone()),
            expected: Some(current.id.clone()),
        }]
    );
    assert_eq!(
        drifts[0].repair(&tenants),
        Some(OccupancyPatch::occupy(&current))
    );
}

#[test]
fn land_is_checked_against_its_own_back_reference() {
    let mut catalog = catalog();
    catalog.lands[0].is_leased = true;

    let drifts = audit(&catalog, &[]);
    assert_eq!(
        drifts,
        vec![OccupancyDrift::FlaggedWithoutTenant {
            property: PropertyRef::land("L1"),
        }]
    );
}

#[test]
fn assignment_to_missing_unit_is_reported() {
    let orphan = in_flat("F404");
    let drifts = audit(&catalog(), &[orphan.clone()]);
    assert_eq!(
        drifts,
        vec![OccupancyDrift::UnknownProperty {
            property: PropertyRef::flat("F404"),
            tenant_id: orphan.id.clone(),
        }]
    );
    assert_eq!(drifts[0].repair(&[orphan]), None);
}

#[test]
fn tenant_without_flag_repairs_by_occupying() {
    let tenant = in_flat("F1");
    let drifts = audit(&catalog(), &[tenant.clone()]);
    assert_eq!(
        drifts,
        vec![OccupancyDrift::TenantWithoutFlag {
            property: PropertyRef::flat("F1"),
            tenant_id: TenantId(tenant.id.0.clone()),
        }]
    );
    assert_eq!(
        drifts[0].repair(&[tenant.clone()]),
        Some(OccupancyPatch::occupy(&tenant))
    );
}

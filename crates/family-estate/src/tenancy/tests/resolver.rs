use super::common::*;
use crate::tenancy::domain::TenantAssignment;
use crate::tenancy::form::{PropertyChoice, PropertyChoiceType};
use crate::tenancy::resolver::resolve_assignment;

#[test]
fn apartment_choice_with_blank_rent_uses_stored_rent() {
    let catalog = catalog();
    for (apartment_id, stored) in [("A12", 15000), ("A13", 16000)] {
        let resolved = resolve_assignment(
            &PropertyChoice::apartment("B1", apartment_id),
            None,
            &catalog,
        );
        assert_eq!(resolved.rent_amount, Some(stored));
        assert_eq!(
            resolved.assignment,
            Some(TenantAssignment::Apartment {
                building_id: "B1".to_string(),
                apartment_id: apartment_id.to_string(),
            })
        );
    }
}

#[test]
fn typed_rent_wins_over_stored_rent() {
    let resolved = resolve_assignment(&PropertyChoice::flat("F1"), Some(9500), &catalog());
    assert_eq!(resolved.rent_amount, Some(9500));
    assert_eq!(
        resolved.assignment.as_ref().map(TenantAssignment::property_id),
        Some("F1")
    );
    assert_eq!(
        resolved
            .assignment
            .as_ref()
            .and_then(TenantAssignment::building_id),
        None
    );
}

#[test]
fn flat_choice_defaults_to_flat_rent() {
    let resolved = resolve_assignment(&PropertyChoice::flat("F1"), None, &catalog());
    assert_eq!(resolved.rent_amount, Some(9000));
}

#[test]
fn apartment_from_another_building_is_a_resolution_miss() {
    let resolved = resolve_assignment(&PropertyChoice::apartment("B9", "A12"), None, &catalog());
    assert!(resolved.assignment.is_none());
    assert_eq!(resolved.rent_amount, None);
}

#[test]
fn incomplete_choices_leave_tenant_unassigned() {
    let catalog = catalog();

    let building_only = PropertyChoice {
        property_type: Some(PropertyChoiceType::Building),
        building_id: Some("B1".to_string()),
        apartment_id: Some("  ".to_string()),
        flat_id: None,
    };
    let unknown_flat = PropertyChoice::flat("F404");
    let nothing = PropertyChoice::default();

    for choice in [building_only, unknown_flat, nothing] {
        let resolved = resolve_assignment(&choice, Some(12000), &catalog);
        assert!(resolved.assignment.is_none(), "{choice:?} should not resolve");
        assert_eq!(resolved.rent_amount, Some(12000));
    }
}

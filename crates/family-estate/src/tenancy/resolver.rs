use tracing::debug;

use crate::properties::PropertyCatalog;

use super::domain::TenantAssignment;
use super::form::{PropertyChoice, PropertyChoiceType};

/// Outcome of matching the property picker against the loaded catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAssignment {
    pub assignment: Option<TenantAssignment>,
    /// Rent typed into the form, or the unit's stored rent when the field was left blank.
    pub rent_amount: Option<u32>,
}

impl ResolvedAssignment {
    fn unassigned(rent_amount: Option<u32>) -> Self {
        Self {
            assignment: None,
            rent_amount,
        }
    }
}

fn picked(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|id| !id.is_empty())
}

/// Resolve the picked unit. A choice that does not match a loaded unit leaves the tenant unassigned.
pub fn resolve_assignment(
    choice: &PropertyChoice,
    requested_rent: Option<u32>,
    catalog: &PropertyCatalog,
) -> ResolvedAssignment {
    match choice.property_type {
        Some(PropertyChoiceType::Building) => {
            let (Some(building_id), Some(apartment_id)) =
                (picked(&choice.building_id), picked(&choice.apartment_id))
            else {
                return ResolvedAssignment::unassigned(requested_rent);
            };

            match catalog.apartment_in(building_id, apartment_id) {
                Some(apartment) => ResolvedAssignment {
                    assignment: Some(TenantAssignment::Apartment {
                        building_id: building_id.to_string(),
                        apartment_id: apartment.id.clone(),
                    }),
                    rent_amount: requested_rent.or(apartment.rent_amount),
                },
                None => {
                    debug!(building_id, apartment_id, "apartment choice did not resolve");
                    ResolvedAssignment::unassigned(requested_rent)
                }
            }
        }
        Some(PropertyChoiceType::Flat) => {
            let Some(flat_id) = picked(&choice.flat_id) else {
                return ResolvedAssignment::unassigned(requested_rent);
            };

            match catalog.flat(flat_id) {
                Some(flat) => ResolvedAssignment {
                    assignment: Some(TenantAssignment::Flat {
                        flat_id: flat.id.clone(),
                    }),
                    rent_amount: requested_rent.or(flat.rent_amount),
                },
                None => {
                    debug!(flat_id, "flat choice did not resolve");
                    ResolvedAssignment::unassigned(requested_rent)
                }
            }
        }
        None => ResolvedAssignment::unassigned(requested_rent),
    }
}

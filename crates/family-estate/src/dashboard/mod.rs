//! Portfolio-level numbers for the landing dashboard and the occupancy roster export.

mod roster;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::properties::{Occupiable, PropertyCatalog};
use crate::tenancy::domain::{Tenant, TenantId};

pub use roster::{roster_csv, write_roster, RosterError, RosterRow};

/// Agreements ending within this many days show up as expiring.
pub const EXPIRY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnitCounts {
    pub total: usize,
    pub occupied: usize,
    pub vacant: usize,
}

impl UnitCounts {
    fn tally<'a, U>(units: impl IntoIterator<Item = &'a U>) -> Self
    where
        U: Occupiable + 'a,
    {
        let mut counts = Self::default();
        for unit in units {
            counts.total += 1;
            if unit.is_occupied() {
                counts.occupied += 1;
            } else {
                counts.vacant += 1;
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiringAgreement {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub agreement_number: String,
    pub end_date: NaiveDate,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub as_of: NaiveDate,
    pub buildings: usize,
    pub apartments: UnitCounts,
    pub flats: UnitCounts,
    pub lands: UnitCounts,
    pub tenants: usize,
    pub active_tenants: usize,
    pub unassigned_tenants: usize,
    /// Occupied share of apartments and flats, in `0.0..=1.0`.
    pub occupancy_rate: f32,
    pub monthly_rent_roll: u64,
    pub expiring_agreements: Vec<ExpiringAgreement>,
}

impl DashboardSummary {
    pub fn compute(catalog: &PropertyCatalog, tenants: &[Tenant], today: NaiveDate) -> Self {
        let apartments = UnitCounts::tally(catalog.apartments());
        let flats = UnitCounts::tally(catalog.flats.iter());
        let lands = UnitCounts::tally(catalog.lands.iter());

        let rentable = apartments.total + flats.total;
        let occupancy_rate = if rentable == 0 {
            0.0
        } else {
            (apartments.occupied + flats.occupied) as f32 / rentable as f32
        };

        let active: Vec<&Tenant> = tenants.iter().filter(|tenant| tenant.is_active).collect();
        let monthly_rent_roll = active
            .iter()
            .map(|tenant| u64::from(tenant.rental_agreement.rent_amount))
            .sum();
        let unassigned_tenants = active
            .iter()
            .filter(|tenant| tenant.assignment.is_none())
            .count();

        let horizon = today + Duration::days(EXPIRY_WINDOW_DAYS);
        let mut expiring_agreements: Vec<ExpiringAgreement> = active
            .iter()
            .filter(|tenant| {
                let end = tenant.rental_agreement.end_date;
                end >= today && end <= horizon
            })
            .map(|tenant| ExpiringAgreement {
                tenant_id: tenant.id.clone(),
                tenant_name: tenant.personal_info.full_name.clone(),
                agreement_number: tenant.rental_agreement.agreement_number.clone(),
                end_date: tenant.rental_agreement.end_date,
                days_remaining: (tenant.rental_agreement.end_date - today).num_days(),
            })
            .collect();
        expiring_agreements.sort_by_key(|agreement| agreement.end_date);

        Self {
            as_of: today,
            buildings: catalog.buildings.len(),
            apartments,
            flats,
            lands,
            tenants: tenants.len(),
            active_tenants: active.len(),
            unassigned_tenants,
            occupancy_rate,
            monthly_rent_roll,
            expiring_agreements,
        }
    }
}

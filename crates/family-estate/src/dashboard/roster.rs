use std::io;

use serde::Serialize;

use crate::properties::{Occupiable, PropertyCatalog, PropertyKind};
use crate::tenancy::domain::Tenant;
use crate::tenancy::index::OccupancyIndex;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("roster serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("roster output failed: {0}")]
    Io(#[from] io::Error),
    #[error("roster output was not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// One line of the occupancy roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub kind: PropertyKind,
    pub property_id: String,
    pub label: String,
    pub occupied: bool,
    pub tenant_id: Option<String>,
    pub tenant_name: Option<String>,
    pub rent_amount: Option<u32>,
}

fn row_for(unit: &dyn Occupiable, index: &OccupancyIndex, tenants: &[Tenant]) -> RosterRow {
    let property = unit.reference();
    let occupant = index
        .current_tenant(&property)
        .and_then(|id| tenants.iter().find(|tenant| &tenant.id == id))
        .or_else(|| unit.current_tenant());

    RosterRow {
        kind: property.kind,
        label: unit.label(),
        occupied: unit.is_occupied(),
        tenant_id: occupant.map(|tenant| tenant.id.0.clone()),
        tenant_name: occupant.map(|tenant| tenant.personal_info.full_name.clone()),
        rent_amount: occupant
            .map(|tenant| tenant.rental_agreement.rent_amount)
            .or_else(|| unit.stored_rent()),
        property_id: property.id,
    }
}

/// Stream one CSV row per unit (apartments, flats, land) into `writer`.
pub fn write_roster<W: io::Write>(
    catalog: &PropertyCatalog,
    tenants: &[Tenant],
    writer: W,
) -> Result<(), RosterError> {
    let index = OccupancyIndex::from_tenants(tenants);
    let mut csv = csv::Writer::from_writer(writer);
    for unit in catalog.units() {
        csv.serialize(row_for(unit, &index, tenants))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn roster_csv(catalog: &PropertyCatalog, tenants: &[Tenant]) -> Result<String, RosterError> {
    let mut buffer = Vec::new();
    write_roster(catalog, tenants, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

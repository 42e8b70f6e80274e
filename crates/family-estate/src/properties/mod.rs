//! Buildings, apartments, flats and land parcels, plus the occupancy state each unit carries.

mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tenancy::domain::Tenant;

pub use store::{PropertyStore, StoreError};

/// Kind of rentable unit. Buildings are containers and are never assigned directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Apartment,
    Flat,
    Land,
}

impl PropertyKind {
    pub const fn label(self) -> &'static str {
        match self {
            PropertyKind::Apartment => "apartment",
            PropertyKind::Flat => "flat",
            PropertyKind::Land => "land",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "apartment" | "apartments" => Some(Self::Apartment),
            "flat" | "flats" => Some(Self::Flat),
            "land" | "lands" => Some(Self::Land),
            _ => None,
        }
    }
}

/// Typed pointer to a single unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyRef {
    pub kind: PropertyKind,
    pub id: String,
}

impl PropertyRef {
    pub fn new(kind: PropertyKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn apartment(id: impl Into<String>) -> Self {
        Self::new(PropertyKind::Apartment, id)
    }

    pub fn flat(id: impl Into<String>) -> Self {
        Self::new(PropertyKind::Flat, id)
    }

    pub fn land(id: impl Into<String>) -> Self {
        Self::new(PropertyKind::Land, id)
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.label(), self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub apartments: Vec<Apartment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apartment {
    pub id: String,
    pub building_id: String,
    pub number: String,
    #[serde(default)]
    pub floor: Option<i16>,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub rent_amount: Option<u32>,
    #[serde(default)]
    pub is_occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_tenant: Option<Box<Tenant>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flat {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rent_amount: Option<u32>,
    #[serde(default)]
    pub is_occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_tenant: Option<Box<Tenant>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Land {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub area_sq_ft: Option<u32>,
    #[serde(default)]
    pub lease_amount: Option<u32>,
    #[serde(default)]
    pub is_leased: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_tenant: Option<Box<Tenant>>,
}

/// Write applied to a unit's occupancy flag and its embedded tenant copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OccupancyPatch {
    Occupy(Box<Tenant>),
    Vacate,
}

impl OccupancyPatch {
    pub fn occupy(tenant: &Tenant) -> Self {
        Self::Occupy(Box::new(tenant.clone()))
    }

    pub fn marks_occupied(&self) -> bool {
        matches!(self, Self::Occupy(_))
    }
}

/// Shared view over the occupancy state of apartments, flats and land.
pub trait Occupiable {
    fn unit_id(&self) -> &str;
    fn kind(&self) -> PropertyKind;
    fn label(&self) -> String;
    fn stored_rent(&self) -> Option<u32>;
    fn is_occupied(&self) -> bool;
    fn current_tenant(&self) -> Option<&Tenant>;
    fn apply(&mut self, patch: OccupancyPatch);

    fn reference(&self) -> PropertyRef {
        PropertyRef::new(self.kind(), self.unit_id())
    }
}

macro_rules! occupiable {
    ($ty:ty, $kind:expr, $flag:ident, $rent:ident, |$unit:ident| $label:expr) => {
        impl Occupiable for $ty {
            fn unit_id(&self) -> &str {
                &self.id
            }

            fn kind(&self) -> PropertyKind {
                $kind
            }

            fn label(&self) -> String {
                let $unit = self;
                $label
            }

            fn stored_rent(&self) -> Option<u32> {
                self.$rent
            }

            fn is_occupied(&self) -> bool {
                self.$flag
            }

            fn current_tenant(&self) -> Option<&Tenant> {
                self.current_tenant.as_deref()
            }

            fn apply(&mut self, patch: OccupancyPatch) {
                match patch {
                    OccupancyPatch::Occupy(tenant) => {
                        self.$flag = true;
                        self.current_tenant = Some(tenant);
                    }
                    OccupancyPatch::Vacate => {
                        self.$flag = false;
                        self.current_tenant = None;
                    }
                }
            }
        }
    };
}

occupiable!(Apartment, PropertyKind::Apartment, is_occupied, rent_amount, |unit| {
    format!("{} #{}", unit.building_id, unit.number)
});
occupiable!(Flat, PropertyKind::Flat, is_occupied, rent_amount, |unit| unit
    .name
    .clone());
occupiable!(Land, PropertyKind::Land, is_leased, lease_amount, |unit| unit
    .name
    .clone());

/// Snapshot of every property list, as loaded for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyCatalog {
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub flats: Vec<Flat>,
    #[serde(default)]
    pub lands: Vec<Land>,
}

impl PropertyCatalog {
    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|building| building.id == id)
    }

    /// Apartment lookup scoped to its owning building.
    pub fn apartment_in(&self, building_id: &str, apartment_id: &str) -> Option<&Apartment> {
        self.building(building_id)?
            .apartments
            .iter()
            .find(|apartment| apartment.id == apartment_id)
    }

    pub fn flat(&self, id: &str) -> Option<&Flat> {
        self.flats.iter().find(|flat| flat.id == id)
    }

    pub fn land(&self, id: &str) -> Option<&Land> {
        self.lands.iter().find(|land| land.id == id)
    }

    pub fn apartments(&self) -> impl Iterator<Item = &Apartment> {
        self.buildings
            .iter()
            .flat_map(|building| building.apartments.iter())
    }

    /// Every rentable unit in catalog order: apartments, flats, then land.
    pub fn units(&self) -> impl Iterator<Item = &dyn Occupiable> {
        self.apartments()
            .map(|unit| unit as &dyn Occupiable)
            .chain(self.flats.iter().map(|unit| unit as &dyn Occupiable))
            .chain(self.lands.iter().map(|unit| unit as &dyn Occupiable))
    }

    pub fn unit(&self, property: &PropertyRef) -> Option<&dyn Occupiable> {
        match property.kind {
            PropertyKind::Apartment => self
                .apartments()
                .find(|unit| unit.id == property.id)
                .map(|unit| unit as &dyn Occupiable),
            PropertyKind::Flat => self.flat(&property.id).map(|unit| unit as &dyn Occupiable),
            PropertyKind::Land => self.land(&property.id).map(|unit| unit as &dyn Occupiable),
        }
    }
}

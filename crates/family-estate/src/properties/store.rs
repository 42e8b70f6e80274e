use super::{Apartment, Building, Flat, Land, OccupancyPatch, PropertyCatalog, PropertyKind, PropertyRef};

/// Storage abstraction for the property side of the estate.
pub trait PropertyStore: Send + Sync {
    /// All buildings, each carrying its apartments.
    fn buildings(&self) -> Result<Vec<Building>, StoreError>;
    fn building(&self, id: &str) -> Result<Option<Building>, StoreError>;
    fn apartments_for_building(&self, building_id: &str) -> Result<Vec<Apartment>, StoreError>;
    fn flats(&self) -> Result<Vec<Flat>, StoreError>;
    fn lands(&self) -> Result<Vec<Land>, StoreError>;
    fn update_apartment(&self, id: &str, patch: OccupancyPatch) -> Result<(), StoreError>;
    fn update_flat(&self, id: &str, patch: OccupancyPatch) -> Result<(), StoreError>;
    fn update_land(&self, id: &str, patch: OccupancyPatch) -> Result<(), StoreError>;

    fn update(&self, property: &PropertyRef, patch: OccupancyPatch) -> Result<(), StoreError> {
        match property.kind {
            PropertyKind::Apartment => self.update_apartment(&property.id, patch),
            PropertyKind::Flat => self.update_flat(&property.id, patch),
            PropertyKind::Land => self.update_land(&property.id, patch),
        }
    }

    fn catalog(&self) -> Result<PropertyCatalog, StoreError> {
        Ok(PropertyCatalog {
            buildings: self.buildings()?,
            flats: self.flats()?,
            lands: self.lands()?,
        })
    }
}

/// Failure reported by any store (property or tenant side).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

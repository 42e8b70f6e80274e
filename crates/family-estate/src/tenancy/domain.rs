use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::properties::PropertyRef;

/// Identifier wrapper for tenants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unit a tenant lives in. Apartments keep the owning building for display and lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "property_type", rename_all = "snake_case")]
pub enum TenantAssignment {
    Apartment {
        building_id: String,
        apartment_id: String,
    },
    Flat {
        flat_id: String,
    },
}

impl TenantAssignment {
    pub fn property_id(&self) -> &str {
        match self {
            TenantAssignment::Apartment { apartment_id, .. } => apartment_id,
            TenantAssignment::Flat { flat_id } => flat_id,
        }
    }

    pub fn building_id(&self) -> Option<&str> {
        match self {
            TenantAssignment::Apartment { building_id, .. } => Some(building_id),
            TenantAssignment::Flat { .. } => None,
        }
    }

    pub fn property_ref(&self) -> PropertyRef {
        match self {
            TenantAssignment::Apartment { apartment_id, .. } => {
                PropertyRef::apartment(apartment_id.clone())
            }
            TenantAssignment::Flat { flat_id } => PropertyRef::flat(flat_id.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    #[default]
    Unspecified,
    Single,
    Married,
    Widowed,
    Divorced,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    #[serde(default)]
    pub father_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    pub occupation: String,
    #[serde(default)]
    pub monthly_income: Option<u32>,
    #[serde(default = "default_family_size")]
    pub family_size: u8,
    #[serde(default)]
    pub marital_status: MaritalStatus,
}

fn default_family_size() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: String,
    #[serde(default)]
    pub alternate_phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub permanent_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentificationKind {
    #[default]
    NationalId,
    Passport,
    DrivingLicence,
    VoterId,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identification {
    pub kind: IdentificationKind,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalAgreement {
    pub agreement_number: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: u32,
    pub security_deposit: u32,
    pub rent_due_day: u8,
    #[serde(default)]
    pub maintenance_charge: u32,
    #[serde(default)]
    pub notice_period_days: u16,
    #[serde(default)]
    pub special_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantReference {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantDocumentCategory {
    Identification,
    Agreement,
    PoliceVerification,
    IncomeProof,
    Photo,
    Other,
}

/// Metadata for an uploaded file; the bytes live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDocument {
    pub name: String,
    pub category: TenantDocumentCategory,
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Complete tenant record as persisted in the tenant store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub personal_info: PersonalInfo,
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub emergency_contact: EmergencyContact,
    #[serde(default)]
    pub identification: Identification,
    pub rental_agreement: RentalAgreement,
    #[serde(default)]
    pub references: Vec<TenantReference>,
    #[serde(default)]
    pub documents: Vec<TenantDocument>,
    #[serde(default)]
    pub move_in_date: Option<NaiveDate>,
    #[serde(default)]
    pub move_out_date: Option<NaiveDate>,
    pub is_active: bool,
    #[serde(default)]
    pub assignment: Option<TenantAssignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn property_ref(&self) -> Option<PropertyRef> {
        self.assignment.as_ref().map(TenantAssignment::property_ref)
    }

    /// Assigned unit, but only while the tenant is active.
    pub fn occupied_property(&self) -> Option<PropertyRef> {
        if self.is_active {
            self.property_ref()
        } else {
            None
        }
    }

    pub fn is_assigned_to(&self, property: &PropertyRef) -> bool {
        self.property_ref().as_ref() == Some(property)
    }
}

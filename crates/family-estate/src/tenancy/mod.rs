//! Tenant records and the occupancy bookkeeping that follows every tenant write.
//!
//! A submission flows through [`form`] validation, the assignment [`resolver`], the
//! record [`builder`], the tenant store, and finally the [`occupancy`] synchronizer.
//! [`index`] derives occupancy from assignments alone and is used to audit the
//! stored flags.

pub mod builder;
pub mod domain;
pub mod form;
pub mod index;
pub mod occupancy;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use builder::{TenantRecordBuilder, DEFAULT_RENT_DUE_DAY, DEPOSIT_RENT_MULTIPLIER};
pub use domain::{
    ContactInfo, EmergencyContact, Identification, IdentificationKind, MaritalStatus,
    PersonalInfo, RentalAgreement, Tenant, TenantAssignment, TenantDocument,
    TenantDocumentCategory, TenantId, TenantReference,
};
pub use form::{FieldIssue, FormError, PropertyChoice, PropertyChoiceType, TenantForm};
pub use index::{audit, OccupancyDrift, OccupancyIndex};
pub use occupancy::{OccupancySynchronizer, PropertySync, SyncStatus};
pub use repository::{Notification, NotificationKind, NotificationLevel, Notifier, TenantStore};
pub use resolver::{resolve_assignment, ResolvedAssignment};
pub use router::tenancy_router;
pub use service::{
    Clock, ReconcileReport, RemovalOutcome, SystemClock, TenancyError, TenancyOutcome,
    TenancyService,
};

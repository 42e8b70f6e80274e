use serde::{Deserialize, Serialize};

use crate::properties::StoreError;

use super::domain::{Tenant, TenantId};

/// Storage abstraction for tenant records.
pub trait TenantStore: Send + Sync {
    fn save(&self, tenant: Tenant) -> Result<Tenant, StoreError>;
    fn update(&self, tenant: Tenant) -> Result<Tenant, StoreError>;
    fn delete(&self, id: &TenantId) -> Result<(), StoreError>;
    fn fetch(&self, id: &TenantId) -> Result<Option<Tenant>, StoreError>;
    fn list(&self) -> Result<Vec<Tenant>, StoreError>;
}

/// Outbound user-facing message channel (toasts in the web client).
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TenantCreated,
    TenantUpdated,
    TenantRemoved,
    TenantSaveFailed,
    TenantDeleteFailed,
    OccupancySyncFailed,
    OccupancyReconciled,
}

impl NotificationKind {
    pub const fn level(self) -> NotificationLevel {
        match self {
            NotificationKind::TenantCreated
            | NotificationKind::TenantUpdated
            | NotificationKind::TenantRemoved
            | NotificationKind::OccupancyReconciled => NotificationLevel::Success,
            NotificationKind::OccupancySyncFailed => NotificationLevel::Warning,
            NotificationKind::TenantSaveFailed | NotificationKind::TenantDeleteFailed => {
                NotificationLevel::Error
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            level: kind.level(),
            message: message.into(),
        }
    }
}

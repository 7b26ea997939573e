//! Notification permission capability
//!
//! The real authorization lookup is owned by the platform notification
//! center and never fails; the trait mirrors that by returning a plain
//! status. `StaticPermission` is the in-repo implementation used for local
//! runs and tests.

use crate::types::AuthorizationStatus;

/// Reports the device's notification-authorization state.
#[async_trait::async_trait]
pub trait NotificationPermission: Send + Sync {
    /// Current authorization state. Infallible: an unknown or restricted
    /// platform state collapses to `Denied`.
    async fn authorization_status(&self) -> AuthorizationStatus;
}

/// Fixed-answer permission source.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission {
    status: AuthorizationStatus,
}

impl StaticPermission {
    pub fn new(status: AuthorizationStatus) -> Self {
        Self { status }
    }

    pub fn authorized() -> Self {
        Self::new(AuthorizationStatus::Authorized)
    }

    pub fn denied() -> Self {
        Self::new(AuthorizationStatus::Denied)
    }
}

#[async_trait::async_trait]
impl NotificationPermission for StaticPermission {
    async fn authorization_status(&self) -> AuthorizationStatus {
        self.status
    }
}

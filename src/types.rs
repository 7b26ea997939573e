//! Shared domain types for Herald
//!
//! The status enums are carried over the HTTP transports in snake_case,
//! so they derive serde alongside the plain Rust forms.

use serde::{Deserialize, Serialize};

/// A remote authority's view of one device's registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Registered against this device.
    Registered,
    /// Not registered anywhere.
    NotRegistered,
    /// Registered, but against a different device.
    AnotherDevice,
}

/// Local notification-authorization state.
///
/// Produced by the permission capability; gates whether a push token may
/// be used at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
}

/// Errors from registry authorities and registration preconditions.
///
/// Every variant displays as the human-readable text the coordinator
/// surfaces through its `last_error` channel.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to fetch session: {0}")]
    SessionFetch(String),

    #[error("Failed to fetch status: {0}")]
    StatusQuery(String),

    #[error("Registration failed: {0}")]
    Register(String),

    #[error("Deregistration failed: {0}")]
    Deregister(String),

    #[error("Notifications not allowed")]
    PermissionDenied,
}

/// Convenience result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_status_wire_form_is_snake_case() {
        let parsed: RegistrationStatus = serde_json::from_str("\"another_device\"").unwrap();
        assert_eq!(parsed, RegistrationStatus::AnotherDevice);

        let encoded = serde_json::to_string(&RegistrationStatus::NotRegistered).unwrap();
        assert_eq!(encoded, "\"not_registered\"");
    }

    #[test]
    fn permission_denied_displays_exact_message() {
        assert_eq!(
            RegistryError::PermissionDenied.to_string(),
            "Notifications not allowed"
        );
    }
}

//! Herald - device push registration reconciled across independent authorities
//!
//! Two remote systems each hold their own opinion of whether a device is
//! registered for push notifications: a push authority (push token vs. user
//! session) and a vendor authority (device UUID vs. third-party system).
//! Herald's [`coordinator::RegistrationCoordinator`] folds both opinions
//! into one observable snapshot and drives register/de-register writes
//! against both sides with consistent loading and error semantics.
//!
//! ## Modules
//!
//! - **types**: shared domain enums and the registry error taxonomy
//! - **registries**: collaborator traits, HTTP transports, static doubles
//! - **coordinator**: the reconciliation state machine
//! - **config**: CLI arguments and environment variable handling

pub mod config;
pub mod coordinator;
pub mod registries;
pub mod types;

pub use config::Args;
pub use coordinator::{CoordinatorConfig, RegistrationCoordinator, RegistrationState};
pub use types::{AuthorizationStatus, RegistrationStatus, RegistryError, Result};

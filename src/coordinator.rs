//! Registration coordinator - reconciliation across two authorities
//!
//! The push authority and the vendor authority each hold their own opinion
//! of whether this device is registered. The coordinator folds both into a
//! single observable snapshot and fans register/deregister writes out to
//! both sides.
//!
//! ## Reconciliation rules
//!
//! - A device counts as registered only when **both** authorities say so.
//! - A push-side "registered on another device" answer is a conflict, not a
//!   failure: it forces the reconciled view to unregistered and surfaces a
//!   distinguished message through the error channel. The vendor's answer
//!   does not override it.
//! - Writes require both results. A partial de-registration leaves the
//!   device registered somewhere, so the reconciled view stays registered.
//!
//! ## Observability
//!
//! All outcomes are published through a [`tokio::sync::watch`] channel of
//! [`RegistrationState`] snapshots; callers subscribe rather than consume
//! return values. `is_loading` spans exactly one operation, and
//! `last_error` is cleared at the start of every operation.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::registries::{NotificationPermission, PushRegistry, SessionProvider, VendorRegistry};
use crate::types::{AuthorizationStatus, RegistrationStatus, RegistryError, Result};

const ERR_ANOTHER_DEVICE: &str = "Registered on another device";
const ERR_REGISTER_FAILED: &str = "Failed to register device";
const ERR_DEREGISTER_FAILED: &str = "Failed to de-register device";

// ============================================================================
// Types
// ============================================================================

/// Configuration for the registration coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Stable identifier for this device
    pub device_uuid: String,
    /// Opaque push token handed to the push authority on registration.
    /// Token acquisition is platform-owned; any non-empty string works here.
    pub push_token: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            device_uuid: Uuid::new_v4().to_string(),
            push_token: "local-push-token".to_string(),
        }
    }
}

/// The reconciled registration snapshot.
///
/// `is_registered` only changes at terminal outcomes; `last_error` carries
/// both failures and the "another device" conflict, and is the single
/// channel callers should read failure information from. In the
/// de-registration failure path `is_registered` is deliberately left
/// unchanged, so failure cannot be inferred from it alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationState {
    pub is_registered: bool,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl Default for RegistrationState {
    fn default() -> Self {
        Self {
            is_registered: false,
            is_loading: false,
            last_error: None,
        }
    }
}

// ============================================================================
// Coordinator
// ============================================================================

/// Orchestrates session, permission, and the two registry authorities into
/// one coherent registration view.
///
/// Operations are serialized through an internal gate: a second invocation
/// while one is in flight waits its turn, so every invocation produces
/// exactly one loading cycle and snapshots never interleave. Dropping the
/// coordinator cancels any in-flight operation at its next suspension point;
/// the state lives inside the coordinator, so a disposed state is never
/// written to.
pub struct RegistrationCoordinator {
    device_uuid: String,
    push_token: String,
    push: Arc<dyn PushRegistry>,
    vendor: Arc<dyn VendorRegistry>,
    session: Arc<dyn SessionProvider>,
    permission: Arc<dyn NotificationPermission>,
    state_tx: watch::Sender<RegistrationState>,
    /// Serializes operations; held for the whole of each one.
    op_gate: Mutex<()>,
}

impl RegistrationCoordinator {
    pub fn new(
        config: CoordinatorConfig,
        push: Arc<dyn PushRegistry>,
        vendor: Arc<dyn VendorRegistry>,
        session: Arc<dyn SessionProvider>,
        permission: Arc<dyn NotificationPermission>,
    ) -> Self {
        let (state_tx, _) = watch::channel(RegistrationState::default());

        Self {
            device_uuid: config.device_uuid,
            push_token: config.push_token,
            push,
            vendor,
            session,
            permission,
            state_tx,
            op_gate: Mutex::new(()),
        }
    }

    /// Subscribe to state snapshots. The receiver always yields the latest
    /// snapshot; intermediate snapshots may be coalesced under load.
    pub fn subscribe(&self) -> watch::Receiver<RegistrationState> {
        self.state_tx.subscribe()
    }

    /// Current snapshot.
    pub fn state(&self) -> RegistrationState {
        self.state_tx.borrow().clone()
    }

    /// Reconcile the registration status from both authorities.
    pub async fn load_status(&self) {
        let _gate = self.op_gate.lock().await;
        self.begin();

        debug!(device = %self.device_uuid, "Loading registration status");

        let session = match self.session.fetch_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Session fetch failed during status load");
                return self.fail(e);
            }
        };

        // Fan-in that short-circuits on the first error; the push query is
        // listed first, so its error wins when both sides fail.
        let statuses = tokio::try_join!(
            self.push.registration_status(&session),
            self.vendor.registration_status(&self.device_uuid),
        );

        match statuses {
            Err(e) => {
                warn!(error = %e, "Status query failed");
                self.fail(e);
            }
            Ok((push_status, vendor_status)) => {
                if push_status == RegistrationStatus::AnotherDevice {
                    info!(device = %self.device_uuid, "Registered on another device");
                    self.settle(false, Some(ERR_ANOTHER_DEVICE.to_string()));
                    return;
                }

                let registered = push_status == RegistrationStatus::Registered
                    && vendor_status == RegistrationStatus::Registered;
                info!(
                    device = %self.device_uuid,
                    registered = registered,
                    "Registration status reconciled"
                );
                self.settle(registered, None);
            }
        }
    }

    /// Drive the device to the target registration state on both authorities.
    pub async fn set_registered(&self, target: bool) {
        if target {
            self.register().await;
        } else {
            self.deregister().await;
        }
    }

    async fn register(&self) {
        let _gate = self.op_gate.lock().await;
        self.begin();

        // Hard precondition: no network calls when notifications are denied.
        let token = match self.acquire_push_token().await {
            Ok(token) => token,
            Err(e) => {
                info!(device = %self.device_uuid, "Registration blocked: notifications denied");
                return self.fail(e);
            }
        };

        let session = match self.session.fetch_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Session fetch failed during registration");
                // A registration that failed to even obtain a session
                // resolves to unregistered.
                return self.settle(false, Some(e.to_string()));
            }
        };

        debug!(device = %self.device_uuid, "Registering with both authorities");

        // Both results are required; neither write short-circuits the other.
        let (push_result, vendor_result) = tokio::join!(
            self.push.register(&self.device_uuid, &session, &token),
            self.vendor.register(&self.device_uuid),
        );

        match (push_result, vendor_result) {
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Registration failed");
                self.settle(false, Some(e.to_string()));
            }
            (Ok(push_accepted), Ok(vendor_accepted)) => {
                let success = push_accepted && vendor_accepted;
                info!(
                    device = %self.device_uuid,
                    push_accepted = push_accepted,
                    vendor_accepted = vendor_accepted,
                    "Registration completed"
                );
                self.settle(
                    success,
                    (!success).then(|| ERR_REGISTER_FAILED.to_string()),
                );
            }
        }
    }

    async fn deregister(&self) {
        let _gate = self.op_gate.lock().await;
        self.begin();

        debug!(device = %self.device_uuid, "Deregistering from both authorities");

        let (push_result, vendor_result) = tokio::join!(
            self.push.deregister(&self.device_uuid),
            self.vendor.deregister(&self.device_uuid),
        );

        match (push_result, vendor_result) {
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Deregistration failed");
                // Unlike registration, an authority failure here leaves the
                // reconciled view untouched.
                self.fail(e);
            }
            (Ok(push_accepted), Ok(vendor_accepted)) => {
                let success = push_accepted && vendor_accepted;
                info!(
                    device = %self.device_uuid,
                    push_accepted = push_accepted,
                    vendor_accepted = vendor_accepted,
                    "Deregistration completed"
                );
                // A one-sided de-registration means the device is still
                // registered somewhere.
                self.settle(
                    !success,
                    (!success).then(|| ERR_DEREGISTER_FAILED.to_string()),
                );
            }
        }
    }

    /// Permission-gated token lookup. The token itself is an opaque
    /// configured string; only the gate is interesting here.
    async fn acquire_push_token(&self) -> Result<String> {
        match self.permission.authorization_status().await {
            AuthorizationStatus::Authorized => Ok(self.push_token.clone()),
            AuthorizationStatus::Denied => Err(RegistryError::PermissionDenied),
        }
    }

    // ------------------------------------------------------------------
    // Terminal-outcome helpers; every state mutation goes through one of
    // these so snapshots are always internally consistent.
    // ------------------------------------------------------------------

    fn begin(&self) {
        self.state_tx.send_modify(|state| {
            state.is_loading = true;
            state.last_error = None;
        });
    }

    /// Terminal failure that leaves `is_registered` untouched.
    fn fail(&self, error: RegistryError) {
        self.state_tx.send_modify(|state| {
            state.is_loading = false;
            state.last_error = Some(error.to_string());
        });
    }

    /// Terminal outcome with an explicit reconciled view.
    fn settle(&self, registered: bool, error: Option<String>) {
        self.state_tx.send_modify(|state| {
            state.is_loading = false;
            state.is_registered = registered;
            state.last_error = error;
        });
    }
}

// ============================================================================
// Tests
// ============================================================================

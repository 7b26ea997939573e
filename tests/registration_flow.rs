//! End-to-end flows through the public API, wired with the static registries.

use std::sync::Arc;

use herald::coordinator::{CoordinatorConfig, RegistrationCoordinator};
use herald::registries::{
    StaticPermission, StaticPushRegistry, StaticSessionProvider, StaticVendorRegistry,
};
use herald::RegistrationStatus;

fn local_coordinator(push: StaticPushRegistry, vendor: StaticVendorRegistry) -> RegistrationCoordinator {
    RegistrationCoordinator::new(
        CoordinatorConfig::default(),
        Arc::new(push),
        Arc::new(vendor),
        Arc::new(StaticSessionProvider::new("integration-session")),
        Arc::new(StaticPermission::authorized()),
    )
}

#[tokio::test]
async fn full_lifecycle_register_then_deregister() {
    let coordinator = local_coordinator(
        StaticPushRegistry::default(),
        StaticVendorRegistry::default(),
    );

    coordinator.load_status().await;
    assert!(coordinator.state().is_registered);

    coordinator.set_registered(false).await;
    let state = coordinator.state();
    assert!(!state.is_registered);
    assert_eq!(state.last_error, None);

    coordinator.set_registered(true).await;
    let state = coordinator.state();
    assert!(state.is_registered);
    assert_eq!(state.last_error, None);
}

#[tokio::test]
async fn subscribers_observe_terminal_snapshots() {
    let coordinator = local_coordinator(
        StaticPushRegistry {
            status: RegistrationStatus::AnotherDevice,
            ..Default::default()
        },
        StaticVendorRegistry::default(),
    );

    let mut rx = coordinator.subscribe();

    coordinator.load_status().await;

    let state = rx
        .wait_for(|state| !state.is_loading && state.last_error.is_some())
        .await
        .expect("terminal snapshot")
        .clone();
    assert!(!state.is_registered);
    assert_eq!(state.last_error.as_deref(), Some("Registered on another device"));
}

#[tokio::test]
async fn vendor_disagreement_reconciles_to_unregistered() {
    let coordinator = local_coordinator(
        StaticPushRegistry::default(),
        StaticVendorRegistry {
            status: RegistrationStatus::NotRegistered,
            ..Default::default()
        },
    );

    coordinator.load_status().await;

    let state = coordinator.state();
    assert!(!state.is_registered);
    assert_eq!(state.last_error, None);
}

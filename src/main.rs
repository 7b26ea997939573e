//! Herald - device push registration reconciled across independent authorities

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herald::{
    config::{Args, Command},
    coordinator::{CoordinatorConfig, RegistrationCoordinator},
    registries::{
        HttpPushRegistry, HttpSessionProvider, HttpVendorRegistry, PushRegistry,
        PushRegistryConfig, SessionProvider, SessionProviderConfig, StaticPermission,
        StaticPushRegistry, StaticSessionProvider, StaticVendorRegistry, VendorRegistry,
        VendorRegistryConfig,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("herald={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("Herald - push registration reconciliation");
    info!("Device UUID: {}", args.device_uuid);
    info!(
        "Mode: {}",
        if args.local { "LOCAL" } else { "HTTP" }
    );
    if !args.local {
        info!("Session service: {}", args.session_url);
        info!("Push registry: {}", args.push_registry_url);
        info!("Vendor registry: {}", args.vendor_registry_url);
    }

    let permission = Arc::new(if args.notifications_authorized {
        StaticPermission::authorized()
    } else {
        StaticPermission::denied()
    });

    let (push, vendor, session): (
        Arc<dyn PushRegistry>,
        Arc<dyn VendorRegistry>,
        Arc<dyn SessionProvider>,
    ) = if args.local {
        (
            Arc::new(StaticPushRegistry::default()),
            Arc::new(StaticVendorRegistry::default()),
            Arc::new(StaticSessionProvider::new("local-session")),
        )
    } else {
        (
            Arc::new(HttpPushRegistry::new(PushRegistryConfig {
                base_url: args.push_registry_url.clone(),
                timeout: args.request_timeout(),
                pace: args.pace(),
            })),
            Arc::new(HttpVendorRegistry::new(VendorRegistryConfig {
                base_url: args.vendor_registry_url.clone(),
                timeout: args.request_timeout(),
                pace: args.pace(),
            })),
            Arc::new(HttpSessionProvider::new(SessionProviderConfig {
                base_url: args.session_url.clone(),
                timeout: args.request_timeout(),
                pace: args.pace(),
            })),
        )
    };

    let coordinator = RegistrationCoordinator::new(
        CoordinatorConfig {
            device_uuid: args.device_uuid.to_string(),
            push_token: args.push_token.clone(),
        },
        push,
        vendor,
        session,
        permission,
    );

    match args.command {
        Command::Status => coordinator.load_status().await,
        Command::Register => coordinator.set_registered(true).await,
        Command::Deregister => coordinator.set_registered(false).await,
    }

    let state = coordinator.state();
    println!("{}", serde_json::to_string_pretty(&state)?);

    if state.last_error.is_some() {
        std::process::exit(1);
    }

    Ok(())
}

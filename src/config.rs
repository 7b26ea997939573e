//! Configuration for Herald
//!
//! CLI arguments and environment variable handling using clap.

use std::time::Duration;

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Herald - device push registration reconciled across independent authorities
#[derive(Parser, Debug, Clone)]
#[command(name = "herald")]
#[command(about = "Reconciles device push registration across a push and a vendor authority")]
pub struct Args {
    /// Stable identifier for this device
    #[arg(long, env = "DEVICE_UUID", default_value_t = Uuid::new_v4())]
    pub device_uuid: Uuid,

    /// Opaque push token handed to the push authority on registration
    #[arg(long, env = "PUSH_TOKEN", default_value = "local-push-token")]
    pub push_token: String,

    /// Base URL of the session service
    #[arg(long, env = "SESSION_URL", default_value = "http://localhost:8080")]
    pub session_url: String,

    /// Base URL of the push registry
    #[arg(long, env = "PUSH_REGISTRY_URL", default_value = "http://localhost:8081")]
    pub push_registry_url: String,

    /// Base URL of the vendor registry
    #[arg(long, env = "VENDOR_REGISTRY_URL", default_value = "http://localhost:8082")]
    pub vendor_registry_url: String,

    /// Treat notifications as authorized. The platform permission lookup is
    /// not reachable from a CLI process, so the answer is injected here.
    #[arg(long, env = "NOTIFICATIONS_AUTHORIZED", default_value = "true")]
    pub notifications_authorized: bool,

    /// Run against fixed in-process registries instead of HTTP transports
    #[arg(long, env = "LOCAL_MODE", default_value = "false")]
    pub local: bool,

    /// Artificial delay before each transport dispatch, in milliseconds
    #[arg(long, env = "PACE_MS")]
    pub pace_ms: Option<u64>,

    /// Request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "10000")]
    pub request_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Reconcile and print the current registration status
    Status,
    /// Register the device with both authorities
    Register,
    /// De-register the device from both authorities
    Deregister,
}

impl Args {
    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.push_token.trim().is_empty() {
            return Err("PUSH_TOKEN must be a non-empty string".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn pace(&self) -> Option<Duration> {
        self.pace_ms.map(Duration::from_millis)
    }
}

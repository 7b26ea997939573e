//! Vendor registry authority
//!
//! Tracks whether the device UUID is registered against the third-party
//! vendor system. Unlike the push registry, every operation is keyed by
//! UUID alone; the vendor knows nothing about sessions or tokens.
//!
//! ## Wire contract
//!
//! - `GET  /v1/vendor/status?uuid=...` → `{"status": "registered" | "not_registered" | "another_device"}`
//! - `POST /v1/vendor/register`   `{uuid}` → `{"accepted": bool}`
//! - `POST /v1/vendor/deregister` `{uuid}` → `{"accepted": bool}`

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{RegistrationStatus, RegistryError, Result};

/// Remote authority for UUID-based vendor registration.
#[async_trait::async_trait]
pub trait VendorRegistry: Send + Sync {
    async fn registration_status(&self, uuid: &str) -> Result<RegistrationStatus>;

    async fn register(&self, uuid: &str) -> Result<bool>;

    async fn deregister(&self, uuid: &str) -> Result<bool>;
}

// ============================================================================
// HTTP transport
// ============================================================================

/// Configuration for the HTTP vendor registry
#[derive(Debug, Clone)]
pub struct VendorRegistryConfig {
    /// Base URL of the vendor registry service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Optional artificial delay before dispatch (latency shaping for demos)
    pub pace: Option<Duration>,
}

impl Default for VendorRegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8082".to_string(),
            timeout: Duration::from_secs(10),
            pace: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: RegistrationStatus,
}

#[derive(Debug, Serialize)]
struct UuidRequest<'a> {
    uuid: &'a str,
}

#[derive(Debug, Deserialize)]
struct AcceptedResponse {
    accepted: bool,
}

/// Vendor registry over HTTP
pub struct HttpVendorRegistry {
    config: VendorRegistryConfig,
    http_client: reqwest::Client,
}

impl HttpVendorRegistry {
    pub fn new(config: VendorRegistryConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self {
            config,
            http_client,
        }
    }

    pub fn with_defaults(base_url: String) -> Self {
        Self::new(VendorRegistryConfig {
            base_url,
            ..Default::default()
        })
    }

    async fn pace(&self) {
        if let Some(pace) = self.config.pace {
            tokio::time::sleep(pace).await;
        }
    }

    async fn post_accepted(
        &self,
        path: &str,
        uuid: &str,
        map_err: fn(String) -> RegistryError,
    ) -> Result<bool> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(url = %url, uuid = %uuid, "Calling vendor registry");

        let response = self
            .http_client
            .post(&url)
            .json(&UuidRequest { uuid })
            .send()
            .await
            .map_err(|e| map_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(map_err(format!("HTTP {} from {}", response.status(), url)));
        }

        let body: AcceptedResponse = response.json().await.map_err(|e| map_err(e.to_string()))?;

        Ok(body.accepted)
    }
}

#[async_trait::async_trait]
impl VendorRegistry for HttpVendorRegistry {
    async fn registration_status(&self, uuid: &str) -> Result<RegistrationStatus> {
        self.pace().await;

        let url = format!("{}/v1/vendor/status", self.config.base_url);
        debug!(url = %url, uuid = %uuid, "Querying vendor registration status");

        let response = self
            .http_client
            .get(&url)
            .query(&[("uuid", uuid)])
            .send()
            .await
            .map_err(|e| RegistryError::StatusQuery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::StatusQuery(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::StatusQuery(e.to_string()))?;

        Ok(body.status)
    }

    async fn register(&self, uuid: &str) -> Result<bool> {
        self.pace().await;
        self.post_accepted("/v1/vendor/register", uuid, RegistryError::Register)
            .await
    }

    async fn deregister(&self, uuid: &str) -> Result<bool> {
        self.pace().await;
        self.post_accepted("/v1/vendor/deregister", uuid, RegistryError::Deregister)
            .await
    }
}

// ============================================================================
// Static registry (local development)
// ============================================================================

/// Fixed-answer vendor registry.
#[derive(Debug, Clone)]
pub struct StaticVendorRegistry {
    pub status: RegistrationStatus,
    pub accept_register: bool,
    pub accept_deregister: bool,
}

impl Default for StaticVendorRegistry {
    fn default() -> Self {
        Self {
            status: RegistrationStatus::Registered,
            accept_register: true,
            accept_deregister: true,
        }
    }
}

#[async_trait::async_trait]
impl VendorRegistry for StaticVendorRegistry {
    async fn registration_status(&self, _uuid: &str) -> Result<RegistrationStatus> {
        Ok(self.status)
    }

    async fn register(&self, _uuid: &str) -> Result<bool> {
        Ok(self.accept_register)
    }

    async fn deregister(&self, _uuid: &str) -> Result<bool> {
        Ok(self.accept_deregister)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_request_encodes_uuid_only() {
        let encoded = serde_json::to_value(UuidRequest { uuid: "device-9" }).unwrap();
        assert_eq!(encoded, serde_json::json!({"uuid": "device-9"}));
    }
}

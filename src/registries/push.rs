//! Push registry authority
//!
//! Tracks whether the device's push token is registered against a user
//! session. Status queries are keyed by session; registration also carries
//! the device UUID and the push token.
//!
//! ## Wire contract
//!
//! - `GET  /v1/push/status?session=...` → `{"status": "registered" | "not_registered" | "another_device"}`
//! - `POST /v1/push/register`   `{uuid, session, token}` → `{"accepted": bool}`
//! - `POST /v1/push/deregister` `{uuid}` → `{"accepted": bool}`

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{RegistrationStatus, RegistryError, Result};

/// Remote authority for push-token-based registration.
#[async_trait::async_trait]
pub trait PushRegistry: Send + Sync {
    /// This authority's view of the device registration for `session`.
    async fn registration_status(&self, session: &str) -> Result<RegistrationStatus>;

    /// Register the device. `true` means the authority accepted the
    /// registration, `false` means it rejected it without failing.
    async fn register(&self, uuid: &str, session: &str, token: &str) -> Result<bool>;

    /// Remove the device registration.
    async fn deregister(&self, uuid: &str) -> Result<bool>;
}

// ============================================================================
// HTTP transport
// ============================================================================

/// Configuration for the HTTP push registry
#[derive(Debug, Clone)]
pub struct PushRegistryConfig {
    /// Base URL of the push registry service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Optional artificial delay before dispatch (latency shaping for demos)
    pub pace: Option<Duration>,
}

impl Default for PushRegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
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
struct RegisterRequest<'a> {
    uuid: &'a str,
    session: &'a str,
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct DeregisterRequest<'a> {
    uuid: &'a str,
}

#[derive(Debug, Deserialize)]
struct AcceptedResponse {
    accepted: bool,
}

/// Push registry over HTTP
pub struct HttpPushRegistry {
    config: PushRegistryConfig,
    http_client: reqwest::Client,
}

impl HttpPushRegistry {
    pub fn new(config: PushRegistryConfig) -> Self {
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
        Self::new(PushRegistryConfig {
            base_url,
            ..Default::default()
        })
    }

    async fn pace(&self) {
        if let Some(pace) = self.config.pace {
            tokio::time::sleep(pace).await;
        }
    }
}

#[async_trait::async_trait]
impl PushRegistry for HttpPushRegistry {
    async fn registration_status(&self, session: &str) -> Result<RegistrationStatus> {
        self.pace().await;

        let url = format!("{}/v1/push/status", self.config.base_url);
        debug!(url = %url, "Querying push registration status");

        let response = self
            .http_client
            .get(&url)
            .query(&[("session", session)])
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

    async fn register(&self, uuid: &str, session: &str, token: &str) -> Result<bool> {
        self.pace().await;

        let url = format!("{}/v1/push/register", self.config.base_url);
        debug!(url = %url, uuid = %uuid, "Registering push token");

        let response = self
            .http_client
            .post(&url)
            .json(&RegisterRequest {
                uuid,
                session,
                token,
            })
            .send()
            .await
            .map_err(|e| RegistryError::Register(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::Register(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body: AcceptedResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Register(e.to_string()))?;

        Ok(body.accepted)
    }

    async fn deregister(&self, uuid: &str) -> Result<bool> {
        self.pace().await;

        let url = format!("{}/v1/push/deregister", self.config.base_url);
        debug!(url = %url, uuid = %uuid, "Deregistering push token");

        let response = self
            .http_client
            .post(&url)
            .json(&DeregisterRequest { uuid })
            .send()
            .await
            .map_err(|e| RegistryError::Deregister(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::Deregister(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body: AcceptedResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Deregister(e.to_string()))?;

        Ok(body.accepted)
    }
}

// ============================================================================
// Static registry (local development)
// ============================================================================

/// Fixed-answer push registry.
#[derive(Debug, Clone)]
pub struct StaticPushRegistry {
    pub status: RegistrationStatus,
    pub accept_register: bool,
    pub accept_deregister: bool,
}

impl Default for StaticPushRegistry {
    fn default() -> Self {
        Self {
            status: RegistrationStatus::Registered,
            accept_register: true,
            accept_deregister: true,
        }
    }
}

#[async_trait::async_trait]
impl PushRegistry for StaticPushRegistry {
    async fn registration_status(&self, _session: &str) -> Result<RegistrationStatus> {
        Ok(self.status)
    }

    async fn register(&self, _uuid: &str, _session: &str, _token: &str) -> Result<bool> {
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
    fn status_response_decodes_all_variants() {
        let cases = [
            ("registered", RegistrationStatus::Registered),
            ("not_registered", RegistrationStatus::NotRegistered),
            ("another_device", RegistrationStatus::AnotherDevice),
        ];

        for (wire, expected) in cases {
            let body: StatusResponse =
                serde_json::from_str(&format!("{{\"status\": \"{}\"}}", wire)).unwrap();
            assert_eq!(body.status, expected);
        }
    }

    #[test]
    fn register_request_carries_all_fields() {
        let encoded = serde_json::to_value(RegisterRequest {
            uuid: "device-1",
            session: "session-1",
            token: "token-1",
        })
        .unwrap();

        assert_eq!(encoded["uuid"], "device-1");
        assert_eq!(encoded["session"], "session-1");
        assert_eq!(encoded["token"], "token-1");
    }
}

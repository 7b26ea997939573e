//! Session provider
//!
//! Produces the opaque session identifier the push authority keys its
//! registration on. The HTTP transport expects a `GET /v1/session` endpoint
//! returning `{"session": "..."}`.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::types::{RegistryError, Result};

/// Produces an opaque session identifier for the current user.
#[async_trait::async_trait]
pub trait SessionProvider: Send + Sync {
    async fn fetch_session(&self) -> Result<String>;
}

// ============================================================================
// HTTP transport
// ============================================================================

/// Configuration for the HTTP session provider
#[derive(Debug, Clone)]
pub struct SessionProviderConfig {
    /// Base URL of the session service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Optional artificial delay before dispatch (latency shaping for demos)
    pub pace: Option<Duration>,
}

impl Default for SessionProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(10),
            pace: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session: String,
}

/// Session provider over HTTP
pub struct HttpSessionProvider {
    config: SessionProviderConfig,
    http_client: reqwest::Client,
}

impl HttpSessionProvider {
    pub fn new(config: SessionProviderConfig) -> Self {
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
        Self::new(SessionProviderConfig {
            base_url,
            ..Default::default()
        })
    }
}

#[async_trait::async_trait]
impl SessionProvider for HttpSessionProvider {
    async fn fetch_session(&self) -> Result<String> {
        if let Some(pace) = self.config.pace {
            tokio::time::sleep(pace).await;
        }

        let url = format!("{}/v1/session", self.config.base_url);
        debug!(url = %url, "Fetching session");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| RegistryError::SessionFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::SessionFetch(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body: SessionResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::SessionFetch(e.to_string()))?;

        Ok(body.session)
    }
}

// ============================================================================
// Static provider (local development)
// ============================================================================

/// Fixed-session provider.
#[derive(Debug, Clone)]
pub struct StaticSessionProvider {
    session: String,
}

impl StaticSessionProvider {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
        }
    }
}

#[async_trait::async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn fetch_session(&self) -> Result<String> {
        Ok(self.session.clone())
    }
}

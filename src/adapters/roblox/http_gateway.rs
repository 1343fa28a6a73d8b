//! Implements RobloxGateway over reqwest.
//!
//! The client is built once with a per-request timeout; a timeout is reported
//! like any other transport failure.

use crate::domain::DomainError;
use crate::ports::{Endpoint, RobloxGateway};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("isb-intel/", env!("CARGO_PKG_VERSION"));

/// Where endpoint URLs point.
#[derive(Debug, Clone)]
enum Routing {
    /// `https://{service}.{domain}{path}`, the public layout.
    Subdomains(String),
    /// `{base}/{service}{path}`, one host for every service.
    Base(String),
}

pub struct HttpRobloxGateway {
    client: Client,
    routing: Routing,
}

impl HttpRobloxGateway {
    /// `domain` is the API root (normally `roblox.com`); `timeout` bounds each request.
    pub fn new(domain: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        Self::build(Routing::Subdomains(domain.into()), timeout)
    }

    /// Send every request under `base_url` instead of the per-service subdomains.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        Self::build(Routing::Base(base_url.into()), timeout)
    }

    fn build(routing: Routing, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DomainError::Config(format!("build HTTP client: {}", e)))?;
        Ok(Self { client, routing })
    }

    fn url(&self, endpoint: &Endpoint) -> String {
        match &self.routing {
            Routing::Subdomains(domain) => endpoint.url(domain),
            Routing::Base(base) => endpoint.url_under(base),
        }
    }
}

#[async_trait]
impl RobloxGateway for HttpRobloxGateway {
    async fn get_json(
        &self,
        endpoint: &Endpoint,
        query: &[(String, String)],
    ) -> Result<serde_json::Value, DomainError> {
        let url = self.url(endpoint);
        debug!(%endpoint, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::Transport {
                endpoint: endpoint.to_string(),
                reason: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%endpoint, status = status.as_u16(), "Roblox API returned error");
            return Err(DomainError::UpstreamStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| {
                if e.is_decode() {
                    DomainError::Parse {
                        endpoint: endpoint.to_string(),
                        reason: e.to_string(),
                    }
                } else {
                    // body read interrupted (timeout, reset)
                    DomainError::Transport {
                        endpoint: endpoint.to_string(),
                        reason: if e.is_timeout() {
                            "request timed out".to_string()
                        } else {
                            e.to_string()
                        },
                    }
                }
            })
    }
}

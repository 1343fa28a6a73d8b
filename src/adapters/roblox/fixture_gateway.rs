//! In-memory RobloxGateway serving canned responses.
//!
//! Responses are keyed by endpoint and request cursor. Unregistered requests
//! answer HTTP 404, like an unknown id would upstream. Every call is recorded.

use crate::domain::DomainError;
use crate::ports::{Endpoint, RobloxGateway};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum FixtureResponse {
    Json(Value),
    Status(u16),
    /// Behaves like a request that hit the client timeout.
    Timeout,
}

#[derive(Default)]
pub struct FixtureGateway {
    responses: HashMap<(Endpoint, Option<String>), FixtureResponse>,
    calls: Mutex<Vec<(Endpoint, Vec<(String, String)>)>>,
}

impl FixtureGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response for `endpoint` requested with `cursor`.
    pub fn respond(mut self, endpoint: Endpoint, cursor: Option<&str>, response: FixtureResponse) -> Self {
        self.responses
            .insert((endpoint, cursor.map(String::from)), response);
        self
    }

    pub fn json(self, endpoint: Endpoint, body: Value) -> Self {
        self.respond(endpoint, None, FixtureResponse::Json(body))
    }

    /// Register a page: `data` records plus an optional next cursor.
    pub fn page(
        self,
        endpoint: Endpoint,
        cursor: Option<&str>,
        data: Vec<Value>,
        next: Option<&str>,
    ) -> Self {
        self.respond(
            endpoint,
            cursor,
            FixtureResponse::Json(json!({ "data": data, "nextPageCursor": next })),
        )
    }

    pub fn count(self, endpoint: Endpoint, count: u64) -> Self {
        self.json(endpoint, json!({ "count": count }))
    }

    pub fn status(self, endpoint: Endpoint, cursor: Option<&str>, status: u16) -> Self {
        self.respond(endpoint, cursor, FixtureResponse::Status(status))
    }

    pub fn timeout(self, endpoint: Endpoint, cursor: Option<&str>) -> Self {
        self.respond(endpoint, cursor, FixtureResponse::Timeout)
    }

    /// Total requests made so far.
    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Query strings sent to `endpoint`, in call order.
    pub fn queries_to(&self, endpoint: &Endpoint) -> Vec<Vec<(String, String)>> {
        self.calls
            .lock()
            .map(|c| {
                c.iter()
                    .filter(|(e, _)| e == endpoint)
                    .map(|(_, q)| q.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl RobloxGateway for FixtureGateway {
    async fn get_json(
        &self,
        endpoint: &Endpoint,
        query: &[(String, String)],
    ) -> Result<Value, DomainError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((*endpoint, query.to_vec()));
        }

        let cursor = query
            .iter()
            .find(|(k, _)| k == "cursor")
            .map(|(_, v)| v.clone());

        match self.responses.get(&(*endpoint, cursor)) {
            Some(FixtureResponse::Json(v)) => Ok(v.clone()),
            Some(FixtureResponse::Status(status)) => Err(DomainError::UpstreamStatus {
                endpoint: endpoint.to_string(),
                status: *status,
            }),
            Some(FixtureResponse::Timeout) => Err(DomainError::Transport {
                endpoint: endpoint.to_string(),
                reason: "request timed out".to_string(),
            }),
            None => Err(DomainError::UpstreamStatus {
                endpoint: endpoint.to_string(),
                status: 404,
            }),
        }
    }
}

//! Cursor pagination over Roblox list endpoints.
//!
//! - Sends `limit` plus any extra params, then follows `nextPageCursor`
//! - Stops when the cursor is absent or empty; there is no page cap
//! - Any failed page aborts the walk and drops what was collected so far

use crate::adapters::roblox::records::Page;
use crate::domain::DomainError;
use crate::ports::{Endpoint, RobloxGateway};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Page size the Roblox list endpoints accept at most.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// A list request: endpoint, page size and fixed query params.
#[derive(Debug, Clone)]
pub struct PageQuery {
    pub endpoint: Endpoint,
    pub limit: u32,
    pub params: Vec<(String, String)>,
}

impl PageQuery {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            limit: DEFAULT_PAGE_LIMIT,
            params: Vec::new(),
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    fn query_for(&self, cursor: Option<&str>) -> Vec<(String, String)> {
        let mut q = self.params.clone();
        q.push(("limit".to_string(), self.limit.to_string()));
        if let Some(c) = cursor {
            q.push(("cursor".to_string(), c.to_string()));
        }
        q
    }
}

/// Walk every page of `query` and return all records in arrival order.
///
/// `Ok(vec![])` means the list is genuinely empty; any failure is an `Err`.
pub async fn collect_pages<T: DeserializeOwned>(
    gateway: &dyn RobloxGateway,
    query: &PageQuery,
) -> Result<Vec<T>, DomainError> {
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let body = gateway
            .get_json(&query.endpoint, &query.query_for(cursor.as_deref()))
            .await?;
        let page: Page<T> = serde_json::from_value(body).map_err(|e| DomainError::Parse {
            endpoint: query.endpoint.to_string(),
            reason: e.to_string(),
        })?;
        pages += 1;

        cursor = page.next_cursor().map(String::from);
        records.extend(page.data);

        if cursor.is_none() {
            break;
        }
    }

    debug!(
        endpoint = %query.endpoint,
        pages,
        records = records.len(),
        "collected pages"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::roblox::FixtureGateway;
    use crate::domain::{FailureKind, GroupId};
    use serde_json::{Value, json};

    fn records(n: usize, offset: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({ "user": { "username": format!("user{}", i + offset) } }))
            .collect()
    }

    fn endpoint() -> Endpoint {
        Endpoint::GroupMembers(GroupId::new(42).unwrap())
    }

    #[tokio::test]
    async fn follows_cursor_across_three_pages() {
        let gw = FixtureGateway::new()
            .page(endpoint(), None, records(100, 0), Some("c1"))
            .page(endpoint(), Some("c1"), records(100, 100), Some("c2"))
            .page(endpoint(), Some("c2"), records(37, 200), None);

        let got: Vec<Value> = collect_pages(&gw, &PageQuery::new(endpoint())).await.unwrap();

        assert_eq!(got.len(), 237);
        assert_eq!(gw.calls(), 3);
        assert_eq!(got[236]["user"]["username"], "user236");
    }

    #[tokio::test]
    async fn sends_limit_params_and_cursor() {
        let gw = FixtureGateway::new()
            .page(endpoint(), None, records(1, 0), Some("next"))
            .page(endpoint(), Some("next"), vec![], None);
        let q = PageQuery::new(endpoint()).param("sortOrder", "Asc").limit(50);

        let _: Vec<Value> = collect_pages(&gw, &q).await.unwrap();

        let queries = gw.queries_to(&endpoint());
        assert_eq!(queries.len(), 2);
        assert!(queries[0].contains(&("sortOrder".to_string(), "Asc".to_string())));
        assert!(queries[0].contains(&("limit".to_string(), "50".to_string())));
        assert!(!queries[0].iter().any(|(k, _)| k == "cursor"));
        assert!(queries[1].contains(&("cursor".to_string(), "next".to_string())));
    }

    #[tokio::test]
    async fn timeout_on_second_page_aborts() {
        let gw = FixtureGateway::new()
            .page(endpoint(), None, records(100, 0), Some("c1"))
            .timeout(endpoint(), Some("c1"));

        let err = collect_pages::<Value>(&gw, &PageQuery::new(endpoint()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Transport);
        assert!(err.to_string().contains("groups/v1/groups/42/users"));
        assert_eq!(gw.calls(), 2);
    }

    #[tokio::test]
    async fn empty_list_is_success() {
        let gw = FixtureGateway::new().page(endpoint(), None, vec![], None);
        let got: Vec<Value> = collect_pages(&gw, &PageQuery::new(endpoint())).await.unwrap();
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_distinct_from_empty() {
        let gw = FixtureGateway::new().status(endpoint(), None, 400);
        let err = collect_pages::<Value>(&gw, &PageQuery::new(endpoint()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::UpstreamStatus);
    }

    #[tokio::test]
    async fn malformed_data_is_parse_failure() {
        let gw = FixtureGateway::new().json(endpoint(), json!({ "data": "nope" }));
        let err = collect_pages::<Value>(&gw, &PageQuery::new(endpoint()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Parse);
    }
}

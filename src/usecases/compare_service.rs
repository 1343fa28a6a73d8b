//! Two-account overlap: shared friends, shared followings, shared groups.
//!
//! Every list goes through the cursor collector, friends and followings
//! included, so large accounts are compared in full.

use crate::adapters::roblox::records::SocialRecord;
use crate::domain::{ComparisonResult, DomainError, ResultExt, RiskLevel, UserId};
use crate::ports::{Endpoint, RobloxGateway};
use crate::usecases::collector::{PageQuery, collect_pages};
use crate::usecases::group_service::GroupService;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Names reachable from one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialSnapshot {
    pub friends: BTreeSet<String>,
    pub followings: BTreeSet<String>,
    pub groups: BTreeSet<String>,
}

pub struct CompareService {
    gateway: Arc<dyn RobloxGateway>,
    groups: Arc<GroupService>,
    page_limit: u32,
}

impl CompareService {
    pub fn new(gateway: Arc<dyn RobloxGateway>, groups: Arc<GroupService>, page_limit: u32) -> Self {
        Self {
            gateway,
            groups,
            page_limit,
        }
    }

    pub async fn compare_users(
        &self,
        first: UserId,
        second: UserId,
    ) -> Result<ComparisonResult, DomainError> {
        let (a, b) = tokio::try_join!(self.snapshot(first), self.snapshot(second))
            .context(format!("comparison of users {} and {}", first, second))?;
        let result = compare_snapshots(&a, &b);
        info!(
            %first,
            %second,
            overlap = result.overlap_count(),
            threat = %result.threat_level,
            "users compared"
        );
        Ok(result)
    }

    pub async fn snapshot(&self, user_id: UserId) -> Result<SocialSnapshot, DomainError> {
        let (friends, followings, groups) = tokio::try_join!(
            async {
                self.names(Endpoint::Friends(user_id))
                    .await
                    .context(format!("friends of user {}", user_id))
            },
            async {
                self.names(Endpoint::Followings(user_id))
                    .await
                    .context(format!("followings of user {}", user_id))
            },
            self.groups.fetch_user_groups(user_id),
        )?;
        Ok(SocialSnapshot {
            friends,
            followings,
            groups: groups.into_iter().map(|g| g.name).collect(),
        })
    }

    async fn names(&self, endpoint: Endpoint) -> Result<BTreeSet<String>, DomainError> {
        let query = PageQuery::new(endpoint).limit(self.page_limit);
        let records: Vec<SocialRecord> = collect_pages(self.gateway.as_ref(), &query).await?;
        Ok(records
            .into_iter()
            .filter_map(SocialRecord::display_name)
            .collect())
    }
}

/// Pairwise intersections and the threat level they imply.
pub fn compare_snapshots(a: &SocialSnapshot, b: &SocialSnapshot) -> ComparisonResult {
    let common = |x: &BTreeSet<String>, y: &BTreeSet<String>| -> BTreeSet<String> {
        x.intersection(y).cloned().collect()
    };
    let common_friends = common(&a.friends, &b.friends);
    let common_followings = common(&a.followings, &b.followings);
    let common_groups = common(&a.groups, &b.groups);
    let overlap = common_friends.len() + common_followings.len() + common_groups.len();

    ComparisonResult {
        common_friends,
        common_followings,
        common_groups,
        threat_level: RiskLevel::from_overlap(overlap),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::roblox::FixtureGateway;
    use crate::domain::FailureKind;
    use serde_json::{Value, json};

    fn u(n: u64) -> UserId {
        UserId::new(n).unwrap()
    }

    fn people(names: &[&str]) -> Vec<Value> {
        names.iter().map(|n| json!({ "name": n })).collect()
    }

    fn groups(names: &[&str]) -> Vec<Value> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| json!({ "group": { "id": i + 1, "name": n }, "role": { "name": "Member", "rank": 1 } }))
            .collect()
    }

    fn with_user(
        gw: FixtureGateway,
        id: UserId,
        friends: Vec<Value>,
        followings: &[&str],
        group_names: &[&str],
    ) -> FixtureGateway {
        gw.page(Endpoint::Friends(id), None, friends, None)
            .page(Endpoint::Followings(id), None, people(followings), None)
            .page(Endpoint::UserGroups(id), None, groups(group_names), None)
    }

    fn service(gw: FixtureGateway) -> CompareService {
        let gw: Arc<dyn RobloxGateway> = Arc::new(gw);
        let groups = Arc::new(GroupService::new(gw.clone(), 100));
        CompareService::new(gw, groups, 100)
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn intersects_each_dimension() {
        let gw = with_user(
            FixtureGateway::new(),
            u(1),
            people(&["ann", "bob", "cat"]),
            &["star1", "star2"],
            &["Raiders", "Builders"],
        );
        let gw = with_user(
            gw,
            u(2),
            vec![json!({ "username": "bob" }), json!({ "name": "cat" }), json!({ "id": 3 })],
            &["star2"],
            &["Builders", "Pilots"],
        );

        let got = service(gw).compare_users(u(1), u(2)).await.unwrap();

        assert_eq!(got.common_friends, set(&["bob", "cat"]));
        assert_eq!(got.common_followings, set(&["star2"]));
        assert_eq!(got.common_groups, set(&["Builders"]));
        assert_eq!(got.overlap_count(), 4);
        assert_eq!(got.threat_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn self_comparison_returns_own_graph() {
        let friends = ["a", "b", "c", "d", "e", "f"];
        let gw = with_user(FixtureGateway::new(), u(5), people(&friends), &["x"], &["G"]);

        let got = service(gw).compare_users(u(5), u(5)).await.unwrap();

        assert_eq!(got.common_friends, set(&friends));
        assert_eq!(got.overlap_count(), 8);
        assert_eq!(got.threat_level, RiskLevel::Medium);
    }

    #[tokio::test]
    async fn friends_follow_pagination() {
        let gw = FixtureGateway::new()
            .page(Endpoint::Friends(u(1)), None, people(&["a"]), Some("next"))
            .page(Endpoint::Friends(u(1)), Some("next"), people(&["b"]), None)
            .page(Endpoint::Followings(u(1)), None, vec![], None)
            .page(Endpoint::UserGroups(u(1)), None, vec![], None);
        let svc = service(gw);
        let snap = svc.snapshot(u(1)).await.unwrap();
        assert_eq!(snap.friends, set(&["a", "b"]));
    }

    #[tokio::test]
    async fn group_failure_aborts_comparison() {
        let gw = with_user(FixtureGateway::new(), u(1), people(&["a"]), &[], &[]);
        let gw = gw
            .page(Endpoint::Friends(u(2)), None, people(&["a"]), None)
            .page(Endpoint::Followings(u(2)), None, vec![], None)
            .status(Endpoint::UserGroups(u(2)), None, 500);

        let err = service(gw).compare_users(u(1), u(2)).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::UpstreamStatus);
        let msg = err.to_string();
        assert!(msg.contains("comparison of users 1 and 2"));
        assert!(msg.contains("groups of user 2"));
    }

    #[test]
    fn threat_thresholds_follow_total_overlap() {
        let many: BTreeSet<String> = (0..16).map(|i| i.to_string()).collect();
        let a = SocialSnapshot {
            friends: many.clone(),
            ..Default::default()
        };
        assert_eq!(compare_snapshots(&a, &a).threat_level, RiskLevel::High);

        let five: BTreeSet<String> = many.iter().take(5).cloned().collect();
        let b = SocialSnapshot {
            groups: five,
            ..Default::default()
        };
        assert_eq!(compare_snapshots(&b, &b).threat_level, RiskLevel::Medium);
        assert_eq!(
            compare_snapshots(&a, &b).threat_level,
            RiskLevel::Low
        );
    }
}

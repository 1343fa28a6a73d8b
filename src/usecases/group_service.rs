//! Group rosters and cross-group membership.

use crate::adapters::roblox::records::{RosterEntry, UserGroupEntry};
use crate::domain::{
    CommonMember, DomainError, GroupId, GroupIntersection, GroupMembership, GroupRoster,
    ResultExt, UserGroup, UserId,
};
use crate::ports::{Endpoint, RobloxGateway};
use crate::usecases::collector::{PageQuery, collect_pages};
use std::sync::Arc;
use tracing::info;

pub struct GroupService {
    gateway: Arc<dyn RobloxGateway>,
    page_limit: u32,
}

impl GroupService {
    pub fn new(gateway: Arc<dyn RobloxGateway>, page_limit: u32) -> Self {
        Self {
            gateway,
            page_limit,
        }
    }

    /// Full member list of a group, with each member's rank.
    pub async fn fetch_roster(&self, group_id: GroupId) -> Result<GroupRoster, DomainError> {
        let query = PageQuery::new(Endpoint::GroupMembers(group_id))
            .param("sortOrder", "Asc")
            .limit(self.page_limit);
        let entries: Vec<RosterEntry> = collect_pages(self.gateway.as_ref(), &query)
            .await
            .context(format!("members of group {}", group_id))?;
        Ok(GroupRoster::from_members(
            group_id,
            entries.into_iter().map(GroupMembership::from),
        ))
    }

    /// Users present in both groups. Fails if either roster cannot be fetched.
    pub async fn intersect_groups(
        &self,
        first: GroupId,
        second: GroupId,
    ) -> Result<GroupIntersection, DomainError> {
        let (a, b) = tokio::try_join!(self.fetch_roster(first), self.fetch_roster(second))?;
        let result = intersect_rosters(first, &a, second, &b);
        info!(
            first = %first,
            second = %second,
            first_size = a.len(),
            second_size = b.len(),
            common = result.total(),
            "group intersection computed"
        );
        Ok(result)
    }

    /// Groups `user_id` belongs to, with their rank in each.
    pub async fn fetch_user_groups(&self, user_id: UserId) -> Result<Vec<UserGroup>, DomainError> {
        let query = PageQuery::new(Endpoint::UserGroups(user_id)).limit(self.page_limit);
        let entries: Vec<UserGroupEntry> = collect_pages(self.gateway.as_ref(), &query)
            .await
            .context(format!("groups of user {}", user_id))?;
        Ok(entries.into_iter().map(UserGroup::from).collect())
    }
}

/// Members of `first_roster` also in `second_roster`, in `first_roster` order.
pub fn intersect_rosters(
    first: GroupId,
    first_roster: &GroupRoster,
    second: GroupId,
    second_roster: &GroupRoster,
) -> GroupIntersection {
    let members = first_roster
        .members()
        .iter()
        .filter_map(|m| {
            second_roster.rank_of(&m.username).map(|other| CommonMember {
                username: m.username.clone(),
                rank_in_first: m.rank.clone(),
                rank_in_second: other.clone(),
            })
        })
        .collect();

    GroupIntersection {
        first_group: first,
        second_group: second,
        members,
    }
}

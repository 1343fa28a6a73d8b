//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/JSON types here; wire records are mapped into these by adapters.

use crate::domain::errors::DomainError;
use crate::domain::risk::{RiskAssessment, RiskLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Number of badge names kept on a profile for display. The full count is kept separately.
pub const BADGE_DISPLAY_LIMIT: usize = 20;

/// Roblox user identifier. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(u64);

/// Roblox group identifier. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(u64);

macro_rules! positive_id {
    ($ty:ident, $label:literal) => {
        impl $ty {
            pub fn new(raw: u64) -> Result<Self, DomainError> {
                if raw == 0 {
                    return Err(DomainError::Input(format!(
                        "{} must be a positive integer",
                        $label
                    )));
                }
                Ok(Self(raw))
            }

            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.trim().parse::<u64>().map_err(|_| {
                    DomainError::Input(format!("{} must be a positive integer, got '{}'", $label, s))
                })?;
                Self::new(raw)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id!(UserId, "User ID");
positive_id!(GroupId, "Group ID");

/// A member's role inside a group. Either half may be missing in the API payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rank {
    pub name: String,
    pub number: Option<i64>,
}

impl Rank {
    pub fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            number: None,
        }
    }
}

impl Default for Rank {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.number {
            Some(n) => write!(f, "{} ({})", self.name, n),
            None => write!(f, "{} (Unknown)", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub username: String,
    pub rank: Rank,
}

/// Snapshot of a group's members at fetch time, in arrival order.
///
/// Holds at most one entry per username. A repeated username keeps its first
/// position and takes the most recent rank.
#[derive(Debug, Clone, Default)]
pub struct GroupRoster {
    pub group_id: Option<GroupId>,
    members: Vec<GroupMembership>,
    index: HashMap<String, usize>,
}

impl GroupRoster {
    pub fn new(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn from_members(
        group_id: GroupId,
        members: impl IntoIterator<Item = GroupMembership>,
    ) -> Self {
        let mut roster = Self::new(group_id);
        for m in members {
            roster.insert(m);
        }
        roster
    }

    pub fn insert(&mut self, membership: GroupMembership) {
        match self.index.get(&membership.username) {
            Some(&pos) => self.members[pos].rank = membership.rank,
            None => {
                self.index
                    .insert(membership.username.clone(), self.members.len());
                self.members.push(membership);
            }
        }
    }

    pub fn rank_of(&self, username: &str) -> Option<&Rank> {
        self.index.get(username).map(|&i| &self.members[i].rank)
    }

    pub fn members(&self) -> &[GroupMembership] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A username present in both rosters, with its rank in each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonMember {
    pub username: String,
    pub rank_in_first: Rank,
    pub rank_in_second: Rank,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupIntersection {
    pub first_group: GroupId,
    pub second_group: GroupId,
    /// Arrival order of the first roster.
    pub members: Vec<CommonMember>,
}

impl GroupIntersection {
    pub fn total(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn usernames(&self) -> BTreeSet<&str> {
        self.members.iter().map(|m| m.username.as_str()).collect()
    }
}

/// One of a user's group memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserGroup {
    pub group_id: u64,
    pub name: String,
    pub rank: Rank,
}

/// Public attributes of a user, with the risk verdict attached.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: String,
    pub display_name: String,
    pub description: String,
    /// `created` exactly as the API returned it.
    pub join_date_raw: String,
    /// `None` when the creation timestamp could not be parsed.
    pub account_age_days: Option<i64>,
    pub friends_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    pub total_badges: usize,
    /// First [`BADGE_DISPLAY_LIMIT`] badge names.
    pub badge_names: Vec<String>,
    pub risk: RiskAssessment,
}

impl UserProfile {
    pub fn account_age_label(&self) -> String {
        match self.account_age_days {
            Some(days) => format!("{} days", days),
            None => "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BadgeAward {
    pub awarded_at: DateTime<Utc>,
    pub badge_name: String,
}

/// Overlap between two users' social graphs and group memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub common_friends: BTreeSet<String>,
    /// Accounts both users follow (computed from followings, not followers).
    pub common_followings: BTreeSet<String>,
    pub common_groups: BTreeSet<String>,
    pub threat_level: RiskLevel,
}

impl ComparisonResult {
    pub fn overlap_count(&self) -> usize {
        self.common_friends.len() + self.common_followings.len() + self.common_groups.len()
    }
}

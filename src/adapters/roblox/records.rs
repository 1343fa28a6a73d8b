//! Roblox wire records and their mapping to domain entities.
//!
//! Optional fields default instead of failing; only structurally required
//! fields (e.g. a roster entry's username) make a payload malformed.

use crate::domain::{GroupMembership, Rank, UserGroup};
use serde::Deserialize;

/// One page of any cursor-paginated list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub next_page_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Cursor for the following request, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rank: Option<i64>,
}

impl From<RoleRecord> for Rank {
    fn from(role: RoleRecord) -> Self {
        Rank {
            name: role.name.unwrap_or_else(|| "Unknown".to_string()),
            number: role.rank,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RosterUser {
    pub username: String,
}

/// Entry of `groups/v1/groups/{id}/users`.
#[derive(Debug, Deserialize)]
pub struct RosterEntry {
    pub user: RosterUser,
    #[serde(default)]
    pub role: Option<RoleRecord>,
}

impl From<RosterEntry> for GroupMembership {
    fn from(entry: RosterEntry) -> Self {
        GroupMembership {
            username: entry.user.username,
            rank: entry.role.map(Rank::from).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GroupRecord {
    pub id: u64,
    pub name: String,
}

/// Entry of `groups/v1/users/{id}/groups`.
#[derive(Debug, Deserialize)]
pub struct UserGroupEntry {
    pub group: GroupRecord,
    #[serde(default)]
    pub role: RoleRecord,
}

impl From<UserGroupEntry> for UserGroup {
    fn from(entry: UserGroupEntry) -> Self {
        UserGroup {
            group_id: entry.group.id,
            name: entry.group.name,
            rank: entry.role.into(),
        }
    }
}

/// Entry of the friends / followings lists.
#[derive(Debug, Default, Deserialize)]
pub struct SocialRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl SocialRecord {
    /// `name`, else `username`; `None` when neither is a non-empty string.
    pub fn display_name(self) -> Option<String> {
        self.name
            .filter(|n| !n.is_empty())
            .or(self.username.filter(|n| !n.is_empty()))
    }
}

/// `users/v1/users/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

/// `*/count` endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct CountRecord {
    #[serde(default)]
    pub count: u64,
}

/// Entry of `badges/v1/users/{id}/badges`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub awarded_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roster_entry_defaults_missing_role() {
        let entry: RosterEntry = serde_json::from_value(json!({"user": {"username": "bob"}})).unwrap();
        let m = GroupMembership::from(entry);
        assert_eq!(m.username, "bob");
        assert_eq!(m.rank, Rank::unknown());

        let entry: RosterEntry =
            serde_json::from_value(json!({"user": {"username": "amy"}, "role": {"rank": 5}})).unwrap();
        let m = GroupMembership::from(entry);
        assert_eq!(m.rank.name, "Unknown");
        assert_eq!(m.rank.number, Some(5));
    }

    #[test]
    fn roster_entry_without_username_is_malformed() {
        let res: Result<RosterEntry, _> = serde_json::from_value(json!({"user": {"id": 3}}));
        assert!(res.is_err());
    }

    #[test]
    fn social_record_prefers_name() {
        let both: SocialRecord =
            serde_json::from_value(json!({"name": "a", "username": "b"})).unwrap();
        assert_eq!(both.display_name().as_deref(), Some("a"));
        let only_user: SocialRecord = serde_json::from_value(json!({"username": "b"})).unwrap();
        assert_eq!(only_user.display_name().as_deref(), Some("b"));
        let neither: SocialRecord = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(neither.display_name(), None);
    }

    #[test]
    fn empty_cursor_ends_pagination() {
        let page: Page<CountRecord> =
            serde_json::from_value(json!({"data": [], "nextPageCursor": ""})).unwrap();
        assert_eq!(page.next_cursor(), None);
        let page: Page<CountRecord> =
            serde_json::from_value(json!({"data": [], "nextPageCursor": null})).unwrap();
        assert_eq!(page.next_cursor(), None);
        let page: Page<CountRecord> = serde_json::from_value(json!({"nextPageCursor": "abc"})).unwrap();
        assert_eq!(page.next_cursor(), Some("abc"));
        assert!(page.data.is_empty());
    }
}

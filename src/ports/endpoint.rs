//! Typed Roblox endpoints. Adapters turn these into URLs; fixtures key on them.

use crate::domain::{GroupId, UserId};
use std::fmt;

/// Roblox web API service (subdomain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiService {
    Groups,
    Users,
    Friends,
    Badges,
}

impl ApiService {
    pub fn subdomain(self) -> &'static str {
        match self {
            ApiService::Groups => "groups",
            ApiService::Users => "users",
            ApiService::Friends => "friends",
            ApiService::Badges => "badges",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Group roster with roles. Paginated.
    GroupMembers(GroupId),
    /// Groups a user belongs to, with their role. Paginated.
    UserGroups(UserId),
    /// Core identity record.
    User(UserId),
    FriendsCount(UserId),
    FollowersCount(UserId),
    FollowingsCount(UserId),
    Friends(UserId),
    Followings(UserId),
    /// Badges a user holds. Paginated.
    Badges(UserId),
}

impl Endpoint {
    pub fn service(&self) -> ApiService {
        match self {
            Endpoint::GroupMembers(_) | Endpoint::UserGroups(_) => ApiService::Groups,
            Endpoint::User(_) => ApiService::Users,
            Endpoint::FriendsCount(_)
            | Endpoint::FollowersCount(_)
            | Endpoint::FollowingsCount(_)
            | Endpoint::Friends(_)
            | Endpoint::Followings(_) => ApiService::Friends,
            Endpoint::Badges(_) => ApiService::Badges,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Endpoint::GroupMembers(g) => format!("/v1/groups/{}/users", g),
            Endpoint::UserGroups(u) => format!("/v1/users/{}/groups", u),
            Endpoint::User(u) => format!("/v1/users/{}", u),
            Endpoint::FriendsCount(u) => format!("/v1/users/{}/friends/count", u),
            Endpoint::FollowersCount(u) => format!("/v1/users/{}/followers/count", u),
            Endpoint::FollowingsCount(u) => format!("/v1/users/{}/followings/count", u),
            Endpoint::Friends(u) => format!("/v1/users/{}/friends", u),
            Endpoint::Followings(u) => format!("/v1/users/{}/followings", u),
            Endpoint::Badges(u) => format!("/v1/users/{}/badges", u),
        }
    }

    /// Full URL under `domain` (e.g. `roblox.com`).
    pub fn url(&self, domain: &str) -> String {
        format!("https://{}.{}{}", self.service().subdomain(), domain, self.path())
    }

    /// URL when all services sit under one base: `{base}/{service}{path}`.
    pub fn url_under(&self, base: &str) -> String {
        format!(
            "{}/{}{}",
            base.trim_end_matches('/'),
            self.service().subdomain(),
            self.path()
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.service().subdomain(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_service_layout() {
        let u = UserId::new(156).unwrap();
        let g = GroupId::new(7).unwrap();
        assert_eq!(
            Endpoint::GroupMembers(g).url("roblox.com"),
            "https://groups.roblox.com/v1/groups/7/users"
        );
        assert_eq!(
            Endpoint::FollowingsCount(u).url("roblox.com"),
            "https://friends.roblox.com/v1/users/156/followings/count"
        );
        assert_eq!(Endpoint::Badges(u).to_string(), "badges/v1/users/156/badges");
        assert_eq!(
            Endpoint::User(u).url_under("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/users/v1/users/156"
        );
    }
}

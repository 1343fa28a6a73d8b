//! Profile fetch: identity, social counts and badges, scored for alt risk.
//!
//! The identity record is fetched first; the three counts and the badge walk
//! then run concurrently and the first failure aborts the whole profile.

use crate::adapters::roblox::records::{BadgeRecord, CountRecord, UserRecord};
use crate::domain::risk::{account_age_days, parse_platform_timestamp};
use crate::domain::{
    BADGE_DISPLAY_LIMIT, BadgeAward, DomainError, ResultExt, RiskInputs, UserId, UserProfile,
    score_risk,
};
use crate::ports::{Endpoint, RobloxGateway};
use crate::usecases::collector::{PageQuery, collect_pages};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

pub struct ProfileService {
    gateway: Arc<dyn RobloxGateway>,
    page_limit: u32,
}

impl ProfileService {
    pub fn new(gateway: Arc<dyn RobloxGateway>, page_limit: u32) -> Self {
        Self {
            gateway,
            page_limit,
        }
    }

    pub async fn fetch_profile(&self, user_id: UserId) -> Result<UserProfile, DomainError> {
        self.fetch_profile_at(user_id, Utc::now())
            .await
            .context(format!("profile for user {}", user_id))
    }

    /// Same as [`fetch_profile`](Self::fetch_profile) with account age measured at `now`.
    pub async fn fetch_profile_at(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, DomainError> {
        self.profile_and_badges(user_id, now)
            .await
            .map(|(profile, _)| profile)
    }

    /// Profile plus dated badge history from a single badge walk.
    pub async fn fetch_profile_with_history(
        &self,
        user_id: UserId,
    ) -> Result<(UserProfile, Vec<BadgeAward>), DomainError> {
        let (profile, badges) = self
            .profile_and_badges(user_id, Utc::now())
            .await
            .context(format!("profile for user {}", user_id))?;
        Ok((profile, dated_awards(badges)))
    }

    /// Badge awards with a parsable award date, oldest first.
    pub async fn fetch_badge_history(&self, user_id: UserId) -> Result<Vec<BadgeAward>, DomainError> {
        let badges = self
            .badges(user_id)
            .await
            .context(format!("badge history for user {}", user_id))?;
        Ok(dated_awards(badges))
    }

    async fn profile_and_badges(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<(UserProfile, Vec<BadgeRecord>), DomainError> {
        let user: UserRecord = self
            .get(Endpoint::User(user_id))
            .await
            .context("user info")?;

        let (friends, followers, followings, badges) = tokio::try_join!(
            async {
                self.get::<CountRecord>(Endpoint::FriendsCount(user_id))
                    .await
                    .context("friends count")
            },
            async {
                self.get::<CountRecord>(Endpoint::FollowersCount(user_id))
                    .await
                    .context("followers count")
            },
            async {
                self.get::<CountRecord>(Endpoint::FollowingsCount(user_id))
                    .await
                    .context("following count")
            },
            async { self.badges(user_id).await.context("badges") },
        )?;

        let join_date_raw = user.created.unwrap_or_else(|| "Unknown".to_string());
        let account_age_days = account_age_days(&join_date_raw, now);
        if account_age_days.is_none() {
            debug!(%user_id, created = %join_date_raw, "unparsable creation date; age unknown");
        }

        let total_badges = badges.len();
        let badge_names: Vec<String> = badges
            .iter()
            .take(BADGE_DISPLAY_LIMIT)
            .map(|b| b.name.clone().unwrap_or_else(|| "Unknown".to_string()))
            .collect();

        let risk = score_risk(&RiskInputs {
            account_age_days,
            friends_count: friends.count,
            followers_count: followers.count,
            total_badges,
        });

        info!(
            %user_id,
            score = risk.score,
            level = %risk.level,
            "profile scored"
        );

        let profile = UserProfile {
            user_id,
            username: user.name.unwrap_or_else(|| "Unknown".to_string()),
            display_name: user.display_name.unwrap_or_else(|| "Unknown".to_string()),
            description: user
                .description
                .unwrap_or_else(|| "No description".to_string()),
            join_date_raw,
            account_age_days,
            friends_count: friends.count,
            followers_count: followers.count,
            following_count: followings.count,
            total_badges,
            badge_names,
            risk,
        };
        Ok((profile, badges))
    }

    async fn badges(&self, user_id: UserId) -> Result<Vec<BadgeRecord>, DomainError> {
        let query = PageQuery::new(Endpoint::Badges(user_id)).limit(self.page_limit);
        collect_pages(self.gateway.as_ref(), &query).await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, DomainError> {
        let body = self.gateway.get_json(&endpoint, &[]).await?;
        serde_json::from_value(body).map_err(|e| DomainError::Parse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

fn dated_awards(badges: Vec<BadgeRecord>) -> Vec<BadgeAward> {
    let mut awards: Vec<BadgeAward> = badges
        .into_iter()
        .filter_map(|b| {
            let awarded_at = b.awarded_date.as_deref().and_then(parse_platform_timestamp)?;
            Some(BadgeAward {
                awarded_at,
                badge_name: b.name.unwrap_or_else(|| "Unknown".to_string()),
            })
        })
        .collect();
    awards.sort();
    awards
}

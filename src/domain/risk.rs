//! Risk rules. Pure functions from fetched numbers to a verdict.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Accounts younger than this count as recent.
pub const RECENT_ACCOUNT_DAYS: i64 = 365;
pub const LOW_FRIENDS: u64 = 10;
pub const LOW_FOLLOWERS: u64 = 50;
pub const FEW_BADGES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Profile risk: score <= 1 Low, 2..=3 Medium, >= 4 High.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=1 => RiskLevel::Low,
            2..=3 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    /// Comparison threat: overlap < 5 Low, 5..=15 Medium, > 15 High.
    pub fn from_overlap(overlap: usize) -> Self {
        match overlap {
            0..=4 => RiskLevel::Low,
            5..=15 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named risk conditions, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskFactor {
    RecentAccount,
    LowFriends,
    LowFollowers,
    FewBadges,
}

impl RiskFactor {
    pub fn weight(self) -> u8 {
        match self {
            RiskFactor::RecentAccount => 2,
            RiskFactor::LowFriends | RiskFactor::LowFollowers | RiskFactor::FewBadges => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskFactor::RecentAccount => "Recent account (<1 year)",
            RiskFactor::LowFriends => "Low friends (<10)",
            RiskFactor::LowFollowers => "Low followers (<50)",
            RiskFactor::FewBadges => "Few badges (<5)",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Numbers the scorer looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskInputs {
    pub account_age_days: Option<i64>,
    pub friends_count: u64,
    pub followers_count: u64,
    pub total_badges: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub score: u8,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
}

impl RiskAssessment {
    pub fn factor_labels(&self) -> Vec<&'static str> {
        self.factors.iter().map(|f| f.label()).collect()
    }
}

/// Score a profile. Unknown account age never contributes.
pub fn score_risk(inputs: &RiskInputs) -> RiskAssessment {
    let checks = [
        (
            RiskFactor::RecentAccount,
            inputs
                .account_age_days
                .is_some_and(|days| days < RECENT_ACCOUNT_DAYS),
        ),
        (RiskFactor::LowFriends, inputs.friends_count < LOW_FRIENDS),
        (RiskFactor::LowFollowers, inputs.followers_count < LOW_FOLLOWERS),
        (RiskFactor::FewBadges, inputs.total_badges < FEW_BADGES),
    ];

    let factors: Vec<RiskFactor> = checks
        .into_iter()
        .filter_map(|(factor, hit)| hit.then_some(factor))
        .collect();
    let score = factors.iter().map(|f| f.weight()).sum();

    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        factors,
    }
}

/// Parse a platform timestamp such as `2015-03-01T12:34:56.123Z`.
///
/// Accepts RFC 3339, and zone-less ISO-8601 which is taken as UTC.
pub fn parse_platform_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = raw.strip_suffix('Z').unwrap_or(raw);
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

/// Whole days between `created` and `now`; `None` if `created` does not parse.
pub fn account_age_days(created: &str, now: DateTime<Utc>) -> Option<i64> {
    parse_platform_timestamp(created).map(|joined| (now - joined).num_days())
}

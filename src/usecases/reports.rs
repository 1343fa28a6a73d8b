//! Report builders. Turn engine results into platform-neutral reports.

use crate::adapters::chart::{chart_attachment, csv_attachment, cumulative_series, monthly_bars};
use crate::domain::{
    Accent, BadgeAward, ChatMember, CommandScope, ComparisonResult, DomainError,
    GroupIntersection, Report, UserGroup, UserId, UserProfile,
};
use std::collections::BTreeSet;
use tracing::warn;

/// Description length shown on profile analysis.
const DESCRIPTION_PREVIEW: usize = 200;
/// Groups listed on profile intel.
const INTEL_GROUP_LIMIT: usize = 10;

fn join_or_none<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let joined = items.into_iter().collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "None".to_string()
    } else {
        joined
    }
}

fn set_or_none(set: &BTreeSet<String>) -> String {
    join_or_none(set.iter().map(String::as_str))
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub fn error_report(message: impl Into<String>) -> Report {
    Report::new("Error", Accent::Red).description(message)
}

/// Error report for a failed fetch, phrased for moderators.
pub fn failure_report(what: &str, err: &DomainError) -> Report {
    error_report(format!("Unable to retrieve {}. {}", what, err))
}

pub fn usage_report(message: &str) -> Report {
    Report::new("Invalid Command", Accent::Red).description(message)
}

/// Pages of `per_page` common users, or a single "No Common Users" report.
pub fn group_check_pages(result: &GroupIntersection, per_page: usize) -> Vec<Report> {
    if result.is_empty() {
        return vec![
            Report::new("No Common Users", Accent::Grey).description("No users are in both groups."),
        ];
    }

    let per_page = per_page.max(1);
    let pages = result.members.chunks(per_page).count();
    result
        .members
        .chunks(per_page)
        .enumerate()
        .map(|(i, chunk)| {
            let description = chunk
                .iter()
                .map(|m| {
                    format!(
                        "**{}**\n- Rank in {}: {}\n- Rank in {}: {}",
                        m.username,
                        result.first_group,
                        m.rank_in_first,
                        result.second_group,
                        m.rank_in_second
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n");
            Report::new(
                format!(
                    "Common Users in Groups {} and {}",
                    result.first_group, result.second_group
                ),
                Accent::Grey,
            )
            .description(description)
            .field("Total Common Users", result.total().to_string(), true)
            .field("Page", format!("{}/{}", i + 1, pages), true)
        })
        .collect()
}

pub fn profile_analysis_report(profile: &UserProfile) -> Report {
    Report::new(
        format!("Profile Analysis: {}", profile.username),
        Accent::for_level(profile.risk.level),
    )
    .field("Display Name", &profile.display_name, true)
    .field(
        "Description",
        truncate_chars(&profile.description, DESCRIPTION_PREVIEW),
        false,
    )
    .field("Join Date", &profile.join_date_raw, true)
    .field("Account Age", profile.account_age_label(), true)
    .field("Friends", profile.friends_count.to_string(), true)
    .field("Followers", profile.followers_count.to_string(), true)
    .field("Following", profile.following_count.to_string(), true)
    .field("Total Badges", profile.total_badges.to_string(), true)
    .field(
        "Badges",
        join_or_none(profile.badge_names.iter().map(String::as_str)),
        false,
    )
    .field("Threat Level", profile.risk.level.as_str(), true)
    .field("Risk Factors", join_or_none(profile.risk.factor_labels()), false)
}

pub fn profile_intel_report(profile: &UserProfile, groups: &[UserGroup]) -> Report {
    let groups_list = groups
        .iter()
        .take(INTEL_GROUP_LIMIT)
        .map(|g| format!("- {} | {}", g.name, g.rank))
        .collect::<Vec<_>>()
        .join("\n");

    Report::new(
        format!("Profile Intel: {}", profile.username),
        Accent::for_level(profile.risk.level),
    )
    .field("Display Name", &profile.display_name, true)
    .field("Account Creation Date", &profile.join_date_raw, true)
    .field("Account Age", profile.account_age_label(), true)
    .field("Friends", profile.friends_count.to_string(), true)
    .field("Followers", profile.followers_count.to_string(), true)
    .field("Following", profile.following_count.to_string(), true)
    .field("Total Badges", profile.total_badges.to_string(), true)
    .field(
        "Badges List",
        join_or_none(profile.badge_names.iter().map(String::as_str)),
        false,
    )
    .field(
        "Groups",
        if groups_list.is_empty() {
            "None".to_string()
        } else {
            groups_list
        },
        false,
    )
    .field("Past Usernames", "Not available via API", false)
    .field("Threat Level", profile.risk.level.as_str(), true)
    .field("Risk Factors", join_or_none(profile.risk.factor_labels()), false)
}

pub fn comparison_report(first: UserId, second: UserId, result: &ComparisonResult) -> Report {
    Report::new(
        format!("User Comparison: {} vs {}", first, second),
        Accent::for_level(result.threat_level),
    )
    .field("Common Friends", set_or_none(&result.common_friends), false)
    .field("Common Followings", set_or_none(&result.common_followings), false)
    .field("Common Groups", set_or_none(&result.common_groups), false)
    .field("Overlap", result.overlap_count().to_string(), true)
    .field("Threat Level", result.threat_level.as_str(), true)
}

/// Badge progression with a PNG chart, or a text-only report when no award is dated.
pub fn badge_report(profile: &UserProfile, awards: &[BadgeAward]) -> Report {
    if awards.is_empty() {
        return Report::new(format!("Badge Info for {}", profile.username), Accent::Silver)
            .description(format!(
                "Total Badges: {}\nNo awarded dates available for graph.",
                profile.total_badges
            ));
    }

    let report = Report::new(format!("Badge Graph for {}", profile.username), Accent::Silver)
        .field("Total Badges", profile.total_badges.to_string(), true)
        .field("Dated Awards", awards.len().to_string(), true)
        .field(
            "First Award",
            awards[0].awarded_at.format("%Y-%m-%d").to_string(),
            true,
        )
        .field(
            "Latest Award",
            awards[awards.len() - 1].awarded_at.format("%Y-%m-%d").to_string(),
            true,
        );

    match chart_attachment(&profile.username, awards) {
        Ok(png) => report.attachment(png),
        Err(e) => {
            warn!(error = %e, "badge chart render failed; sending text chart");
            with_text_chart(report, &profile.username, awards)
        }
    }
}

/// Monthly text bars in the body plus the CSV export.
fn with_text_chart(report: Report, username: &str, awards: &[BadgeAward]) -> Report {
    let report = report.description(monthly_bars(&cumulative_series(awards)));
    match csv_attachment(username, awards) {
        Ok(csv) => report.attachment(csv),
        Err(e) => {
            warn!(error = %e, "badge CSV export failed; sending text chart only");
            report
        }
    }
}

pub fn member_report(member: &ChatMember) -> Report {
    let title = format!("Chat User Info: {}", member.full_name());
    let joined_label = match &member.chat_title {
        Some(t) => format!("Status in {}", t),
        None => "Status".to_string(),
    };
    let status = if member.is_present() {
        member.status.clone()
    } else {
        format!("{} (not in this chat)", member.status)
    };
    Report::new(title, Accent::Green)
        .field(
            "Username",
            member
                .username
                .as_deref()
                .map(|u| format!("@{}", u))
                .unwrap_or_else(|| "None".to_string()),
            true,
        )
        .field("Bot", if member.is_bot { "Yes" } else { "No" }, true)
        .field(joined_label, status, false)
        .footer(format!(
            "User ID: {} | {}",
            member.user_id,
            crate::domain::REPORT_FOOTER
        ))
}

pub fn member_not_found_report() -> Report {
    Report::new("User Not Found", Accent::Red).description(
        "User not found in this chat. Ensure the user ID is correct and the user is a member.",
    )
}

pub fn unauthorized_report() -> Report {
    Report::new("Unauthorized", Accent::Red).description("Access denied.")
}

pub fn calibrated_report(count: usize, scope: CommandScope) -> Report {
    Report::new("Uplink Calibrated", Accent::Green).description(format!(
        "Successfully synced {} command(s) {}.",
        count, scope
    ))
}

pub fn sync_failed_report(err: &DomainError) -> Report {
    Report::new("Sync Failed", Accent::Red).description(format!("Failed to sync commands: {}", err))
}

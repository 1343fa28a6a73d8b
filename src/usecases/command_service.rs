//! Moderator commands: parsing and execution against the engine.
//!
//! Execution never fails outright; every failure becomes an error report so
//! front-ends render one uniform response.

use crate::domain::{CommandSpec, DomainError, GroupId, Reply, Report, UserId};
use crate::usecases::compare_service::CompareService;
use crate::usecases::group_service::GroupService;
use crate::usecases::profile_service::ProfileService;
use crate::usecases::reports;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GroupCheck { first: GroupId, second: GroupId },
    ProfileAnalysis(UserId),
    CompareUsers { first: UserId, second: UserId },
    ProfileIntel(UserId),
    BadgeInfo(UserId),
    /// Chat member by numeric id, in the current chat or `chat_id`.
    MemberLookup { user_id: i64, chat_id: Option<i64> },
    CalibrateUplink,
    Help,
}

/// Commands published to the chat platform's menu.
pub const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        name: "group_check",
        description: "Users in both Roblox groups with their ranks: <group1> <group2>",
    },
    CommandSpec {
        name: "profile_analysis",
        description: "Roblox profile check for alt risk: <user_id>",
    },
    CommandSpec {
        name: "compare_users",
        description: "Common friends, followings and groups: <user1> <user2>",
    },
    CommandSpec {
        name: "profile_intel",
        description: "Profile inspector with groups and badges: <user_id>",
    },
    CommandSpec {
        name: "badge_info",
        description: "Badge progression chart: <user_id>",
    },
    CommandSpec {
        name: "member_lookup",
        description: "Chat member info: <user_id> [chat_id]",
    },
    CommandSpec {
        name: "calibrate_uplink",
        description: "Re-publish commands (operator only)",
    },
    CommandSpec {
        name: "help",
        description: "List commands",
    },
];

impl Command {
    /// Parse a chat message. `Ok(None)` for text that is not one of our commands.
    ///
    /// A `@botname` suffix is accepted only when it names this bot.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Result<Option<Command>, DomainError> {
        let mut parts = text.split_whitespace();
        let Some(head) = parts.next().and_then(|h| h.strip_prefix('/')) else {
            return Ok(None);
        };
        let name = match head.split_once('@') {
            Some((name, target)) => match bot_username {
                Some(me) if target.eq_ignore_ascii_case(me) => name,
                _ => return Ok(None),
            },
            None => head,
        };
        let args: Vec<&str> = parts.collect();

        let cmd = match name.to_ascii_lowercase().as_str() {
            "group_check" => {
                let [a, b] = expect_args::<2>(&args, "/group_check <group_id_1> <group_id_2>")?;
                Command::GroupCheck {
                    first: a.parse()?,
                    second: b.parse()?,
                }
            }
            "profile_analysis" => {
                let [a] = expect_args::<1>(&args, "/profile_analysis <user_id>")?;
                Command::ProfileAnalysis(a.parse()?)
            }
            "compare_users" => {
                let [a, b] = expect_args::<2>(&args, "/compare_users <user_id_1> <user_id_2>")?;
                Command::CompareUsers {
                    first: a.parse()?,
                    second: b.parse()?,
                }
            }
            "profile_intel" => {
                let [a] = expect_args::<1>(&args, "/profile_intel <user_id>")?;
                Command::ProfileIntel(a.parse()?)
            }
            "badge_info" => {
                let [a] = expect_args::<1>(&args, "/badge_info <user_id>")?;
                Command::BadgeInfo(a.parse()?)
            }
            "member_lookup" => {
                const USAGE: &str = "/member_lookup <user_id> [chat_id]";
                if args.is_empty() || args.len() > 2 {
                    return Err(DomainError::Input(format!("Usage: {}", USAGE)));
                }
                let user_id = args[0]
                    .parse::<i64>()
                    .map_err(|_| DomainError::Input(format!("Invalid user ID. Usage: {}", USAGE)))?;
                let chat_id = args
                    .get(1)
                    .map(|c| c.parse::<i64>())
                    .transpose()
                    .map_err(|_| DomainError::Input("Invalid chat ID format".to_string()))?;
                Command::MemberLookup { user_id, chat_id }
            }
            "calibrate_uplink" => Command::CalibrateUplink,
            "help" | "start" => Command::Help,
            _ => return Ok(None),
        };
        Ok(Some(cmd))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::GroupCheck { .. } => "group_check",
            Command::ProfileAnalysis(_) => "profile_analysis",
            Command::CompareUsers { .. } => "compare_users",
            Command::ProfileIntel(_) => "profile_intel",
            Command::BadgeInfo(_) => "badge_info",
            Command::MemberLookup { .. } => "member_lookup",
            Command::CalibrateUplink => "calibrate_uplink",
            Command::Help => "help",
        }
    }
}

fn expect_args<'a, const N: usize>(args: &[&'a str], usage: &str) -> Result<[&'a str; N], DomainError> {
    <[&str; N]>::try_from(args).map_err(|_| DomainError::Input(format!("Usage: {}", usage)))
}

pub fn help_report() -> Report {
    let body = COMMAND_SPECS
        .iter()
        .map(|c| format!("/{} - {}", c.name, c.description))
        .collect::<Vec<_>>()
        .join("\n");
    Report::new("Commands", crate::domain::Accent::Grey).description(body)
}

/// Runs engine-backed commands. Chat-only commands are handled by the bot.
pub struct CommandService {
    profiles: Arc<ProfileService>,
    groups: Arc<GroupService>,
    compare: Arc<CompareService>,
    members_per_page: usize,
}

impl CommandService {
    pub fn new(
        profiles: Arc<ProfileService>,
        groups: Arc<GroupService>,
        compare: Arc<CompareService>,
        members_per_page: usize,
    ) -> Self {
        Self {
            profiles,
            groups,
            compare,
            members_per_page,
        }
    }

    pub async fn execute(&self, command: &Command) -> Reply {
        info!(command = command.name(), "executing command");
        match *command {
            Command::GroupCheck { first, second } => {
                match self.groups.intersect_groups(first, second).await {
                    Ok(result) => Reply::Paged(reports::group_check_pages(
                        &result,
                        self.members_per_page,
                    )),
                    Err(e) => failed("group data", &e),
                }
            }
            Command::ProfileAnalysis(user) => match self.profiles.fetch_profile(user).await {
                Ok(p) => Reply::Single(reports::profile_analysis_report(&p)),
                Err(e) => failed("profile data", &e),
            },
            Command::CompareUsers { first, second } => {
                match self.compare.compare_users(first, second).await {
                    Ok(r) => Reply::Single(reports::comparison_report(first, second, &r)),
                    Err(e) => failed("comparison data", &e),
                }
            }
            Command::ProfileIntel(user) => {
                let fetched = tokio::try_join!(
                    self.profiles.fetch_profile(user),
                    self.groups.fetch_user_groups(user)
                );
                match fetched {
                    Ok((p, groups)) => Reply::Single(reports::profile_intel_report(&p, &groups)),
                    Err(e) => failed("profile intel", &e),
                }
            }
            Command::BadgeInfo(user) => match self.profiles.fetch_profile_with_history(user).await {
                Ok((p, awards)) => Reply::Single(reports::badge_report(&p, &awards)),
                Err(e) => failed("badge data", &e),
            },
            Command::Help => Reply::Single(help_report()),
            Command::MemberLookup { .. } | Command::CalibrateUplink => Reply::Single(
                reports::error_report("This command is only available in chat."),
            ),
        }
    }
}

fn failed(what: &str, err: &DomainError) -> Reply {
    warn!(error = %err, kind = ?err.kind(), "command failed");
    Reply::Single(reports::failure_report(what, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::roblox::FixtureGateway;
    use crate::domain::{Accent, FailureKind};
    use crate::ports::{Endpoint, RobloxGateway};
    use serde_json::json;

    fn parse(text: &str) -> Result<Option<Command>, DomainError> {
        Command::parse(text, Some("isb_bot"))
    }

    #[test]
    fn parses_engine_commands() {
        assert_eq!(
            parse("/group_check 10 20").unwrap(),
            Some(Command::GroupCheck {
                first: GroupId::new(10).unwrap(),
                second: GroupId::new(20).unwrap()
            })
        );
        assert_eq!(
            parse("/profile_analysis@isb_bot 156").unwrap(),
            Some(Command::ProfileAnalysis(UserId::new(156).unwrap()))
        );
        assert_eq!(
            parse("  /BADGE_INFO   3 ").unwrap(),
            Some(Command::BadgeInfo(UserId::new(3).unwrap()))
        );
        assert_eq!(parse("/start").unwrap(), Some(Command::Help));
    }

    #[test]
    fn ignores_chatter_and_other_bots() {
        assert_eq!(parse("hello there").unwrap(), None);
        assert_eq!(parse("/profile_analysis@other_bot 1").unwrap(), None);
        assert_eq!(parse("/unknown 1").unwrap(), None);
        assert_eq!(parse("").unwrap(), None);
    }

    #[test]
    fn rejects_bad_arguments() {
        let err = parse("/compare_users 1").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Input);
        assert!(err.to_string().contains("Usage: /compare_users"));
        assert!(parse("/profile_intel 0").is_err());
        assert!(parse("/group_check a b").is_err());
        assert!(parse("/member_lookup 5 chat").is_err());
    }

    #[test]
    fn member_lookup_optional_chat() {
        assert_eq!(
            parse("/member_lookup 42").unwrap(),
            Some(Command::MemberLookup {
                user_id: 42,
                chat_id: None
            })
        );
        assert_eq!(
            parse("/member_lookup 42 -100123").unwrap(),
            Some(Command::MemberLookup {
                user_id: 42,
                chat_id: Some(-100123)
            })
        );
    }

    fn service(gw: FixtureGateway) -> CommandService {
        let gw: Arc<dyn RobloxGateway> = Arc::new(gw);
        let groups = Arc::new(GroupService::new(gw.clone(), 100));
        CommandService::new(
            Arc::new(ProfileService::new(gw.clone(), 100)),
            groups.clone(),
            Arc::new(CompareService::new(gw, groups, 100)),
            5,
        )
    }

    #[tokio::test]
    async fn failures_render_as_error_reports() {
        let reply = service(FixtureGateway::new())
            .execute(&Command::ProfileAnalysis(UserId::new(8).unwrap()))
            .await;
        let Reply::Single(report) = reply else {
            panic!("expected single report");
        };
        assert_eq!(report.title, "Error");
        assert_eq!(report.accent, Accent::Red);
        assert!(report.description.unwrap().contains("HTTP 404"));
    }

    #[tokio::test]
    async fn group_check_is_paged() {
        let members: Vec<_> = (0..7)
            .map(|i| json!({ "user": { "username": format!("m{}", i) }, "role": { "name": "M", "rank": 1 } }))
            .collect();
        let g1 = GroupId::new(1).unwrap();
        let g2 = GroupId::new(2).unwrap();
        let gw = FixtureGateway::new()
            .page(Endpoint::GroupMembers(g1), None, members.clone(), None)
            .page(Endpoint::GroupMembers(g2), None, members, None);

        let reply = service(gw)
            .execute(&Command::GroupCheck {
                first: g1,
                second: g2,
            })
            .await;

        match reply {
            Reply::Paged(pages) => {
                assert_eq!(pages.len(), 2);
                assert_eq!(pages[1].field_value("Total Common Users"), Some("7"));
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn help_lists_every_command() {
        let body = help_report().description.unwrap();
        for spec in COMMAND_SPECS {
            assert!(body.contains(&format!("/{}", spec.name)));
        }
    }
}

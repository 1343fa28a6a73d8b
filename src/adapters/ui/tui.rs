//! Implements InputPort. Inquire-based operator console.
//!
//! Runs the same commands as the chat bot and can launch the bot itself.

use crate::adapters::ui::{progress, render};
use crate::domain::{DomainError, GroupId, Reply, Report, UserId};
use crate::ports::InputPort;
use crate::usecases::pager::{PageMove, Pager};
use crate::usecases::{BotService, Command, CommandService};
use async_trait::async_trait;
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{CustomType, InquireError, Select};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

const START_BOT: &str = "Start moderation bot";
const GROUP_CHECK: &str = "Group check";
const PROFILE_ANALYSIS: &str = "Profile analysis";
const COMPARE_USERS: &str = "Compare users";
const PROFILE_INTEL: &str = "Profile intel";
const BADGE_INFO: &str = "Badge info";
const EXIT: &str = "Exit";

const NEXT: &str = "Next ▶";
const PREVIOUS: &str = "◀ Previous";
const DONE: &str = "Done";

/// Amber prompt prefix for every inquire prompt.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightYellow))
        .with_highlighted_option_prefix(Styled::new("▶").with_fg(Color::LightRed));
    inquire::set_global_render_config(config);
}

fn prompt_error(e: InquireError) -> DomainError {
    DomainError::Input(format!("prompt failed: {}", e))
}

fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

/// Ask for a positive id. `Ok(None)` when the operator cancels.
fn ask_id(label: &str) -> Result<Option<u64>, DomainError> {
    match CustomType::<u64>::new(label)
        .with_error_message("Enter a positive whole number")
        .prompt()
    {
        Ok(v) => Ok(Some(v)),
        Err(e) if is_cancel(&e) => Ok(None),
        Err(e) => Err(prompt_error(e)),
    }
}

fn ask_user(label: &str) -> Result<Option<UserId>, DomainError> {
    ask_id(label)?.map(UserId::new).transpose()
}

fn ask_group(label: &str) -> Result<Option<GroupId>, DomainError> {
    ask_id(label)?.map(GroupId::new).transpose()
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    commands: Arc<CommandService>,
    bot: Option<Arc<BotService>>,
    reports_dir: PathBuf,
}

impl TuiInputPort {
    /// `bot` is `None` when no chat token is configured.
    pub fn new(
        commands: Arc<CommandService>,
        bot: Option<Arc<BotService>>,
        reports_dir: PathBuf,
    ) -> Self {
        Self {
            commands,
            bot,
            reports_dir,
        }
    }

    fn ask_command(&self, choice: &str) -> Result<Option<Command>, DomainError> {
        let cmd = match choice {
            GROUP_CHECK => {
                let Some(first) = ask_group("First group ID:")? else {
                    return Ok(None);
                };
                let Some(second) = ask_group("Second group ID:")? else {
                    return Ok(None);
                };
                Command::GroupCheck { first, second }
            }
            PROFILE_ANALYSIS => match ask_user("User ID:")? {
                Some(u) => Command::ProfileAnalysis(u),
                None => return Ok(None),
            },
            COMPARE_USERS => {
                let Some(first) = ask_user("First user ID:")? else {
                    return Ok(None);
                };
                let Some(second) = ask_user("Second user ID:")? else {
                    return Ok(None);
                };
                Command::CompareUsers { first, second }
            }
            PROFILE_INTEL => match ask_user("User ID:")? {
                Some(u) => Command::ProfileIntel(u),
                None => return Ok(None),
            },
            BADGE_INFO => match ask_user("User ID:")? {
                Some(u) => Command::BadgeInfo(u),
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(cmd))
    }

    async fn run_command(&self, command: Command) -> Result<(), DomainError> {
        let label = format!("Running {}...", command.name());
        let reply = progress::with_spinner(&label, self.commands.execute(&command)).await;
        match reply {
            Reply::Single(report) => {
                render::print_report(&report);
                self.save_attachment(&report).await;
                Ok(())
            }
            Reply::Paged(pages) => match Pager::new(pages) {
                Some(pager) => browse(pager),
                None => Ok(()),
            },
        }
    }

    async fn save_attachment(&self, report: &Report) {
        let Some(attachment) = &report.attachment else {
            return;
        };
        let path = self.reports_dir.join(&attachment.file_name);
        let written = async {
            tokio::fs::create_dir_all(&self.reports_dir).await?;
            tokio::fs::write(&path, &attachment.bytes).await
        }
        .await;
        match written {
            Ok(()) => {
                info!(path = %path.display(), "saved attachment");
                println!("  Saved {}", path.display());
            }
            Err(e) => warn!(path = %path.display(), error = %e, "could not save attachment"),
        }
    }

    async fn run_bot(&self) -> Result<(), DomainError> {
        let Some(bot) = &self.bot else {
            render::print_report(&crate::usecases::reports::error_report(
                "No chat token configured. Set ISB_TELEGRAM_TOKEN and restart.",
            ));
            return Ok(());
        };
        println!("  Bot running. Press Ctrl+C to return to the menu.");
        tokio::select! {
            res = Arc::clone(bot).run_loop() => res,
            _ = tokio::signal::ctrl_c() => {
                info!("bot stopped by operator");
                Ok(())
            }
        }
    }
}

/// Show pages one at a time until the operator is done.
fn browse(mut pager: Pager) -> Result<(), DomainError> {
    loop {
        render::print_report(pager.current());
        let mut options = Vec::with_capacity(3);
        if pager.has_next() {
            options.push(NEXT);
        }
        if pager.has_previous() {
            options.push(PREVIOUS);
        }
        if options.is_empty() {
            return Ok(());
        }
        options.push(DONE);

        let choice = match Select::new("Page:", options).prompt() {
            Ok(c) => c,
            Err(e) if is_cancel(&e) => return Ok(()),
            Err(e) => return Err(prompt_error(e)),
        };
        let mv = match choice {
            NEXT => PageMove::Next,
            PREVIOUS => PageMove::Previous,
            _ => return Ok(()),
        };
        pager.apply(mv);
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let options = vec![
            START_BOT,
            GROUP_CHECK,
            PROFILE_ANALYSIS,
            COMPARE_USERS,
            PROFILE_INTEL,
            BADGE_INFO,
            EXIT,
        ];
        loop {
            let choice = match Select::new("ISB Intel", options.clone()).prompt() {
                Ok(c) => c,
                Err(e) if is_cancel(&e) => return Ok(()),
                Err(e) => return Err(prompt_error(e)),
            };
            match choice {
                EXIT => return Ok(()),
                START_BOT => self.run_bot().await?,
                other => match self.ask_command(other) {
                    Ok(Some(cmd)) => self.run_command(cmd).await?,
                    Ok(None) => {}
                    Err(e) => render::print_report(&crate::usecases::reports::error_report(
                        e.to_string(),
                    )),
                },
            }
        }
    }
}

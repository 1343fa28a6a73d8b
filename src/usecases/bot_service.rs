//! Bot (daemon) use case: poll chat events, run commands, drive paged replies.
//!
//! Each event is handled on its own task so a slow group walk never blocks
//! other moderators. Pagers live in memory and expire after `pager_ttl`.

use crate::domain::{Button, ChatEvent, CommandScope, DomainError, MessageRef, Reply, Report};
use crate::ports::ChatPort;
use crate::usecases::command_service::{COMMAND_SPECS, Command, CommandService};
use crate::usecases::pager::{PageMove, Pager};
use crate::usecases::reports;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Pause after a failed poll before trying again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

enum PressOutcome {
    Moved(Report, Vec<Button>),
    Unchanged,
    Foreign,
    Expired,
}

struct PagerSession {
    pager: Pager,
    owner: i64,
    expires_at: Instant,
}

pub struct BotService {
    chat: Arc<dyn ChatPort>,
    commands: Arc<CommandService>,
    /// Only this chat user may run `/calibrate_uplink`.
    operator_id: Option<i64>,
    sync_scope: CommandScope,
    pager_ttl: Duration,
    bot_username: Mutex<Option<String>>,
    pagers: Mutex<HashMap<MessageRef, PagerSession>>,
}

impl BotService {
    pub fn new(
        chat: Arc<dyn ChatPort>,
        commands: Arc<CommandService>,
        operator_id: Option<i64>,
        sync_scope: CommandScope,
        pager_ttl: Duration,
    ) -> Self {
        Self {
            chat,
            commands,
            operator_id,
            sync_scope,
            pager_ttl,
            bot_username: Mutex::new(None),
            pagers: Mutex::new(HashMap::new()),
        }
    }

    /// Log in, publish commands, then poll forever.
    pub async fn run_loop(self: Arc<Self>) -> Result<(), DomainError> {
        self.start().await?;

        loop {
            let events = match self.chat.poll_events().await {
                Ok(events) => events,
                Err(e) => {
                    warn!(error = %e, "poll failed; backing off");
                    tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    continue;
                }
            };

            for event in events {
                let this = Arc::clone(&self);
                tokio::spawn(async move {
                    if let Err(e) = this.handle_event(event).await {
                        warn!(error = %e, "event handling failed");
                    }
                });
            }
            self.prune_pagers().await;
        }
    }

    /// Identify the bot and publish the command menu.
    pub async fn start(&self) -> Result<(), DomainError> {
        let me = self.chat.identity().await?;
        info!(id = me.id, username = %me.username, "Bot logged in");
        *self.bot_username.lock().await = Some(me.username);

        match self.chat.publish_commands(COMMAND_SPECS, self.sync_scope).await {
            Ok(0) => warn!("No commands synced. Check the bot token and scope."),
            Ok(n) => info!(count = n, scope = %self.sync_scope, "Successfully synced commands"),
            Err(e) => warn!(error = %e, "Failed to sync commands on start"),
        }
        Ok(())
    }

    pub async fn handle_event(&self, event: ChatEvent) -> Result<(), DomainError> {
        match event {
            ChatEvent::Text {
                chat_id,
                user_id,
                text,
            } => self.handle_text(chat_id, user_id, &text).await,
            ChatEvent::Button {
                callback_id,
                message,
                user_id,
                data,
            } => self.handle_button(&callback_id, message, user_id, &data).await,
        }
    }

    async fn handle_text(&self, chat_id: i64, user_id: i64, text: &str) -> Result<(), DomainError> {
        let bot_username = self.bot_username.lock().await.clone();
        let command = match Command::parse(text, bot_username.as_deref()) {
            Ok(Some(c)) => c,
            Ok(None) => return Ok(()),
            Err(e) => {
                self.chat
                    .send_report(chat_id, &reports::usage_report(&e.to_string()), &[])
                    .await?;
                return Ok(());
            }
        };
        debug!(chat_id, user_id, command = command.name(), "command received");

        let reply = match command {
            Command::CalibrateUplink => Reply::Single(self.calibrate(user_id).await),
            Command::MemberLookup {
                user_id: target,
                chat_id: in_chat,
            } => {
                let report = match self.chat.lookup_member(in_chat.unwrap_or(chat_id), target).await {
                    Ok(Some(member)) => reports::member_report(&member),
                    Ok(None) => reports::member_not_found_report(),
                    Err(e) => reports::failure_report("user data", &e),
                };
                Reply::Single(report)
            }
            other => self.commands.execute(&other).await,
        };

        self.send_reply(chat_id, user_id, reply).await
    }

    async fn calibrate(&self, user_id: i64) -> Report {
        if self.operator_id != Some(user_id) {
            warn!(user_id, "unauthorized calibrate_uplink attempt");
            return reports::unauthorized_report();
        }
        match self.chat.publish_commands(COMMAND_SPECS, self.sync_scope).await {
            Ok(n) => {
                info!(count = n, scope = %self.sync_scope, "Manual sync");
                reports::calibrated_report(n, self.sync_scope)
            }
            Err(e) => {
                warn!(error = %e, "Manual sync error");
                reports::sync_failed_report(&e)
            }
        }
    }

    async fn send_reply(&self, chat_id: i64, user_id: i64, reply: Reply) -> Result<(), DomainError> {
        match reply {
            Reply::Single(report) => {
                self.chat.send_report(chat_id, &report, &[]).await?;
            }
            Reply::Paged(pages) => {
                let Some(pager) = Pager::new(pages) else {
                    return Ok(());
                };
                let sent = self
                    .chat
                    .send_report(chat_id, pager.current(), &pager.buttons())
                    .await?;
                if pager.len() > 1 {
                    self.pagers.lock().await.insert(
                        sent,
                        PagerSession {
                            pager,
                            owner: user_id,
                            expires_at: Instant::now() + self.pager_ttl,
                        },
                    );
                }
            }
        }
        Ok(())
    }

    async fn handle_button(
        &self,
        callback_id: &str,
        message: MessageRef,
        user_id: i64,
        data: &str,
    ) -> Result<(), DomainError> {
        let Some(mv) = PageMove::from_data(data) else {
            return self.chat.acknowledge(callback_id, None).await;
        };

        let outcome = {
            let mut pagers = self.pagers.lock().await;
            let now = Instant::now();
            match pagers.get_mut(&message) {
                None => PressOutcome::Expired,
                Some(s) if s.expires_at <= now => PressOutcome::Expired,
                Some(s) if s.owner != user_id => PressOutcome::Foreign,
                Some(s) => {
                    if s.pager.apply(mv) {
                        PressOutcome::Moved(s.pager.current().clone(), s.pager.buttons())
                    } else {
                        PressOutcome::Unchanged
                    }
                }
            }
        };

        match outcome {
            PressOutcome::Moved(report, buttons) => {
                self.chat.edit_report(message, &report, &buttons).await?;
                self.chat.acknowledge(callback_id, None).await
            }
            PressOutcome::Unchanged => self.chat.acknowledge(callback_id, None).await,
            PressOutcome::Foreign => {
                self.chat
                    .acknowledge(callback_id, Some("Only the requester can page this result."))
                    .await
            }
            PressOutcome::Expired => {
                self.pagers.lock().await.remove(&message);
                self.chat
                    .acknowledge(callback_id, Some("This result has expired."))
                    .await
            }
        }
    }

    async fn prune_pagers(&self) {
        let now = Instant::now();
        let mut pagers = self.pagers.lock().await;
        let before = pagers.len();
        pagers.retain(|_, s| s.expires_at > now);
        if pagers.len() < before {
            debug!(expired = before - pagers.len(), "pruned pagers");
        }
    }

    pub async fn open_pagers(&self) -> usize {
        self.pagers.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::roblox::FixtureGateway;
    use crate::domain::{BotIdentity, ChatMember, CommandSpec, GroupId};
    use crate::ports::{Endpoint, RobloxGateway};
    use crate::usecases::compare_service::CompareService;
    use crate::usecases::group_service::GroupService;
    use crate::usecases::profile_service::ProfileService;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingChat {
        sent: StdMutex<Vec<(i64, Report, Vec<Button>)>>,
        edits: StdMutex<Vec<(MessageRef, Report, Vec<Button>)>>,
        acks: StdMutex<Vec<Option<String>>>,
        published: StdMutex<Vec<CommandScope>>,
    }

    #[async_trait::async_trait]
    impl ChatPort for RecordingChat {
        async fn identity(&self) -> Result<BotIdentity, DomainError> {
            Ok(BotIdentity {
                id: 1,
                username: "isb_bot".into(),
            })
        }

        async fn poll_events(&self) -> Result<Vec<ChatEvent>, DomainError> {
            Ok(vec![])
        }

        async fn send_report(
            &self,
            chat_id: i64,
            report: &Report,
            buttons: &[Button],
        ) -> Result<MessageRef, DomainError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push((chat_id, report.clone(), buttons.to_vec()));
            Ok(MessageRef {
                chat_id,
                message_id: sent.len() as i64,
            })
        }

        async fn edit_report(
            &self,
            message: MessageRef,
            report: &Report,
            buttons: &[Button],
        ) -> Result<(), DomainError> {
            self.edits
                .lock()
                .unwrap()
                .push((message, report.clone(), buttons.to_vec()));
            Ok(())
        }

        async fn acknowledge(&self, _callback_id: &str, notice: Option<&str>) -> Result<(), DomainError> {
            self.acks.lock().unwrap().push(notice.map(String::from));
            Ok(())
        }

        async fn publish_commands(
            &self,
            commands: &[CommandSpec],
            scope: CommandScope,
        ) -> Result<usize, DomainError> {
            self.published.lock().unwrap().push(scope);
            Ok(commands.len())
        }

        async fn lookup_member(
            &self,
            _chat_id: i64,
            user_id: i64,
        ) -> Result<Option<ChatMember>, DomainError> {
            Ok((user_id == 77).then(|| ChatMember {
                user_id,
                first_name: "Mod".into(),
                last_name: None,
                username: Some("mod77".into()),
                is_bot: false,
                status: "administrator".into(),
                chat_title: None,
            }))
        }
    }

    fn group_fixture() -> FixtureGateway {
        let members: Vec<_> = (0..12)
            .map(|i| json!({ "user": { "username": format!("m{}", i) }, "role": { "name": "M", "rank": 1 } }))
            .collect();
        FixtureGateway::new()
            .page(Endpoint::GroupMembers(GroupId::new(1).unwrap()), None, members.clone(), None)
            .page(Endpoint::GroupMembers(GroupId::new(2).unwrap()), None, members, None)
    }

    fn bot(chat: Arc<RecordingChat>, ttl: Duration) -> BotService {
        let gw: Arc<dyn RobloxGateway> = Arc::new(group_fixture());
        let groups = Arc::new(GroupService::new(gw.clone(), 100));
        let commands = Arc::new(CommandService::new(
            Arc::new(ProfileService::new(gw.clone(), 100)),
            groups.clone(),
            Arc::new(CompareService::new(gw, groups, 100)),
            5,
        ));
        BotService::new(chat, commands, Some(500), CommandScope::Global, ttl)
    }

    fn text(user_id: i64, text: &str) -> ChatEvent {
        ChatEvent::Text {
            chat_id: -10,
            user_id,
            text: text.into(),
        }
    }

    fn press(user_id: i64, message_id: i64, data: &str) -> ChatEvent {
        ChatEvent::Button {
            callback_id: "cb".into(),
            message: MessageRef {
                chat_id: -10,
                message_id,
            },
            user_id,
            data: data.into(),
        }
    }

    #[tokio::test]
    async fn paged_group_check_can_be_browsed() {
        let chat = Arc::new(RecordingChat::default());
        let svc = bot(chat.clone(), Duration::from_secs(300));

        svc.handle_event(text(9, "/group_check 1 2")).await.unwrap();
        {
            let sent = chat.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].1.field_value("Page"), Some("1/3"));
            assert_eq!(sent[0].2.len(), 1);
        }
        assert_eq!(svc.open_pagers().await, 1);

        svc.handle_event(press(9, 1, "page:next")).await.unwrap();
        let edits = chat.edits.lock().unwrap().clone();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].1.field_value("Page"), Some("2/3"));
        assert_eq!(edits[0].2.len(), 2);
    }

    #[tokio::test]
    async fn other_users_cannot_page() {
        let chat = Arc::new(RecordingChat::default());
        let svc = bot(chat.clone(), Duration::from_secs(300));
        svc.handle_event(text(9, "/group_check 1 2")).await.unwrap();

        svc.handle_event(press(10, 1, "page:next")).await.unwrap();

        assert!(chat.edits.lock().unwrap().is_empty());
        let acks = chat.acks.lock().unwrap();
        assert!(acks[0].as_deref().unwrap().contains("Only the requester"));
    }

    #[tokio::test]
    async fn expired_pager_is_dropped() {
        let chat = Arc::new(RecordingChat::default());
        let svc = bot(chat.clone(), Duration::ZERO);
        svc.handle_event(text(9, "/group_check 1 2")).await.unwrap();

        svc.handle_event(press(9, 1, "page:next")).await.unwrap();

        assert!(chat.edits.lock().unwrap().is_empty());
        assert_eq!(svc.open_pagers().await, 0);
        assert_eq!(
            chat.acks.lock().unwrap()[0].as_deref(),
            Some("This result has expired.")
        );
    }

    #[tokio::test]
    async fn calibrate_is_operator_only() {
        let chat = Arc::new(RecordingChat::default());
        let svc = bot(chat.clone(), Duration::from_secs(300));

        svc.handle_event(text(9, "/calibrate_uplink")).await.unwrap();
        svc.handle_event(text(500, "/calibrate_uplink")).await.unwrap();

        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent[0].1.title, "Unauthorized");
        assert_eq!(sent[1].1.title, "Uplink Calibrated");
        assert!(sent[1].1.description.as_deref().unwrap().contains("globally"));
        assert_eq!(chat.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn usage_errors_and_member_lookup() {
        let chat = Arc::new(RecordingChat::default());
        let svc = bot(chat.clone(), Duration::from_secs(300));

        svc.handle_event(text(9, "/compare_users 1")).await.unwrap();
        svc.handle_event(text(9, "/member_lookup 77")).await.unwrap();
        svc.handle_event(text(9, "/member_lookup 78")).await.unwrap();
        svc.handle_event(text(9, "just chatting")).await.unwrap();

        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].1.title, "Invalid Command");
        assert_eq!(sent[1].1.field_value("Username"), Some("@mod77"));
        assert_eq!(sent[2].1.title, "User Not Found");
    }

    #[tokio::test]
    async fn start_publishes_and_learns_username() {
        let chat = Arc::new(RecordingChat::default());
        let svc = bot(chat.clone(), Duration::from_secs(300));
        svc.start().await.unwrap();
        assert_eq!(chat.published.lock().unwrap().as_slice(), &[CommandScope::Global]);

        svc.handle_event(text(9, "/help@isb_bot")).await.unwrap();
        svc.handle_event(text(9, "/help@someone_else")).await.unwrap();
        assert_eq!(chat.sent.lock().unwrap().len(), 1);
    }
}

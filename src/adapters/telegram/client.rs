//! Implements ChatPort over the Telegram Bot API (HTTPS + JSON, long polling).
//!
//! Tracks the update offset so each update is delivered once. Errors never
//! carry the request URL, which embeds the bot token.

use crate::adapters::telegram::format::{self, CAPTION_LIMIT, MESSAGE_LIMIT};
use crate::adapters::telegram::mapper;
use crate::adapters::telegram::wire::{
    ApiResponse, BotCommandRecord, Chat, ChatMemberRecord, Message, Update, User,
};
use crate::domain::{
    BotIdentity, Button, ChatEvent, ChatMember, CommandScope, CommandSpec, DomainError, MessageRef,
    Report,
};
use crate::ports::ChatPort;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const API_BASE: &str = "https://api.telegram.org";

/// Bot API descriptions meaning "no such member", answered as 400.
const MEMBER_MISSING: &[&str] = &["user not found", "member not found", "participant_id_invalid"];

pub struct BotApiClient {
    client: Client,
    token: String,
    poll_timeout: Duration,
    http_timeout: Duration,
    offset: Mutex<i64>,
}

impl BotApiClient {
    /// `http_timeout` bounds ordinary calls; long polls get `poll_timeout` on top.
    pub fn new(
        token: impl Into<String>,
        http_timeout: Duration,
        poll_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DomainError::Config("bot token is empty".into()));
        }
        let client = Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            token,
            poll_timeout,
            http_timeout,
            offset: Mutex::new(0),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    async fn send_raw<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>, DomainError> {
        let res = request
            .send()
            .await
            .map_err(|e| DomainError::Chat(format!("{}: {}", method, e.without_url())))?;
        res.json::<ApiResponse<T>>()
            .await
            .map_err(|e| DomainError::Chat(format!("{}: bad response: {}", method, e.without_url())))
    }

    async fn call_raw<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
    ) -> Result<ApiResponse<T>, DomainError> {
        debug!(method, "Bot API call");
        let request = self.client.post(self.url(method)).json(body);
        self.send_raw(method, request).await
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, DomainError> {
        unwrap_result(method, self.call_raw(method, body).await?)
    }

    /// Upload the report's attachment: images as photos, anything else as a document.
    async fn send_attachment(
        &self,
        chat_id: i64,
        report: &Report,
        buttons: &[Button],
    ) -> Result<Message, DomainError> {
        let Some(attachment) = &report.attachment else {
            return Err(DomainError::Chat("upload: report has no attachment".into()));
        };
        let (method, field) = upload_method(attachment.mime);
        let part = Part::bytes(attachment.bytes.clone())
            .file_name(attachment.file_name.clone())
            .mime_str(attachment.mime)
            .map_err(|e| DomainError::Chat(format!("{}: {}", method, e)))?;
        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", format::render_html(report, CAPTION_LIMIT))
            .text("parse_mode", "HTML")
            .part(field, part);
        if !buttons.is_empty() {
            form = form.text("reply_markup", format::inline_keyboard(buttons).to_string());
        }
        debug!(method, file = %attachment.file_name, "Bot API upload");
        let request = self.client.post(self.url(method)).multipart(form);
        unwrap_result(method, self.send_raw(method, request).await?)
    }
}

/// Bot API method and form field for an attachment of type `mime`.
fn upload_method(mime: &str) -> (&'static str, &'static str) {
    if mime.starts_with("image/") {
        ("sendPhoto", "photo")
    } else {
        ("sendDocument", "document")
    }
}

fn unwrap_result<T>(method: &str, response: ApiResponse<T>) -> Result<T, DomainError> {
    match response {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse {
            error_code,
            description,
            ..
        } => Err(DomainError::Chat(format!(
            "{} failed ({}): {}",
            method,
            error_code.map_or_else(|| "no code".to_string(), |c| c.to_string()),
            description.unwrap_or_else(|| "no description".to_string())
        ))),
    }
}

fn scope_json(scope: CommandScope) -> Value {
    match scope {
        CommandScope::Global => json!({ "type": "default" }),
        CommandScope::Chat(chat_id) => json!({ "type": "chat", "chat_id": chat_id }),
    }
}

#[async_trait]
impl ChatPort for BotApiClient {
    async fn identity(&self) -> Result<BotIdentity, DomainError> {
        let me: User = self.call("getMe", &json!({})).await?;
        Ok(mapper::identity_from_user(me))
    }

    async fn poll_events(&self) -> Result<Vec<ChatEvent>, DomainError> {
        let mut offset = self.offset.lock().await;
        let body = json!({
            "offset": *offset,
            "timeout": self.poll_timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });
        let request = self
            .client
            .post(self.url("getUpdates"))
            .timeout(self.poll_timeout + self.http_timeout)
            .json(&body);
        let updates: Vec<Update> =
            unwrap_result("getUpdates", self.send_raw("getUpdates", request).await?)?;

        if let Some(last) = updates.last() {
            *offset = last.update_id + 1;
        }
        debug!(count = updates.len(), offset = *offset, "updates received");
        Ok(updates.into_iter().filter_map(mapper::update_to_event).collect())
    }

    async fn send_report(
        &self,
        chat_id: i64,
        report: &Report,
        buttons: &[Button],
    ) -> Result<MessageRef, DomainError> {
        let sent = if report.attachment.is_some() {
            self.send_attachment(chat_id, report, buttons).await?
        } else {
            let mut body = json!({
                "chat_id": chat_id,
                "text": format::render_html(report, MESSAGE_LIMIT),
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            });
            if !buttons.is_empty() {
                body["reply_markup"] = format::inline_keyboard(buttons);
            }
            self.call::<Message>("sendMessage", &body).await?
        };
        Ok(MessageRef {
            chat_id: sent.chat.id,
            message_id: sent.message_id,
        })
    }

    async fn edit_report(
        &self,
        message: MessageRef,
        report: &Report,
        buttons: &[Button],
    ) -> Result<(), DomainError> {
        let (method, key, limit) = if report.attachment.is_some() {
            ("editMessageCaption", "caption", CAPTION_LIMIT)
        } else {
            ("editMessageText", "text", MESSAGE_LIMIT)
        };
        let mut body = json!({
            "chat_id": message.chat_id,
            "message_id": message.message_id,
            "parse_mode": "HTML",
            "reply_markup": format::inline_keyboard(buttons),
        });
        body[key] = Value::String(format::render_html(report, limit));

        let response: ApiResponse<Value> = self.call_raw(method, &body).await?;
        let unchanged = response
            .description
            .as_deref()
            .is_some_and(|d| d.contains("message is not modified"));
        if !response.ok && unchanged {
            return Ok(());
        }
        unwrap_result(method, response).map(|_| ())
    }

    async fn acknowledge(&self, callback_id: &str, notice: Option<&str>) -> Result<(), DomainError> {
        let mut body = json!({ "callback_query_id": callback_id });
        if let Some(text) = notice {
            body["text"] = Value::String(text.to_string());
        }
        let _: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    async fn publish_commands(
        &self,
        commands: &[CommandSpec],
        scope: CommandScope,
    ) -> Result<usize, DomainError> {
        let list: Vec<Value> = commands
            .iter()
            .map(|c| json!({ "command": c.name, "description": c.description }))
            .collect();
        let _: bool = self
            .call(
                "setMyCommands",
                &json!({ "commands": list, "scope": scope_json(scope) }),
            )
            .await?;
        let registered: Vec<BotCommandRecord> = self
            .call("getMyCommands", &json!({ "scope": scope_json(scope) }))
            .await?;
        Ok(registered.len())
    }

    async fn lookup_member(&self, chat_id: i64, user_id: i64) -> Result<Option<ChatMember>, DomainError> {
        let member_body = json!({ "chat_id": chat_id, "user_id": user_id });
        let chat_body = json!({ "chat_id": chat_id });
        let (member, chat) = tokio::join!(
            self.call_raw::<ChatMemberRecord>("getChatMember", &member_body),
            self.call::<Chat>("getChat", &chat_body),
        );

        let member = member?;
        if !member.ok {
            let missing = member.error_code == Some(400)
                && member.description.as_deref().is_some_and(|d| {
                    let d = d.to_ascii_lowercase();
                    MEMBER_MISSING.iter().any(|m| d.contains(m))
                });
            if missing {
                return Ok(None);
            }
        }
        let record = unwrap_result("getChatMember", member)?;

        let title = match chat {
            Ok(chat) => chat.title,
            Err(e) => {
                warn!(chat_id, error = %e, "could not read chat title");
                None
            }
        };
        Ok(Some(mapper::member_to_domain(record, title)))
    }
}

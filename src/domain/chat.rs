//! Chat-platform events and handles, mapped from the platform's update format.

use std::fmt;

/// A sent message that can later be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

/// Something a moderator did in the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A text message. Only `/`-prefixed ones are commands.
    Text {
        chat_id: i64,
        user_id: i64,
        text: String,
    },
    /// An inline button was pressed on one of our messages.
    Button {
        callback_id: String,
        message: MessageRef,
        user_id: i64,
        data: String,
    },
}

/// Inline button shown under a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

/// Command entry published to the platform's command menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Where the command list is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandScope {
    Global,
    Chat(i64),
}

impl fmt::Display for CommandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandScope::Global => f.write_str("globally"),
            CommandScope::Chat(id) => write!(f, "to chat {}", id),
        }
    }
}

/// A member of a chat, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMember {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub is_bot: bool,
    /// creator, administrator, member, restricted, left, kicked.
    pub status: String,
    pub chat_title: Option<String>,
}

impl ChatMember {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self.status.as_str(), "left" | "kicked")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: i64,
    pub username: String,
}

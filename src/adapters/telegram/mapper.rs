//! Map Bot API records to domain chat types.

use crate::adapters::telegram::wire::{ChatMemberRecord, Update, User};
use crate::domain::{BotIdentity, ChatEvent, ChatMember, MessageRef};

/// Map an update to a chat event. Updates the bot does not act on give `None`.
pub fn update_to_event(update: Update) -> Option<ChatEvent> {
    if let Some(query) = update.callback_query {
        // buttons on messages too old for the platform to return are unusable
        let message = query.message?;
        return Some(ChatEvent::Button {
            callback_id: query.id,
            message: MessageRef {
                chat_id: message.chat.id,
                message_id: message.message_id,
            },
            user_id: query.from.id,
            data: query.data.unwrap_or_default(),
        });
    }

    let message = update.message?;
    let from = message.from?;
    if from.is_bot {
        return None;
    }
    Some(ChatEvent::Text {
        chat_id: message.chat.id,
        user_id: from.id,
        text: message.text?,
    })
}

pub fn member_to_domain(record: ChatMemberRecord, chat_title: Option<String>) -> ChatMember {
    ChatMember {
        user_id: record.user.id,
        first_name: record.user.first_name,
        last_name: record.user.last_name,
        username: record.user.username,
        is_bot: record.user.is_bot,
        status: record.status,
        chat_title,
    }
}

pub fn identity_from_user(user: User) -> BotIdentity {
    BotIdentity {
        id: user.id,
        username: user.username.unwrap_or(user.first_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_message_maps_to_text_event() {
        let event = update_to_event(update(json!({
            "update_id": 1,
            "message": {
                "message_id": 5,
                "chat": { "id": -100, "title": "Mods" },
                "from": { "id": 42, "is_bot": false, "first_name": "Ann" },
                "text": "/help"
            }
        })));
        assert_eq!(
            event,
            Some(ChatEvent::Text {
                chat_id: -100,
                user_id: 42,
                text: "/help".into()
            })
        );
    }

    #[test]
    fn callback_maps_to_button_event() {
        let event = update_to_event(update(json!({
            "update_id": 2,
            "callback_query": {
                "id": "cb1",
                "from": { "id": 42, "first_name": "Ann" },
                "message": { "message_id": 9, "chat": { "id": -100 } },
                "data": "page:next"
            }
        })));
        assert_eq!(
            event,
            Some(ChatEvent::Button {
                callback_id: "cb1".into(),
                message: MessageRef {
                    chat_id: -100,
                    message_id: 9
                },
                user_id: 42,
                data: "page:next".into()
            })
        );
    }

    #[test]
    fn ignores_bots_and_non_text() {
        assert!(update_to_event(update(json!({
            "update_id": 3,
            "message": {
                "message_id": 1,
                "chat": { "id": 1 },
                "from": { "id": 7, "is_bot": true, "first_name": "B" },
                "text": "/help"
            }
        })))
        .is_none());
        assert!(update_to_event(update(json!({
            "update_id": 4,
            "message": { "message_id": 1, "chat": { "id": 1 }, "from": { "id": 7, "first_name": "A" } }
        })))
        .is_none());
        assert!(update_to_event(update(json!({ "update_id": 5 }))).is_none());
    }

    #[test]
    fn member_record_maps() {
        let record: ChatMemberRecord = serde_json::from_value(json!({
            "status": "kicked",
            "user": { "id": 3, "is_bot": false, "first_name": "Cy", "last_name": "D", "username": "cyd" }
        }))
        .unwrap();
        let member = member_to_domain(record, Some("Mods".into()));
        assert_eq!(member.full_name(), "Cy D");
        assert!(!member.is_present());
        assert_eq!(member.chat_title.as_deref(), Some("Mods"));
    }
}

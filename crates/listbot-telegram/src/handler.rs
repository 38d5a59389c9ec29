// SPDX-FileCopyrightText: 2026 Listbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of Telegram updates into [`InputEvent`]s.
//!
//! Text messages become `Text`, photo messages become `Photo` (largest
//! size), and callback queries become `ButtonSelection`. Every other update
//! kind is ignored.

use listbot_core::{ChatId, ImageRef, InputEvent, MessageRef, UserId};
use teloxide::types::{CallbackQuery, Message, PhotoSize, Update, UpdateKind};

/// Decodes any update the bot reacts to.
pub fn decode_update(update: &Update) -> Option<InputEvent> {
    match &update.kind {
        UpdateKind::Message(msg) => decode_message(msg),
        UpdateKind::CallbackQuery(query) => decode_callback(query),
        _ => None,
    }
}

/// Decodes a text or photo message. Messages without a sender (channel
/// posts) and other content types are dropped.
pub fn decode_message(msg: &Message) -> Option<InputEvent> {
    let sender = msg.from.as_ref()?;
    let chat = ChatId(msg.chat.id.0);
    let user = UserId(sender.id.0 as i64);
    let message = MessageRef(msg.id.0);

    if let Some(text) = msg.text() {
        return Some(InputEvent::Text {
            chat,
            user,
            text: normalize_command(text),
            message,
        });
    }

    if let Some(photos) = msg.photo() {
        let largest = largest_photo(photos)?;
        return Some(InputEvent::Photo {
            chat,
            user,
            image: ImageRef(largest.file.id.to_string()),
            message,
        });
    }

    None
}

/// Decodes an inline button press. Presses without data are dropped.
pub fn decode_callback(query: &CallbackQuery) -> Option<InputEvent> {
    let payload = query.data.clone()?;
    let user = UserId(query.from.id.0 as i64);
    // Inaccessible or missing messages fall back to the private chat.
    let chat = query
        .message
        .as_ref()
        .map(|m| ChatId(m.chat().id.0))
        .unwrap_or(ChatId(user.0));

    Some(InputEvent::ButtonSelection {
        chat,
        user,
        payload,
        selection_id: Some(query.id.to_string()),
    })
}

/// Strips the `@botname` suffix Telegram appends to commands in groups:
/// `/additem@listbot_bot` becomes `/additem`. Arguments are kept.
pub fn normalize_command(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with('/') {
        return text.to_string();
    }
    let (command, rest) = match text.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, Some(rest.trim_start())),
        None => (text, None),
    };
    let command = command.split('@').next().unwrap_or(command);
    match rest {
        Some(rest) if !rest.is_empty() => format!("{command} {rest}"),
        _ => command.to_string(),
    }
}

fn largest_photo(photos: &[PhotoSize]) -> Option<&PhotoSize> {
    photos
        .iter()
        .max_by_key(|photo| u64::from(photo.width) * u64::from(photo.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn private_chat(id: i64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "type": "private",
            "first_name": "Test",
        })
    }

    fn group_chat(id: i64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "type": "supergroup",
            "title": "Test Group",
        })
    }

    fn sender(id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "is_bot": false,
            "first_name": "Test",
        })
    }

    fn make_text_message(chat: serde_json::Value, user: u64, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 41,
            "date": 1700000000i64,
            "chat": chat,
            "from": sender(user),
            "text": text,
        });
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    fn make_photo_message(user: u64) -> Message {
        let json = serde_json::json!({
            "message_id": 42,
            "date": 1700000000i64,
            "chat": private_chat(user as i64),
            "from": sender(user),
            "photo": [
                { "file_id": "small", "file_unique_id": "s", "width": 90, "height": 90 },
                { "file_id": "large", "file_unique_id": "l", "width": 1280, "height": 960 },
                { "file_id": "medium", "file_unique_id": "m", "width": 320, "height": 240 },
            ],
        });
        serde_json::from_value(json).expect("failed to deserialize mock photo message")
    }

    fn make_callback_update(chat: serde_json::Value, user: u64, data: Option<&str>) -> Update {
        let mut query = serde_json::json!({
            "id": "cbq-1",
            "from": sender(user),
            "chat_instance": "instance",
            "message": {
                "message_id": 7,
                "date": 1700000000i64,
                "chat": chat,
                "text": "Pick one",
            },
        });
        if let Some(data) = data {
            query["data"] = serde_json::json!(data);
        }
        let json = serde_json::json!({
            "update_id": 1000,
            "callback_query": query,
        });
        serde_json::from_str(&json.to_string()).expect("failed to deserialize mock update")
    }

    #[test]
    fn text_message_decodes_to_text_event() {
        let msg = make_text_message(private_chat(12345), 12345, "Cafe A");
        let event = decode_message(&msg).unwrap();
        assert_eq!(
            event,
            InputEvent::Text {
                chat: ChatId(12345),
                user: UserId(12345),
                text: "Cafe A".into(),
                message: MessageRef(41),
            }
        );
        assert!(event.key().is_private());
    }

    #[test]
    fn group_command_is_normalized() {
        let msg = make_text_message(group_chat(-100123), 7, "/additem@listbot_bot");
        match decode_message(&msg) {
            Some(InputEvent::Text { chat, user, text, .. }) => {
                assert_eq!(chat, ChatId(-100123));
                assert_eq!(user, UserId(7));
                assert_eq!(text, "/additem");
            }
            other => panic!("expected text event, got {other:?}"),
        }
    }

    #[test]
    fn photo_message_uses_largest_size() {
        let msg = make_photo_message(99);
        match decode_message(&msg) {
            Some(InputEvent::Photo { image, message, .. }) => {
                assert_eq!(image, ImageRef("large".into()));
                assert_eq!(message, MessageRef(42));
            }
            other => panic!("expected photo event, got {other:?}"),
        }
    }

    #[test]
    fn message_without_sender_is_ignored() {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": private_chat(12345),
            "text": "hello",
        });
        let msg: Message = serde_json::from_value(json).unwrap();
        assert!(decode_message(&msg).is_none());
    }

    #[test]
    fn callback_query_decodes_to_button_selection() {
        let update = make_callback_update(group_chat(-100123), 7, Some("Cafe A"));
        assert_eq!(
            decode_update(&update),
            Some(InputEvent::ButtonSelection {
                chat: ChatId(-100123),
                user: UserId(7),
                payload: "Cafe A".into(),
                selection_id: Some("cbq-1".into()),
            })
        );
    }

    #[test]
    fn callback_without_data_is_ignored() {
        let update = make_callback_update(private_chat(7), 7, None);
        assert!(decode_update(&update).is_none());
    }

    #[test]
    fn normalize_keeps_arguments_and_plain_text() {
        assert_eq!(normalize_command("/start@listbot_bot addItem"), "/start addItem");
        assert_eq!(normalize_command("/start   query"), "/start query");
        assert_eq!(normalize_command("  /help  "), "/help");
        assert_eq!(normalize_command("meet @ noon"), "meet @ noon");
    }
}

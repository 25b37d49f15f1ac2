use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// One inbound platform update.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<Message>,
}

impl Update {
    /// Decode a bare update or a cloud-function event whose `body` holds the update as a string.
    pub fn from_invocation(input: &str) -> Result<Self, DecodeError> {
        let value: serde_json::Value = serde_json::from_str(input)?;

        match value.get("body") {
            Some(serde_json::Value::String(body)) => Ok(serde_json::from_str(body)?),
            Some(_) => Err(DecodeError::EventBody),
            None => Ok(serde_json::from_value(value)?),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Voice {
    pub file_id: String,
    /// Seconds.
    pub duration: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Payload of a message, classified once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Voice(Voice),
    Location(Location),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawMessage")]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub content: MessageContent,
}

impl Message {
    pub fn reply_target(&self) -> ReplyTarget {
        ReplyTarget { chat_id: self.chat.id, message_id: self.message_id }
    }
}

#[derive(Deserialize)]
struct RawMessage {
    message_id: i64,
    chat: Chat,
    text: Option<String>,
    voice: Option<Voice>,
    location: Option<Location>,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        let content = match (raw.text, raw.voice, raw.location) {
            (Some(text), _, _) => MessageContent::Text(text),
            (None, Some(voice), _) => MessageContent::Voice(voice),
            (None, None, Some(location)) => MessageContent::Location(location),
            (None, None, None) => MessageContent::Unsupported,
        };

        Self { message_id: raw.message_id, chat: raw.chat, content }
    }
}

/// Where a reply goes: the chat, quoting the inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTarget {
    pub chat_id: i64,
    pub message_id: i64,
}

/// Current conditions as reported by the weather provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub description: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub pressure: f64,
    pub humidity_pct: f64,
    pub visibility_m: f64,
    pub wind_speed_mps: f64,
    pub wind_deg: f64,
    /// Unix seconds.
    pub sunrise: i64,
    /// Unix seconds.
    pub sunset: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherLookup {
    Found(CurrentWeather),
    /// Provider answered with a non-success status for this place.
    NotFound,
}

/// Fixed reply returned to the invoking platform, whatever happened inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Acknowledgment {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: &'static str,
}

impl Acknowledgment {
    pub const OK: Acknowledgment = Acknowledgment { status_code: 200, body: "" };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: &str) -> Message {
        let update: Update = serde_json::from_str(json).unwrap();
        update.message.expect("message present")
    }

    #[test]
    fn update_without_message_decodes() {
        let update: Update = serde_json::from_str(r#"{"update_id": 7, "edited_message": {}}"#).unwrap();
        assert_eq!(update.update_id, Some(7));
        assert!(update.message.is_none());
    }

    #[test]
    fn text_message_is_classified() {
        let msg = message(r#"{"message": {"message_id": 1, "chat": {"id": 42}, "text": "London"}}"#);
        assert_eq!(msg.content, MessageContent::Text("London".into()));
        assert_eq!(msg.reply_target(), ReplyTarget { chat_id: 42, message_id: 1 });
    }

    #[test]
    fn voice_message_is_classified() {
        let msg = message(
            r#"{"message": {"message_id": 2, "chat": {"id": 42, "type": "private"},
                "voice": {"file_id": "abc", "file_unique_id": "u", "duration": 4, "mime_type": "audio/ogg"}}}"#,
        );
        assert_eq!(msg.content, MessageContent::Voice(Voice { file_id: "abc".into(), duration: 4 }));
    }

    #[test]
    fn location_message_is_classified() {
        let msg = message(
            r#"{"message": {"message_id": 3, "chat": {"id": 1}, "location": {"latitude": 55.75, "longitude": 37.62}}}"#,
        );
        assert_eq!(
            msg.content,
            MessageContent::Location(Location { latitude: 55.75, longitude: 37.62 })
        );
    }

    #[test]
    fn other_payloads_are_unsupported() {
        let msg = message(r#"{"message": {"message_id": 4, "chat": {"id": 1}, "sticker": {"file_id": "s"}}}"#);
        assert_eq!(msg.content, MessageContent::Unsupported);
    }

    #[test]
    fn text_wins_over_voice_and_location() {
        let msg = message(
            r#"{"message": {"message_id": 5, "chat": {"id": 1}, "text": "Paris",
                "voice": {"file_id": "v", "duration": 1},
                "location": {"latitude": 1.0, "longitude": 2.0}}}"#,
        );
        assert_eq!(msg.content, MessageContent::Text("Paris".into()));

        let msg = message(
            r#"{"message": {"message_id": 6, "chat": {"id": 1},
                "voice": {"file_id": "v", "duration": 1},
                "location": {"latitude": 1.0, "longitude": 2.0}}}"#,
        );
        assert!(matches!(msg.content, MessageContent::Voice(_)));
    }

    #[test]
    fn invocation_event_body_is_unwrapped() {
        let event = serde_json::json!({
            "httpMethod": "POST",
            "body": r#"{"update_id": 1, "message": {"message_id": 9, "chat": {"id": 5}, "text": "/help"}}"#,
        })
        .to_string();

        let update = Update::from_invocation(&event).unwrap();
        let msg = update.message.unwrap();
        assert_eq!(msg.content, MessageContent::Text("/help".into()));
    }

    #[test]
    fn bare_update_is_accepted_as_invocation() {
        let update = Update::from_invocation(r#"{"update_id": 1}"#).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn non_string_event_body_is_rejected() {
        let err = Update::from_invocation(r#"{"body": {"update_id": 1}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::EventBody));
    }

    #[test]
    fn acknowledgment_serializes_to_fixed_shape() {
        let json = serde_json::to_value(Acknowledgment::OK).unwrap();
        assert_eq!(json, serde_json::json!({"statusCode": 200, "body": ""}));
    }
}

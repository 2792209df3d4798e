//! Typed wire format for the Web API endpoints the tool consumes.
//!
//! Every response shares the `{ok, error, ...}` envelope; pagination rides in
//! `response_metadata.next_cursor`, which the service sets to an empty string
//! on the last page.

use serde::Deserialize;

use scour_core::{Conversation, ConversationKind, Message, error_code};

use crate::retry::CallError;

/// Shared `{ok, error}` envelope around an endpoint-specific body.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    /// Unwrap the body, converting an envelope-level error into the retry
    /// classification: `ratelimited` is throttling, everything else terminal.
    pub fn into_body(self) -> Result<T, CallError> {
        if self.ok {
            return Ok(self.body);
        }
        let code = self.error.unwrap_or_else(|| "unknown_error".to_string());
        if code == error_code::RATELIMITED {
            return Err(CallError::Throttled { retry_after: None });
        }
        Err(CallError::Fatal(scour_core::Error::Request { code }))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub next_cursor: String,
}

impl ResponseMetadata {
    /// Empty-string cursors mean "no more pages".
    pub fn cursor(self) -> Option<String> {
        if self.next_cursor.is_empty() {
            None
        } else {
            Some(self.next_cursor)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthTestBody {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListBody {
    #[serde(default)]
    pub channels: Vec<ChannelObject>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryBody {
    #[serde(default)]
    pub messages: Vec<MessageObject>,
    #[serde(default)]
    pub response_metadata: Option<ResponseMetadata>,
}

/// `chat.delete` carries nothing we need beyond the envelope.
#[derive(Debug, Default, Deserialize)]
pub struct EmptyBody {}

#[derive(Debug, Deserialize)]
pub struct ChannelObject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_im: bool,
    #[serde(default)]
    pub is_mpim: bool,
    #[serde(default)]
    pub is_private: bool,
    /// Peer user id, present for IMs only.
    #[serde(default)]
    pub user: Option<String>,
}

impl From<ChannelObject> for Conversation {
    fn from(obj: ChannelObject) -> Self {
        let kind = if obj.is_im {
            ConversationKind::Im
        } else if obj.is_mpim {
            ConversationKind::Mpim
        } else if obj.is_private {
            ConversationKind::PrivateChannel
        } else {
            ConversationKind::PublicChannel
        };
        Self {
            id: obj.id,
            kind,
            name: obj.name,
            user: obj.user,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageObject {
    pub ts: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl From<MessageObject> for Message {
    fn from(obj: MessageObject) -> Self {
        Self {
            ts: obj.ts,
            user: obj.user,
            subtype: obj.subtype,
            text: obj.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_error_classifies_throttling() {
        let raw = r#"{"ok": false, "error": "ratelimited"}"#;
        let envelope: Envelope<EmptyBody> = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            envelope.into_body(),
            Err(CallError::Throttled { retry_after: None })
        ));
    }

    #[test]
    fn envelope_error_classifies_terminal_codes() {
        let raw = r#"{"ok": false, "error": "invalid_auth"}"#;
        let envelope: Envelope<EmptyBody> = serde_json::from_str(raw).unwrap();
        match envelope.into_body() {
            Err(CallError::Fatal(scour_core::Error::Request { code })) => {
                assert_eq!(code, "invalid_auth");
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn history_page_parses_with_cursor() {
        let raw = r#"{
            "ok": true,
            "messages": [
                {"ts": "1700000000.000100", "user": "U1", "text": "hi"},
                {"ts": "1700000000.000200", "subtype": "channel_join", "user": "U2"}
            ],
            "response_metadata": {"next_cursor": "dGVhbTpD"}
        }"#;
        let envelope: Envelope<HistoryBody> = serde_json::from_str(raw).unwrap();
        let body = envelope.into_body().unwrap();
        assert_eq!(body.messages.len(), 2);
        assert_eq!(
            body.response_metadata.and_then(ResponseMetadata::cursor),
            Some("dGVhbTpD".to_string())
        );
    }

    #[test]
    fn empty_cursor_means_last_page() {
        let raw = r#"{"ok": true, "channels": [], "response_metadata": {"next_cursor": ""}}"#;
        let envelope: Envelope<ListBody> = serde_json::from_str(raw).unwrap();
        let body = envelope.into_body().unwrap();
        assert_eq!(body.response_metadata.and_then(ResponseMetadata::cursor), None);
    }

    #[test]
    fn channel_object_maps_to_conversation_kinds() {
        let im: ChannelObject =
            serde_json::from_str(r#"{"id": "D1", "is_im": true, "user": "U7"}"#).unwrap();
        let conv: Conversation = im.into();
        assert_eq!(conv.kind, ConversationKind::Im);
        assert_eq!(conv.display_name(), "DM:U7");

        let private: ChannelObject =
            serde_json::from_str(r#"{"id": "G1", "name": "ops", "is_private": true}"#).unwrap();
        let conv: Conversation = private.into();
        assert_eq!(conv.kind, ConversationKind::PrivateChannel);
    }
}

#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::{Error, Result};

/// Well-known API error codes the pipeline needs to recognize.
pub mod error_code {
    pub const RATELIMITED: &str = "ratelimited";
    pub const MESSAGE_NOT_FOUND: &str = "message_not_found";
    pub const CANT_DELETE_MESSAGE: &str = "cant_delete_message";
    pub const CHANNEL_NOT_FOUND: &str = "channel_not_found";
}

/// The kind of messaging context a conversation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    PublicChannel,
    PrivateChannel,
    /// Multi-party direct message (group DM).
    Mpim,
    /// One-to-one direct message.
    Im,
}

impl ConversationKind {
    pub const ALL: [Self; 4] = [
        Self::PublicChannel,
        Self::PrivateChannel,
        Self::Mpim,
        Self::Im,
    ];

    /// Name used in the `types` parameter of the listing endpoint.
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::PublicChannel => "public_channel",
            Self::PrivateChannel => "private_channel",
            Self::Mpim => "mpim",
            Self::Im => "im",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public_channel" => Some(Self::PublicChannel),
            "private_channel" => Some(Self::PrivateChannel),
            "mpim" => Some(Self::Mpim),
            "im" => Some(Self::Im),
            _ => None,
        }
    }
}

/// A conversation the authenticated user belongs to.
///
/// The listing endpoint only returns conversations the user is a member of,
/// so membership is implicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub kind: ConversationKind,
    /// Channel name; absent for direct messages.
    pub name: Option<String>,
    /// Peer user id; present only for direct messages.
    pub user: Option<String>,
}

impl Conversation {
    /// Human-readable label for progress reporting.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.kind == ConversationKind::Im {
            let peer = self.user.as_deref().unwrap_or("unknown");
            return format!("DM:{peer}");
        }
        self.name.clone().unwrap_or_else(|| self.id.clone())
    }
}

/// One message in a conversation's history.
///
/// `ts` is the service-issued timestamp string; it is both the pagination
/// anchor and the identifier a delete call targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub ts: String,
    /// Author user id; system messages may have none.
    pub user: Option<String>,
    /// Set for system messages (joins, topic changes, bot posts).
    pub subtype: Option<String>,
    pub text: Option<String>,
}

impl Message {
    #[must_use]
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.user.as_deref() == Some(user_id)
    }

    /// Whether this message qualifies for deletion by `user_id`: authored by
    /// them and not a system message.
    #[must_use]
    pub fn is_deletable_by(&self, user_id: &str) -> bool {
        self.is_authored_by(user_id) && self.subtype.is_none()
    }
}

/// One page of a cursor-paginated listing.
///
/// `next_cursor` is `None` on the final page. Cursors are opaque; callers
/// must never derive them from item positions.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// The remote workspace API surface the pipeline consumes.
///
/// The production implementation lives in `scour_slack`; tests substitute
/// in-memory fakes. Implementations are expected to absorb throttling
/// internally and only surface the error taxonomy in [`Error`].
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Resolve the authenticated user's id.
    async fn identity(&self) -> Result<String>;

    /// Fetch one page of conversations of the given kinds.
    async fn list_conversations(
        &self,
        kinds: &[ConversationKind],
        cursor: Option<&str>,
    ) -> Result<Page<Conversation>>;

    /// Fetch one page of a conversation's message history.
    async fn history(&self, conversation_id: &str, cursor: Option<&str>) -> Result<Page<Message>>;

    /// Delete a single message.
    async fn delete_message(&self, conversation_id: &str, ts: &str) -> Result<()>;
}

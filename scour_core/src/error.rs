//! Error taxonomy shared by every crate in the workspace.
//!
//! Fatal for the whole run: [`Error::CorruptCheckpoint`], [`Error::Enumeration`].
//! Fatal for the current conversation only: [`Error::Network`], [`Error::Request`]
//! (except the "not found" variants the pipeline treats as already deleted).
//! Throttling never appears here; the client absorbs it as backpressure.

use thiserror::Error;

use crate::error_code;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The checkpoint file exists but cannot be parsed. Surfaced to the user
    /// instead of silently starting over, so real corruption is never masked.
    #[error("checkpoint file {path} is corrupt: {reason} (delete it to reset progress)")]
    CorruptCheckpoint { path: String, reason: String },

    /// Listing conversations failed; without the full list, "every conversation
    /// was considered" cannot be guaranteed, so the run aborts.
    #[error("conversation listing failed: {0}")]
    Enumeration(String),

    /// Transport-level failure that survived every retry.
    #[error("network failure after {attempts} attempts: {reason}")]
    Network { attempts: usize, reason: String },

    /// The service rejected the request with an error code. Never retried.
    #[error("request rejected: {code}")]
    Request { code: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn request(code: impl Into<String>) -> Self {
        Self::Request { code: code.into() }
    }

    /// A delete that targets a message that no longer exists. Treated as
    /// success so re-runs are idempotent.
    #[must_use]
    pub fn is_already_deleted(&self) -> bool {
        matches!(self, Self::Request { code } if code == error_code::MESSAGE_NOT_FOUND)
    }

    /// The service refuses to delete this message (e.g. admin-locked).
    #[must_use]
    pub fn is_undeletable(&self) -> bool {
        matches!(self, Self::Request { code } if code == error_code::CANT_DELETE_MESSAGE)
    }

    /// The conversation itself is gone or inaccessible.
    #[must_use]
    pub fn is_conversation_gone(&self) -> bool {
        matches!(self, Self::Request { code } if code == error_code::CHANNEL_NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_delete_counts_as_already_deleted() {
        assert!(Error::request("message_not_found").is_already_deleted());
        assert!(!Error::request("cant_delete_message").is_already_deleted());
        assert!(Error::request("cant_delete_message").is_undeletable());
    }

    #[test]
    fn missing_conversation_is_recognized() {
        assert!(Error::request("channel_not_found").is_conversation_gone());
        assert!(!Error::request("message_not_found").is_conversation_gone());
    }

    #[test]
    fn network_error_is_not_a_request_error() {
        let err = Error::Network {
            attempts: 4,
            reason: "connection reset".to_string(),
        };
        assert!(!err.is_already_deleted());
        assert!(!err.is_undeletable());
        assert!(!err.is_conversation_gone());
    }
}

//! Cursor-following scan over a single conversation's history.

use scour_core::{Message, Result, SlackApi};
use tracing::debug;

/// Pages through one conversation's history in the order the service exposes
/// it (newest first).
///
/// Pagination is by opaque cursor only. Deleting messages between page
/// fetches is safe: the cursor anchors to the last message seen, not to a
/// numeric offset, so later messages are neither skipped nor repeated.
pub struct HistoryScanner<'a, A: SlackApi + ?Sized> {
    api: &'a A,
    conversation_id: &'a str,
    cursor: Option<String>,
    done: bool,
}

impl<'a, A: SlackApi + ?Sized> HistoryScanner<'a, A> {
    #[must_use]
    pub const fn new(api: &'a A, conversation_id: &'a str) -> Self {
        Self {
            api,
            conversation_id,
            cursor: None,
            done: false,
        }
    }

    /// Fetch the next page of messages, or `None` once the history is
    /// exhausted. Errors from the underlying client propagate unchanged.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Message>>> {
        if self.done {
            return Ok(None);
        }

        let page = self
            .api
            .history(self.conversation_id, self.cursor.as_deref())
            .await?;

        debug!(
            "History page for {}: {} messages, more: {}",
            self.conversation_id,
            page.items.len(),
            !page.is_last()
        );

        self.cursor = page.next_cursor;
        if self.cursor.is_none() {
            self.done = true;
        }

        // A final empty page just ends the scan.
        if page.items.is_empty() && self.done {
            return Ok(None);
        }
        Ok(Some(page.items))
    }
}

//! Conversation enumeration.

use scour_core::{Conversation, ConversationKind, Error, Result, SlackApi};
use tracing::{debug, info};

/// Collect every conversation of the given kinds the user belongs to.
///
/// Enumeration is cheap and redone on every run; it is never checkpointed.
/// Any page failure is promoted to [`Error::Enumeration`] — without the full
/// list, "only your messages, everywhere" cannot be guaranteed, so the caller
/// must abort the run.
pub async fn list_all_conversations<A: SlackApi + ?Sized>(
    api: &A,
    kinds: &[ConversationKind],
) -> Result<Vec<Conversation>> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = api
            .list_conversations(kinds, cursor.as_deref())
            .await
            .map_err(|e| Error::Enumeration(e.to_string()))?;

        debug!("Fetched conversation page: {} items", page.items.len());
        all.extend(page.items);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!("Found {} conversations", all.len());
    Ok(all)
}

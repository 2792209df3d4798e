use std::fmt;

use scour_checkpoint::CheckpointStore;
use scour_core::{Conversation, ConversationKind, Error, Result, SlackApi};
use tracing::{debug, info, warn};

/// Run-wide settings passed in explicitly; no ambient globals.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The authenticated user whose messages are deleted. Nothing authored by
    /// anyone else is ever targeted.
    pub user_id: String,
    pub kinds: Vec<ConversationKind>,
    /// Report what would be deleted without issuing delete calls and without
    /// checkpointing anything.
    pub dry_run: bool,
}

/// Outcome of processing a single conversation.
#[derive(Debug)]
pub enum ProcessResult {
    /// Every qualifying message was confirmed deleted (or none existed) and
    /// the conversation was checkpointed (unless dry-run).
    Completed { deleted: usize, skipped: usize },
    /// Already checkpointed by an earlier run; not scanned at all.
    Skipped,
    /// Processing aborted; the conversation is not checkpointed and will be
    /// retried on the next invocation. Deletions already performed before the
    /// failure are real and carried in `deleted` so the summary stays honest.
    Failed {
        error: Error,
        deleted: usize,
        skipped: usize,
    },
}

/// Counters reported at the end of a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub completed: usize,
    pub skipped_conversations: usize,
    /// `(conversation id, reason)` for every conversation left incomplete.
    pub failed: Vec<(String, String)>,
    pub deleted_messages: usize,
    /// Other authors' messages, system messages, and undeletable messages.
    pub skipped_messages: usize,
    pub dry_run: bool,
}

impl RunSummary {
    /// Whether every conversation completed or was already checkpointed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.dry_run { "Would delete" } else { "Deleted" };
        writeln!(
            f,
            "{verb}: {} messages (skipped {})",
            self.deleted_messages, self.skipped_messages
        )?;
        write!(
            f,
            "Conversations: {} completed, {} already done, {} failed",
            self.completed,
            self.skipped_conversations,
            self.failed.len()
        )?;
        for (id, reason) in &self.failed {
            write!(f, "\n  failed {id}: {reason}")?;
        }
        Ok(())
    }
}

/// The sequential scan-filter-delete-checkpoint loop.
pub struct Pipeline<A: SlackApi> {
    api: A,
    checkpoint: CheckpointStore,
    config: PipelineConfig,
}

impl<A: SlackApi> Pipeline<A> {
    pub const fn new(api: A, checkpoint: CheckpointStore, config: PipelineConfig) -> Self {
        Self {
            api,
            checkpoint,
            config,
        }
    }

    #[must_use]
    pub const fn checkpoint(&self) -> &CheckpointStore {
        &self.checkpoint
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Give the client back, e.g. to rebuild a pipeline for a fresh run.
    #[must_use]
    pub fn into_api(self) -> A {
        self.api
    }

    /// Process every conversation. Only enumeration failure is fatal; each
    /// conversation's failures are reported in the summary instead.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let conversations =
            crate::enumerate::list_all_conversations(&self.api, &self.config.kinds).await?;

        let mut summary = RunSummary {
            dry_run: self.config.dry_run,
            ..RunSummary::default()
        };
        let total = conversations.len();

        for (i, conversation) in conversations.iter().enumerate() {
            info!(
                "Processing {} ({}) [{}/{total}]",
                conversation.display_name(),
                conversation.id,
                i + 1
            );

            match self.process_conversation(conversation).await {
                ProcessResult::Completed { deleted, skipped } => {
                    summary.completed += 1;
                    summary.deleted_messages += deleted;
                    summary.skipped_messages += skipped;
                    if deleted > 0 {
                        info!("  -> {} messages", deleted);
                    }
                }
                ProcessResult::Skipped => {
                    debug!("  -> already complete, skipping");
                    summary.skipped_conversations += 1;
                }
                ProcessResult::Failed {
                    error,
                    deleted,
                    skipped,
                } => {
                    if error.is_conversation_gone() {
                        warn!(
                            "  -> {} is not accessible; will retry on next run",
                            conversation.display_name()
                        );
                    } else {
                        warn!("  -> failed: {error}; will retry on next run");
                    }
                    summary.deleted_messages += deleted;
                    summary.skipped_messages += skipped;
                    summary
                        .failed
                        .push((conversation.id.clone(), error.to_string()));
                }
            }
        }

        Ok(summary)
    }

    /// Per-conversation state machine: Pending -> Skipped if checkpointed,
    /// otherwise Scanning -> Deleting -> Completed or Failed.
    pub async fn process_conversation(&mut self, conversation: &Conversation) -> ProcessResult {
        if self.checkpoint.is_complete(&conversation.id) {
            return ProcessResult::Skipped;
        }

        let outcome = self.scrub(conversation).await;
        let deleted = outcome.deleted;
        let skipped = outcome.skipped + outcome.undeletable;

        if let Some(error) = outcome.error {
            return ProcessResult::Failed {
                error,
                deleted,
                skipped,
            };
        }

        if outcome.undeletable > 0 {
            // Locked messages remain, so the conversation is not verifiably
            // clean. Leave it un-checkpointed for a later run to retry.
            warn!(
                "{}: {} messages could not be deleted",
                conversation.display_name(),
                outcome.undeletable
            );
            return ProcessResult::Failed {
                error: Error::request(scour_core::error_code::CANT_DELETE_MESSAGE),
                deleted,
                skipped,
            };
        }

        if !self.config.dry_run {
            if let Err(error) = self.checkpoint.mark_complete(&conversation.id) {
                return ProcessResult::Failed {
                    error,
                    deleted,
                    skipped,
                };
            }
        }

        ProcessResult::Completed { deleted, skipped }
    }

    /// Scan the history and delete qualifying messages. Counts accumulated
    /// before a fatal error are kept alongside it; the deletions happened.
    async fn scrub(&self, conversation: &Conversation) -> ScrubOutcome {
        let mut outcome = ScrubOutcome::default();

        let mut scanner = crate::scan::HistoryScanner::new(&self.api, &conversation.id);

        loop {
            let messages = match scanner.next_page().await {
                Ok(Some(messages)) => messages,
                Ok(None) => break,
                Err(err) => {
                    outcome.error = Some(err);
                    return outcome;
                }
            };

            for message in &messages {
                if !message.is_deletable_by(&self.config.user_id) {
                    outcome.skipped += 1;
                    continue;
                }

                if self.config.dry_run {
                    info!("  [dry-run] would delete: {}", preview(message.text.as_deref()));
                    outcome.deleted += 1;
                    continue;
                }

                match self.api.delete_message(&conversation.id, &message.ts).await {
                    Ok(()) => {
                        debug!("  Deleted: {}", preview(message.text.as_deref()));
                        outcome.deleted += 1;
                    }
                    // Already gone; a previous interrupted run got to it first.
                    Err(err) if err.is_already_deleted() => outcome.deleted += 1,
                    Err(err) if err.is_undeletable() => outcome.undeletable += 1,
                    Err(err) => {
                        outcome.error = Some(err);
                        return outcome;
                    }
                }
            }
        }

        outcome
    }
}

/// What a single conversation scan actually did, fatal error or not.
#[derive(Debug, Default)]
struct ScrubOutcome {
    deleted: usize,
    skipped: usize,
    undeletable: usize,
    error: Option<Error>,
}

/// First few characters of a message for log lines.
fn preview(text: Option<&str>) -> String {
    let text = text.unwrap_or("");
    if text.chars().count() <= 50 {
        text.to_string()
    } else {
        let cut: String = text.chars().take(50).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_text_on_char_boundaries() {
        let long = "é".repeat(80);
        let p = preview(Some(&long));
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 53);
        assert_eq!(preview(Some("short")), "short");
        assert_eq!(preview(None), "");
    }

    #[test]
    fn summary_display_lists_failures() {
        let summary = RunSummary {
            completed: 2,
            skipped_conversations: 1,
            failed: vec![("C9".to_string(), "network failure".to_string())],
            deleted_messages: 7,
            skipped_messages: 3,
            dry_run: false,
        };
        let text = summary.to_string();
        assert!(text.contains("Deleted: 7 messages"));
        assert!(text.contains("1 failed"));
        assert!(text.contains("failed C9: network failure"));
        assert!(!summary.is_clean());
    }

    #[test]
    fn dry_run_summary_uses_conditional_wording() {
        let summary = RunSummary {
            deleted_messages: 4,
            dry_run: true,
            ..RunSummary::default()
        };
        assert!(summary.to_string().contains("Would delete: 4 messages"));
        assert!(summary.is_clean());
    }
}

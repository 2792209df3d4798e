use anyhow::Context;
use scour_checkpoint::CheckpointStore;
use scour_config::Config;
use scour_core::{ConversationKind, SlackApi};
use scour_pipeline::{Pipeline, PipelineConfig};
use scour_slack::SlackClient;
use tracing::info;

/// Strategy for the full cleanup run.
///
/// Loads config and checkpoint, resolves the user's identity, and drives the
/// deletion pipeline over every conversation. Checkpoint-load and enumeration
/// failures abort; per-conversation failures are summarized and turn into a
/// nonzero exit without stopping the sweep.
#[derive(Debug, Clone, Copy)]
pub struct RunStrategy;

pub struct RunInput {
    pub dry_run: bool,
    /// Kind names from the command line; overrides the config filter.
    pub kinds: Vec<String>,
}

impl super::CommandStrategy for RunStrategy {
    type Input = RunInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        info!("Loaded config from ~/scour/config.json");

        let kinds = resolve_kinds(&input, &config)?;
        let dry_run = input.dry_run || config.dry_run;
        if dry_run {
            info!("Dry run: nothing will be deleted");
        }

        let checkpoint = CheckpointStore::load(config.checkpoint_path()?)?;

        let client = SlackClient::new(config.slack.token.clone());
        let user_id = client
            .identity()
            .await
            .context("Could not resolve your user id. Check your token.")?;
        info!("Your user id: {user_id}");

        let mut pipeline = Pipeline::new(
            client,
            checkpoint,
            PipelineConfig {
                user_id,
                kinds,
                dry_run,
            },
        );

        let summary = pipeline.run().await?;
        println!("{summary}");

        if !summary.is_clean() {
            anyhow::bail!(
                "{} conversations failed; they are not checkpointed and will be retried on the next run",
                summary.failed.len()
            );
        }
        Ok(())
    }
}

fn resolve_kinds(input: &RunInput, config: &Config) -> anyhow::Result<Vec<ConversationKind>> {
    if input.kinds.is_empty() {
        return Ok(config.filters.effective_kinds());
    }
    input
        .kinds
        .iter()
        .map(|name| {
            ConversationKind::parse(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown conversation kind '{name}' (expected public_channel, private_channel, mpim, or im)"
                )
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(kinds: &[&str]) -> RunInput {
        RunInput {
            dry_run: false,
            kinds: kinds.iter().map(ToString::to_string).collect(),
        }
    }

    fn config() -> Config {
        serde_config(r#"{"slack": {"token": "xoxp-test"}}"#)
    }

    fn serde_config(raw: &str) -> Config {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn cli_kinds_override_config() {
        let kinds = resolve_kinds(&input(&["im"]), &config()).unwrap();
        assert_eq!(kinds, vec![ConversationKind::Im]);
    }

    #[test]
    fn no_cli_kinds_falls_back_to_config_default() {
        let kinds = resolve_kinds(&input(&[]), &config()).unwrap();
        assert_eq!(kinds.len(), 4);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(resolve_kinds(&input(&["channel"]), &config()).is_err());
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use scour_core::ConversationKind;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub slack: SlackConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    /// Report what would be deleted without deleting anything.
    #[serde(default)]
    pub dry_run: bool,
    /// Checkpoint file location; defaults to `~/scour/processed_conversations.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SlackConfig {
    /// User OAuth token. Scopes needed: chat:write plus the history and read
    /// scopes for every conversation kind being scrubbed.
    pub token: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct FilterConfig {
    /// Conversation kinds to process. Empty means all four.
    #[serde(default)]
    pub kinds: Vec<ConversationKind>,
}

impl FilterConfig {
    /// The effective kind list, expanding "unset" to every kind.
    #[must_use]
    pub fn effective_kinds(&self) -> Vec<ConversationKind> {
        if self.kinds.is_empty() {
            ConversationKind::ALL.to_vec()
        } else {
            self.kinds.clone()
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'scour init' to create it, then add your Slack token.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.slack.token.is_empty() || self.slack.token == "your-slack-user-token-here" {
            anyhow::bail!(
                "'slack.token' is not set. Edit ~/scour/config.json and add your user OAuth token."
            );
        }
        Ok(())
    }

    /// Resolved checkpoint file path.
    pub fn checkpoint_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.checkpoint_file {
            return Ok(path.clone());
        }
        Ok(Self::config_dir()?.join("processed_conversations.json"))
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("scour"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, Self::template())?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Slack user OAuth token");
        println!("   2. Run 'scour run --dry-run' to preview what would be deleted");
        println!("   3. Run 'scour run' to delete your messages");
        println!();
        println!("🔧 Configuration options:");
        println!("   - filters.kinds: restrict to some of public_channel, private_channel, mpim, im");
        println!("   - dry_run: true to always preview instead of deleting");
        println!("   - checkpoint_file: override the resume-checkpoint location");
        println!();
        Ok(())
    }

    const fn template() -> &'static str {
        r#"{
  "slack": {
    "token": "your-slack-user-token-here"
  },
  "filters": {
    "kinds": []
  },
  "dry_run": false
}"#
    }
}

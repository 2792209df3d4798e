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

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use command::{
    CommandStrategy, InitStrategy, RunInput, RunStrategy, StatusStrategy, VersionStrategy,
};

mod command;

#[derive(Parser)]
#[command(name = "scour")]
#[command(about = "Delete your own messages across a Slack workspace", long_about = None)]
struct Cli {
    /// Defaults to `run` when no subcommand is given.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan every conversation and delete your messages
    Run {
        /// Report what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,

        /// Conversation kinds to process (public_channel, private_channel,
        /// mpim, im); default is all four
        #[arg(short = 'k', long, value_delimiter = ',')]
        kinds: Vec<String>,
    },
    /// Show checkpoint progress
    Status,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| Commands::Run {
        dry_run: false,
        kinds: Vec::new(),
    });

    match command {
        Commands::Run { dry_run, kinds } => RunStrategy.execute(RunInput { dry_run, kinds }).await,
        Commands::Status => StatusStrategy.execute(()).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}

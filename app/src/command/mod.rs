//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own type; dispatch is static
//! and each strategy defines its own input via an associated type.

mod init;
mod run;
mod status;
mod version;

pub use init::InitStrategy;
pub use run::{RunInput, RunStrategy};
pub use status::StatusStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails; `main` maps it to a
    /// nonzero exit code.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

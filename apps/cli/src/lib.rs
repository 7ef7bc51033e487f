//! # Deploy Pack CLI
//!
//! Thin host around the resolver: loads settings and the target policy, runs one
//! resolution, and hands the tree back for printing.
//!
//! ## Example
//! ```no_run
//! use clap::Parser;
//! use dpack_cli::{Cli, CliConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cli = Cli::parse();
//! let tree = dpack_cli::run(cli.command, CliConfig::default()).await?;
//! # Ok(())
//! # }
//! ```

mod args;
mod settings;

pub use args::{Cli, Command, TargetArgs};
pub use settings::{CliConfig, LoggingSettings};

use anyhow::{Context, Result};
use dpack::domain::target::DeployTarget;
use dpack::domain::tree::ConfigurationTree;
use dpack::kernel::secrets::SecretEnvironment;
use tracing::info;

/// Runs one resolution against the process environment.
///
/// # Errors
/// Returns an error if the policy table is invalid or the resolution fails.
pub async fn run(command: Command, config: CliConfig) -> Result<ConfigurationTree> {
    config.policy.validate().context("Invalid [policy] table")?;

    let resolver = dpack::resolver(config.engine, SecretEnvironment::from_process());

    let tree = match command {
        Command::Resolve(args) => {
            let target = DeployTarget::from(args.target);
            info!(prefix = %args.prefix, deploy_target = %target, "Resolving deploy configuration");
            resolver.resolve(&args.prefix, &args.app, &target, &config.policy).await?
        },
        Command::Batch { target: args, latest } => {
            let target = DeployTarget::from(args.target);
            info!(prefix = %args.prefix, deploy_target = %target, latest, "Resolving batch configuration");
            resolver.resolve_batch(&args.prefix, &args.app, &target, &config.policy, latest).await?
        },
    };

    Ok(tree)
}

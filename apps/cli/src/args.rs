//! # CLI Argument Definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dpack")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Resolves the deployment plugin configuration for a target")]
pub struct Cli {
    /// Settings file (TOML, JSON or YAML). Defaults to `dpack.*` in the working directory.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Standard deploy: fetch the host env file and build every section
    Resolve(TargetArgs),
    /// Batch build: read the settings object from the object store, no secret channel
    Batch {
        #[command(flatten)]
        target: TargetArgs,
        /// Publish under the `latest` revision key instead of the revision index
        #[arg(long)]
        latest: bool,
    },
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Application prefix used for keys and asset paths (e.g. 'blog-app')
    pub prefix: String,
    /// Human-readable application name used in notifications
    pub app: String,
    /// Deploy target (e.g. 'aws-prod', 'development-postbuild')
    pub target: String,
}

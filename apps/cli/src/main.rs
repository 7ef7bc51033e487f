use anyhow::Context;
use clap::Parser;
use dpack::kernel::config::load_config;
use dpack_cli::{Cli, CliConfig};
use std::io::Write;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config: CliConfig =
        load_config(cli.config.as_deref()).context("Critical: Configuration is malformed")?;
    let _log = config.logging.init()?;

    let tree = dpack_cli::run(cli.command, config).await?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &tree)?;
    writeln!(stdout)?;
    Ok(())
}

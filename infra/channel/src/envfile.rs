use crate::error::{ChannelError, ChannelErrorExt};
use dpack_kernel::secrets::SecretEnvironment;
use std::path::Path;
use tokio::fs;

/// Parses `KEY=value` lines (dotenv syntax: comments, quotes, `export`) into a
/// [`SecretEnvironment`]. Later duplicates replace earlier ones.
pub fn parse_env(contents: &[u8]) -> Result<SecretEnvironment, ChannelError> {
    let mut env = SecretEnvironment::new();
    for item in dotenvy::from_read_iter(contents) {
        let (key, value) = item.context("Invalid env line")?;
        env.insert(key, value);
    }
    Ok(env)
}

/// Reads and parses a materialized env file.
pub async fn read_env_file(path: &Path) -> Result<SecretEnvironment, ChannelError> {
    let contents =
        fs::read(path).await.context(format!("Failed to read env file: {}", path.display()))?;
    parse_env(&contents)
}

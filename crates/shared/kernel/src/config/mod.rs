use crate::error::{KernelError, KernelErrorExt};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment prefix for setting overrides (`DPACK__CHANNEL__TIMEOUT_SECONDS=30`).
pub const ENV_PREFIX: &str = "DPACK";

const DEFAULT_SETTINGS_FILE: &str = "dpack";

/// Loads settings from a file layered with `DPACK__`-prefixed environment overrides.
///
/// 1. **Base File**: `path`, or `dpack.{toml,json,yaml}` in the working directory.
///    The format follows the file extension.
/// 2. **Environment Overrides**: `DPACK__SECTION__KEY` maps to `section.key`.
///
/// # Errors
/// Returns [`KernelError::Config`] if the file is missing, an override is malformed,
/// or the merged values do not match `T`.
///
/// # Example
/// ```rust,no_run
/// use dpack_kernel::config::load_config;
/// use dpack_kernel::domain::config::EngineSettings;
///
/// let settings: EngineSettings = load_config(Some("config/dpack.toml")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, KernelError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE), |p| p.as_ref().to_path_buf());

    info!("Loading settings from {}", effective_path.display());

    Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("batch.allowed_keys")
                .with_list_parse_key("sections.exclude")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build settings")?
        .try_deserialize::<T>()
        .context("Failed to deserialize settings")
}

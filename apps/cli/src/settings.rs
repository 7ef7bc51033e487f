use dpack::domain::config::EngineSettings;
use dpack::kernel::policy::PolicyTable;
use dpack::logger::{Logger, LoggerError};
use serde::Deserialize;
use std::path::PathBuf;

/// Settings file of the `dpack` binary: engine settings at the top level plus
/// `[logging]` and `[policy]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub engine: EngineSettings,
    pub logging: LoggingSettings,
    pub policy: PolicyTable,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub console: bool,
    /// Directory for rolling log files; console only when unset.
    pub path: Option<PathBuf>,
    pub json: bool,
    pub env_filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_owned(), console: true, path: None, json: false, env_filter: None }
    }
}

impl LoggingSettings {
    /// Installs the global subscriber described by these settings.
    pub fn init(&self) -> Result<Logger, LoggerError> {
        let mut builder =
            Logger::builder().name(env!("CARGO_PKG_NAME")).level_name(&self.level)?.console(self.console);
        if let Some(filter) = &self.env_filter {
            builder = builder.env_filter(filter);
        }

        match &self.path {
            Some(path) if self.json => builder.path(path).json().init(),
            Some(path) => builder.path(path).init(),
            None => builder.init(),
        }
    }
}

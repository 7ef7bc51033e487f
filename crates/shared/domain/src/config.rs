use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Engine settings shared by every resolution.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettingsInner {
    pub channel: ChannelConfig,
    pub services: ServicesConfig,
    pub batch: BatchConfig,
    pub sections: SectionsConfig,
}

/// Thin Arc-wrapped settings for inexpensive cloning into resolvers.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct EngineSettings {
    #[serde(flatten, default)]
    inner: Arc<EngineSettingsInner>,
}

impl Deref for EngineSettings {
    type Target = EngineSettingsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for EngineSettings {
    fn deref_mut(&mut self) -> &mut EngineSettingsInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Secured channel used to pull the remote env file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Application root under the remote user's home directory.
    pub app_root: String,
    /// Local file the remote env file is materialized into.
    pub local_env_file: PathBuf,
    /// Private key used when no agent socket is available.
    /// Defaults to `/home/$USER/.ssh/id_rsa`.
    pub private_key: Option<PathBuf>,
    /// Upper bound for the whole transfer; `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,
    pub scp_program: String,
    pub port: Option<u16>,
}

impl ChannelConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Remote env file path for a user: `/home/<user>/<app_root>/shared/.env`.
    #[must_use]
    pub fn remote_env_path(&self, username: &str) -> String {
        format!("/home/{username}/{}/shared/.env", self.app_root)
    }
}

/// Fixed endpoints and policies baked into sections.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub redis_host: String,
    pub redis_port: u16,
    pub development_revision_key: String,
    pub max_recent_uploads: u32,
    pub sentry_url: String,
    pub activation_command: String,
}

/// Batch ("latest") resolutions: where the settings object lives and what to import.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Bucket holding settings objects; falls back to `AWS_ASSET_BUCKET`.
    pub settings_bucket: Option<String>,
    pub settings_object: String,
    /// Keys copied from the settings object into the secret environment.
    pub allowed_keys: Vec<String>,
    /// Root directory of the local object store.
    pub store_root: PathBuf,
}

/// Declarative overrides applied on top of the built-in section tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SectionsConfig {
    /// Section names dropped from every resolution.
    pub exclude: Vec<String>,
}

// --- Default ---

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            app_root: "eternal-sledgehammer".to_owned(),
            local_env_file: PathBuf::from(".env.remote"),
            private_key: None,
            timeout_seconds: None,
            scp_program: "scp".to_owned(),
            port: None,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            redis_host: "localhost".to_owned(),
            redis_port: 6379,
            development_revision_key: "__development__".to_owned(),
            max_recent_uploads: 100,
            sentry_url: "https://sentry.io".to_owned(),
            activation_command: "ember deploy:activate".to_owned(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            settings_bucket: None,
            settings_object: "app-settings.json".to_owned(),
            allowed_keys: Vec::new(),
            store_root: PathBuf::from("objects"),
        }
    }
}

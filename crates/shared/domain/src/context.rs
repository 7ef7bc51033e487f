//! Deployment-time data. The plugin pipeline builds [`DeploymentContext`] after the
//! configuration tree has been resolved; hooks in the tree are evaluated against it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome data supplied by the plugin pipeline once a deploy or activation has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentContext {
    pub revision_data: RevisionData,
    pub command_options: CommandOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevisionData {
    pub revision_key: Option<String>,
    pub activated_revision_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandOptions {
    /// Set on explicit activation runs (`--revision=<key>`).
    pub revision: Option<String>,
    pub build_dir: Option<PathBuf>,
}

impl CommandOptions {
    /// `true` when a non-empty revision was passed on the command line.
    #[must_use]
    pub fn has_revision(&self) -> bool {
        self.revision.as_deref().is_some_and(|r| !r.is_empty())
    }
}

/// Values captured at resolution time for notification formatting.
///
/// Formatting never consults the target policy again; everything it needs is here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContext {
    pub app_name: String,
    pub domain: String,
    pub prefix: String,
    /// Deploy target label used in message text only.
    pub target_label: String,
    /// Command suggested for activating a deployed-but-inactive revision.
    pub activation_command: String,
}

/// A section value whose content depends on data that only exists after deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hook", content = "context", rename_all = "camelCase")]
pub enum DeferredHook {
    /// Resolves to `commandOptions.buildDir`.
    DistDir,
    /// Notification after upload; see `didDeploy`.
    DidDeploy(NotificationContext),
    /// Notification after an explicit activation; see `didActivate`.
    DidActivate(NotificationContext),
}

impl DeferredHook {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DistDir => "distDir",
            Self::DidDeploy(_) => "didDeploy",
            Self::DidActivate(_) => "didActivate",
        }
    }
}

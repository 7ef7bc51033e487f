use crate::constants::DEVELOPMENT_POSTBUILD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque deploy target identifier (e.g. `aws-prod`, `staging`, `qa-3`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeployTarget(String);

impl DeployTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.0 == DEVELOPMENT_POSTBUILD
    }

    /// Upper-cased, shell-safe form used for target-prefixed environment keys
    /// (`aws-prod` -> `AWS_PROD`).
    #[must_use]
    pub fn env_prefix(&self) -> String {
        self.0
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

impl From<&str> for DeployTarget {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DeployTarget {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for DeployTarget {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deploy-target class; drives every branch of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetClass {
    /// Local post-build run: cache section only, no network.
    DevelopmentPostbuild,
    /// Reached through a jump host; tunnel is two-hop.
    BastionFronted,
    /// Production-like and reachable directly.
    DirectProduction,
    /// Anything else (staging, QA slots).
    Generic,
}

impl TargetClass {
    /// Classifies a target. The development check happens first and needs no policy facts.
    #[must_use]
    pub fn classify(target: &DeployTarget, bastion_host: Option<&str>, production: bool) -> Self {
        if target.is_development() {
            Self::DevelopmentPostbuild
        } else if bastion_host.is_some_and(|h| !h.trim().is_empty()) {
            Self::BastionFronted
        } else if production {
            Self::DirectProduction
        } else {
            Self::Generic
        }
    }

    #[must_use]
    pub const fn is_two_hop(self) -> bool {
        matches!(self, Self::BastionFronted)
    }
}

/// Value of `build.environment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildEnvironment {
    Development,
    Staging,
    Production,
}

impl BuildEnvironment {
    #[must_use]
    pub const fn from_production(production: bool) -> Self {
        if production { Self::Production } else { Self::Staging }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for BuildEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

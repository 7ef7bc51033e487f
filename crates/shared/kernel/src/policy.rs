//! Target policy: per-deploy-target facts the engine consumes but never computes.

use crate::error::KernelError;
use dpack_domain::target::DeployTarget;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Synchronous, side-effect-free lookups keyed by deploy target.
pub trait TargetPolicy: Send + Sync {
    /// Rejecting a target is fatal and happens before any network activity.
    /// Policies without validation accept everything.
    fn is_valid_target(&self, _target: &DeployTarget) -> bool {
        true
    }

    fn domain(&self, target: &DeployTarget) -> String;

    /// Jump host in front of the target; `None` means a direct connection.
    fn bastion_host(&self, target: &DeployTarget) -> Option<String>;

    fn is_production(&self, target: &DeployTarget) -> bool;

    fn ssh_username(&self) -> &str;

    /// Organization slug for error-tracking uploads.
    fn sentry_org(&self, target: &DeployTarget) -> String;
}

impl<P: TargetPolicy + ?Sized> TargetPolicy for &P {
    fn is_valid_target(&self, target: &DeployTarget) -> bool {
        (**self).is_valid_target(target)
    }

    fn domain(&self, target: &DeployTarget) -> String {
        (**self).domain(target)
    }

    fn bastion_host(&self, target: &DeployTarget) -> Option<String> {
        (**self).bastion_host(target)
    }

    fn is_production(&self, target: &DeployTarget) -> bool {
        (**self).is_production(target)
    }

    fn ssh_username(&self) -> &str {
        (**self).ssh_username()
    }

    fn sentry_org(&self, target: &DeployTarget) -> String {
        (**self).sentry_org(target)
    }
}

/// Facts for one deploy target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TargetFacts {
    pub domain: String,
    pub bastion_host: Option<String>,
    pub production: bool,
    pub sentry_org: String,
}

/// A [`TargetPolicy`] backed by a static table, usually the `[policy]` block of the
/// settings file.
///
/// ```toml
/// [policy]
/// ssh_username = "deploy"
///
/// [policy.targets.aws-prod]
/// domain = "blog.example.com"
/// bastion_host = "bastion.example.com"
/// production = true
/// sentry_org = "example"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyTable {
    pub ssh_username: String,
    /// Only listed targets are valid when set.
    pub strict: bool,
    /// Facts for targets that are not listed.
    pub defaults: TargetFacts,
    pub targets: BTreeMap<String, TargetFacts>,
}

impl PolicyTable {
    #[must_use]
    pub fn new(ssh_username: impl Into<String>) -> Self {
        Self { ssh_username: ssh_username.into(), strict: true, ..Self::default() }
    }

    #[must_use]
    pub fn target(mut self, name: impl Into<String>, facts: TargetFacts) -> Self {
        self.targets.insert(name.into(), facts);
        self
    }

    fn facts(&self, target: &DeployTarget) -> &TargetFacts {
        self.targets.get(target.as_str()).unwrap_or(&self.defaults)
    }

    /// Checks the table is usable before resolving against it.
    ///
    /// # Errors
    /// Returns [`KernelError::Policy`] if the SSH username is blank or a listed
    /// target has no domain.
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.ssh_username.trim().is_empty() {
            return Err(KernelError::Policy {
                message: "ssh_username cannot be empty".into(),
                context: None,
            });
        }

        if let Some((name, _)) = self.targets.iter().find(|(_, f)| f.domain.trim().is_empty()) {
            return Err(KernelError::Policy {
                message: format!("target '{name}' has no domain").into(),
                context: None,
            });
        }

        Ok(())
    }
}

impl TargetPolicy for PolicyTable {
    fn is_valid_target(&self, target: &DeployTarget) -> bool {
        !self.strict || self.targets.contains_key(target.as_str())
    }

    fn domain(&self, target: &DeployTarget) -> String {
        self.facts(target).domain.clone()
    }

    fn bastion_host(&self, target: &DeployTarget) -> Option<String> {
        self.facts(target).bastion_host.clone().filter(|h| !h.trim().is_empty())
    }

    fn is_production(&self, target: &DeployTarget) -> bool {
        self.facts(target).production
    }

    fn ssh_username(&self) -> &str {
        &self.ssh_username
    }

    fn sentry_org(&self, target: &DeployTarget) -> String {
        self.facts(target).sentry_org.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PolicyTable {
        PolicyTable::new("deploy").target(
            "aws-prod",
            TargetFacts {
                domain: "blog.example.com".to_owned(),
                bastion_host: Some("bastion.example.com".to_owned()),
                production: true,
                sentry_org: "example".to_owned(),
            },
        )
    }

    #[test]
    fn strict_table_rejects_unknown_targets() {
        let policy = table();
        assert!(policy.is_valid_target(&"aws-prod".into()));
        assert!(!policy.is_valid_target(&"aws-qa".into()));
    }

    #[test]
    fn lenient_table_falls_back_to_defaults() {
        let mut policy = table();
        policy.strict = false;
        policy.defaults.domain = "staging.example.com".to_owned();

        let qa = DeployTarget::from("qa-7");
        assert!(policy.is_valid_target(&qa));
        assert_eq!(policy.domain(&qa), "staging.example.com");
        assert!(policy.bastion_host(&qa).is_none());
        assert!(!policy.is_production(&qa));
    }

    #[test]
    fn blank_bastion_reads_as_direct() {
        let policy = table().target(
            "direct",
            TargetFacts {
                domain: "d.example.com".to_owned(),
                bastion_host: Some(String::new()),
                ..TargetFacts::default()
            },
        );
        assert!(policy.bastion_host(&"direct".into()).is_none());
    }

    #[test]
    fn validate_flags_missing_domains() {
        assert!(table().validate().is_ok());
        let broken = table().target("empty", TargetFacts::default());
        let err = broken.validate().expect_err("target without domain");
        assert_eq!(err.kind(), "Policy");
        assert!(PolicyTable::new(" ").validate().is_err());
    }
}

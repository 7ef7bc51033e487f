use crate::error::ResolveError;
use crate::plan::SectionPlan;
use crate::sections::{self, SectionInputs, StorageCredentials};
use dpack_channel::{SecretTransport, SshIdentity};
use dpack_kernel::domain::config::EngineSettings;
use dpack_kernel::domain::constants::{AWS_ASSET_BUCKET, BUILD, DEPLOY_TARGET, REDIS};
use dpack_kernel::domain::context::NotificationContext;
use dpack_kernel::domain::sections::PIPELINE_ORDER;
use dpack_kernel::domain::target::{BuildEnvironment, DeployTarget, TargetClass};
use dpack_kernel::domain::tree::ConfigurationTree;
use dpack_kernel::policy::TargetPolicy;
use dpack_kernel::secrets::SecretEnvironment;
use dpack_storage::ObjectStore;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Facts about one target, gathered before any section is built.
struct ResolvedTarget<'a> {
    prefix: &'a str,
    app_name: &'a str,
    target: &'a DeployTarget,
    domain: String,
    bastion_host: Option<String>,
    production: bool,
}

/// The configuration resolution engine.
///
/// Holds the engine settings, the secret transport used by standard resolutions, and the
/// object store used by batch resolutions. The ambient [`SecretEnvironment`] given to
/// [`with_environment`](Self::with_environment) is copied into every resolution and never
/// mutated, so concurrent resolutions cannot observe each other's secrets.
#[derive(Debug)]
pub struct Resolver<T, S> {
    settings: EngineSettings,
    transport: T,
    store: S,
    environment: SecretEnvironment,
}

impl<T, S> Resolver<T, S>
where
    T: SecretTransport,
    S: ObjectStore,
{
    pub fn new(settings: EngineSettings, transport: T, store: S) -> Self {
        Self { settings, transport, store, environment: SecretEnvironment::new() }
    }

    /// Ambient values (usually a process snapshot). Fetched secrets never replace them.
    #[must_use]
    pub fn with_environment(mut self, environment: SecretEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Resolves the configuration tree for a standard deploy.
    ///
    /// `development-postbuild` returns a local cache-only tree without touching the policy,
    /// the network or any secret. Every other target is validated, its env file is fetched
    /// over the secret channel (through the bastion when there is one), and then the
    /// sections are built. Any failure aborts the resolution and no tree is returned.
    ///
    /// # Errors
    /// [`ResolveError::InvalidTarget`] before any I/O, [`ResolveError::Channel`] when the
    /// fetch fails.
    #[instrument(skip(self, target, policy), fields(deploy_target = %target))]
    pub async fn resolve<P: TargetPolicy>(
        &self,
        prefix: &str,
        app_name: &str,
        target: &DeployTarget,
        policy: &P,
    ) -> Result<ConfigurationTree, ResolveError> {
        if target.is_development() {
            return Ok(self.development_tree(prefix));
        }

        let facts = self.target_facts(prefix, app_name, target, policy)?;
        let host = facts.bastion_host.as_deref().unwrap_or(&facts.domain).to_owned();

        let mut env = self.environment.clone();
        let identity = SshIdentity::detect(
            policy.ssh_username(),
            &env,
            self.settings.channel.private_key.as_deref(),
        )?;

        let fetched = self.transport.fetch_remote_env(&identity, &host).await?;
        let added = env.merge_missing(fetched);
        debug!(added = added.len(), "Merged remote env file");

        let plan = SectionPlan::STANDARD.excluding(&self.settings.sections.exclude);
        let credentials = StorageCredentials::global(&env);
        let tree = self.assemble(&facts, policy, plan, credentials, &env);

        info!(host = %host, sections = tree.section_names().count(), "Configuration resolved");
        Ok(tree)
    }

    /// Resolves the tree for a batch ("latest") build.
    ///
    /// Skips the secret channel. Instead the settings object
    /// `<production|staging>/<target>/<settings_object>` is read from the object store and
    /// its allow-listed keys are added to the environment. Tunnel and cache plugins are
    /// disabled; `is_latest_build` picks between the revision index and the `latest` alias.
    ///
    /// # Errors
    /// [`ResolveError::InvalidTarget`] for rejected targets and `development-postbuild`,
    /// [`ResolveError::Storage`] when the object cannot be read, and
    /// [`ResolveError::SecretParse`] when it is not a JSON object.
    #[instrument(skip(self, target, policy), fields(deploy_target = %target))]
    pub async fn resolve_batch<P: TargetPolicy>(
        &self,
        prefix: &str,
        app_name: &str,
        target: &DeployTarget,
        policy: &P,
        is_latest_build: bool,
    ) -> Result<ConfigurationTree, ResolveError> {
        if target.is_development() {
            return Err(ResolveError::InvalidTarget {
                message: target.to_string().into(),
                context: Some("Batch builds need a deployed target".into()),
            });
        }

        let facts = self.target_facts(prefix, app_name, target, policy)?;
        let mut env = self.environment.clone();

        let batch = &self.settings.batch;
        let bucket = batch
            .settings_bucket
            .as_deref()
            .or_else(|| env.get_non_empty(AWS_ASSET_BUCKET))
            .ok_or_else(|| ResolveError::Internal {
                message: "no settings bucket configured".into(),
                context: Some(format!("Set batch.settings_bucket or {AWS_ASSET_BUCKET}").into()),
            })?
            .to_owned();
        let key = format!(
            "{}/{target}/{}",
            BuildEnvironment::from_production(facts.production),
            batch.settings_object
        );

        let body = self.store.get_object(&bucket, &key).await?;
        let settings = parse_settings(&body)?;
        import_allowed(&mut env, &settings, &batch.allowed_keys);

        let plan = SectionPlan::batch(is_latest_build).excluding(&self.settings.sections.exclude);
        let credentials = StorageCredentials::for_target(&env, target);
        let tree = self.assemble(&facts, policy, plan, credentials, &env);

        info!(bucket = %bucket, key = %key, is_latest_build, "Batch configuration resolved");
        Ok(tree)
    }

    fn development_tree(&self, prefix: &str) -> ConfigurationTree {
        let plan = SectionPlan::DEVELOPMENT.excluding(&self.settings.sections.exclude);
        let (build, redis) = sections::development(prefix, &self.settings);

        let mut tree = ConfigurationTree::new();
        tree.set_plugins(plan.plugin_list());
        for (name, section) in [(BUILD, build), (REDIS, redis)] {
            if plan.sections.names().any(|n| n == name) {
                tree.insert(name, section);
            }
        }
        debug!("Development tree resolved without secret fetch");
        tree
    }

    fn target_facts<'a, P: TargetPolicy>(
        &self,
        prefix: &'a str,
        app_name: &'a str,
        target: &'a DeployTarget,
        policy: &P,
    ) -> Result<ResolvedTarget<'a>, ResolveError> {
        if !policy.is_valid_target(target) {
            warn!("Deploy target rejected by policy");
            return Err(ResolveError::InvalidTarget { message: target.to_string().into(), context: None });
        }

        let domain = policy.domain(target);
        let bastion_host = policy.bastion_host(target).filter(|h| !h.trim().is_empty());
        if domain.trim().is_empty() && bastion_host.is_none() {
            return Err(ResolveError::InvalidTarget {
                message: target.to_string().into(),
                context: Some("Policy resolves no host for this target".into()),
            });
        }

        Ok(ResolvedTarget {
            prefix,
            app_name,
            target,
            domain,
            bastion_host,
            production: policy.is_production(target),
        })
    }

    fn assemble<P: TargetPolicy>(
        &self,
        facts: &ResolvedTarget<'_>,
        policy: &P,
        plan: SectionPlan,
        credentials: StorageCredentials<'_>,
        env: &SecretEnvironment,
    ) -> ConfigurationTree {
        let target = facts.target;
        let sentry_org = policy.sentry_org(target);
        let services = &self.settings.services;

        let inputs = SectionInputs {
            prefix: facts.prefix,
            target,
            class: TargetClass::classify(target, facts.bastion_host.as_deref(), facts.production),
            domain: &facts.domain,
            bastion_host: facts.bastion_host.as_deref(),
            ssh_username: policy.ssh_username(),
            environment: BuildEnvironment::from_production(facts.production),
            sentry_org: &sentry_org,
            credentials,
            env,
            settings: &self.settings,
            notification: NotificationContext {
                app_name: facts.app_name.to_owned(),
                domain: facts.domain.clone(),
                prefix: facts.prefix.to_owned(),
                target_label: env.get_non_empty(DEPLOY_TARGET).unwrap_or(target.as_str()).to_owned(),
                activation_command: services.activation_command.clone(),
            },
        };

        let mut tree = ConfigurationTree::new();
        tree.set_plugins(plan.plugin_list());
        if let Some(pipeline) = plan.pipeline() {
            tree.set_pipeline(pipeline);
        }

        for (flag, name, _) in PIPELINE_ORDER {
            if !plan.sections.contains(flag) {
                continue;
            }
            if let Some(section) = sections::build(flag, &inputs) {
                debug!(section = name, options = section.len(), "Section built");
                tree.insert(name, section);
            }
        }
        tree
    }
}

fn parse_settings(body: &[u8]) -> Result<serde_json::Map<String, Value>, ResolveError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ResolveError::SecretParse {
            message: format!("expected a JSON object, found {}", json_kind(&other)).into(),
            context: None,
        }),
        Err(err) => Err(ResolveError::SecretParse { message: err.to_string().into(), context: None }),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Copies allow-listed settings into `env`. Keys already set are kept; absent keys only warn.
fn import_allowed(
    env: &mut SecretEnvironment,
    settings: &serde_json::Map<String, Value>,
    allowed: &[String],
) {
    for key in allowed {
        match settings.get(key) {
            None | Some(Value::Null) => warn!(key = %key, "Allow-listed setting is missing"),
            Some(_) if env.contains(key) => debug!(key = %key, "Keeping existing value for setting"),
            Some(Value::String(value)) => env.insert(key.as_str(), value.as_str()),
            Some(other) => env.insert(key.as_str(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_must_be_an_object() {
        assert!(parse_settings(br#"{"A":"1"}"#).is_ok());

        let err = parse_settings(b"[1,2]").expect_err("array");
        assert_eq!(err.kind(), "SecretParse");
        assert!(err.to_string().contains("an array"));

        let err = parse_settings(b"{not json").expect_err("garbage");
        assert_eq!(err.kind(), "SecretParse");
    }

    #[test]
    fn import_respects_existing_values_and_stringifies() {
        let mut env: SecretEnvironment = [("API_HOST", "local")].into_iter().collect();
        let settings = parse_settings(br#"{"API_HOST":"remote","RETRIES":3,"FLAG":true}"#)
            .expect("object");
        let allowed = ["API_HOST", "RETRIES", "FLAG", "ABSENT"].map(str::to_owned);

        import_allowed(&mut env, &settings, &allowed);

        assert_eq!(env.get("API_HOST"), Some("local"));
        assert_eq!(env.get("RETRIES"), Some("3"));
        assert_eq!(env.get("FLAG"), Some("true"));
        assert!(!env.contains("ABSENT"));
    }
}

//! Section builders. Each one turns resolved facts into the option map of one plugin.

use dpack_kernel::domain::config::EngineSettings;
use dpack_kernel::domain::constants::{
    ASSET_HOST, AWS_ACCESS_KEY_ID, AWS_ASSET_BUCKET, AWS_DEPLOYMENT_REGION, AWS_SECRET_ACCESS_KEY,
    BUILD, LATEST_REVISION_KEY, NO_CACHE, REDIS, REVISION_DATA, REVISION_STRATEGY, S3_ALL,
    S3_INDEX, S3_INDEX_LATEST, S3_SOURCE_MAPS, SENTRY, SENTRY_API_KEY, SLACK,
    SLACK_DEPLOY_WEBHOOK_ENDPOINT, SSH_TUNNEL,
};
use dpack_kernel::domain::context::{DeferredHook, NotificationContext};
use dpack_kernel::domain::sections::SectionSet;
use dpack_kernel::domain::target::{BuildEnvironment, DeployTarget, TargetClass};
use dpack_kernel::domain::tree::Section;
use dpack_kernel::secrets::SecretEnvironment;
use serde_json::Value;
use tracing::warn;

/// Everything a builder may read, fixed once the secret fetch has completed.
#[derive(Debug)]
pub(crate) struct SectionInputs<'a> {
    pub prefix: &'a str,
    pub target: &'a DeployTarget,
    pub class: TargetClass,
    pub domain: &'a str,
    pub bastion_host: Option<&'a str>,
    pub ssh_username: &'a str,
    pub environment: BuildEnvironment,
    pub sentry_org: &'a str,
    pub credentials: StorageCredentials<'a>,
    pub env: &'a SecretEnvironment,
    pub settings: &'a EngineSettings,
    pub notification: NotificationContext,
}

/// Object storage access shared by every storage section.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StorageCredentials<'a> {
    access_key_id: Option<&'a str>,
    secret_access_key: Option<&'a str>,
    bucket: Option<&'a str>,
    region: Option<&'a str>,
}

impl<'a> StorageCredentials<'a> {
    /// Global `AWS_*` keys.
    pub(crate) fn global(env: &'a SecretEnvironment) -> Self {
        Self::lookup(env, None)
    }

    /// `<TARGET>_AWS_*` keys, falling back to the global pair.
    pub(crate) fn for_target(env: &'a SecretEnvironment, target: &DeployTarget) -> Self {
        Self::lookup(env, Some(&target.env_prefix()))
    }

    fn lookup(env: &'a SecretEnvironment, prefix: Option<&str>) -> Self {
        let keyed = |key: &str| {
            let scoped = prefix.map(|p| format!("{p}_{key}"));
            env.first_of(scoped.as_deref().into_iter().chain([key]))
        };

        let credentials = Self {
            access_key_id: keyed(AWS_ACCESS_KEY_ID),
            secret_access_key: keyed(AWS_SECRET_ACCESS_KEY),
            bucket: env.get_non_empty(AWS_ASSET_BUCKET),
            region: env.get_non_empty(AWS_DEPLOYMENT_REGION),
        };

        if credentials.access_key_id.is_none() || credentials.secret_access_key.is_none() {
            warn!(scope = prefix.unwrap_or("global"), "Storage credentials are incomplete");
        }
        if credentials.bucket.is_none() {
            warn!(key = AWS_ASSET_BUCKET, "Asset bucket is not set");
        }
        credentials
    }

    fn section(self, prefix: String) -> Section {
        Section::new()
            .with("accessKeyId", text(self.access_key_id))
            .with("secretAccessKey", text(self.secret_access_key))
            .with("bucket", text(self.bucket))
            .with("region", text(self.region))
            .with("prefix", prefix)
    }
}

/// `null` for missing values.
fn text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_owned()))
}

/// Builds the section for a single-flag `section`; `None` for option-less plugins.
pub(crate) fn build(section: SectionSet, inputs: &SectionInputs<'_>) -> Option<Section> {
    let built = match section.name()? {
        BUILD => build_environment(inputs),
        SSH_TUNNEL => ssh_tunnel(inputs),
        REVISION_DATA => Section::new().with("type", REVISION_STRATEGY),
        REDIS => redis(inputs),
        S3_ALL => inputs.credentials.section(asset_prefix(inputs)),
        S3_SOURCE_MAPS => source_maps(inputs),
        S3_INDEX => inputs
            .credentials
            .section(format!("{}/revisions", asset_prefix(inputs)))
            .with("allowOverwrite", true),
        S3_INDEX_LATEST => inputs
            .credentials
            .section(asset_prefix(inputs))
            .with("revisionKey", LATEST_REVISION_KEY)
            .with("allowOverwrite", true),
        SLACK => slack(inputs),
        SENTRY => sentry(inputs),
        _ => return None,
    };
    Some(built)
}

/// Tree for `development-postbuild`: local cache only, nothing secret.
pub(crate) fn development(prefix: &str, settings: &EngineSettings) -> (Section, Section) {
    let services = &settings.services;
    let build = Section::new().with("environment", BuildEnvironment::Development.as_str());
    let redis = Section::new()
        .with("revisionKey", services.development_revision_key.as_str())
        .with("keyPrefix", prefix)
        .with("allowOverwrite", true)
        .with("maxRecentUploads", services.max_recent_uploads)
        .with("host", services.redis_host.as_str())
        .with("port", services.redis_port)
        .with_hook("distDir", DeferredHook::DistDir);
    (build, redis)
}

fn asset_prefix(inputs: &SectionInputs<'_>) -> String {
    format!("{}/{}", inputs.target, inputs.prefix)
}

fn build_environment(inputs: &SectionInputs<'_>) -> Section {
    Section::new().with("environment", inputs.environment.as_str())
}

/// Two-hop through the bastion, or straight to the domain.
fn ssh_tunnel(inputs: &SectionInputs<'_>) -> Section {
    let tunnel = Section::new().with("username", inputs.ssh_username);
    match inputs.bastion_host {
        Some(bastion) if inputs.class.is_two_hop() => {
            tunnel.with("host", bastion).with("dstHost", inputs.domain)
        },
        _ => tunnel.with("host", inputs.domain),
    }
}

fn redis(inputs: &SectionInputs<'_>) -> Section {
    Section::new()
        .with("allowOverwrite", true)
        .with("host", inputs.settings.services.redis_host.as_str())
        .with("keyPrefix", inputs.prefix)
}

/// Source maps are never edge-cached.
fn source_maps(inputs: &SectionInputs<'_>) -> Section {
    inputs
        .credentials
        .section(asset_prefix(inputs))
        .with("manifestPath", Value::Null)
        .with("filePattern", format!("**/+(vendor|{}).map", inputs.prefix))
        .with("cacheControl", NO_CACHE)
        .with("expires", 0)
}

fn slack(inputs: &SectionInputs<'_>) -> Section {
    Section::new()
        .with("webhookURL", text(inputs.env.get_non_empty(SLACK_DEPLOY_WEBHOOK_ENDPOINT)))
        .with_hook("didDeploy", DeferredHook::DidDeploy(inputs.notification.clone()))
        .with_hook("didActivate", DeferredHook::DidActivate(inputs.notification.clone()))
}

fn sentry(inputs: &SectionInputs<'_>) -> Section {
    let api_key = text(inputs.env.get_non_empty(SENTRY_API_KEY));
    let public_url = inputs
        .env
        .get_non_empty(ASSET_HOST)
        .map_or(Value::Null, |host| Value::String(format!("{host}/{}", asset_prefix(inputs))));

    Section::new()
        .with("sentryUrl", inputs.settings.services.sentry_url.as_str())
        .with("sentryOrganizationSlug", inputs.sentry_org)
        .with("sentryProjectSlug", inputs.prefix)
        .with("publicUrl", public_url)
        .with("sentryApiKey", api_key.clone())
        .with("sentryBearerApiKey", api_key)
}

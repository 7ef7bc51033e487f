// --- Section / plugin names ---

pub const BUILD: &str = "build";
pub const SSH_TUNNEL: &str = "ssh-tunnel";
pub const GZIP: &str = "gzip";
pub const REVISION_DATA: &str = "revision-data";
pub const MANIFEST: &str = "manifest";
pub const S3_ALL: &str = "s3-all";
pub const S3_SOURCE_MAPS: &str = "s3-source-maps";
pub const S3_INDEX: &str = "s3-index";
pub const S3_INDEX_LATEST: &str = "s3-index-latest";
pub const REDIS: &str = "redis";
pub const DISPLAY_REVISIONS: &str = "display-revisions";
pub const SLACK: &str = "slack";
pub const SENTRY: &str = "sentry";

/// Plugin the storage sections are instances of.
pub const S3_PLUGIN: &str = "s3";

/// Deploy target that short-circuits resolution to a local cache-only tree.
pub const DEVELOPMENT_POSTBUILD: &str = "development-postbuild";

// --- Environment keys read by the engine ---

pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_ASSET_BUCKET: &str = "AWS_ASSET_BUCKET";
pub const AWS_DEPLOYMENT_REGION: &str = "AWS_DEPLOYMENT_REGION";
pub const SLACK_DEPLOY_WEBHOOK_ENDPOINT: &str = "SLACK_DEPLOY_WEBHOOK_ENDPOINT";
pub const SENTRY_API_KEY: &str = "SENTRY_API_KEY";
pub const ASSET_HOST: &str = "EMBER_CLI_ASSET_HOST";
pub const DEPLOY_TARGET: &str = "DEPLOY_TARGET";
pub const SSH_AUTH_SOCK: &str = "SSH_AUTH_SOCK";
pub const USER: &str = "USER";

// --- Fixed section values ---

pub const REVISION_STRATEGY: &str = "git-commit";
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
pub const LATEST_REVISION_KEY: &str = "latest";

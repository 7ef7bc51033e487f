#![allow(dead_code, unreachable_pub)]

use dpack_channel::{ChannelError, SecretTransport, SshIdentity};
use dpack_kernel::domain::config::EngineSettings;
use dpack_kernel::policy::{PolicyTable, TargetFacts};
use dpack_kernel::secrets::SecretEnvironment;
use dpack_resolver::Resolver;
use dpack_storage::{ObjectStore, Storage, StorageError};
use std::sync::Mutex;
use tempfile::TempDir;

/// In-process secret channel: records every call and answers from a fixed env file.
#[derive(Default)]
pub struct FakeTransport {
    remote: Vec<(String, String)>,
    failure: Option<fn(&str) -> ChannelError>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeTransport {
    pub fn serving(pairs: &[(&str, &str)]) -> Self {
        Self {
            remote: pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
            ..Self::default()
        }
    }

    pub fn failing(failure: fn(&str) -> ChannelError) -> Self {
        Self { failure: Some(failure), ..Self::default() }
    }

    /// `(username, host)` of every fetch.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl SecretTransport for FakeTransport {
    async fn fetch_remote_env(
        &self,
        identity: &SshIdentity,
        host: &str,
    ) -> Result<SecretEnvironment, ChannelError> {
        self.calls.lock().unwrap().push((identity.username().to_owned(), host.to_owned()));
        match self.failure {
            Some(fail) => Err(fail(host)),
            None => Ok(self.remote.iter().cloned().collect()),
        }
    }
}

pub const REMOTE_ENV: &[(&str, &str)] = &[
    ("AWS_ACCESS_KEY_ID", "AKIAREMOTE"),
    ("AWS_SECRET_ACCESS_KEY", "remote-secret"),
    ("AWS_ASSET_BUCKET", "blog-assets"),
    ("AWS_DEPLOYMENT_REGION", "eu-west-1"),
    ("SLACK_DEPLOY_WEBHOOK_ENDPOINT", "https://hooks.example.com/T000"),
    ("SENTRY_API_KEY", "sentry-key"),
    ("EMBER_CLI_ASSET_HOST", "https://cdn.example.com"),
];

/// Ambient environment of a CI runner with a forwarded agent.
pub fn ambient() -> SecretEnvironment {
    [("SSH_AUTH_SOCK", "/tmp/ssh-agent.sock"), ("USER", "ci")].into_iter().collect()
}

pub fn policy() -> PolicyTable {
    PolicyTable::new("deploy")
        .target(
            "aws-prod",
            TargetFacts {
                domain: "blog.example.com".to_owned(),
                bastion_host: Some("bastion.example.com".to_owned()),
                production: true,
                sentry_org: "example".to_owned(),
            },
        )
        .target(
            "staging",
            TargetFacts {
                domain: "staging.example.com".to_owned(),
                bastion_host: None,
                production: false,
                sentry_org: "example".to_owned(),
            },
        )
}

pub fn store(dir: &TempDir) -> Storage {
    Storage::open(dir.path().join("objects"))
}

/// Writes `body` as object `key` of `bucket` under the store root.
pub fn seed(dir: &TempDir, bucket: &str, key: &str, body: &str) {
    let path = dir.path().join("objects").join(bucket).join(key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

pub fn resolver<'t>(
    transport: &'t FakeTransport,
    store: Storage,
    settings: EngineSettings,
) -> Resolver<&'t FakeTransport, Storage> {
    Resolver::new(settings, transport, store).with_environment(ambient())
}

/// Object store holding a single settings object; every other key is missing.
pub struct SettingsObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
}

impl ObjectStore for SettingsObject {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        if bucket == self.bucket && key == self.key {
            Ok(self.body.clone())
        } else {
            Err(StorageError::ObjectNotFound { message: format!("s3://{bucket}/{key}").into(), context: None })
        }
    }
}

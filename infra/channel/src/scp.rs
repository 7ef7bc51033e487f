//! `scp`-backed secret transport.
//!
//! The system client does the SSH work; this module only builds its argument list, bounds
//! its run time, and maps its stderr onto [`ChannelError`] variants.

use crate::envfile::read_env_file;
use crate::error::{ChannelError, ChannelErrorExt};
use crate::identity::{SshAuth, SshIdentity};
use crate::transport::SecretTransport;
use dpack_kernel::domain::config::ChannelConfig;
use dpack_kernel::domain::constants::SSH_AUTH_SOCK;
use dpack_kernel::secrets::SecretEnvironment;
use std::ffi::OsString;
use std::process::{Output, Stdio};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ScpTransport {
    config: ChannelConfig,
}

impl ScpTransport {
    #[must_use]
    pub const fn new(config: ChannelConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// `user@host:/home/user/<app_root>/shared/.env`
    #[must_use]
    pub fn remote_spec(&self, identity: &SshIdentity, host: &str) -> String {
        let user = identity.username();
        format!("{user}@{host}:{}", self.config.remote_env_path(user))
    }

    /// Arguments passed to the scp program, in order.
    #[must_use]
    pub fn command_args(&self, identity: &SshIdentity, host: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-B".into(), "-q".into()];

        if let Some(port) = self.config.port {
            args.push("-P".into());
            args.push(port.to_string().into());
        }

        if let SshAuth::PrivateKey(key) = identity.auth() {
            args.push("-i".into());
            args.push(key.into());
            args.push("-o".into());
            args.push("IdentitiesOnly=yes".into());
        }

        args.push(self.remote_spec(identity, host).into());
        args.push(self.config.local_env_file.clone().into());
        args
    }

    fn command(&self, identity: &SshIdentity, host: &str) -> Command {
        let mut cmd = Command::new(&self.config.scp_program);
        cmd.args(self.command_args(identity, host))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match identity.auth() {
            SshAuth::Agent(socket) => {
                cmd.env(SSH_AUTH_SOCK, socket);
            },
            SshAuth::PrivateKey(_) => {
                cmd.env_remove(SSH_AUTH_SOCK);
            },
        }
        cmd
    }

    async fn transfer(&self, identity: &SshIdentity, host: &str) -> Result<(), ChannelError> {
        if let Some(parent) = self.config.local_env_file.parent().filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create {}", parent.display()))?;
        }

        let child = self
            .command(identity, host)
            .spawn()
            .context(format!("Failed to spawn '{}'", self.config.scp_program))?;

        let output = match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ChannelError::Timeout {
                    message: format!("{host} did not answer within {}s", limit.as_secs()).into(),
                    context: None,
                })?,
            None => child.wait_with_output().await,
        }
        .context("Failed to wait for scp")?;

        check_output(&output, host)
    }
}

impl SecretTransport for ScpTransport {
    async fn fetch_remote_env(
        &self,
        identity: &SshIdentity,
        host: &str,
    ) -> Result<SecretEnvironment, ChannelError> {
        info!(host, identity = %identity, "Fetching remote env file");

        if let Err(err) = self.transfer(identity, host).await {
            warn!(host, kind = err.kind(), "Secret channel failed");
            return Err(err);
        }

        let file = &self.config.local_env_file;
        let env = read_env_file(file).await;
        // The copy holds plaintext secrets; only the parsed environment outlives this call.
        if let Err(err) = fs::remove_file(file).await {
            warn!(file = %file.display(), error = %err, "Failed to remove fetched env file");
        }

        let env = env?;
        debug!(host, keys = env.len(), file = %file.display(), "Remote env file loaded");
        Ok(env)
    }
}

fn check_output(output: &Output, host: &str) -> Result<(), ChannelError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(classify_failure(&stderr, output.status.code(), host))
}

/// Maps a failed scp run onto the channel error taxonomy using its stderr text.
#[must_use]
pub fn classify_failure(stderr: &str, code: Option<i32>, host: &str) -> ChannelError {
    let detail = stderr.lines().map(str::trim).rfind(|l| !l.is_empty()).unwrap_or_default();
    let message = if detail.is_empty() {
        format!("{host}: exit status {}", code.map_or_else(|| "signal".to_owned(), |c| c.to_string()))
    } else {
        format!("{host}: {detail}")
    };
    let has = |needle: &str| stderr.contains(needle);

    if has("Connection refused") || has("No route to host") || has("Could not resolve hostname") {
        ChannelError::ConnectionRefused { message: message.into(), context: None }
    } else if has("Connection timed out") || has("Operation timed out") {
        ChannelError::Timeout { message: message.into(), context: None }
    } else if has("Permission denied")
        || has("Host key verification failed")
        || has("Too many authentication failures")
    {
        ChannelError::Authentication { message: message.into(), context: None }
    } else if has("No such file or directory") {
        ChannelError::RemoteFileNotFound { message: message.into(), context: None }
    } else {
        ChannelError::Transfer { message: message.into(), context: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn transport() -> ScpTransport {
        ScpTransport::new(ChannelConfig { port: Some(2222), ..ChannelConfig::default() })
    }

    #[test]
    fn key_auth_arguments() {
        let identity = SshIdentity::new("deploy", SshAuth::PrivateKey("/home/ci/.ssh/id_rsa".into()));
        let args = transport().command_args(&identity, "bastion.example.com");
        let expected: Vec<OsString> = [
            "-B",
            "-q",
            "-P",
            "2222",
            "-i",
            "/home/ci/.ssh/id_rsa",
            "-o",
            "IdentitiesOnly=yes",
            "deploy@bastion.example.com:/home/deploy/eternal-sledgehammer/shared/.env",
            ".env.remote",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn agent_auth_passes_no_key() {
        let identity = SshIdentity::new("deploy", SshAuth::Agent(PathBuf::from("/tmp/agent")));
        let args = ScpTransport::new(ChannelConfig::default()).command_args(&identity, "blog.example.com");
        assert!(!args.iter().any(|a| a == "-i"));
        assert!(!args.iter().any(|a| a == "-P"));
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn stderr_classification() {
        let cases = [
            ("ssh: connect to host h port 22: Connection refused\r\nlost connection\n", "ConnectionRefused"),
            ("deploy@h: Permission denied (publickey).\n", "Authentication"),
            ("Host key verification failed.\n", "Authentication"),
            ("scp: /home/deploy/eternal-sledgehammer/shared/.env: No such file or directory\n", "RemoteFileNotFound"),
            ("ssh: connect to host h port 22: Connection timed out\n", "Timeout"),
            ("something else broke\n", "Transfer"),
        ];
        for (stderr, kind) in cases {
            assert_eq!(classify_failure(stderr, Some(1), "h").kind(), kind, "{stderr}");
        }
    }

    #[test]
    fn empty_stderr_reports_exit_status() {
        let err = classify_failure("", Some(255), "bastion.example.com");
        assert_eq!(err.kind(), "Transfer");
        assert!(err.to_string().contains("bastion.example.com: exit status 255"));
    }
}

use crate::error::ChannelError;
use dpack_kernel::domain::constants::{SSH_AUTH_SOCK, USER};
use dpack_kernel::secrets::SecretEnvironment;
use std::fmt;
use std::path::{Path, PathBuf};

/// How the SSH client proves the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshAuth {
    /// Keys held by a running agent reachable through this socket.
    Agent(PathBuf),
    /// A private key file passed with `-i`.
    PrivateKey(PathBuf),
}

impl SshAuth {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Agent(_) => "agent",
            Self::PrivateKey(_) => "private-key",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshIdentity {
    username: String,
    auth: SshAuth,
}

impl SshIdentity {
    #[must_use]
    pub fn new(username: impl Into<String>, auth: SshAuth) -> Self {
        Self { username: username.into(), auth }
    }

    /// Picks the auth mode from the environment.
    ///
    /// A non-empty `SSH_AUTH_SOCK` selects agent forwarding. Otherwise the private key is
    /// `key_override` or `/home/$USER/.ssh/id_rsa`.
    ///
    /// # Errors
    /// [`ChannelError::Authentication`] when no agent is present, no key path is
    /// configured and `USER` is unset.
    pub fn detect(
        username: impl Into<String>,
        env: &SecretEnvironment,
        key_override: Option<&Path>,
    ) -> Result<Self, ChannelError> {
        if let Some(socket) = env.get_non_empty(SSH_AUTH_SOCK) {
            return Ok(Self::new(username, SshAuth::Agent(PathBuf::from(socket))));
        }

        let key = match key_override {
            Some(path) => path.to_path_buf(),
            None => {
                let local_user =
                    env.get_non_empty(USER).ok_or_else(|| ChannelError::Authentication {
                        message: "no SSH agent socket and USER is unset".into(),
                        context: Some("Cannot locate a private key".into()),
                    })?;
                default_key_path(local_user)
            },
        };

        Ok(Self::new(username, SshAuth::PrivateKey(key)))
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn auth(&self) -> &SshAuth {
        &self.auth
    }
}

impl fmt::Display for SshIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.auth.kind())
    }
}

fn default_key_path(local_user: &str) -> PathBuf {
    PathBuf::from(format!("/home/{local_user}/.ssh/id_rsa"))
}

//! Secret channel: retrieves the per-host env file that carries deploy credentials.
//!
//! [`ScpTransport`] copies `/home/<user>/<app_root>/shared/.env` from the deploy host (or its
//! bastion) into a local file with the system `scp` client, then parses it into a
//! [`SecretEnvironment`](dpack_kernel::secrets::SecretEnvironment). Authentication uses the
//! running SSH agent when `SSH_AUTH_SOCK` is set and a private key otherwise.

mod envfile;
mod error;
mod identity;
mod scp;
mod transport;

pub use envfile::{parse_env, read_env_file};
pub use error::{ChannelError, ChannelErrorExt};
pub use identity::{SshAuth, SshIdentity};
pub use scp::{ScpTransport, classify_failure};
pub use transport::SecretTransport;

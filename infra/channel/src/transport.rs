use crate::error::ChannelError;
use crate::identity::SshIdentity;
use dpack_kernel::secrets::SecretEnvironment;
use std::future::Future;

/// Retrieves the remote env file for a deploy host.
///
/// Implementations fail with [`ChannelError`] and never retry. Dropping the returned future
/// cancels the transfer.
pub trait SecretTransport: Send + Sync {
    fn fetch_remote_env(
        &self,
        identity: &SshIdentity,
        host: &str,
    ) -> impl Future<Output = Result<SecretEnvironment, ChannelError>> + Send;
}

impl<T: SecretTransport> SecretTransport for &T {
    fn fetch_remote_env(
        &self,
        identity: &SshIdentity,
        host: &str,
    ) -> impl Future<Output = Result<SecretEnvironment, ChannelError>> + Send {
        (**self).fetch_remote_env(identity, host)
    }
}

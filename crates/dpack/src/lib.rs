//! Facade crate for Deploy Pack.
//! Re-exports the domain and kernel primitives and wires the default collaborators
//! (system `scp` channel, filesystem object store) into a [`Resolver`].
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `dpack` (with `logger` for hosts that own the process).
//! - Call [`resolver`] once, then resolve as many targets as needed.

pub use dpack_channel as channel;
pub use dpack_domain as domain;
pub use dpack_kernel as kernel;
#[cfg(feature = "logger")]
pub use dpack_logger as logger;
pub use dpack_resolver as resolver;
pub use dpack_storage as storage;

use dpack_channel::ScpTransport;
use dpack_domain::config::EngineSettings;
use dpack_kernel::secrets::SecretEnvironment;
use dpack_resolver::Resolver;
use dpack_storage::Storage;

/// Resolver over the system `scp` channel and the local object store.
pub type DefaultResolver = Resolver<ScpTransport, Storage>;

/// Build-time enabled features (by Cargo feature).
pub mod features {
    pub const ENABLED: &[&str] = &[
        "resolve",
        "batch",
        #[cfg(feature = "logger")]
        "logger",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Builds a resolver over `environment`, reading batch settings from the object store
/// under `settings.batch.store_root`. Nothing touches the filesystem until a batch
/// resolution reads an object.
#[must_use]
pub fn resolver(settings: EngineSettings, environment: SecretEnvironment) -> DefaultResolver {
    let store = Storage::open(&settings.batch.store_root);
    let transport = ScpTransport::new(settings.channel.clone());
    Resolver::new(settings, transport, store).with_environment(environment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_features_are_always_enabled() {
        assert!(features::is_enabled("resolve"));
        assert!(features::is_enabled("batch"));
        assert!(!features::is_enabled("licensing"));
    }

    #[test]
    fn building_a_resolver_leaves_the_store_root_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = EngineSettings::default();
        settings.batch.store_root = dir.path().join("objects");

        let resolver = resolver(settings, SecretEnvironment::new());

        assert!(!dir.path().join("objects").exists());
        assert_eq!(resolver.settings().channel.scp_program, "scp");
    }
}

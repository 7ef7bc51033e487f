//! # Resolver
//!
//! Assembles the configuration tree consumed by the deployment plugin pipeline.
//!
//! A standard resolution classifies the deploy target, pulls the host's env file over the
//! secret channel, and builds each section listed in the [`SectionPlan`]. Batch resolutions
//! read a settings object from an [`ObjectStore`](dpack_storage::ObjectStore) instead and
//! return a pipeline with tunnel and cache disabled.
//!
//! ```rust,no_run
//! use dpack_channel::ScpTransport;
//! use dpack_kernel::domain::config::EngineSettings;
//! use dpack_kernel::policy::{PolicyTable, TargetFacts};
//! use dpack_kernel::secrets::SecretEnvironment;
//! use dpack_resolver::Resolver;
//! use dpack_storage::Storage;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = EngineSettings::default();
//! let store = Storage::open(&settings.batch.store_root);
//! let resolver = Resolver::new(settings.clone(), ScpTransport::new(settings.channel.clone()), store)
//!     .with_environment(SecretEnvironment::from_process());
//!
//! let policy = PolicyTable::new("deploy").target(
//!     "aws-prod",
//!     TargetFacts { domain: "blog.example.com".into(), production: true, ..TargetFacts::default() },
//! );
//! let tree = resolver.resolve("blog-app", "Blog", &"aws-prod".into(), &policy).await?;
//! println!("{}", tree.to_json()?);
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
pub mod notification;
pub mod plan;
mod sections;

pub use engine::Resolver;
pub use error::{ResolveError, ResolveErrorExt};
pub use plan::SectionPlan;

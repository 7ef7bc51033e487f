//! Kernel utilities shared by the engine and its hosts.
//! Keep this crate lightweight: settings loading, the explicit secret environment, and the
//! target policy interface the engine consumes.
//!
//! ## Settings loading
//! ```rust,ignore
//! use dpack_kernel::config::load_config;
//! use dpack_kernel::domain::config::EngineSettings;
//!
//! let settings: EngineSettings = load_config(Some("dpack.toml"))?;
//! ```

pub mod config;
mod error;
pub mod policy;
pub mod secrets;

pub use dpack_domain as domain;
pub use error::{KernelError, KernelErrorExt};

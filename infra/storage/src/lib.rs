//! Read-only bucket/key object store.
//!
//! Settings objects for batch resolutions are read through the [`ObjectStore`] trait;
//! [`Storage`] implements it on top of a directory tree where each bucket is a directory
//! under the store root.
//!
//! ```rust
//! use dpack_storage::{ObjectStore, Storage, StorageError};
//!
//! # async fn run(root: std::path::PathBuf) -> Result<(), StorageError> {
//! let storage = Storage::open(root);
//!
//! match ObjectStore::get_object(&storage, "deploy-settings", "staging/qa/app-settings.json").await {
//!     Ok(body) => println!("{} bytes", body.len()),
//!     Err(StorageError::BucketNotFound { .. } | StorageError::ObjectNotFound { .. }) => {},
//!     Err(err) => return Err(err),
//! }
//! # Ok(())
//! # }
//! ```

mod bucket;
mod engine;
mod error;
mod security;
mod store;

pub use bucket::BucketName;
pub use engine::Storage;
pub use error::{StorageError, StorageErrorExt};
pub use store::ObjectStore;

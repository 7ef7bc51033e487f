//! Filesystem object store: one directory per bucket, one file per object key.

use crate::bucket::BucketName;
use crate::error::StorageError;
use crate::security;
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

#[derive(Debug)]
pub struct StorageInner {
    /// Store root; bucket directories live directly below it.
    pub(crate) root: PathBuf,
}

/// Read-only handle to a local object store.
///
/// Buckets are directories under the root and object keys are `/`-separated paths inside
/// them. Opening a store touches nothing on disk; a missing root simply has no buckets.
///
/// # Example
///
/// ```rust
/// use dpack_storage::{Storage, StorageError};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     # let dir = tmp.path().join("deploy-settings/production/aws-prod");
///     # std::fs::create_dir_all(&dir).unwrap();
///     # std::fs::write(dir.join("app-settings.json"), br#"{"FEATURE":"on"}"#).unwrap();
///     let storage = Storage::open(tmp.path());
///
///     let body = storage.get_object("deploy-settings", "production/aws-prod/app-settings.json").await?;
///     assert_eq!(body, br#"{"FEATURE":"on"}"#);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use]
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { inner: Arc::new(StorageInner { root: root.into() }) }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads a whole object.
    ///
    /// # Errors
    /// [`StorageError::InvalidBucketName`], [`StorageError::BucketNotFound`],
    /// [`StorageError::ObjectNotFound`], [`StorageError::PathTraversalAttempt`] for keys or
    /// symlinks leading out of the bucket, or [`StorageError::Io`].
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let name = BucketName::try_from(bucket)?;
        let relative = security::key_path(key)?;
        let dir = self.bucket_dir(&name).await?;

        let not_found = || StorageError::ObjectNotFound {
            message: format!("s3://{bucket}/{key}").into(),
            context: None,
        };

        let path = match fs::canonicalize(dir.join(&relative)).await {
            Ok(path) => security::ensure_within(&dir, path)?,
            Err(err) if is_missing(&err) => return Err(not_found()),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to resolve s3://{bucket}/{key}").into()),
                });
            },
        };

        match fs::read(&path).await {
            Ok(data) => {
                debug!(bucket, key, bytes = data.len(), "Object read");
                Ok(data)
            },
            Err(err) if is_missing(&err) => Err(not_found()),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", path.display()).into()),
            }),
        }
    }

    async fn bucket_dir(&self, name: &BucketName) -> Result<PathBuf, StorageError> {
        let missing = || StorageError::BucketNotFound { message: name.to_string().into(), context: None };

        let dir = match fs::canonicalize(self.root.join(name.as_str())).await {
            Ok(dir) => dir,
            Err(err) if is_missing(&err) => return Err(missing()),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to resolve bucket {name}").into()),
                });
            },
        };

        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(dir),
            _ => Err(missing()),
        }
    }
}

fn is_missing(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory | ErrorKind::IsADirectory)
}

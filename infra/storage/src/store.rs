use crate::engine::Storage;
use crate::error::StorageError;
use std::future::Future;

/// Read access to bucket/key objects.
///
/// Resolvers depend on this seam rather than on [`Storage`] so hosts can plug in a remote
/// object service.
pub trait ObjectStore: Send + Sync {
    /// Fetches the full body of `key` in `bucket`.
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send;
}

impl ObjectStore for Storage {
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send {
        Self::get_object(self, bucket, key)
    }
}

impl<S: ObjectStore> ObjectStore for &S {
    fn get_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send {
        (**self).get_object(bucket, key)
    }
}

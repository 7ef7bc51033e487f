use dpack_storage::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn seed(root: &Path, bucket: &str, key: &str, body: &[u8]) {
    let path = root.join(bucket).join(key);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

async fn fetch<S: ObjectStore>(store: &S, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
    store.get_object(bucket, key).await
}

#[tokio::test]
async fn reads_through_object_store_trait() {
    let temp = TempDir::new().unwrap();
    seed(temp.path(), "asset-bucket", "production/aws-prod/app-settings.json", br#"{"API_HOST":"x"}"#);
    let storage = Storage::open(temp.path());

    let body = fetch(&storage, "asset-bucket", "production/aws-prod/app-settings.json").await.unwrap();
    assert_eq!(body, br#"{"API_HOST":"x"}"#);
}

#[tokio::test]
async fn missing_bucket_and_missing_object_are_distinct() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("asset-bucket")).unwrap();
    let storage = Storage::open(temp.path());

    let err = storage.get_object("other-bucket", "a.json").await.unwrap_err();
    assert!(matches!(err, StorageError::BucketNotFound { .. }), "{err}");

    let err = storage.get_object("asset-bucket", "a.json").await.unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound { .. }), "{err}");
    assert!(err.to_string().contains("s3://asset-bucket/a.json"));

    let err = storage.get_object("asset-bucket", "a.json/nested").await.unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound { .. }), "{err}");
}

#[tokio::test]
async fn opening_a_missing_root_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("objects");
    let storage = Storage::open(&root);

    let err = storage.get_object("asset-bucket", "a.json").await.unwrap_err();
    assert!(matches!(err, StorageError::BucketNotFound { .. }), "{err}");
    assert!(!root.exists());
}

#[tokio::test]
async fn prefixes_are_not_objects() {
    let temp = TempDir::new().unwrap();
    seed(temp.path(), "asset-bucket", "staging/qa/app-settings.json", b"{}");
    let storage = Storage::open(temp.path());

    let err = storage.get_object("asset-bucket", "staging/qa").await.unwrap_err();
    assert!(matches!(err, StorageError::ObjectNotFound { .. }), "{err}");
}

#[tokio::test]
async fn keys_cannot_escape_their_bucket() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("bucket-a")).unwrap();
    seed(temp.path(), "bucket-b", "secret.json", b"{}");
    let storage = Storage::open(temp.path());

    let err = storage.get_object("bucket-a", "../bucket-b/secret.json").await.unwrap_err();
    assert!(matches!(err, StorageError::PathTraversalAttempt { .. }), "{err}");

    let err = storage.get_object("bucket-a", "/etc/passwd").await.unwrap_err();
    assert!(matches!(err, StorageError::PathTraversalAttempt { .. }), "{err}");
}

#[cfg(unix)]
#[tokio::test]
async fn symlinks_out_of_the_bucket_are_rejected() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("bucket-a")).unwrap();
    seed(temp.path(), "bucket-b", "secret.json", b"{}");
    std::os::unix::fs::symlink(
        temp.path().join("bucket-b/secret.json"),
        temp.path().join("bucket-a/link.json"),
    )
    .unwrap();
    let storage = Storage::open(temp.path());

    let err = storage.get_object("bucket-a", "link.json").await.unwrap_err();
    assert!(matches!(err, StorageError::PathTraversalAttempt { .. }), "{err}");
}

#[tokio::test]
async fn invalid_bucket_names_are_rejected() {
    let temp = TempDir::new().unwrap();
    let storage = Storage::open(temp.path());

    let err = storage.get_object("Not_A_Bucket", "a.json").await.unwrap_err();
    assert_eq!(err.kind(), "InvalidBucketName");
}

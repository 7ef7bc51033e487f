//! Key checks for the read path. A key may name any object inside its bucket and nothing
//! outside it, whether by `..` segments or by a symlink.

use crate::error::StorageError;
use std::path::{Path, PathBuf};

/// Turns a `/`-separated object key into a path relative to the bucket directory.
///
/// Empty and `.` segments are skipped. `..` may only cancel a segment named earlier in the
/// same key.
pub(crate) fn key_path(key: &str) -> Result<PathBuf, StorageError> {
    let traversal = |reason: &'static str| StorageError::PathTraversalAttempt {
        message: key.to_owned().into(),
        context: Some(reason.into()),
    };

    if key.starts_with('/') || key.contains(['\\', '\0']) {
        return Err(traversal("Keys must be relative and '/'-separated"));
    }

    let mut segments = Vec::new();
    for segment in key.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    return Err(traversal("Key climbs above its bucket"));
                }
            },
            name => segments.push(name),
        }
    }

    if segments.is_empty() || key.ends_with('/') {
        return Err(StorageError::ObjectNotFound {
            message: key.to_owned().into(),
            context: Some("Key must name an object".into()),
        });
    }

    Ok(segments.into_iter().collect())
}

/// Accepts a canonical object path only if it lies under the canonical bucket directory.
pub(crate) fn ensure_within(bucket_dir: &Path, resolved: PathBuf) -> Result<PathBuf, StorageError> {
    if resolved.starts_with(bucket_dir) {
        Ok(resolved)
    } else {
        Err(StorageError::PathTraversalAttempt {
            message: resolved.display().to_string().into(),
            context: Some("Object resolves outside its bucket".into()),
        })
    }
}

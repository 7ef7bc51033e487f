use crate::error::StorageError;
use std::fmt;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 63;

/// A validated bucket name.
///
/// Follows the S3 naming rules: 3 to 63 characters of lowercase ASCII letters, digits,
/// `-` and `.`, starting and ending with a letter or digit, and no `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for BucketName {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        let invalid = |reason: &'static str| StorageError::InvalidBucketName {
            message: value.to_owned().into(),
            context: Some(reason.into()),
        };

        if !(MIN_LEN..=MAX_LEN).contains(&value.len()) {
            return Err(invalid("Bucket names must be 3 to 63 characters long"));
        }
        if !value.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
        {
            return Err(invalid("Bucket names may only contain a-z, 0-9, '-' and '.'"));
        }
        let edge_ok = |b: Option<u8>| b.is_some_and(|b| b.is_ascii_alphanumeric());
        if !edge_ok(value.bytes().next()) || !edge_ok(value.bytes().last()) {
            return Err(invalid("Bucket names must start and end with a letter or digit"));
        }
        if value.contains("..") {
            return Err(invalid("Bucket names cannot contain '..'"));
        }

        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for BucketName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for BucketName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

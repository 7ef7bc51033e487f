use std::borrow::Cow;

#[dpack_derive::dpack_error]
pub enum StorageError {
    #[error("Bucket not found{}: {message}", format_context(.context))]
    BucketNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Object not found{}: {message}", format_context(.context))]
    ObjectNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid bucket name{}: {message}", format_context(.context))]
    InvalidBucketName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path traversal security violation{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}

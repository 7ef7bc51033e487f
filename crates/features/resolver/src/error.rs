use dpack_channel::ChannelError;
use dpack_storage::StorageError;
use std::borrow::Cow;

#[dpack_derive::dpack_error]
pub enum ResolveError {
    /// The policy rejected the deploy target. Raised before any I/O.
    #[error("Invalid deploy target{}: {message}", format_context(.context))]
    InvalidTarget { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Secret channel error{}: {source}", format_context(.context))]
    Channel { source: ChannelError, context: Option<Cow<'static, str>> },

    /// The batch settings object is not a JSON object.
    #[error("Settings object could not be parsed{}: {message}", format_context(.context))]
    SecretParse { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Object store error{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

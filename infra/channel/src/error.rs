use std::borrow::Cow;

#[dpack_derive::dpack_error]
pub enum ChannelError {
    #[error("Connection refused{}: {message}", format_context(.context))]
    ConnectionRefused { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("SSH authentication failed{}: {message}", format_context(.context))]
    Authentication { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Remote file not found{}: {message}", format_context(.context))]
    RemoteFileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Secret channel timed out{}: {message}", format_context(.context))]
    Timeout { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Any other non-zero exit of the transfer program.
    #[error("Transfer failed{}: {message}", format_context(.context))]
    Transfer { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Channel I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Malformed env file{}: {source}", format_context(.context))]
    EnvFile { source: dotenvy::Error, context: Option<Cow<'static, str>> },
}

use std::borrow::Cow;

/// Errors raised while loading settings or policy tables.
#[dpack_derive::dpack_error]
pub enum KernelError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Policy error{}: {message}", format_context(.context))]
    Policy { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Derive
//!
//! Procedural macros shared by the deploy pack crates.
//!
//! Currently a single attribute, [`macro@dpack_error`], which wires an error enum into
//! `thiserror` and generates the context plumbing every crate in the workspace relies on.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to `Result<T, Name>` and to `Result<T, Source>` for every wrapped upstream error.
/// * **Conversions**: Implements `From<Source>` for variants carrying a `source` field
///   (or a field marked `#[source]`/`#[from]`), so `?` works on upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an `Internal`
///   variant exists.
/// * **Kind Names**: `kind()` returns the variant name as a `&'static str`, handy as a
///   structured logging field.
///
/// # Requirements
///
/// 1. Must be applied to an **enum** with named-field variants only.
/// 2. Variants that wrap a source must also declare `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use dpack_derive::dpack_error;
/// use std::borrow::Cow;
///
/// #[dpack_error]
/// pub enum FetchError {
///     #[error("I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<String, FetchError> {
///     std::fs::read_to_string(".env").context("Reading local env file")
/// }
/// ```
#[proc_macro_attribute]
pub fn dpack_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand_derive(input).into()
}

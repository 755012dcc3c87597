#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! `#[mkp_error]` for the error enums of every wizard crate. Examples below are `ignore`d
//! here; `tests/ui` compiles real expansions.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns a named-field enum into a domain error.
///
/// Generated on top of the enum:
///
/// * `#[derive(Debug, thiserror::Error)]` unless the enum already derives them.
/// * `<Name>Ext::context(..)` for `Result<T, Name>` and for `Result<T, Source>` of every
///   variant holding a `source` (or `#[source]`/`#[from]`) field, so `?` can attach context.
/// * `From<Source>` per wrapping variant; `From<&str>` and `From<String>` when an
///   `Internal { message, context }` variant exists.
/// * `const fn code(&self)`: the `snake_case` variant name, used as a stable key when a
///   failure is localized or reported.
/// * a private `format_context` helper for the `#[error(..)]` strings.
///
/// Tuple and unit variants are rejected. Context-carrying variants declare
/// `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use mkp_derive::mkp_error;
/// use std::borrow::Cow;
///
/// #[mkp_error]
/// pub enum DraftError {
///     #[error("Snapshot codec failure{}: {source}", format_context(.context))]
///     Codec {
///         #[source]
///         source: postcard::Error,
///         context: Option<Cow<'static, str>>,
///     },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn decode(bytes: &[u8]) -> Result<Snapshot, DraftError> {
///     postcard::from_bytes(bytes).context("Decoding persisted draft")
/// }
///
/// assert_eq!(DraftError::from("boom").code(), "internal");
/// ```
#[proc_macro_attribute]
pub fn mkp_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand_derive(input).into()
}

#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the workspace infrastructure crates.
//! Currently this provides the [`macro@mkit_error`] attribute which removes
//! the boilerplate around contextual error enums.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro that turns an enum into a contextual error type.
///
/// The enum keeps its `thiserror`-style `#[error(...)]` attributes and gains:
///
/// 1. `#[derive(Debug, thiserror::Error)]` (unless already derived).
/// 2. A `<Name>Ext` trait with a `.context(..)` combinator for `Result`,
///    filling the variant's `context: Option<Cow<'static, str>>` slot.
/// 3. `From<SourceType>` for every variant carrying a `source` field.
/// 4. `From<&'static str>` / `From<String>` when an `Internal` variant with
///    a `message` field exists.
///
/// Every variant must use named fields; variants with a `source` field must
/// also carry a `context: Option<Cow<'static, str>>` field. The emitted
/// `context_suffix` helper renders that slot inside `#[error(...)]` format
/// strings.
///
/// # Example
///
/// ```rust,ignore
/// use mkit_derive::mkit_error;
/// use std::borrow::Cow;
///
/// #[mkit_error]
/// pub enum InstallError {
///     #[error("I/O failure{}: {source}", context_suffix(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", context_suffix(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &std::path::Path) -> Result<Vec<u8>, InstallError> {
///     std::fs::read(path).context("Reading prior artifact")
/// }
/// ```
#[proc_macro_attribute]
pub fn mkit_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}

//! # urlmap-macros
//!
//! Procedural macros for urlmap. Provides `#[derive(UrlParameters)]`, which
//! declares a type's URL mapping from attributes:
//!
//! ```ignore
//! #[derive(Default, UrlParameters)]
//! #[url_mapping(pattern = "thread/:id[/:message]", reroute_view = "Home")]
//! struct ThreadView {
//!     #[url_parameter]
//!     id: Option<i32>,
//!     #[url_parameter(regex = "[0-9]+")]
//!     message: Option<i64>,
//!     #[url_matched_pattern]
//!     matched: Option<String>,
//! }
//! ```
//!
//! This crate is independent of the other urlmap crates because proc-macro
//! crates cannot depend on crates that use them. Generated code refers to
//! `::urlmap_routing` unless `#[url_mapping(crate = "...")]` says otherwise.

mod string_list;
mod url_parameters;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `urlmap_routing::UrlParameters`.
///
/// Struct attributes, `#[url_mapping(...)]`:
/// - `pattern = "..."` or `pattern(path = "...", query("key=:param", ...))`,
///   repeatable, in declaration order
/// - `name = "..."` owner name used in errors and logs
/// - `crate = "..."` path of the routing crate, `::urlmap_routing` by default
/// - `reroute_error = "..."`, `reroute_view = "..."` or
///   `ignore_if_not_matched`
///
/// Field attributes, on `Option<T>` fields:
/// - `#[url_parameter(name = "...", regex = "...", dynamic)]`
/// - `#[url_matched_pattern]` on an `Option<String>` field. Without one, the
///   matched pattern is not recorded and `matched_pattern` always returns
///   `None`.
///
/// The generated `set_parameter` rejects names without a `#[url_parameter]`
/// field with a configuration error.
#[proc_macro_derive(UrlParameters, attributes(url_mapping, url_parameter, url_matched_pattern))]
pub fn derive_url_parameters(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    url_parameters::derive_url_parameters_impl(input).into()
}

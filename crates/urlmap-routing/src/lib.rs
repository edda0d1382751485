//! # urlmap-routing
//!
//! Binds URL path parameters to typed fields. A type declares its parameters
//! and a list of compact path patterns such as `thread/:id[/:message]`; the
//! patterns are compiled once per type into a single anchored regex, matched
//! against request paths, and used in reverse to format paths from the
//! current field values.
//!
//! ## Modules
//!
//! - [`coercion`] - Parameter kinds, default regexes and value parsing
//! - [`parameters`] - Declarations and the [`UrlParameters`] accessor trait
//! - [`pattern`] - The pattern grammar and its compiler
//! - [`mapping`] - The compiled mapping of one type
//! - [`matcher`] - Path normalization, winner selection and applying results
//! - [`dynamic`] - Regexes supplied per instance at match time
//! - [`format`] - Reverse formatting
//! - [`registry`] - The per-type mapping cache and the public operations
//!
//! ## Pattern grammar
//!
//! | Syntax        | Meaning                                               |
//! |---------------|-------------------------------------------------------|
//! | `:name`       | Parameter, matched with its declared or default regex |
//! | `:name:expr:` | Parameter, matched with `expr` in this pattern only   |
//! | `[...]`       | Optional group                                        |
//! | `:1` .. `:99` | Positional argument, in format templates only         |
//!
//! Query parameters are declared per pattern as `key=:name` and may appear in
//! any order; unknown pairs are ignored.
//!
//! When several patterns could match, the one declared first wins.

pub mod coercion;
pub mod dynamic;
pub mod format;
pub mod mapping;
pub mod matcher;
pub mod parameters;
pub mod pattern;
pub mod registry;

pub use coercion::{ParamKind, ParamType, ParamValue};
pub use dynamic::RegexProducer;
pub use mapping::Mapping;
pub use matcher::{MatchOutcome, MatchResult, Reroute};
pub use parameters::{
    MappingDeclaration, ParameterDescriptor, PatternDeclaration, UrlParameters, MATCH_ANY,
};
pub use pattern::PatternDefinition;
pub use registry::{match_path, matched_pattern, set_dynamic_regex, MappingRegistry};
pub use urlmap_core::{NoMatchPolicy, SelectionPolicy, Settings, UrlMapError, UrlMapResult};

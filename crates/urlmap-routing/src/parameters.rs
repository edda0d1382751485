//! Parameter declarations and the accessor trait implemented by mapped types.
//!
//! A type that wants its fields bound from a URL implements [`UrlParameters`].
//! The trait hands the registry a [`MappingDeclaration`] (the parameters and
//! patterns of the type, in declaration order) and gives it read/write access
//! to the parameter values of one instance. The declaration is usually
//! produced by `#[derive(UrlParameters)]`, but can be written by hand:
//!
//! ```
//! use urlmap_routing::coercion::{assign, ParamKind, ParamType, ParamValue};
//! use urlmap_routing::parameters::{MappingDeclaration, ParameterDescriptor, UrlParameters};
//! use urlmap_core::UrlMapResult;
//!
//! #[derive(Default)]
//! struct ThreadView {
//!     id: Option<i32>,
//! }
//!
//! impl UrlParameters for ThreadView {
//!     fn url_mapping() -> MappingDeclaration {
//!         MappingDeclaration::new("ThreadView")
//!             .parameter(ParameterDescriptor::new("id", ParamKind::Integer))
//!             .pattern("thread/:id")
//!     }
//!
//!     fn set_parameter(&mut self, name: &str, value: Option<ParamValue>) -> UrlMapResult<()> {
//!         match name {
//!             "id" => assign(&mut self.id, name, value),
//!             _ => Ok(()),
//!         }
//!     }
//!
//!     fn parameter(&self, name: &str) -> Option<ParamValue> {
//!         match name {
//!             "id" => self.id.as_ref().map(ParamType::to_value),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use urlmap_core::{NoMatchPolicy, UrlMapResult};

use crate::coercion::{ParamKind, ParamValue};

/// Pattern matching any path, including the empty one.
pub const MATCH_ANY: &str = ".*?";

/// Describes one bindable parameter of a mapped type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// The parameter name referenced by `:name` placeholders.
    pub name: String,
    /// The declared type.
    pub kind: ParamKind,
    /// A regex replacing the kind's default, if any.
    #[serde(default)]
    pub regex: Option<String>,
    /// Whether the regex is supplied per instance at match time.
    #[serde(default)]
    pub dynamic: bool,
}

impl ParameterDescriptor {
    /// Creates a descriptor using the kind's default regex.
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            regex: None,
            dynamic: false,
        }
    }

    /// Sets a static regex.
    #[must_use]
    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = Some(regex.into());
        self
    }

    /// Marks the parameter as dynamic.
    #[must_use]
    pub const fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }
}

/// One declared pattern together with its query-parameter sub-patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDeclaration {
    /// The raw path pattern, e.g. `"thread/:id[/:message]"`.
    pub pattern: String,
    /// Query sub-patterns such as `"mode=:mode:edit|print:"`.
    #[serde(default)]
    pub query: Vec<String>,
}

impl PatternDeclaration {
    /// Creates a declaration without query parameters.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            query: Vec::new(),
        }
    }

    /// Adds a query sub-pattern.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query.push(query.into());
        self
    }
}

impl From<&str> for PatternDeclaration {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}

/// Everything the registry needs to know about a mapped type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDeclaration {
    /// The type name used in diagnostics.
    pub owner: String,
    /// Parameters in declaration order.
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Patterns in declaration order; the position is the match priority.
    #[serde(default)]
    pub patterns: Vec<PatternDeclaration>,
    /// What to signal when nothing matches. `None` uses the registry default.
    #[serde(default)]
    pub no_match: Option<NoMatchPolicy>,
}

impl MappingDeclaration {
    /// Creates an empty declaration for `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            parameters: Vec::new(),
            patterns: Vec::new(),
            no_match: None,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn parameter(mut self, descriptor: ParameterDescriptor) -> Self {
        self.parameters.push(descriptor);
        self
    }

    /// Appends a pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<PatternDeclaration>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Sets the no-match policy.
    #[must_use]
    pub fn no_match(mut self, policy: NoMatchPolicy) -> Self {
        self.no_match = Some(policy);
        self
    }

    /// Looks up a parameter by name.
    pub fn find(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Access to the URL parameters of one instance.
///
/// The registry calls [`url_mapping`](UrlParameters::url_mapping) once per
/// type and caches the compiled result. A match sets every captured parameter
/// and clears all others through [`set_parameter`](UrlParameters::set_parameter).
pub trait UrlParameters: 'static {
    /// Returns the declaration of this type.
    fn url_mapping() -> MappingDeclaration
    where
        Self: Sized;

    /// Sets (`Some`) or clears (`None`) a parameter.
    fn set_parameter(&mut self, name: &str, value: Option<ParamValue>) -> UrlMapResult<()>;

    /// Returns the current value of a parameter.
    fn parameter(&self, name: &str) -> Option<ParamValue>;

    /// Records the raw pattern that matched last, or clears it.
    ///
    /// The default implementation discards the record, so a type must
    /// override both this and [`matched_pattern`](UrlParameters::matched_pattern)
    /// to answer which pattern matched. With the derive, that means adding a
    /// `#[url_matched_pattern]` field.
    fn set_matched_pattern(&mut self, _pattern: Option<&str>) {}

    /// Returns the raw pattern that matched last.
    ///
    /// Always `None` unless the type overrides this method.
    fn matched_pattern(&self) -> Option<&str> {
        None
    }
}

//! Core error types for urlmap.
//!
//! [`UrlMapError`] covers every failure the pattern compiler, matcher and
//! formatter can report, plus configuration loading. Errors are grouped into
//! an [`ErrorCategory`] so callers can tell a static misconfiguration (which
//! will fail the same way every time) from a bad input value.

use thiserror::Error;

/// Broad classification of a [`UrlMapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The mapping for a type could not be compiled.
    Build,
    /// A match attempt could not be carried out.
    Match,
    /// A captured value could not be converted to its declared type.
    Coercion,
    /// A path could not be synthesized from a template.
    Format,
    /// Settings could not be loaded.
    Configuration,
}

/// The error type for all urlmap operations.
///
/// Variants mirror the failure taxonomy of the mapping lifecycle: build-time
/// errors are raised while a type's patterns are compiled and are never
/// cached, match-time and coercion errors abort one match attempt, and
/// format errors abort one reverse formatting call.
#[derive(Error, Debug)]
pub enum UrlMapError {
    // ── Build ────────────────────────────────────────────────────────

    /// A pattern references a parameter that the owning type does not declare.
    #[error("Unknown parameter '{parameter}' in pattern '{pattern}' of {owner}")]
    UnknownParameter {
        /// The referenced parameter name.
        parameter: String,
        /// The raw pattern containing the reference.
        pattern: String,
        /// The owning type.
        owner: String,
    },

    /// Two parameters share the same name, or one pattern captures the same
    /// parameter twice.
    #[error("Duplicate parameter '{parameter}' in {owner}")]
    DuplicateParameter {
        /// The duplicated name.
        parameter: String,
        /// The owning type.
        owner: String,
    },

    /// A parameter is declared with a type that has no default regex and no
    /// explicit regex was supplied.
    #[error("Unsupported parameter type '{type_name}' for parameter '{parameter}' of {owner}")]
    UnsupportedType {
        /// The declared type name.
        type_name: String,
        /// The parameter name.
        parameter: String,
        /// The owning type.
        owner: String,
    },

    /// A pattern or query declaration is syntactically malformed.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The raw pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The assembled regular expression was rejected by the regex engine.
    #[error("Invalid regular expression for {owner}: {reason}")]
    InvalidRegex {
        /// The owning type.
        owner: String,
        /// The engine's error message.
        reason: String,
    },

    // ── Match ────────────────────────────────────────────────────────

    /// A dynamic parameter was matched before its regex producer was registered.
    #[error("No dynamic regex specified for parameter '{parameter}' of {owner}")]
    NoDynamicRegex {
        /// The dynamic parameter.
        parameter: String,
        /// The owning type.
        owner: String,
    },

    // ── Coercion ─────────────────────────────────────────────────────

    /// A captured value could not be set on the owning instance.
    #[error("Cannot set parameter '{parameter}' to value \"{value}\": {reason}")]
    Coercion {
        /// The parameter being set.
        parameter: String,
        /// The offending raw value.
        value: String,
        /// Why the conversion failed.
        reason: String,
    },

    // ── Format ───────────────────────────────────────────────────────

    /// A path could not be produced from a format template.
    #[error("Cannot format '{template}' (got '{rendered}'): {reason}")]
    Format {
        /// The original template.
        template: String,
        /// The string produced so far, with missing values marked.
        rendered: String,
        /// What went wrong.
        reason: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An I/O error occurred while reading configuration.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl UrlMapError {
    /// Returns the category of this error.
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownParameter { .. }
            | Self::DuplicateParameter { .. }
            | Self::UnsupportedType { .. }
            | Self::InvalidPattern { .. }
            | Self::InvalidRegex { .. } => ErrorCategory::Build,
            Self::NoDynamicRegex { .. } => ErrorCategory::Match,
            Self::Coercion { .. } => ErrorCategory::Coercion,
            Self::Format { .. } => ErrorCategory::Format,
            Self::ConfigurationError(_) | Self::IoError(_) => ErrorCategory::Configuration,
        }
    }

    /// Returns `true` if this error was raised while compiling a mapping.
    pub const fn is_build_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Build)
    }

    /// Shorthand for an [`UrlMapError::InvalidPattern`].
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`UrlMapError::Coercion`].
    pub fn coercion(
        parameter: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Coercion {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// A convenience type alias for `Result<T, UrlMapError>`.
pub type UrlMapResult<T> = Result<T, UrlMapError>;

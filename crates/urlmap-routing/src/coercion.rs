//! Parameter types and the conversion of captured text into typed values.
//!
//! Every URL parameter is declared with a [`ParamKind`]. The kind supplies the
//! default regex used when a pattern does not override it, and the parser that
//! turns the captured text into a [`ParamValue`].
//!
//! # Supported kinds
//!
//! | Kind      | Default regex                                                | Rust type    |
//! |-----------|--------------------------------------------------------------|--------------|
//! | `String`  | `[^/]+`                                                      | `String`     |
//! | `Integer` | `-?[0-1]?[0-9]{1,9}`                                         | `i32`        |
//! | `Long`    | `-?[0-8]?[0-9]{1,18}`                                        | `i64`        |
//! | `Boolean` | `true\|false`                                                | `bool`       |
//! | `Uuid`    | `[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}` | `uuid::Uuid` |
//!
//! A custom regex never changes the parse target: text captured by a looser
//! regex is still parsed as the declared kind, and a failure is reported as
//! [`UrlMapError::Coercion`].

use std::fmt;

use serde::{Deserialize, Serialize};
use urlmap_core::{UrlMapError, UrlMapResult};

/// Default regex for [`ParamKind::String`].
pub const STRING_REGEX: &str = "[^/]+";
/// Default regex for [`ParamKind::Integer`].
pub const INTEGER_REGEX: &str = "-?[0-1]?[0-9]{1,9}";
/// Default regex for [`ParamKind::Long`].
pub const LONG_REGEX: &str = "-?[0-8]?[0-9]{1,18}";
/// Default regex for [`ParamKind::Boolean`].
pub const BOOLEAN_REGEX: &str = "true|false";
/// Default regex for [`ParamKind::Uuid`].
pub const UUID_REGEX: &str = "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}";

/// The declared type of a URL parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Free text without slashes.
    String,
    /// A 32-bit signed integer.
    Integer,
    /// A 64-bit signed integer.
    Long,
    /// `true` or `false`.
    Boolean,
    /// A hyphenated UUID.
    Uuid,
    /// Any other declared type, carrying its name for diagnostics.
    ///
    /// Such a parameter needs an explicit regex; its captured text is handed
    /// over as [`ParamValue::Str`].
    Other(String),
}

impl ParamKind {
    /// Maps a declared type name to a kind.
    ///
    /// Both Rust names (`i32`, `bool`) and their boxed-language spellings
    /// (`Integer`, `Boolean`) are accepted. Anything else yields
    /// [`ParamKind::Other`].
    ///
    /// # Examples
    ///
    /// ```
    /// use urlmap_routing::coercion::ParamKind;
    ///
    /// assert_eq!(ParamKind::from_type_name("i64"), ParamKind::Long);
    /// assert_eq!(ParamKind::from_type_name("UUID"), ParamKind::Uuid);
    /// assert_eq!(ParamKind::from_type_name("f64"), ParamKind::Other("f64".into()));
    /// ```
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "String" | "str" => Self::String,
            "i32" | "Integer" | "int" => Self::Integer,
            "i64" | "Long" | "long" => Self::Long,
            "bool" | "Boolean" | "boolean" => Self::Boolean,
            "Uuid" | "UUID" => Self::Uuid,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the type name used in diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Boolean => "Boolean",
            Self::Uuid => "Uuid",
            Self::Other(name) => name,
        }
    }

    /// Returns the default regex for this kind, or `None` for
    /// [`ParamKind::Other`].
    pub const fn default_regex(&self) -> Option<&'static str> {
        match self {
            Self::String => Some(STRING_REGEX),
            Self::Integer => Some(INTEGER_REGEX),
            Self::Long => Some(LONG_REGEX),
            Self::Boolean => Some(BOOLEAN_REGEX),
            Self::Uuid => Some(UUID_REGEX),
            Self::Other(_) => None,
        }
    }

    /// Returns the default regex for this kind, failing with
    /// [`UrlMapError::UnsupportedType`] when there is none.
    pub fn require_default_regex(&self, parameter: &str, owner: &str) -> UrlMapResult<&'static str> {
        self.default_regex()
            .ok_or_else(|| UrlMapError::UnsupportedType {
                type_name: self.type_name().to_string(),
                parameter: parameter.to_string(),
                owner: owner.to_string(),
            })
    }

    /// Parses captured text into a value of this kind.
    ///
    /// `parameter` is only used to label the error.
    pub fn parse(&self, parameter: &str, raw: &str) -> UrlMapResult<ParamValue> {
        let fail = |reason: String| UrlMapError::coercion(parameter, raw, reason);
        match self {
            Self::String => Ok(ParamValue::Str(raw.to_string())),
            Self::Other(name) => Err(fail(format!("unsupported parameter type '{name}'"))),
            Self::Integer => raw
                .parse::<i32>()
                .map(ParamValue::Integer)
                .map_err(|e| fail(e.to_string())),
            Self::Long => raw
                .parse::<i64>()
                .map(ParamValue::Long)
                .map_err(|e| fail(e.to_string())),
            Self::Boolean => match raw {
                "true" => Ok(ParamValue::Boolean(true)),
                "false" => Ok(ParamValue::Boolean(false)),
                _ => Err(fail("expected 'true' or 'false'".to_string())),
            },
            Self::Uuid => uuid::Uuid::try_parse(raw)
                .map(ParamValue::Uuid)
                .map_err(|e| fail(e.to_string())),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A typed parameter value.
///
/// `Display` renders the canonical text used when formatting a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A string value.
    Str(String),
    /// A 32-bit integer value.
    Integer(i32),
    /// A 64-bit integer value.
    Long(i64),
    /// A boolean value.
    Boolean(bool),
    /// A UUID value.
    Uuid(uuid::Uuid),
}

impl ParamValue {
    /// Returns the kind this value belongs to.
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::Str(_) => ParamKind::String,
            Self::Integer(_) => ParamKind::Integer,
            Self::Long(_) => ParamKind::Long,
            Self::Boolean(_) => ParamKind::Boolean,
            Self::Uuid(_) => ParamKind::Uuid,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(v) => f.write_str(v),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Uuid(v) => write!(f, "{}", v.hyphenated()),
        }
    }
}

/// A Rust type that can hold a URL parameter.
///
/// Implemented for the five supported kinds. Used by hand-written and derived
/// [`UrlParameters`](crate::UrlParameters) implementations to move values in
/// and out of their fields.
pub trait ParamType: Sized {
    /// The kind matching this type.
    fn kind() -> ParamKind;

    /// Extracts a value of this type, or `None` if `value` holds another kind.
    fn from_value(value: ParamValue) -> Option<Self>;

    /// Wraps this value.
    fn to_value(&self) -> ParamValue;
}

macro_rules! impl_param_type {
    ($ty:ty, $variant:ident, $kind:ident) => {
        impl ParamType for $ty {
            fn kind() -> ParamKind {
                ParamKind::$kind
            }

            fn from_value(value: ParamValue) -> Option<Self> {
                match value {
                    ParamValue::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn to_value(&self) -> ParamValue {
                ParamValue::$variant(self.clone())
            }
        }
    };
}

impl_param_type!(String, Str, String);
impl_param_type!(i32, Integer, Integer);
impl_param_type!(i64, Long, Long);
impl_param_type!(bool, Boolean, Boolean);
impl_param_type!(uuid::Uuid, Uuid, Uuid);

/// Stores `value` into an optional field, failing when the value has the
/// wrong kind.
///
/// # Examples
///
/// ```
/// use urlmap_routing::coercion::{assign, ParamValue};
///
/// let mut id: Option<i32> = None;
/// assign(&mut id, "id", Some(ParamValue::Integer(7))).unwrap();
/// assert_eq!(id, Some(7));
/// assign(&mut id, "id", None).unwrap();
/// assert_eq!(id, None);
/// assert!(assign(&mut id, "id", Some(ParamValue::Boolean(true))).is_err());
/// ```
pub fn assign<V: ParamType>(
    slot: &mut Option<V>,
    parameter: &str,
    value: Option<ParamValue>,
) -> UrlMapResult<()> {
    match value {
        None => {
            *slot = None;
            Ok(())
        }
        Some(value) => {
            let rendered = value.to_string();
            let found = value.kind();
            *slot = Some(V::from_value(value).ok_or_else(|| {
                UrlMapError::coercion(
                    parameter,
                    rendered,
                    format!("expected {}, got {found}", V::kind()),
                )
            })?);
            Ok(())
        }
    }
}

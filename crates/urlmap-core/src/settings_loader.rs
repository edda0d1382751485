//! Settings loading from configuration files.
//!
//! This module loads [`Settings`] from TOML or JSON and applies environment
//! variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `URLMAP_DEBUG` | `debug` |
//! | `URLMAP_LOG_LEVEL` | `log_level` |
//! | `URLMAP_REGEX_SIZE_LIMIT` | `regex_size_limit` |
//! | `URLMAP_SELECTION_POLICY` | `selection_policy` (`declaration_order` / `most_captured`) |
//! | `URLMAP_MISSING_MARKER` | `missing_marker` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use urlmap_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/urlmap.toml").unwrap();
//! let settings = settings_loader::from_toml_file_with_env("config/urlmap.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::UrlMapError;
use crate::policy::SelectionPolicy;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys not present in the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, UrlMapError> {
    // Deserialize into a generic value first and merge over the defaults so
    // that partial documents are accepted.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| UrlMapError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, UrlMapError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        UrlMapError::ConfigurationError(format!(
            "Failed to read TOML file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, UrlMapError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, UrlMapError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| UrlMapError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, UrlMapError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        UrlMapError::ConfigurationError(format!(
            "Failed to read JSON file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Unparseable numeric or policy values are ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("URLMAP_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("URLMAP_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("URLMAP_REGEX_SIZE_LIMIT") {
        if let Ok(limit) = val.parse::<usize>() {
            settings.regex_size_limit = limit;
        }
    }

    if let Ok(val) = std::env::var("URLMAP_SELECTION_POLICY") {
        match val.to_lowercase().as_str() {
            "declaration_order" => settings.selection_policy = SelectionPolicy::DeclarationOrder,
            "most_captured" => settings.selection_policy = SelectionPolicy::MostCaptured,
            _ => {}
        }
    }

    if let Ok(val) = std::env::var("URLMAP_MISSING_MARKER") {
        settings.missing_marker = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, UrlMapError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        UrlMapError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        UrlMapError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Merges the top-level keys of `override_val` over `base`.
///
/// Values are replaced wholesale: policies are externally tagged enums, and
/// merging two variant tables key by key would produce an invalid document.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            base_map.extend(override_map);
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

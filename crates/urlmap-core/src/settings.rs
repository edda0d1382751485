//! Settings for urlmap.
//!
//! [`Settings`] holds the knobs shared by every mapping registry: logging,
//! regex compilation limits, and the default match policies. [`LazySettings`]
//! offers a globally-accessible instance configured once at startup.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::policy::{NoMatchPolicy, SelectionPolicy};

/// The complete set of urlmap settings.
///
/// # Examples
///
/// ```
/// use urlmap_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.missing_marker, "<missing:{}>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter (e.g. "info", "urlmap_routing=trace").
    pub log_level: String,

    // ── Regex ────────────────────────────────────────────────────────

    /// Upper bound in bytes for a compiled mapping regex.
    pub regex_size_limit: usize,

    // ── Matching ─────────────────────────────────────────────────────

    /// The no-match policy for types that do not declare their own.
    pub default_no_match: NoMatchPolicy,
    /// How the winning pattern is chosen.
    pub selection_policy: SelectionPolicy,

    // ── Formatting ───────────────────────────────────────────────────

    /// Marker rendered in format diagnostics for a missing value; `{}` is
    /// replaced with the parameter name.
    pub missing_marker: String,
}

impl Settings {
    /// Renders the missing-value marker for `name`.
    pub fn missing_marker_for(&self, name: &str) -> String {
        self.missing_marker.replace("{}", name)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Core
            debug: true,

            // Logging
            log_level: "info".to_string(),

            // Regex
            regex_size_limit: 10 * (1 << 20),

            // Matching
            default_no_match: NoMatchPolicy::default(),
            selection_policy: SelectionPolicy::default(),

            // Formatting
            missing_marker: "<missing:{}>".to_string(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup; until then
/// [`get`](LazySettings::get) returns the defaults.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called at most once, before
    /// the first [`get`](LazySettings::get).
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured or read.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns the configured settings, falling back to defaults.
    pub fn get(&self) -> &Settings {
        self.inner.get_or_init(Settings::default)
    }

    /// Returns `true` if settings have been configured or read.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();

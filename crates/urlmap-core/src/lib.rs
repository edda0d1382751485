//! # urlmap-core
//!
//! Core types for urlmap: the error taxonomy, settings and their loading, the
//! match policies, and logging helpers. This crate has no routing logic and
//! is the foundation for the other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`policy`] - No-match and winner-selection policies
//! - [`settings`] - Settings and the global settings instance
//! - [`settings_loader`] - Loading settings from TOML, JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod policy;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{ErrorCategory, UrlMapError, UrlMapResult};
pub use policy::{NoMatchPolicy, SelectionPolicy, NOT_FOUND};
pub use settings::{Settings, SETTINGS};

//! Logging integration for urlmap.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-match spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level` (e.g. "debug",
/// "urlmap_routing=trace"). In debug mode a pretty, human-readable format is
/// used; otherwise a structured JSON format is used. Installing a subscriber
/// twice is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one match attempt.
///
/// # Examples
///
/// ```
/// use urlmap_core::logging::match_span;
///
/// let span = match_span("ThreadView", "/thread/5");
/// let _guard = span.enter();
/// tracing::trace!("matching");
/// ```
pub fn match_span(owner: &str, path: &str) -> tracing::Span {
    tracing::debug_span!("url_match", owner = owner, path = path)
}

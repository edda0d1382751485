//! # urlmap
//!
//! Typed URL parameters from compact path patterns.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `urlmap` for everything, or on the individual crates for
//! finer-grained control.
//!
//! ```
//! # #[cfg(feature = "macros")]
//! # {
//! use urlmap::prelude::*;
//!
//! #[derive(Default, UrlParameters)]
//! #[url_mapping(crate = "urlmap::routing", pattern = "thread/:id[/:message]")]
//! struct ThreadView {
//!     #[url_parameter]
//!     id: Option<i32>,
//!     #[url_parameter]
//!     message: Option<i64>,
//! }
//!
//! let mut view = ThreadView::default();
//! assert!(match_path(&mut view, "thread/5/42").unwrap().is_matched());
//! assert_eq!((view.id, view.message), (Some(5), Some(42)));
//! assert_eq!(format(&view, "thread/:id", &[]).unwrap(), "thread/5");
//! # }
//! ```

/// Settings, errors, policies and logging setup.
pub use urlmap_core as core;

/// Pattern compiler, matcher, formatter and mapping registry.
pub use urlmap_routing as routing;

/// The `UrlParameters` derive macro.
#[cfg(feature = "macros")]
pub use urlmap_macros as macros;

/// The names most applications need.
pub mod prelude {
    pub use urlmap_core::{NoMatchPolicy, Settings, UrlMapError, UrlMapResult, SETTINGS};
    #[cfg(feature = "macros")]
    pub use urlmap_macros::UrlParameters;
    pub use urlmap_routing::registry::{format, match_path, matched_pattern, set_dynamic_regex};
    pub use urlmap_routing::{
        MappingRegistry, MatchOutcome, ParamValue, Reroute, UrlParameters, MATCH_ANY,
    };
}

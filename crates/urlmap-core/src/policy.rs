//! Policies that govern match outcomes.
//!
//! [`NoMatchPolicy`] decides what the navigation layer is told when no pattern
//! of a type matches, and [`SelectionPolicy`] decides which alternative wins
//! when more than one captured.

use serde::{Deserialize, Serialize};

/// The error kind used when no explicit reroute target is configured.
pub const NOT_FOUND: &str = "NotFound";

/// What to do when a path matches none of a type's patterns.
///
/// Parameters are cleared in every case; the policy only controls the signal
/// handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchPolicy {
    /// Treat the miss as a normal outcome and signal nothing.
    Ignore,
    /// Reroute to the error handler identified by the given kind.
    RerouteToError(String),
    /// Reroute to the view identified by the given kind.
    RerouteToView(String),
}

impl Default for NoMatchPolicy {
    fn default() -> Self {
        Self::RerouteToError(NOT_FOUND.to_string())
    }
}

/// How the winning alternative is chosen among those that captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// The first declared pattern wins.
    #[default]
    DeclarationOrder,
    /// The pattern that captured the most parameters wins; ties go to the
    /// first declared.
    MostCaptured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_no_match_policy() {
        assert_eq!(
            NoMatchPolicy::default(),
            NoMatchPolicy::RerouteToError("NotFound".to_string())
        );
    }

    #[test]
    fn test_default_selection_policy() {
        assert_eq!(SelectionPolicy::default(), SelectionPolicy::DeclarationOrder);
    }

    #[test]
    fn test_no_match_policy_serde() {
        let json = serde_json::to_value(NoMatchPolicy::Ignore).unwrap();
        assert_eq!(json, serde_json::json!("ignore"));

        let policy: NoMatchPolicy =
            serde_json::from_value(serde_json::json!({"reroute_to_view": "HomeView"})).unwrap();
        assert_eq!(policy, NoMatchPolicy::RerouteToView("HomeView".to_string()));
    }

    #[test]
    fn test_selection_policy_serde() {
        let policy: SelectionPolicy =
            serde_json::from_value(serde_json::json!("most_captured")).unwrap();
        assert_eq!(policy, SelectionPolicy::MostCaptured);
    }
}

//! Matching a path against a mapping and applying the result.
//!
//! Matching happens in two steps. [`Mapping::select`] runs the anchored
//! regex and picks the winning alternative without touching any instance.
//! [`MatchResult::apply`] then converts the captured text and writes it to
//! the instance: captured parameters are set, every other parameter is
//! cleared, and the matched pattern is recorded.

use std::fmt;

use regex::Regex;
use urlmap_core::{NoMatchPolicy, SelectionPolicy, UrlMapResult};

use crate::coercion::ParamValue;
use crate::mapping::Mapping;
use crate::parameters::UrlParameters;
use crate::pattern::compiler::PatternDefinition;

/// Where the navigation layer should go after a miss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reroute {
    /// Show the error handler of the given kind.
    Error(String),
    /// Show the view of the given kind.
    View(String),
}

impl Reroute {
    /// Returns the signal for `policy`, or `None` for
    /// [`NoMatchPolicy::Ignore`].
    pub fn from_policy(policy: &NoMatchPolicy) -> Option<Self> {
        match policy {
            NoMatchPolicy::Ignore => None,
            NoMatchPolicy::RerouteToError(kind) => Some(Self::Error(kind.clone())),
            NoMatchPolicy::RerouteToView(kind) => Some(Self::View(kind.clone())),
        }
    }
}

impl fmt::Display for Reroute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(kind) => write!(f, "error:{kind}"),
            Self::View(kind) => write!(f, "view:{kind}"),
        }
    }
}

/// The observable result of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A pattern matched and the instance was updated.
    Matched {
        /// The winning pattern as declared.
        pattern: String,
    },
    /// Nothing matched; all parameters were cleared.
    NotMatched {
        /// The signal from the no-match policy.
        reroute: Option<Reroute>,
    },
}

impl MatchOutcome {
    /// Returns `true` for [`MatchOutcome::Matched`].
    pub const fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Returns the winning pattern.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            Self::Matched { pattern } => Some(pattern.as_str()),
            Self::NotMatched { .. } => None,
        }
    }

    /// Returns the reroute signal of a miss.
    pub const fn reroute(&self) -> Option<&Reroute> {
        match self {
            Self::NotMatched { reroute } => reroute.as_ref(),
            Self::Matched { .. } => None,
        }
    }
}

/// Brings `path` into the shape the compiled regex expects: exactly one
/// leading `/`, a `?`, and a terminating `&`.
///
/// # Examples
///
/// ```
/// use urlmap_routing::matcher::normalize_path;
///
/// assert_eq!(normalize_path("thread/5"), "/thread/5?&");
/// assert_eq!(normalize_path("//thread/5?mode=edit"), "/thread/5?mode=edit&");
/// assert_eq!(normalize_path("/a?x=1&"), "/a?x=1&");
/// ```
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    let mut normalized = String::with_capacity(trimmed.len() + 3);
    normalized.push('/');
    normalized.push_str(trimmed);
    if !normalized.contains('?') {
        normalized.push('?');
    }
    if !normalized.ends_with('&') {
        normalized.push('&');
    }
    normalized
}

/// The winner of a match and its captured text, not yet applied.
#[derive(Debug)]
pub struct MatchResult<'m> {
    mapping: &'m Mapping,
    winner: Option<&'m PatternDefinition>,
    captured: Vec<(&'m str, String)>,
}

impl Mapping {
    /// Matches `path` against `regex` (the regex of this mapping, see
    /// [`DynamicRegexes::regex_for`](crate::dynamic::DynamicRegexes::regex_for))
    /// and selects the winning alternative.
    pub fn select<'m>(&'m self, regex: &Regex, path: &str) -> MatchResult<'m> {
        let normalized = normalize_path(path);
        let Some(captures) = regex.captures(&normalized) else {
            return MatchResult {
                mapping: self,
                winner: None,
                captured: Vec::new(),
            };
        };

        let captured_by = |pattern: &'m PatternDefinition| -> Vec<(&'m str, String)> {
            pattern
                .parameters()
                .iter()
                .filter_map(|name| {
                    captures
                        .name(&pattern.group_name(name))
                        .map(|m| (name.as_str(), m.as_str().to_string()))
                })
                .collect()
        };

        let mut candidates = self
            .patterns()
            .iter()
            .filter(|p| captures.name(p.fragment()).is_some());

        let winner = match self.selection() {
            SelectionPolicy::DeclarationOrder => candidates.next().map(|p| (p, captured_by(p))),
            SelectionPolicy::MostCaptured => {
                let mut best: Option<(&PatternDefinition, Vec<(&str, String)>)> = None;
                for pattern in candidates {
                    let values = captured_by(pattern);
                    if best.as_ref().map_or(true, |(_, b)| values.len() > b.len()) {
                        best = Some((pattern, values));
                    }
                }
                best
            }
        };

        let (winner, captured) = match winner {
            Some((pattern, captured)) => (Some(pattern), captured),
            None => (None, Vec::new()),
        };
        tracing::trace!(
            owner = self.owner(),
            path = %normalized,
            winner = ?winner.map(PatternDefinition::raw),
            "Selected pattern"
        );
        MatchResult {
            mapping: self,
            winner,
            captured,
        }
    }
}

impl<'m> MatchResult<'m> {
    /// Returns the winning pattern.
    pub const fn winner(&self) -> Option<&'m PatternDefinition> {
        self.winner
    }

    /// Returns `true` if a pattern matched.
    pub const fn is_match(&self) -> bool {
        self.winner.is_some()
    }

    /// Returns the raw text captured for `name`.
    pub fn captured(&self, name: &str) -> Option<&str> {
        self.captured
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the parameters that will be cleared by [`apply`](Self::apply).
    pub fn cleared(&self) -> Vec<&'m str> {
        self.mapping
            .parameters()
            .iter()
            .map(|p| p.name.as_str())
            .filter(|name| self.captured(name).is_none())
            .collect()
    }

    /// Writes the result to `instance`.
    ///
    /// All captured values are converted before anything is written, so a
    /// coercion error leaves the instance unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`UrlMapError::Coercion`](urlmap_core::UrlMapError::Coercion)
    /// if captured text cannot be parsed as its declared kind, or whatever
    /// error the instance's setter reports.
    pub fn apply<T: UrlParameters + ?Sized>(self, instance: &mut T) -> UrlMapResult<MatchOutcome> {
        let Some(winner) = self.winner else {
            for descriptor in self.mapping.parameters() {
                instance.set_parameter(&descriptor.name, None)?;
            }
            instance.set_matched_pattern(None);
            let reroute = Reroute::from_policy(self.mapping.no_match());
            tracing::debug!(
                owner = self.mapping.owner(),
                reroute = ?reroute,
                "No URL pattern matched"
            );
            return Ok(MatchOutcome::NotMatched { reroute });
        };

        let mut values: Vec<(&str, ParamValue)> = Vec::with_capacity(self.captured.len());
        for (name, raw) in &self.captured {
            let Some(descriptor) = self.mapping.descriptor(name) else {
                continue;
            };
            match descriptor.kind.parse(name, raw) {
                Ok(value) => values.push((*name, value)),
                Err(e) => {
                    tracing::warn!(
                        owner = self.mapping.owner(),
                        parameter = *name,
                        value = %raw,
                        "Failed to convert URL parameter"
                    );
                    return Err(e);
                }
            }
        }

        for descriptor in self.mapping.parameters() {
            let value = values
                .iter()
                .position(|(name, _)| *name == descriptor.name)
                .map(|i| values.swap_remove(i).1);
            instance.set_parameter(&descriptor.name, value)?;
        }
        instance.set_matched_pattern(Some(winner.raw()));

        Ok(MatchOutcome::Matched {
            pattern: winner.raw().to_string(),
        })
    }
}

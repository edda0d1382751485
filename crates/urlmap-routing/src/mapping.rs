//! The compiled mapping of one type.
//!
//! [`Mapping::build`] compiles every declared pattern in declaration order and
//! joins the fragments into a single anchored alternation:
//!
//! ```text
//! ^(?:(?P<p0>...)|(?P<p1>...)|...)$
//! ```
//!
//! When a referenced parameter is dynamic the regex cannot be fixed up front,
//! so the mapping keeps the [`Pieces`] and the regex is assembled per match
//! (see [`dynamic`](crate::dynamic)).

use std::collections::HashSet;
use std::fmt;

use regex::{Regex, RegexBuilder};
use urlmap_core::{NoMatchPolicy, SelectionPolicy, Settings, UrlMapError, UrlMapResult};

use crate::parameters::{MappingDeclaration, ParameterDescriptor};
use crate::pattern::compiler::{self, PatternDefinition, Pieces};

/// The regex of a mapping.
#[derive(Debug, Clone)]
pub enum MappingRegex {
    /// Compiled once at build time.
    Static(Regex),
    /// Assembled and compiled per match.
    Dynamic(Pieces),
}

/// The compiled, immutable mapping of one type.
pub struct Mapping {
    owner: String,
    parameters: Vec<ParameterDescriptor>,
    patterns: Vec<PatternDefinition>,
    no_match: NoMatchPolicy,
    selection: SelectionPolicy,
    regex_size_limit: usize,
    regex: MappingRegex,
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("owner", &self.owner)
            .field("patterns", &self.patterns)
            .field("no_match", &self.no_match)
            .field("selection", &self.selection)
            .field("dynamic", &self.is_dynamic())
            .finish_non_exhaustive()
    }
}

impl Mapping {
    /// Compiles `declaration`.
    ///
    /// Declarations without a no-match policy use
    /// `settings.default_no_match`.
    ///
    /// # Errors
    ///
    /// Returns a build error ([`UrlMapError::is_build_error`]) when a
    /// parameter is declared twice, a parameter has an unsupported kind (even
    /// with an explicit or dynamic regex), a pattern fails to compile, or the assembled regex is
    /// rejected.
    pub fn build(declaration: &MappingDeclaration, settings: &Settings) -> UrlMapResult<Self> {
        let owner = &declaration.owner;

        let mut names = HashSet::new();
        for descriptor in &declaration.parameters {
            if !names.insert(descriptor.name.as_str()) {
                return Err(UrlMapError::DuplicateParameter {
                    parameter: descriptor.name.clone(),
                    owner: owner.clone(),
                });
            }
            descriptor
                .kind
                .require_default_regex(&descriptor.name, owner)?;
        }

        let mut pieces = Pieces::default();
        pieces.text("^(?:");
        let mut patterns = Vec::with_capacity(declaration.patterns.len());
        for (index, pattern) in declaration.patterns.iter().enumerate() {
            let compiled = compiler::compile(declaration, pattern, index)?;
            if index > 0 {
                pieces.text("|");
            }
            pieces.extend(compiled.pieces);
            patterns.push(compiled.definition);
        }
        pieces.text(")$");

        let regex = match pieces.as_static() {
            Some(source) => MappingRegex::Static(compile_regex(
                owner,
                &source,
                settings.regex_size_limit,
            )?),
            None => MappingRegex::Dynamic(pieces),
        };

        let mapping = Self {
            owner: owner.clone(),
            parameters: declaration.parameters.clone(),
            patterns,
            no_match: declaration
                .no_match
                .clone()
                .unwrap_or_else(|| settings.default_no_match.clone()),
            selection: settings.selection_policy,
            regex_size_limit: settings.regex_size_limit,
            regex,
        };

        tracing::debug!(
            owner = %mapping.owner,
            patterns = mapping.patterns.len(),
            dynamic = mapping.is_dynamic(),
            "Built URL mapping"
        );
        Ok(mapping)
    }

    /// Returns the owning type name.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the parameter descriptors in declaration order.
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Looks up a parameter descriptor.
    pub fn descriptor(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Returns the compiled patterns in declaration order.
    pub fn patterns(&self) -> &[PatternDefinition] {
        &self.patterns
    }

    /// Returns the no-match policy in effect.
    pub const fn no_match(&self) -> &NoMatchPolicy {
        &self.no_match
    }

    /// Returns the winner-selection policy in effect.
    pub const fn selection(&self) -> SelectionPolicy {
        self.selection
    }

    /// Returns the regex of this mapping.
    pub const fn regex(&self) -> &MappingRegex {
        &self.regex
    }

    /// Returns `true` if the regex is assembled per match.
    pub const fn is_dynamic(&self) -> bool {
        matches!(self.regex, MappingRegex::Dynamic(_))
    }

    /// Compiles a regex assembled for this mapping.
    pub fn compile_regex(&self, source: &str) -> UrlMapResult<Regex> {
        compile_regex(&self.owner, source, self.regex_size_limit)
    }
}

fn compile_regex(owner: &str, source: &str, size_limit: usize) -> UrlMapResult<Regex> {
    RegexBuilder::new(source)
        .size_limit(size_limit)
        .build()
        .map_err(|e| UrlMapError::InvalidRegex {
            owner: owner.to_string(),
            reason: e.to_string(),
        })
}

//! Compiles one declared pattern into a regex fragment.
//!
//! A pattern such as `thread/:id[/:message]` with the query sub-pattern
//! `mode=:mode:edit|print:` compiles, as declaration `0`, to:
//!
//! ```text
//! (?P<p0>/thread/(?P<p0_id>-?[0-1]?[0-9]{1,9})(?:/(?P<p0_message>[^/]+))?\?(?:(?:mode=(?P<p0_mode>edit|print)|[^&]*)&)*)
//! ```
//!
//! Literal text is copied into the regex unchanged, so a pattern may use
//! regex syntax between its placeholders (see
//! [`MATCH_ANY`](crate::parameters::MATCH_ANY)).

use std::collections::{HashMap, HashSet};
use std::fmt;

use urlmap_core::{UrlMapError, UrlMapResult};

use super::grammar::{self, Segment};
use crate::coercion::ParamKind;
use crate::parameters::{MappingDeclaration, ParameterDescriptor, PatternDeclaration};

/// Value regex for a `String` query parameter without an explicit regex.
pub const QUERY_STRING_REGEX: &str = "[^&]+";

/// A compiled pattern as seen by the matcher and by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternDefinition {
    raw: String,
    index: usize,
    fragment: String,
    parameters: Vec<String>,
    query_parameters: Vec<String>,
    inline_regexes: HashMap<String, String>,
}

impl PatternDefinition {
    /// Returns the pattern as declared.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the declaration index; lower wins.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the fragment id, `p{index}`.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Returns the referenced parameters in order of appearance, path first.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Returns the parameters bound from the query string.
    pub fn query_parameters(&self) -> &[String] {
        &self.query_parameters
    }

    /// Returns the inline regex given for `name` in this pattern.
    pub fn inline_regex(&self, name: &str) -> Option<&str> {
        self.inline_regexes.get(name).map(String::as_str)
    }

    /// Returns the capture group name of `parameter` in this fragment.
    pub fn group_name(&self, parameter: &str) -> String {
        group_name(&self.fragment, parameter)
    }
}

impl fmt::Display for PatternDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.raw, self.fragment)
    }
}

/// A piece of an assembled regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Regex text.
    Text(String),
    /// The regex of a dynamic parameter, resolved per match.
    Dynamic(String),
}

/// Accumulates [`Piece`]s, merging adjacent text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Pieces(Vec<Piece>);

impl Pieces {
    /// Appends regex text.
    pub fn text(&mut self, text: &str) {
        if let Some(Piece::Text(last)) = self.0.last_mut() {
            last.push_str(text);
        } else if !text.is_empty() {
            self.0.push(Piece::Text(text.to_string()));
        }
    }

    /// Appends a dynamic slot.
    pub fn dynamic(&mut self, name: &str) {
        self.0.push(Piece::Dynamic(name.to_string()));
    }

    /// Appends all pieces of `other`.
    pub fn extend(&mut self, other: Self) {
        for piece in other.0 {
            match piece {
                Piece::Text(text) => self.text(&text),
                Piece::Dynamic(name) => self.0.push(Piece::Dynamic(name)),
            }
        }
    }

    /// Returns `true` if any slot is dynamic.
    pub fn has_dynamic(&self) -> bool {
        self.0.iter().any(|p| matches!(p, Piece::Dynamic(_)))
    }

    /// Returns the regex if no slot is dynamic.
    pub fn as_static(&self) -> Option<String> {
        let mut out = String::new();
        for piece in &self.0 {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Dynamic(_) => return None,
            }
        }
        Some(out)
    }

    /// Returns the pieces.
    pub fn as_slice(&self) -> &[Piece] {
        &self.0
    }
}

/// The output of [`compile`].
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// The definition handed to the matcher.
    pub definition: PatternDefinition,
    /// The wrapped fragment.
    pub pieces: Pieces,
}

/// Returns the capture group name of `parameter` inside `fragment`.
pub fn group_name(fragment: &str, parameter: &str) -> String {
    format!("{fragment}_{parameter}")
}

/// Compiles the pattern declared at `index` of `declaration`.
///
/// # Errors
///
/// - [`UrlMapError::InvalidPattern`] for malformed syntax, a positional
///   placeholder, or a malformed query sub-pattern.
/// - [`UrlMapError::UnknownParameter`] for a placeholder without descriptor.
/// - [`UrlMapError::DuplicateParameter`] when one pattern captures a
///   parameter twice.
/// - [`UrlMapError::UnsupportedType`] for a parameter of an unsupported kind,
///   whatever regex it is given.
pub fn compile(
    declaration: &MappingDeclaration,
    pattern: &PatternDeclaration,
    index: usize,
) -> UrlMapResult<CompiledPattern> {
    let fragment = format!("p{index}");
    let mut ctx = Context {
        declaration,
        raw: &pattern.pattern,
        fragment: &fragment,
        seen: HashSet::new(),
        parameters: Vec::new(),
        inline_regexes: HashMap::new(),
    };

    let normalized = if pattern.pattern.starts_with('/') || pattern.pattern.starts_with("[/") {
        pattern.pattern.clone()
    } else {
        format!("/{}", pattern.pattern)
    };
    let segments = grammar::parse(&normalized)?;

    let mut pieces = Pieces::default();
    pieces.text(&format!("(?P<{fragment}>"));
    ctx.emit(&segments, &mut pieces)?;

    let query_start = ctx.parameters.len();
    let mut branches = Vec::with_capacity(pattern.query.len());
    for query in &pattern.query {
        branches.push(ctx.query_branch(query)?);
    }
    pieces.text(r"\?(?:(?:");
    for branch in branches {
        pieces.extend(branch);
        pieces.text("|");
    }
    pieces.text("[^&]*)&)*)");

    let query_parameters = ctx.parameters[query_start..].to_vec();
    let definition = PatternDefinition {
        raw: pattern.pattern.clone(),
        index,
        fragment: fragment.clone(),
        parameters: ctx.parameters,
        query_parameters,
        inline_regexes: ctx.inline_regexes,
    };
    Ok(CompiledPattern { definition, pieces })
}

struct Context<'a> {
    declaration: &'a MappingDeclaration,
    raw: &'a str,
    fragment: &'a str,
    seen: HashSet<String>,
    parameters: Vec<String>,
    inline_regexes: HashMap<String, String>,
}

impl Context<'_> {
    fn emit(&mut self, segments: &[Segment], out: &mut Pieces) -> UrlMapResult<()> {
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.text(text),
                Segment::Placeholder { name, regex } => {
                    self.placeholder(name, regex.as_deref(), false, out)?;
                }
                Segment::Positional(n) => {
                    return Err(UrlMapError::invalid_pattern(
                        self.raw,
                        format!("positional placeholder :{n} is only allowed in format templates"),
                    ));
                }
                Segment::Optional(inner) => {
                    out.text("(?:");
                    self.emit(inner, out)?;
                    out.text(")?");
                }
            }
        }
        Ok(())
    }

    fn descriptor(&self, name: &str) -> UrlMapResult<&ParameterDescriptor> {
        self.declaration
            .find(name)
            .ok_or_else(|| UrlMapError::UnknownParameter {
                parameter: name.to_string(),
                pattern: self.raw.to_string(),
                owner: self.declaration.owner.clone(),
            })
    }

    fn placeholder(
        &mut self,
        name: &str,
        inline: Option<&str>,
        in_query: bool,
        out: &mut Pieces,
    ) -> UrlMapResult<()> {
        let descriptor = self.descriptor(name)?.clone();
        let default_regex = descriptor
            .kind
            .require_default_regex(name, &self.declaration.owner)?;
        if !self.seen.insert(name.to_string()) {
            return Err(UrlMapError::DuplicateParameter {
                parameter: name.to_string(),
                owner: self.declaration.owner.clone(),
            });
        }
        self.parameters.push(name.to_string());

        out.text(&format!("(?P<{}>", group_name(self.fragment, name)));
        if let Some(inline) = inline {
            self.inline_regexes
                .insert(name.to_string(), inline.to_string());
            out.text(inline);
        } else if descriptor.dynamic {
            out.dynamic(name);
        } else if let Some(regex) = &descriptor.regex {
            out.text(regex);
        } else if in_query && descriptor.kind == ParamKind::String {
            out.text(QUERY_STRING_REGEX);
        } else {
            out.text(default_regex);
        }
        out.text(")");
        Ok(())
    }

    /// Compiles `key=:name` into one alternative of the query group.
    fn query_branch(&mut self, query: &str) -> UrlMapResult<Pieces> {
        let malformed = |reason: &str| {
            UrlMapError::invalid_pattern(
                query,
                format!("malformed query declaration in '{}': {reason}", self.raw),
            )
        };

        let (key, value) = query
            .split_once('=')
            .ok_or_else(|| malformed("expected 'key=:parameter'"))?;
        if key.is_empty() || key.contains(['&', '?', '[', ']']) {
            return Err(malformed("invalid key"));
        }
        let segments = grammar::parse(value)?;
        let [Segment::Placeholder { name, regex }] = segments.as_slice() else {
            return Err(malformed("the value must be a single placeholder"));
        };

        let mut pieces = Pieces::default();
        pieces.text(&regex::escape(key));
        pieces.text("=");
        self.placeholder(name, regex.as_deref(), true, &mut pieces)?;
        Ok(pieces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::{INTEGER_REGEX, STRING_REGEX};

    fn declaration() -> MappingDeclaration {
        MappingDeclaration::new("ThreadView")
            .parameter(ParameterDescriptor::new("id", ParamKind::Integer))
            .parameter(ParameterDescriptor::new("message", ParamKind::String))
            .parameter(ParameterDescriptor::new("mode", ParamKind::String))
            .parameter(ParameterDescriptor::new("tab", ParamKind::String).dynamic())
            .parameter(ParameterDescriptor::new("ratio", ParamKind::Other("f64".into())))
    }

    fn compile_str(pattern: &str) -> UrlMapResult<CompiledPattern> {
        compile(&declaration(), &PatternDeclaration::new(pattern), 0)
    }

    #[test]
    fn test_compile_simple() {
        let compiled = compile_str("thread/:id").unwrap();
        assert_eq!(
            compiled.pieces.as_static().unwrap(),
            format!(r"(?P<p0>/thread/(?P<p0_id>{INTEGER_REGEX})\?(?:(?:[^&]*)&)*)")
        );
        assert_eq!(compiled.definition.parameters(), ["id"]);
        assert_eq!(compiled.definition.raw(), "thread/:id");
        assert_eq!(compiled.definition.fragment(), "p0");
    }

    #[test]
    fn test_compile_keeps_leading_slash() {
        let compiled = compile_str("[/:message]").unwrap();
        assert!(compiled
            .pieces
            .as_static()
            .unwrap()
            .starts_with("(?P<p0>(?:/(?P<p0_message>"));
    }

    #[test]
    fn test_compile_optional_and_inline() {
        let compiled = compile_str(":id[/:mode:edit|print:]").unwrap();
        assert_eq!(
            compiled.pieces.as_static().unwrap(),
            format!(
                r"(?P<p0>/(?P<p0_id>{INTEGER_REGEX})(?:/(?P<p0_mode>edit|print))?\?(?:(?:[^&]*)&)*)"
            )
        );
        assert_eq!(compiled.definition.inline_regex("mode"), Some("edit|print"));
        assert_eq!(compiled.definition.inline_regex("id"), None);
    }

    #[test]
    fn test_compile_query() {
        let pattern = PatternDeclaration::new("thread/:id").query("mode=:mode:edit|print:");
        let compiled = compile(&declaration(), &pattern, 3).unwrap();
        assert_eq!(
            compiled.pieces.as_static().unwrap(),
            format!(
                r"(?P<p3>/thread/(?P<p3_id>{INTEGER_REGEX})\?(?:(?:mode=(?P<p3_mode>edit|print)|[^&]*)&)*)"
            )
        );
        assert_eq!(compiled.definition.query_parameters(), ["mode"]);
        assert_eq!(compiled.definition.parameters(), ["id", "mode"]);
    }

    #[test]
    fn test_compile_query_string_default() {
        let pattern = PatternDeclaration::new("list").query("q=:message");
        let compiled = compile(&declaration(), &pattern, 0).unwrap();
        assert!(compiled
            .pieces
            .as_static()
            .unwrap()
            .contains("q=(?P<p0_message>[^&]+)"));
    }

    #[test]
    fn test_compile_dynamic_slot() {
        let compiled = compile_str("tabs/:tab").unwrap();
        assert!(compiled.pieces.has_dynamic());
        assert!(compiled.pieces.as_static().is_none());
        assert_eq!(
            compiled.pieces.as_slice()[1],
            Piece::Dynamic("tab".to_string())
        );
    }

    #[test]
    fn test_compile_inline_beats_dynamic() {
        let compiled = compile_str("tabs/:tab:[a-z]+:").unwrap();
        assert!(!compiled.pieces.has_dynamic());
    }

    #[test]
    fn test_compile_static_regex() {
        let decl = MappingDeclaration::new("SlugView")
            .parameter(ParameterDescriptor::new("slug", ParamKind::String).with_regex("[a-z-]+"));
        let compiled = compile(&decl, &PatternDeclaration::new(":slug"), 0).unwrap();
        assert!(compiled
            .pieces
            .as_static()
            .unwrap()
            .contains("(?P<p0_slug>[a-z-]+)"));
        assert!(!compiled.pieces.as_static().unwrap().contains(STRING_REGEX));
    }

    #[test]
    fn test_compile_unknown_parameter() {
        let err = compile_str("thread/:idd").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown parameter 'idd' in pattern 'thread/:idd' of ThreadView"
        );
    }

    #[test]
    fn test_compile_duplicate_reference() {
        let err = compile_str(":id/:id").unwrap_err();
        assert!(matches!(err, UrlMapError::DuplicateParameter { .. }));
    }

    #[test]
    fn test_compile_unsupported_type() {
        let err = compile_str(":ratio").unwrap_err();
        assert!(matches!(err, UrlMapError::UnsupportedType { .. }));
        let err = compile_str(r":ratio:\d+\.\d+:").unwrap_err();
        assert!(matches!(err, UrlMapError::UnsupportedType { .. }));
    }

    #[test]
    fn test_compile_positional_rejected() {
        assert!(matches!(
            compile_str("user/:1").unwrap_err(),
            UrlMapError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_compile_malformed_query() {
        for query in ["mode", "=:mode", "mode=edit", "mode=:mode/:id"] {
            let pattern = PatternDeclaration::new("thread").query(query);
            let err = compile(&declaration(), &pattern, 0).unwrap_err();
            assert!(
                matches!(err, UrlMapError::InvalidPattern { .. }),
                "{query}: {err:?}"
            );
        }
    }
}

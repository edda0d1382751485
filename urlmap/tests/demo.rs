//! End-to-end tests through the `urlmap` meta-crate.

use std::collections::HashMap;

use urlmap::prelude::*;
use urlmap::routing::coercion::ParamKind;
use urlmap::routing::parameters::MappingDeclaration;

#[derive(Debug, Default, UrlParameters)]
#[url_mapping(
    crate = "urlmap::routing",
    pattern = ":long",
    pattern = ":text",
    pattern = ":mode:test|production:/:text[/:long]",
    pattern = "debug/:text:.*:"
)]
struct DemoView {
    #[url_parameter]
    long: Option<i64>,
    #[url_parameter]
    text: Option<String>,
    #[url_parameter]
    mode: Option<String>,
    #[url_matched_pattern]
    matched: Option<String>,
}

fn demo(path: &str) -> (MatchOutcome, DemoView) {
    let mut view = DemoView::default();
    let outcome = match_path(&mut view, path).unwrap();
    (outcome, view)
}

#[test]
fn test_demo_number_prefers_first_pattern() {
    let (outcome, view) = demo("42");
    assert_eq!(outcome.pattern(), Some(":long"));
    assert_eq!(view.long, Some(42));
    assert_eq!(view.text, None);
}

#[test]
fn test_demo_text() {
    let (outcome, view) = demo("/hello");
    assert_eq!(outcome.pattern(), Some(":text"));
    assert_eq!(view.text.as_deref(), Some("hello"));
    assert_eq!(view.long, None);
}

#[test]
fn test_demo_inline_regex_and_optional() {
    let (_, view) = demo("test/hello/7");
    assert_eq!(view.mode.as_deref(), Some("test"));
    assert_eq!(view.text.as_deref(), Some("hello"));
    assert_eq!(view.long, Some(7));
    assert_eq!(
        matched_pattern(&view),
        Some(":mode:test|production:/:text[/:long]")
    );

    let (_, view) = demo("production/hello");
    assert_eq!(view.mode.as_deref(), Some("production"));
    assert_eq!(view.long, None);
}

#[test]
fn test_demo_catch_all_text() {
    let (outcome, view) = demo("debug/a/b/c?verbose=1");
    assert_eq!(outcome.pattern(), Some("debug/:text:.*:"));
    assert_eq!(view.text.as_deref(), Some("a/b/c"));
}

#[test]
fn test_demo_no_match() {
    let (outcome, view) = demo("staging/hello/world");
    assert_eq!(
        outcome.reroute(),
        Some(&Reroute::Error("NotFound".to_string()))
    );
    assert!(view.text.is_none() && view.mode.is_none() && view.matched.is_none());
}

#[test]
fn test_demo_format_round_trip() {
    let (_, view) = demo("test/hello/7");
    let path = format(&view, ":mode/:text[/:long]", &[]).unwrap();
    assert_eq!(path, "test/hello/7");

    let (_, again) = demo(&path);
    assert_eq!(again.long, view.long);
    assert_eq!(again.text, view.text);
}

// ── Declarations from data ──────────────────────────────────────────────

const ARCHIVE_MAPPING: &str = r#"{
    "owner": "ArchiveView",
    "parameters": [
        { "name": "year", "kind": "integer" },
        { "name": "slug", "kind": "string", "regex": "[a-z-]+" }
    ],
    "patterns": [
        { "pattern": "archive/:year[/:slug]" }
    ],
    "no_match": { "reroute_to_view": "ArchiveIndex" }
}"#;

#[derive(Default)]
struct ArchiveView(HashMap<String, ParamValue>);

impl urlmap::routing::UrlParameters for ArchiveView {
    fn url_mapping() -> MappingDeclaration {
        serde_json::from_str(ARCHIVE_MAPPING).expect("valid mapping JSON")
    }

    fn set_parameter(&mut self, name: &str, value: Option<ParamValue>) -> UrlMapResult<()> {
        match value {
            Some(v) => self.0.insert(name.to_string(), v),
            None => self.0.remove(name),
        };
        Ok(())
    }

    fn parameter(&self, name: &str) -> Option<ParamValue> {
        self.0.get(name).cloned()
    }
}

#[test]
fn test_declaration_from_json() {
    let declaration = <ArchiveView as urlmap::routing::UrlParameters>::url_mapping();
    assert_eq!(declaration.parameters[0].kind, ParamKind::Integer);

    let registry = MappingRegistry::new(Settings::default());
    let mut view = ArchiveView::default();
    registry.match_path(&mut view, "archive/2024/new-year").unwrap();
    assert_eq!(view.parameter("year"), Some(ParamValue::Integer(2024)));
    assert_eq!(
        view.parameter("slug"),
        Some(ParamValue::Str("new-year".to_string()))
    );

    let outcome = registry.match_path(&mut view, "archive/2024/New").unwrap();
    assert_eq!(
        outcome.reroute(),
        Some(&Reroute::View("ArchiveIndex".to_string()))
    );
    assert!(view.0.is_empty());
}

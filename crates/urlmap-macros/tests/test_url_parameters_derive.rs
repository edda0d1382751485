//! Integration tests for `#[derive(UrlParameters)]`.
//!
//! These tests verify that the generated declarations build into working
//! mappings and that the generated accessors read and write the fields.

use urlmap_core::{NoMatchPolicy, Settings, UrlMapError};
use urlmap_macros::UrlParameters;
use urlmap_routing::{
    MappingRegistry, MatchOutcome, ParamKind, ParamValue, Reroute, UrlParameters as _,
};
use uuid::Uuid;

fn registry() -> MappingRegistry {
    MappingRegistry::new(Settings::default())
}

// ── Thread view ─────────────────────────────────────────────────────────

#[derive(Debug, Default, UrlParameters)]
#[url_mapping(
    pattern = "thread/:id[/:message]",
    pattern(path = "thread/:id/reply", query("mode=:mode")),
    reroute_view = "ThreadIndex"
)]
struct ThreadView {
    #[url_parameter]
    id: Option<i32>,
    #[url_parameter]
    message: Option<i64>,
    #[url_parameter]
    mode: Option<String>,
    #[url_matched_pattern]
    matched: Option<String>,
    title: String,
}

#[test]
fn test_thread_view_declaration() {
    let declaration = ThreadView::url_mapping();
    assert_eq!(declaration.owner, "ThreadView");
    assert_eq!(declaration.parameters.len(), 3);
    assert_eq!(declaration.parameters[0].name, "id");
    assert_eq!(declaration.parameters[0].kind, ParamKind::Integer);
    assert_eq!(declaration.parameters[1].kind, ParamKind::Long);
    assert_eq!(declaration.parameters[2].kind, ParamKind::String);
    assert_eq!(declaration.patterns.len(), 2);
    assert_eq!(declaration.patterns[1].pattern, "thread/:id/reply");
    assert_eq!(declaration.patterns[1].query, vec!["mode=:mode"]);
    assert_eq!(
        declaration.no_match,
        Some(NoMatchPolicy::RerouteToView("ThreadIndex".to_string()))
    );
}

#[test]
fn test_thread_view_accessors() {
    let mut view = ThreadView::default();
    view.set_parameter("id", Some(ParamValue::Integer(7))).unwrap();
    assert_eq!(view.id, Some(7));
    assert_eq!(view.parameter("id"), Some(ParamValue::Integer(7)));

    view.set_parameter("id", None).unwrap();
    assert_eq!(view.id, None);

    let err = view
        .set_parameter("id", Some(ParamValue::Str("seven".into())))
        .unwrap_err();
    assert!(matches!(err, UrlMapError::Coercion { .. }));

    let err = view
        .set_parameter("title", Some(ParamValue::Str("x".into())))
        .unwrap_err();
    assert!(matches!(err, UrlMapError::ConfigurationError(_)));
    assert_eq!(
        err.to_string(),
        "Configuration error: Unknown parameter 'title' of ThreadView"
    );
    assert!(view.title.is_empty());
    assert_eq!(view.parameter("title"), None);
}

#[test]
fn test_thread_view_match() {
    let registry = registry();
    let mut view = ThreadView::default();

    let outcome = registry.match_path(&mut view, "thread/5/42").unwrap();
    assert_eq!(outcome.pattern(), Some("thread/:id[/:message]"));
    assert_eq!(view.id, Some(5));
    assert_eq!(view.message, Some(42));
    assert_eq!(view.mode, None);
    assert_eq!(
        registry.matched_pattern(&view),
        Some("thread/:id[/:message]")
    );

    let outcome = registry
        .match_path(&mut view, "/thread/5/reply?lang=en&mode=quote")
        .unwrap();
    assert_eq!(outcome.pattern(), Some("thread/:id/reply"));
    assert_eq!(view.id, Some(5));
    assert_eq!(view.message, None);
    assert_eq!(view.mode.as_deref(), Some("quote"));
    assert_eq!(view.matched.as_deref(), Some("thread/:id/reply"));
}

#[test]
fn test_thread_view_no_match_reroutes() {
    let registry = registry();
    let mut view = ThreadView {
        id: Some(1),
        ..ThreadView::default()
    };

    let outcome = registry.match_path(&mut view, "forum/1").unwrap();
    assert_eq!(
        outcome,
        MatchOutcome::NotMatched {
            reroute: Some(Reroute::View("ThreadIndex".to_string()))
        }
    );
    assert_eq!(view.id, None);
    assert_eq!(view.matched, None);
}

#[test]
fn test_thread_view_format() {
    let registry = registry();
    let mut view = ThreadView::default();
    registry.match_path(&mut view, "thread/5").unwrap();

    assert_eq!(
        registry.format(&view, "thread/:id[/:message]", &[]).unwrap(),
        "thread/5"
    );
    view.message = Some(9);
    assert_eq!(
        registry.format(&view, "thread/:id[/:message]", &[]).unwrap(),
        "thread/5/9"
    );
}

// ── Renamed parameters and UUIDs ────────────────────────────────────────

#[derive(Debug, Default, UrlParameters)]
#[url_mapping(
    name = "Document",
    pattern = "doc/:key/:rev",
    pattern = "doc/:key",
    ignore_if_not_matched
)]
struct DocumentView {
    #[url_parameter]
    key: Option<Uuid>,
    #[url_parameter(name = "rev", regex = "r[0-9]+")]
    revision: Option<String>,
}

#[test]
fn test_document_view_declaration() {
    let declaration = DocumentView::url_mapping();
    assert_eq!(declaration.owner, "Document");
    assert_eq!(declaration.parameters[0].kind, ParamKind::Uuid);
    assert_eq!(declaration.parameters[1].name, "rev");
    assert_eq!(declaration.parameters[1].regex.as_deref(), Some("r[0-9]+"));
    assert_eq!(declaration.no_match, Some(NoMatchPolicy::Ignore));
}

#[test]
fn test_document_view_match() {
    let registry = registry();
    let mut view = DocumentView::default();
    let key = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    registry
        .match_path(&mut view, &format!("doc/{key}/r12"))
        .unwrap();
    assert_eq!(view.key, Some(Uuid::parse_str(key).unwrap()));
    assert_eq!(view.revision.as_deref(), Some("r12"));

    registry.match_path(&mut view, &format!("doc/{key}")).unwrap();
    assert_eq!(view.revision, None);

    let outcome = registry
        .match_path(&mut view, &format!("doc/{key}/draft"))
        .unwrap();
    assert_eq!(outcome, MatchOutcome::NotMatched { reroute: None });
    assert_eq!(view.key, None);
}

#[test]
fn test_document_view_does_not_record_pattern() {
    let registry = registry();
    let mut view = DocumentView::default();
    let outcome = registry
        .match_path(&mut view, "doc/67e55044-10b1-426f-9247-bb680e5fe0c8")
        .unwrap();
    assert_eq!(outcome.pattern(), Some("doc/:key"));
    assert_eq!(registry.matched_pattern(&view), None);
}

// ── Dynamic parameters ──────────────────────────────────────────────────

#[derive(Debug, Default, UrlParameters)]
#[url_mapping(pattern = "settings/:tab", reroute_error = "Forbidden")]
struct TabView {
    #[url_parameter(dynamic)]
    tab: Option<String>,
    tabs: Vec<String>,
}

#[test]
fn test_tab_view_dynamic_regex() {
    let registry = registry();
    registry
        .set_dynamic_regex::<TabView, _>("tab", |view: &TabView| {
            if view.tabs.is_empty() {
                None
            } else {
                Some(view.tabs.join("|"))
            }
        })
        .unwrap();

    let mut view = TabView {
        tabs: vec!["profile".into(), "privacy".into()],
        ..TabView::default()
    };
    assert!(registry.match_path(&mut view, "settings/privacy").unwrap().is_matched());
    assert_eq!(view.tab.as_deref(), Some("privacy"));

    let outcome = registry.match_path(&mut view, "settings/billing").unwrap();
    assert_eq!(outcome.reroute(), Some(&Reroute::Error("Forbidden".into())));
    assert_eq!(view.tab, None);

    view.tabs.clear();
    assert!(registry.match_path(&mut view, "settings/billing").unwrap().is_matched());
    assert_eq!(view.tab.as_deref(), Some("billing"));
}

// ── Build errors ────────────────────────────────────────────────────────

#[derive(Debug, Default, UrlParameters)]
#[url_mapping(pattern = ":id")]
struct DuplicateView {
    #[url_parameter]
    id: Option<i32>,
    #[url_parameter(name = "id")]
    other: Option<String>,
}

#[test]
fn test_duplicate_parameter_fails_build() {
    let registry = registry();
    let mut view = DuplicateView::default();
    let err = registry.match_path(&mut view, "5").unwrap_err();
    assert!(matches!(err, UrlMapError::DuplicateParameter { .. }));
    assert!(err.is_build_error());
    assert!(!registry.is_cached::<DuplicateView>());
    assert!(view.other.is_none());
}

#[derive(Debug, Default, UrlParameters)]
#[url_mapping(pattern = "user/:name")]
struct TypoView {
    #[url_parameter]
    username: Option<String>,
}

#[test]
fn test_unknown_parameter_fails_build() {
    let registry = registry();
    let err = registry.mapping::<TypoView>().unwrap_err();
    assert!(matches!(
        err,
        UrlMapError::UnknownParameter { ref parameter, .. } if parameter == "name"
    ));
    assert!(TypoView::default().username.is_none());
}

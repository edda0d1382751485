//! Dynamic regex resolution.
//!
//! A parameter declared `dynamic` gets its regex from the instance at match
//! time, through a [`RegexProducer`] registered for its type. Each match of a
//! dynamic mapping assembles the regex from the producers' current output and
//! compiles it for that match only.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use regex::Regex;
use urlmap_core::{UrlMapError, UrlMapResult};

use crate::mapping::{Mapping, MappingRegex};
use crate::parameters::ParameterDescriptor;
use crate::pattern::compiler::{Piece, Pieces};

/// Supplies the regex of a dynamic parameter for one instance.
///
/// Implemented for every `Fn(&T) -> Option<String>` closure.
pub trait RegexProducer<T: ?Sized>: Send + Sync {
    /// Returns the regex to use, or `None` to fall back to the declared one.
    fn produce(&self, instance: &T) -> Option<String>;
}

impl<T, F> RegexProducer<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> Option<String> + Send + Sync,
{
    fn produce(&self, instance: &T) -> Option<String> {
        self(instance)
    }
}

type ProducerMap = RwLock<HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>>;

/// The producers registered per type and parameter.
#[derive(Default)]
pub struct DynamicRegexes {
    producers: ProducerMap,
}

impl DynamicRegexes {
    /// Creates an empty set of producers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `producer` for `name` on `T`, replacing any previous one.
    pub fn insert<T: 'static>(&self, name: &str, producer: Arc<dyn RegexProducer<T>>) {
        let mut producers = self
            .producers
            .write()
            .expect("dynamic regex lock poisoned");
        producers.insert((TypeId::of::<T>(), name.to_string()), Arc::new(producer));
    }

    /// Returns the producer registered for `name` on `T`.
    pub fn get<T: 'static>(&self, name: &str) -> Option<Arc<dyn RegexProducer<T>>> {
        let producers = self.producers.read().expect("dynamic regex lock poisoned");
        producers
            .get(&(TypeId::of::<T>(), name.to_string()))
            .and_then(|entry| entry.downcast_ref::<Arc<dyn RegexProducer<T>>>())
            .cloned()
    }

    /// Returns `true` if a producer is registered for `name` on `T`.
    pub fn contains<T: 'static>(&self, name: &str) -> bool {
        self.get::<T>(name).is_some()
    }

    /// Returns the regex to match `instance` against.
    ///
    /// A static mapping lends its precompiled regex. A dynamic one is
    /// assembled from the producers and compiled.
    ///
    /// # Errors
    ///
    /// - [`UrlMapError::NoDynamicRegex`] if a dynamic parameter has no producer.
    /// - [`UrlMapError::UnsupportedType`] if a producer yields `None` and the
    ///   parameter has neither a static nor a default regex.
    /// - [`UrlMapError::InvalidRegex`] if the assembled regex is rejected.
    pub fn regex_for<'m, T: 'static>(
        &self,
        mapping: &'m Mapping,
        instance: &T,
    ) -> UrlMapResult<Cow<'m, Regex>> {
        let pieces = match mapping.regex() {
            MappingRegex::Static(regex) => return Ok(Cow::Borrowed(regex)),
            MappingRegex::Dynamic(pieces) => pieces,
        };

        let source = assemble(pieces, |name| {
            let descriptor = mapping.descriptor(name).ok_or_else(|| {
                UrlMapError::NoDynamicRegex {
                    parameter: name.to_string(),
                    owner: mapping.owner().to_string(),
                }
            })?;
            let producer = self
                .get::<T>(name)
                .ok_or_else(|| UrlMapError::NoDynamicRegex {
                    parameter: name.to_string(),
                    owner: mapping.owner().to_string(),
                })?;
            match producer.produce(instance) {
                Some(regex) => Ok(regex),
                None => fallback_regex(descriptor, mapping.owner()),
            }
        })?;

        tracing::trace!(owner = mapping.owner(), regex = %source, "Assembled dynamic regex");
        mapping.compile_regex(&source).map(Cow::Owned)
    }
}

/// Joins `pieces`, resolving each dynamic slot through `resolve`.
pub fn assemble(
    pieces: &Pieces,
    mut resolve: impl FnMut(&str) -> UrlMapResult<String>,
) -> UrlMapResult<String> {
    let mut source = String::new();
    for piece in pieces.as_slice() {
        match piece {
            Piece::Text(text) => source.push_str(text),
            Piece::Dynamic(name) => source.push_str(&resolve(name)?),
        }
    }
    Ok(source)
}

/// The regex of a dynamic parameter whose producer yielded nothing: the
/// static regex if declared, otherwise the kind's default.
pub fn fallback_regex(descriptor: &ParameterDescriptor, owner: &str) -> UrlMapResult<String> {
    match &descriptor.regex {
        Some(regex) => Ok(regex.clone()),
        None => descriptor
            .kind
            .require_default_regex(&descriptor.name, owner)
            .map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::ParamKind;

    struct TabView {
        tabs: Vec<&'static str>,
    }

    #[test]
    fn test_closure_producer() {
        let producer = |view: &TabView| Some(view.tabs.join("|"));
        let view = TabView {
            tabs: vec!["inbox", "sent"],
        };
        assert_eq!(producer.produce(&view).as_deref(), Some("inbox|sent"));
    }

    #[test]
    fn test_insert_and_get() {
        let producers = DynamicRegexes::new();
        assert!(!producers.contains::<TabView>("tab"));

        producers.insert::<TabView>("tab", Arc::new(|_: &TabView| Some("a|b".to_string())));
        assert!(producers.contains::<TabView>("tab"));
        assert!(!producers.contains::<TabView>("other"));
        assert!(!producers.contains::<String>("tab"));

        let view = TabView { tabs: Vec::new() };
        let producer = producers.get::<TabView>("tab").unwrap();
        assert_eq!(producer.produce(&view).as_deref(), Some("a|b"));
    }

    #[test]
    fn test_assemble() {
        let mut pieces = Pieces::default();
        pieces.text("^(?P<p0_tab>");
        pieces.dynamic("tab");
        pieces.text(")$");
        let source = assemble(&pieces, |name| Ok(format!("<{name}>"))).unwrap();
        assert_eq!(source, "^(?P<p0_tab><tab>)$");
    }

    #[test]
    fn test_fallback_regex() {
        let plain = ParameterDescriptor::new("tab", ParamKind::Integer).dynamic();
        assert_eq!(
            fallback_regex(&plain, "TabView").unwrap(),
            "-?[0-1]?[0-9]{1,9}"
        );

        let with_static = plain.clone().with_regex("[0-9]");
        assert_eq!(fallback_regex(&with_static, "TabView").unwrap(), "[0-9]");

        let other = ParameterDescriptor::new("tab", ParamKind::Other("Tab".into())).dynamic();
        assert!(fallback_regex(&other, "TabView").is_err());
    }
}

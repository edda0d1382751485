//! The mapping registry: one compiled [`Mapping`] per type.
//!
//! [`MappingRegistry`] is the service the navigation layer talks to. It builds
//! a type's mapping on first use and caches it for the life of the registry.
//! Concurrent first uses of the same type block on one build; a failed build
//! caches nothing, so the next call retries and reports the same error.
//!
//! Tests construct their own registry. Applications normally use
//! [`MappingRegistry::global`] through the free functions of this module.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::{Lazy, OnceCell};
use urlmap_core::logging::match_span;
use urlmap_core::{Settings, UrlMapError, UrlMapResult, SETTINGS};

use crate::dynamic::{DynamicRegexes, RegexProducer};
use crate::mapping::Mapping;
use crate::matcher::MatchOutcome;
use crate::parameters::UrlParameters;

type MappingCell = Arc<OnceCell<Arc<Mapping>>>;

/// Builds, caches and applies the mappings of [`UrlParameters`] types.
pub struct MappingRegistry {
    settings: Settings,
    mappings: RwLock<HashMap<TypeId, MappingCell>>,
    dynamic: DynamicRegexes,
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

static GLOBAL: Lazy<MappingRegistry> = Lazy::new(|| MappingRegistry::new(SETTINGS.get().clone()));

impl MappingRegistry {
    /// Creates an empty registry.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            mappings: RwLock::new(HashMap::new()),
            dynamic: DynamicRegexes::new(),
        }
    }

    /// Returns the process-wide registry, configured from
    /// [`SETTINGS`] on first use.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the settings of this registry.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    fn cell<T: UrlParameters>(&self) -> MappingCell {
        let key = TypeId::of::<T>();
        {
            let mappings = self.mappings.read().expect("mapping registry lock poisoned");
            if let Some(cell) = mappings.get(&key) {
                return Arc::clone(cell);
            }
        }

        let mut mappings = self.mappings.write().expect("mapping registry lock poisoned");
        Arc::clone(mappings.entry(key).or_default())
    }

    /// Returns the mapping of `T`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns the build error of `T`'s declaration. Nothing is cached in that
    /// case.
    pub fn mapping<T: UrlParameters>(&self) -> UrlMapResult<Arc<Mapping>> {
        let cell = self.cell::<T>();
        cell.get_or_try_init(|| Mapping::build(&T::url_mapping(), &self.settings).map(Arc::new))
            .map(Arc::clone)
    }

    /// Returns `true` if the mapping of `T` has been built.
    pub fn is_cached<T: UrlParameters>(&self) -> bool {
        let mappings = self.mappings.read().expect("mapping registry lock poisoned");
        mappings
            .get(&TypeId::of::<T>())
            .is_some_and(|cell| cell.get().is_some())
    }

    /// Registers the regex producer of the dynamic parameter `name` of `T`.
    ///
    /// Registering again replaces the previous producer.
    ///
    /// # Errors
    ///
    /// Returns the build error of `T`, or
    /// [`UrlMapError::ConfigurationError`] if `T` has no dynamic parameter
    /// called `name`.
    pub fn set_dynamic_regex<T, P>(&self, name: &str, producer: P) -> UrlMapResult<()>
    where
        T: UrlParameters,
        P: RegexProducer<T> + 'static,
    {
        let mapping = self.mapping::<T>()?;
        match mapping.descriptor(name) {
            Some(descriptor) if descriptor.dynamic => {
                self.dynamic.insert::<T>(name, Arc::new(producer));
                tracing::debug!(owner = mapping.owner(), parameter = name, "Registered dynamic regex");
                Ok(())
            }
            Some(_) => Err(UrlMapError::ConfigurationError(format!(
                "Parameter '{name}' of {} is not dynamic",
                mapping.owner()
            ))),
            None => Err(UrlMapError::ConfigurationError(format!(
                "Unknown dynamic parameter '{name}' of {}",
                mapping.owner()
            ))),
        }
    }

    /// Matches `path` and updates `instance`.
    ///
    /// On a match every captured parameter is set, all others are cleared and
    /// the winning pattern is recorded. On a miss every parameter and the
    /// record are cleared and the no-match policy decides the reroute signal.
    ///
    /// # Errors
    ///
    /// Build errors of `T`, [`UrlMapError::NoDynamicRegex`] for a dynamic
    /// parameter without producer, and coercion errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use urlmap_core::{Settings, UrlMapResult};
    /// use urlmap_routing::coercion::{assign, ParamKind, ParamType, ParamValue};
    /// use urlmap_routing::parameters::{MappingDeclaration, ParameterDescriptor, UrlParameters};
    /// use urlmap_routing::registry::MappingRegistry;
    ///
    /// #[derive(Default)]
    /// struct ThreadView {
    ///     id: Option<i32>,
    /// }
    ///
    /// impl UrlParameters for ThreadView {
    ///     fn url_mapping() -> MappingDeclaration {
    ///         MappingDeclaration::new("ThreadView")
    ///             .parameter(ParameterDescriptor::new("id", ParamKind::Integer))
    ///             .pattern("thread/:id")
    ///     }
    ///
    ///     fn set_parameter(&mut self, name: &str, value: Option<ParamValue>) -> UrlMapResult<()> {
    ///         assign(&mut self.id, name, value)
    ///     }
    ///
    ///     fn parameter(&self, _name: &str) -> Option<ParamValue> {
    ///         self.id.as_ref().map(ParamType::to_value)
    ///     }
    /// }
    ///
    /// let registry = MappingRegistry::new(Settings::default());
    /// let mut view = ThreadView::default();
    /// let outcome = registry.match_path(&mut view, "thread/42").unwrap();
    /// assert!(outcome.is_matched());
    /// assert_eq!(view.id, Some(42));
    /// assert_eq!(registry.format(&view, "thread/:id", &[]).unwrap(), "thread/42");
    /// ```
    pub fn match_path<T: UrlParameters>(
        &self,
        instance: &mut T,
        path: &str,
    ) -> UrlMapResult<MatchOutcome> {
        let mapping = self.mapping::<T>()?;
        let span = match_span(mapping.owner(), path);
        let _guard = span.enter();

        let regex = self.dynamic.regex_for(&mapping, &*instance)?;
        mapping.select(&regex, path).apply(instance)
    }

    /// Renders `template` from the current values of `instance`; `args` fill
    /// the positional placeholders `:1` to `:99`.
    ///
    /// # Errors
    ///
    /// Build errors of `T` and [`UrlMapError::Format`].
    pub fn format<T: UrlParameters>(
        &self,
        instance: &T,
        template: &str,
        args: &[&str],
    ) -> UrlMapResult<String> {
        let mapping = self.mapping::<T>()?;
        crate::format::format(&mapping, instance, template, args, &self.settings)
    }

    /// Returns the pattern that matched `instance` last.
    pub fn matched_pattern<'a, T: UrlParameters>(&self, instance: &'a T) -> Option<&'a str> {
        instance.matched_pattern()
    }
}

/// [`MappingRegistry::match_path`] on the global registry.
pub fn match_path<T: UrlParameters>(instance: &mut T, path: &str) -> UrlMapResult<MatchOutcome> {
    MappingRegistry::global().match_path(instance, path)
}

/// [`MappingRegistry::format`] on the global registry.
pub fn format<T: UrlParameters>(instance: &T, template: &str, args: &[&str]) -> UrlMapResult<String> {
    MappingRegistry::global().format(instance, template, args)
}

/// [`MappingRegistry::set_dynamic_regex`] on the global registry.
pub fn set_dynamic_regex<T, P>(name: &str, producer: P) -> UrlMapResult<()>
where
    T: UrlParameters,
    P: RegexProducer<T> + 'static,
{
    MappingRegistry::global().set_dynamic_regex::<T, P>(name, producer)
}

/// Returns the pattern that matched `instance` last.
pub fn matched_pattern<T: UrlParameters>(instance: &T) -> Option<&str> {
    instance.matched_pattern()
}

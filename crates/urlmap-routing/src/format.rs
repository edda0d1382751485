//! Reverse formatting: building a path from an instance's current values.
//!
//! Templates use the match grammar without inline regexes. `:name` is
//! replaced by the current value of the parameter, `:1` to `:99` by the
//! caller's positional arguments. An optional group whose own placeholders
//! are all present is kept, otherwise it is dropped entirely. A missing value
//! or a positional index beyond the arguments is an error outside any
//! optional group.
//!
//! The template is rendered as written; no leading `/` is added.

use urlmap_core::{Settings, UrlMapError, UrlMapResult};

use crate::mapping::Mapping;
use crate::parameters::UrlParameters;
use crate::pattern::grammar::{self, Segment};

/// Renders `template` with the values of `instance`.
///
/// # Errors
///
/// Returns [`UrlMapError::Format`] if the template is malformed, contains an
/// inline regex, names an unknown parameter, or leaves a required parameter
/// or positional argument without value. The error carries
/// the template and the text rendered so far, with missing values shown as
/// `settings.missing_marker`.
pub fn format<T: UrlParameters + ?Sized>(
    mapping: &Mapping,
    instance: &T,
    template: &str,
    args: &[&str],
    settings: &Settings,
) -> UrlMapResult<String> {
    let segments = grammar::parse(template).map_err(|e| UrlMapError::Format {
        template: template.to_string(),
        rendered: String::new(),
        reason: e.to_string(),
    })?;

    let mut renderer = Renderer {
        mapping,
        instance,
        template,
        args,
        settings,
        out: String::new(),
        missing: Vec::new(),
        depth: 0,
    };
    renderer.render(&segments)?;

    if !renderer.missing.is_empty() {
        let names: Vec<String> = renderer.missing.iter().map(|n| format!("'{n}'")).collect();
        return Err(renderer.error(format!(
            "missing required parameter {}",
            names.join(", ")
        )));
    }
    Ok(renderer.out)
}

struct Renderer<'a, T: ?Sized> {
    mapping: &'a Mapping,
    instance: &'a T,
    template: &'a str,
    args: &'a [&'a str],
    settings: &'a Settings,
    out: String,
    missing: Vec<String>,
    depth: usize,
}

impl<T: UrlParameters + ?Sized> Renderer<'_, T> {
    fn error(&self, reason: impl Into<String>) -> UrlMapError {
        UrlMapError::Format {
            template: self.template.to_string(),
            rendered: self.out.clone(),
            reason: reason.into(),
        }
    }

    fn render(&mut self, segments: &[Segment]) -> UrlMapResult<()> {
        for segment in segments {
            match segment {
                Segment::Literal(text) => self.out.push_str(&grammar::unescape(text)),
                Segment::Placeholder { name, regex } => {
                    if regex.is_some() {
                        return Err(self.error(format!(
                            "inline regex for ':{name}' is not allowed in a format template"
                        )));
                    }
                    if self.mapping.descriptor(name).is_none() {
                        return Err(self.error(format!("unknown placeholder ':{name}'")));
                    }
                    match self.instance.parameter(name) {
                        Some(value) => self.out.push_str(&value.to_string()),
                        None => {
                            let marker = self.settings.missing_marker_for(name);
                            self.out.push_str(&marker);
                            self.missing.push(name.clone());
                        }
                    }
                }
                Segment::Positional(index) => match self.args.get(index - 1) {
                    Some(arg) => self.out.push_str(arg),
                    None if self.depth > 0 => {
                        let name = format!(":{index}");
                        self.out.push_str(&self.settings.missing_marker_for(&name));
                        self.missing.push(name);
                    }
                    None => {
                        return Err(self.error(format!(
                            "positional placeholder :{index} out of range ({} given)",
                            self.args.len()
                        )));
                    }
                },
                Segment::Optional(inner) => {
                    let start = self.out.len();
                    let missing_before = self.missing.len();
                    self.depth += 1;
                    let rendered = self.render(inner);
                    self.depth -= 1;
                    rendered?;
                    if self.missing.len() > missing_before {
                        self.out.truncate(start);
                        self.missing.truncate(missing_before);
                    }
                }
            }
        }
        Ok(())
    }
}

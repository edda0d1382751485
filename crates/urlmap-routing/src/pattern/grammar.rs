//! Tokenizer for the path-pattern grammar.
//!
//! The grammar is shared by match patterns and format templates:
//!
//! | Syntax        | Meaning                                               |
//! |---------------|-------------------------------------------------------|
//! | `:name`       | Placeholder bound to the parameter `name`             |
//! | `:name:expr:` | Placeholder with an inline regex for this occurrence  |
//! | `:1` .. `:99` | Positional argument (format templates only)           |
//! | `[...]`       | Optional group, may be nested                         |
//! | `\c`          | The character `c`, taken literally                    |
//!
//! Everything else is literal text. A `:` that is not followed by a word
//! character is literal as well.

use urlmap_core::{UrlMapError, UrlMapResult};

/// Highest positional index accepted in a template.
pub const MAX_POSITIONAL: usize = 99;

/// One element of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, with escapes kept as written.
    Literal(String),
    /// A named placeholder.
    Placeholder {
        /// The referenced parameter.
        name: String,
        /// The inline regex, if one was given.
        regex: Option<String>,
    },
    /// A one-indexed positional placeholder.
    Positional(usize),
    /// An optional group.
    Optional(Vec<Segment>),
}

impl Segment {
    /// Calls `f` for every named placeholder, descending into optional groups.
    pub fn visit_placeholders<'a>(segments: &'a [Self], f: &mut impl FnMut(&'a str, Option<&'a str>)) {
        for segment in segments {
            match segment {
                Self::Placeholder { name, regex } => f(name, regex.as_deref()),
                Self::Optional(inner) => Self::visit_placeholders(inner, f),
                Self::Literal(_) | Self::Positional(_) => {}
            }
        }
    }
}

/// Parses `pattern` into a segment tree.
///
/// # Errors
///
/// Returns [`UrlMapError::InvalidPattern`] for unbalanced brackets, an
/// unterminated or empty inline regex, a dangling escape, or a positional
/// index outside `1..=99`.
///
/// # Examples
///
/// ```
/// use urlmap_routing::pattern::grammar::{parse, Segment};
///
/// let segments = parse("thread/:id[/:message]").unwrap();
/// assert_eq!(segments.len(), 3);
/// assert!(matches!(segments[2], Segment::Optional(_)));
/// ```
pub fn parse(pattern: &str) -> UrlMapResult<Vec<Segment>> {
    let mut parser = Parser {
        pattern,
        chars: pattern.char_indices().peekable(),
    };
    parser.parse_sequence(false)
}

struct Parser<'a> {
    pattern: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> UrlMapError {
        UrlMapError::invalid_pattern(self.pattern, reason)
    }

    /// Parses until the end of input, or until the closing `]` when `nested`.
    fn parse_sequence(&mut self, nested: bool) -> UrlMapResult<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut literal = String::new();

        while let Some((pos, c)) = self.chars.next() {
            match c {
                '\\' => {
                    let (_, escaped) = self
                        .chars
                        .next()
                        .ok_or_else(|| self.error("dangling escape at end of pattern"))?;
                    literal.push('\\');
                    literal.push(escaped);
                }
                '[' => {
                    flush(&mut literal, &mut segments);
                    let inner = self.parse_sequence(true)?;
                    segments.push(Segment::Optional(inner));
                }
                ']' => {
                    if !nested {
                        return Err(self.error(format!("unmatched ']' at offset {pos}")));
                    }
                    flush(&mut literal, &mut segments);
                    return Ok(segments);
                }
                ':' if self.peek_is_word() => {
                    flush(&mut literal, &mut segments);
                    segments.push(self.parse_placeholder(pos)?);
                }
                _ => literal.push(c),
            }
        }

        if nested {
            return Err(self.error("unclosed '['"));
        }
        flush(&mut literal, &mut segments);
        Ok(segments)
    }

    fn peek_is_word(&mut self) -> bool {
        self.chars.peek().is_some_and(|&(_, c)| is_word(c))
    }

    /// Parses the part after `:`.
    fn parse_placeholder(&mut self, start: usize) -> UrlMapResult<Segment> {
        let mut name = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if !is_word(c) {
                break;
            }
            name.push(c);
            self.chars.next();
        }

        if name.bytes().all(|b| b.is_ascii_digit()) {
            let index: usize = name
                .parse()
                .map_err(|_| self.error(format!("invalid positional index ':{name}'")))?;
            if !(1..=MAX_POSITIONAL).contains(&index) {
                return Err(self.error(format!(
                    "positional index :{index} outside 1..={MAX_POSITIONAL}"
                )));
            }
            return Ok(Segment::Positional(index));
        }

        if self.chars.peek().is_some_and(|&(_, c)| c == ':') {
            self.chars.next();
            let mut regex = String::new();
            let mut terminated = false;
            for (_, c) in self.chars.by_ref() {
                if c == ':' {
                    terminated = true;
                    break;
                }
                regex.push(c);
            }
            if !terminated {
                return Err(self.error(format!(
                    "unterminated inline regex for ':{name}' at offset {start}"
                )));
            }
            if regex.is_empty() {
                return Err(self.error(format!("empty inline regex for ':{name}'")));
            }
            return Ok(Segment::Placeholder {
                name,
                regex: Some(regex),
            });
        }

        Ok(Segment::Placeholder { name, regex: None })
    }
}

const fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn flush(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

/// Removes the escaping backslashes from literal text.
pub fn unescape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

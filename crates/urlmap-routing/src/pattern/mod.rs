//! The path-pattern grammar and its compiler.
//!
//! - [`grammar`]: tokenizer shared by match patterns and format templates
//! - [`compiler`]: turns one declared pattern into a named regex fragment
//!
//! # Examples
//!
//! ```
//! use urlmap_routing::coercion::ParamKind;
//! use urlmap_routing::parameters::{MappingDeclaration, ParameterDescriptor, PatternDeclaration};
//! use urlmap_routing::pattern::compiler::compile;
//!
//! let declaration = MappingDeclaration::new("ThreadView")
//!     .parameter(ParameterDescriptor::new("id", ParamKind::Integer))
//!     .parameter(ParameterDescriptor::new("message", ParamKind::String));
//!
//! let compiled = compile(&declaration, &PatternDeclaration::new("thread/:id[/:message]"), 0).unwrap();
//! assert_eq!(compiled.definition.parameters(), ["id", "message"]);
//! assert!(compiled.pieces.as_static().unwrap().starts_with("(?P<p0>/thread/(?P<p0_id>"));
//! ```

pub mod compiler;
pub mod grammar;

pub use compiler::{PatternDefinition, Piece, Pieces};
pub use grammar::Segment;

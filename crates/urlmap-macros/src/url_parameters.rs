//! `#[derive(UrlParameters)]` implementation.
//!
//! Generates an implementation of `urlmap_routing::UrlParameters` from
//! struct and field attributes:
//!
//! - `#[url_mapping(...)]` on the struct declares patterns and the no-match
//!   policy.
//! - `#[url_parameter(...)]` on an `Option<T>` field declares a parameter.
//! - `#[url_matched_pattern]` on an `Option<String>` field receives the
//!   pattern that matched last. Without it the record is discarded.

use darling::{FromDeriveInput, FromField, FromMeta};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Type};

use crate::string_list::StringList;

const PARAMETER_ATTR: &str = "url_parameter";
const MATCHED_PATTERN_ATTR: &str = "url_matched_pattern";

/// Struct-level attributes parsed from `#[url_mapping(...)]`.
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(url_mapping), supports(struct_named))]
pub struct MappingOpts {
    pub ident: syn::Ident,
    pub generics: syn::Generics,
    pub data: darling::ast::Data<(), syn::Field>,

    /// Owner name used in diagnostics; defaults to the struct name.
    #[darling(default)]
    pub name: Option<String>,

    /// Declared patterns, in order.
    #[darling(multiple)]
    pub pattern: Vec<PatternOpts>,

    /// Reroute to this error kind when nothing matches.
    #[darling(default)]
    pub reroute_error: Option<String>,

    /// Reroute to this view kind when nothing matches.
    #[darling(default)]
    pub reroute_view: Option<String>,

    /// Signal nothing when nothing matches.
    #[darling(default)]
    pub ignore_if_not_matched: bool,

    /// Path of the routing crate in generated code, for callers that reach
    /// it through a re-export.
    #[darling(default, rename = "crate")]
    pub krate: Option<syn::Path>,
}

/// One `pattern` entry: either `pattern = "..."` or
/// `pattern(path = "...", query("k=:v", ...))`.
#[derive(Debug, Clone)]
pub struct PatternOpts {
    pub path: String,
    pub query: Vec<String>,
}

#[derive(Debug, FromMeta)]
struct PatternListOpts {
    path: String,
    #[darling(default)]
    query: StringList,
}

impl FromMeta for PatternOpts {
    fn from_string(value: &str) -> darling::Result<Self> {
        Ok(Self {
            path: value.to_string(),
            query: Vec::new(),
        })
    }

    fn from_list(items: &[darling::ast::NestedMeta]) -> darling::Result<Self> {
        let opts = PatternListOpts::from_list(items)?;
        Ok(Self {
            path: opts.path,
            query: opts.query.0,
        })
    }
}

/// Field-level attributes parsed from `#[url_parameter(...)]`.
#[derive(Debug, FromField)]
#[darling(attributes(url_parameter))]
pub struct ParameterOpts {
    pub ident: Option<syn::Ident>,
    pub ty: syn::Type,

    /// Parameter name; defaults to the field name.
    #[darling(default)]
    pub name: Option<String>,

    /// Static regex replacing the type's default.
    #[darling(default)]
    pub regex: Option<String>,

    /// The regex is supplied per instance at match time.
    #[darling(default)]
    pub dynamic: bool,
}

/// Generates the `UrlParameters` implementation for the given derive input.
pub fn derive_url_parameters_impl(input: DeriveInput) -> TokenStream {
    let opts = match MappingOpts::from_derive_input(&input) {
        Ok(o) => o,
        Err(e) => return e.write_errors(),
    };
    match expand(&opts) {
        Ok(tokens) => tokens,
        Err(e) => e.write_errors(),
    }
}

fn expand(opts: &MappingOpts) -> darling::Result<TokenStream> {
    let struct_name = &opts.ident;
    let owner = opts
        .name
        .clone()
        .unwrap_or_else(|| struct_name.to_string());
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();
    let krate = opts
        .krate
        .clone()
        .unwrap_or_else(|| syn::parse_quote!(::urlmap_routing));

    let fields = opts
        .data
        .as_ref()
        .take_struct()
        .ok_or_else(|| darling::Error::unsupported_shape("enum"))?
        .fields;

    let mut errors = darling::Error::accumulator();
    let mut parameters = Vec::new();
    let mut matched_field = None;

    for field in fields {
        if has_attr(field, PARAMETER_ATTR) {
            if let Some(param) = errors.handle(ParameterOpts::from_field(field)) {
                if let Some(param) = errors.handle(Parameter::from_opts(param)) {
                    parameters.push(param);
                }
            }
        }
        if has_attr(field, MATCHED_PATTERN_ATTR) {
            if !is_option_of(&field.ty, "String") {
                errors.push(
                    darling::Error::custom("#[url_matched_pattern] requires an Option<String> field")
                        .with_span(&field.ty),
                );
            } else if matched_field.is_some() {
                errors.push(
                    darling::Error::custom("only one #[url_matched_pattern] field is allowed")
                        .with_span(field),
                );
            } else {
                matched_field = field.ident.clone();
            }
        }
    }

    let no_match = match (
        &opts.reroute_error,
        &opts.reroute_view,
        opts.ignore_if_not_matched,
    ) {
        (None, None, false) => quote! {},
        (Some(kind), None, false) => quote! {
            .no_match(#krate::NoMatchPolicy::RerouteToError(#kind.to_string()))
        },
        (None, Some(kind), false) => quote! {
            .no_match(#krate::NoMatchPolicy::RerouteToView(#kind.to_string()))
        },
        (None, None, true) => quote! {
            .no_match(#krate::NoMatchPolicy::Ignore)
        },
        _ => {
            errors.push(
                darling::Error::custom(
                    "reroute_error, reroute_view and ignore_if_not_matched are mutually exclusive",
                )
                .with_span(struct_name),
            );
            quote! {}
        }
    };

    errors.finish()?;

    let descriptors = parameters.iter().map(|p| p.descriptor(&krate));
    let patterns = opts.pattern.iter().map(|p| {
        let path = &p.path;
        let query = &p.query;
        quote! {
            .pattern(
                #krate::PatternDeclaration::new(#path)
                    #(.query(#query))*
            )
        }
    });

    let set_arms = parameters.iter().map(|p| {
        let name = &p.name;
        let field = &p.field;
        quote! {
            #name => #krate::coercion::assign(&mut self.#field, name, value),
        }
    });
    let get_arms = parameters.iter().map(|p| {
        let name = &p.name;
        let field = &p.field;
        quote! {
            #name => self.#field.as_ref().map(#krate::ParamType::to_value),
        }
    });

    let matched_methods = matched_field.map(|field| {
        quote! {
            fn set_matched_pattern(&mut self, pattern: ::core::option::Option<&str>) {
                self.#field = pattern.map(::std::string::String::from);
            }

            fn matched_pattern(&self) -> ::core::option::Option<&str> {
                self.#field.as_deref()
            }
        }
    });

    Ok(quote! {
        impl #impl_generics #krate::UrlParameters for #struct_name #ty_generics #where_clause {
            fn url_mapping() -> #krate::MappingDeclaration {
                #krate::MappingDeclaration::new(#owner)
                    #(.parameter(#descriptors))*
                    #(#patterns)*
                    #no_match
            }

            #[allow(unreachable_patterns, clippy::match_single_binding)]
            fn set_parameter(
                &mut self,
                name: &str,
                value: ::core::option::Option<#krate::ParamValue>,
            ) -> #krate::UrlMapResult<()> {
                match name {
                    #(#set_arms)*
                    _ => {
                        let _ = value;
                        ::core::result::Result::Err(#krate::UrlMapError::ConfigurationError(
                            ::std::format!("Unknown parameter '{}' of {}", name, #owner),
                        ))
                    }
                }
            }

            #[allow(unreachable_patterns, clippy::match_single_binding)]
            fn parameter(&self, name: &str) -> ::core::option::Option<#krate::ParamValue> {
                match name {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #matched_methods
        }
    })
}

/// A validated `#[url_parameter]` field.
struct Parameter {
    field: syn::Ident,
    name: String,
    inner: Type,
    regex: Option<String>,
    dynamic: bool,
}

impl Parameter {
    fn from_opts(opts: ParameterOpts) -> darling::Result<Self> {
        let field = opts
            .ident
            .clone()
            .ok_or_else(|| darling::Error::custom("tuple fields are not supported"))?;
        let inner = unwrap_option_type(&opts.ty)
            .cloned()
            .ok_or_else(|| {
                darling::Error::custom("#[url_parameter] requires an Option<T> field")
                    .with_span(&opts.ty)
            })?;
        let name = opts.name.unwrap_or_else(|| field.to_string());
        Ok(Self {
            field,
            name,
            inner,
            regex: opts.regex,
            dynamic: opts.dynamic,
        })
    }

    fn descriptor(&self, krate: &syn::Path) -> TokenStream {
        let name = &self.name;
        let inner = &self.inner;
        let regex = self.regex.as_ref().map(|r| quote! { .with_regex(#r) });
        let dynamic = self.dynamic.then(|| quote! { .dynamic() });
        quote! {
            #krate::ParameterDescriptor::new(
                #name,
                <#inner as #krate::ParamType>::kind(),
            )
            #regex
            #dynamic
        }
    }
}

fn has_attr(field: &syn::Field, name: &str) -> bool {
    field.attrs.iter().any(|a| a.path().is_ident(name))
}

/// If the type is `Option<T>`, returns `Some(&T)`. Otherwise `None`.
pub(crate) fn unwrap_option_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Option" {
            if let syn::PathArguments::AngleBracketed(ref args) = segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return Some(inner);
                }
            }
        }
    }
    None
}

/// Checks if a type is `Option<T>` where the last path segment of `T` is `name`.
pub(crate) fn is_option_of(ty: &Type, name: &str) -> bool {
    match unwrap_option_type(ty) {
        Some(Type::Path(inner)) => inner
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == name),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_unwrap_option_type() {
        let ty: Type = parse_quote!(Option<i64>);
        let inner = unwrap_option_type(&ty).unwrap();
        assert_eq!(quote!(#inner).to_string(), "i64");

        let ty: Type = parse_quote!(i64);
        assert!(unwrap_option_type(&ty).is_none());
    }

    #[test]
    fn test_is_option_of() {
        let ty: Type = parse_quote!(Option<String>);
        assert!(is_option_of(&ty, "String"));
        let ty: Type = parse_quote!(::std::option::Option<::std::string::String>);
        assert!(is_option_of(&ty, "String"));
        let ty: Type = parse_quote!(Option<i32>);
        assert!(!is_option_of(&ty, "String"));
    }

    #[test]
    fn test_pattern_opts_forms() {
        let input: DeriveInput = parse_quote! {
            #[url_mapping(pattern = "a/:x", pattern(path = "b/:x", query("q=:y", "r=:z")))]
            struct View {
                #[url_parameter]
                x: Option<String>,
            }
        };
        let opts = MappingOpts::from_derive_input(&input).unwrap();
        assert_eq!(opts.pattern.len(), 2);
        assert_eq!(opts.pattern[0].path, "a/:x");
        assert!(opts.pattern[0].query.is_empty());
        assert_eq!(opts.pattern[1].path, "b/:x");
        assert_eq!(opts.pattern[1].query, vec!["q=:y", "r=:z"]);
    }

    #[test]
    fn test_expand_generates_impl() {
        let input: DeriveInput = parse_quote! {
            #[url_mapping(pattern = "thread/:id", reroute_view = "Home")]
            struct ThreadView {
                #[url_parameter(name = "id", regex = "[0-9]+")]
                thread_id: Option<i64>,
                #[url_matched_pattern]
                matched: Option<String>,
                other: u8,
            }
        };
        let tokens = derive_url_parameters_impl(input).to_string();
        assert!(tokens.contains("UrlParameters for ThreadView"));
        assert!(tokens.contains("with_regex (\"[0-9]+\")"));
        assert!(tokens.contains("RerouteToView"));
        assert!(tokens.contains("fn matched_pattern"));
        assert!(tokens.contains("ConfigurationError"));
        assert!(!tokens.contains("compile_error"));
    }

    #[test]
    fn test_expand_uses_crate_path() {
        let input: DeriveInput = parse_quote! {
            #[url_mapping(crate = "urlmap::routing", pattern = ":id")]
            struct View {
                #[url_parameter]
                id: Option<i64>,
            }
        };
        let tokens = derive_url_parameters_impl(input).to_string();
        assert!(tokens.contains("urlmap :: routing :: UrlParameters for View"));
        assert!(!tokens.contains("urlmap_routing"));
    }

    #[test]
    fn test_expand_rejects_non_option_parameter() {
        let input: DeriveInput = parse_quote! {
            #[url_mapping(pattern = ":id")]
            struct View {
                #[url_parameter]
                id: i64,
            }
        };
        let tokens = derive_url_parameters_impl(input).to_string();
        assert!(tokens.contains("compile_error"));
        assert!(tokens.contains("requires an Option<T> field"));
    }

    #[test]
    fn test_expand_rejects_conflicting_policies() {
        let input: DeriveInput = parse_quote! {
            #[url_mapping(pattern = ":id", reroute_error = "NotFound", ignore_if_not_matched)]
            struct View {
                #[url_parameter]
                id: Option<i64>,
            }
        };
        let tokens = derive_url_parameters_impl(input).to_string();
        assert!(tokens.contains("mutually exclusive"));
    }
}

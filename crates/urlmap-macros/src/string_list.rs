//! Helper type for parsing `Vec<String>` from darling attributes.
//!
//! Accepts both `query("a=:a", "b=:b")` and `query = ["a=:a", "b=:b"]`.

use darling::FromMeta;

/// A list of string literals.
#[derive(Debug, Clone, Default)]
pub struct StringList(pub Vec<String>);

impl FromMeta for StringList {
    fn from_list(items: &[darling::ast::NestedMeta]) -> darling::Result<Self> {
        items
            .iter()
            .map(|item| match item {
                darling::ast::NestedMeta::Lit(syn::Lit::Str(lit)) => Ok(lit.value()),
                _ => Err(darling::Error::unexpected_type("non-string literal")),
            })
            .collect::<darling::Result<Vec<String>>>()
            .map(StringList)
    }

    fn from_string(value: &str) -> darling::Result<Self> {
        Ok(Self(vec![value.to_string()]))
    }

    fn from_expr(expr: &syn::Expr) -> darling::Result<Self> {
        match expr {
            syn::Expr::Array(arr) => arr
                .elems
                .iter()
                .map(|elem| match elem {
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit),
                        ..
                    }) => Ok(lit.value()),
                    _ => Err(darling::Error::unexpected_type("non-string literal in array")),
                })
                .collect::<darling::Result<Vec<String>>>()
                .map(StringList),
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) => Self::from_string(&lit.value()),
            _ => Err(darling::Error::unexpected_expr_type(expr)),
        }
    }
}

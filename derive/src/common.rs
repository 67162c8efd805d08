//! Attribute options shared by the struct and enum derives.

use darling::{FromDeriveInput, FromField, FromMeta, FromVariant};
use proc_macro2::{Span, TokenStream};
use quote::quote;

pub fn make_literal_int(i: usize) -> syn::LitInt {
    let i = format!("{}", i);
    syn::LitInt::new(&i, Span::call_site())
}

/// `#[wire(date_format(case = "C", field = "f", format = "%Y"))]`
#[derive(Debug, FromMeta)]
pub struct CaseDateFormat {
    pub case: String,
    pub field: String,
    pub format: String,
}

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(wire))]
pub struct WireOptions {
    pub ident: syn::Ident,
    /// Specify a path to the wirejson crate instance to use when referring to
    /// wirejson APIs from generated code. This is normally only applicable
    /// when invoking re-exported wirejson derives from a public macro in a
    /// different crate.
    #[darling(default, rename = "crate")]
    pub crate_path: Option<syn::Path>,
    /// Enum discriminator member, written as `{tag: "<case name>"}`.
    #[darling(default)]
    pub tag: Option<String>,
    /// No discriminator; cases are told apart by their fields.
    #[darling(default)]
    pub untagged: bool,
    /// The only data-less case of a small enum is written as `null`.
    #[darling(default)]
    pub null_case: bool,
    #[darling(default, multiple)]
    pub date_format: Vec<CaseDateFormat>,
    /// Struct rebuilt from `Default` with every field listed, including the
    /// skipped ones.
    #[darling(default)]
    pub opaque: bool,
}

impl WireOptions {
    pub fn crate_path_or_default(&self) -> syn::Path {
        self.crate_path
            .clone()
            .unwrap_or_else(|| syn::parse_quote!(wirejson))
    }
}

#[derive(Default, FromField)]
#[darling(default, attributes(wire))]
pub struct WireFieldOptions {
    pub ident: Option<syn::Ident>,
    /// Wire name of the field
    pub rename: Option<String>,
    /// chrono format string for date fields
    pub date_format: Option<String>,
    /// Left at its default and never written (opaque structs only)
    pub skip: bool,
}

impl WireFieldOptions {
    /// Rust name, or `None` for tuple fields
    pub fn name(&self) -> Option<String> {
        self.ident.as_ref().map(|ident| ident.to_string())
    }
}

/// Scalar a constant case is written as.
#[derive(Debug, Clone)]
pub enum ConstantOption {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FromMeta for ConstantOption {
    /// Bare `#[wire(constant)]` is `null`
    fn from_word() -> darling::Result<Self> {
        Ok(ConstantOption::Null)
    }

    fn from_value(value: &syn::Lit) -> darling::Result<Self> {
        match value {
            syn::Lit::Str(s) => Ok(ConstantOption::Str(s.value())),
            syn::Lit::Bool(b) => Ok(ConstantOption::Bool(b.value)),
            syn::Lit::Int(i) => Ok(ConstantOption::Int(i.base10_parse()?)),
            syn::Lit::Float(f) => Ok(ConstantOption::Float(f.base10_parse()?)),
            _ => Err(darling::Error::unexpected_lit_type(value)),
        }
    }

    fn from_expr(expr: &syn::Expr) -> darling::Result<Self> {
        match expr {
            syn::Expr::Lit(lit) => Self::from_value(&lit.lit),
            syn::Expr::Unary(syn::ExprUnary {
                op: syn::UnOp::Neg(_),
                expr,
                ..
            }) => match Self::from_expr(expr)? {
                ConstantOption::Int(i) => Ok(ConstantOption::Int(-i)),
                ConstantOption::Float(f) => Ok(ConstantOption::Float(-f)),
                _ => Err(darling::Error::custom("only numbers can be negated").with_span(expr)),
            },
            syn::Expr::Group(group) => Self::from_expr(&group.expr),
            _ => Err(darling::Error::unexpected_expr_type(expr)),
        }
    }
}

impl ConstantOption {
    pub fn to_tokens(&self, krate: &TokenStream) -> TokenStream {
        match self {
            ConstantOption::Null => quote!(#krate::Constant::Null),
            ConstantOption::Bool(b) => quote!(#krate::Constant::Bool(#b)),
            ConstantOption::Int(i) => quote!(#krate::Constant::Int(#i)),
            ConstantOption::Float(f) => quote!(#krate::Constant::Float(#f)),
            ConstantOption::Str(s) => quote!(#krate::Constant::Str(#s)),
        }
    }
}

#[derive(FromVariant)]
#[darling(attributes(wire))]
pub struct WireVariantOptions {
    pub ident: syn::Ident,
    /// Wire name of the case
    #[darling(default)]
    pub rename: Option<String>,
    #[darling(default)]
    pub constant: Option<ConstantOption>,
}

impl WireVariantOptions {
    pub fn name(&self) -> String {
        self.rename
            .clone()
            .unwrap_or_else(|| self.ident.to_string())
    }
}

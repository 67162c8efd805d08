use darling::{FromField, FromVariant};
use proc_macro2::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{DataEnum, DeriveInput, Error, Fields, Index, Meta, Token};

use crate::common::*;
use crate::record::field_shape;
use crate::DeriveResult;

const REPRS: &[&str] = &[
    "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
];

pub fn shape(
    input: &DeriveInput,
    options: &WireOptions,
    enumeration: &DataEnum,
) -> DeriveResult<TokenStream> {
    if enumeration.variants.is_empty() {
        return Err(
            Error::new_spanned(&options.ident, "enums without variants are not supported")
                .to_compile_error(),
        );
    }
    if options.untagged && options.tag.is_some() {
        return Err(Error::new_spanned(
            &options.ident,
            "`tag` and `untagged` can't be used together",
        )
        .to_compile_error());
    }

    let variants = enumeration
        .variants
        .iter()
        .map(|v| WireVariantOptions::from_variant(v).map_err(|err| err.write_errors()))
        .collect::<Result<Vec<_>, TokenStream>>()?;

    let plain = options.tag.is_none()
        && !options.untagged
        && !options.null_case
        && options.date_format.is_empty()
        && enumeration
            .variants
            .iter()
            .all(|v| matches!(v.fields, Fields::Unit))
        && variants
            .iter()
            .all(|v| v.rename.is_none() && v.constant.is_none());

    match repr(input).map_err(|err| err.to_compile_error())? {
        Some(repr) if plain => Ok(repr_enum(&repr, enumeration)),
        _ => union(options, enumeration, &variants),
    }
}

/// Integer type named by `#[repr(..)]`, if any.
fn repr(input: &DeriveInput) -> syn::Result<Option<syn::Ident>> {
    for attr in &input.attrs {
        if !attr.path().is_ident("repr") {
            continue;
        }
        let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for meta in metas {
            if let Meta::Path(path) = meta {
                if let Some(ident) = path.get_ident() {
                    if REPRS.iter().any(|r| ident == r) {
                        return Ok(Some(ident.clone()));
                    }
                }
            }
        }
    }
    Ok(None)
}

fn repr_enum(repr: &syn::Ident, enumeration: &DataEnum) -> TokenStream {
    let variant = enumeration.variants.iter().map(|v| &v.ident).collect::<Vec<_>>();
    let first = variant[0];

    quote! {
        __crate::export::Shape::Enum(__crate::export::EnumShape {
            repr: __crate::export::TypeRef::of::<#repr>(),
            to_repr: |__v| __crate::export::Ok(__crate::export::Box::new(
                match __crate::export::downcast_ref::<Self>(__v)? {
                    #(Self::#variant => Self::#variant as #repr,)*
                }
            ) as __crate::export::Box<dyn __crate::export::Any>),
            from_repr: |__r| {
                let __r = __crate::export::unbox::<#repr>(__r)?;
                #(
                    if __r == Self::#variant as #repr {
                        return __crate::export::Ok(__crate::export::Some(
                            __crate::export::Box::new(Self::#variant) as __crate::export::Box<dyn __crate::export::Any>
                        ));
                    }
                )*
                __crate::export::Ok(__crate::export::None)
            },
            first: || __crate::export::Box::new(Self::#first) as __crate::export::Box<dyn __crate::export::Any>,
        })
    }
}

fn union(
    options: &WireOptions,
    enumeration: &DataEnum,
    variants: &[WireVariantOptions],
) -> DeriveResult<TokenStream> {
    let mut cases = vec![];
    let mut case_ident = vec![];
    let mut case_index = vec![];

    for (i, (v, opt)) in enumeration.variants.iter().zip(variants).enumerate() {
        let ident = &v.ident;
        let name = ident.to_string();
        let wire_name = opt.name();
        let constant = match &opt.constant {
            Some(constant) => {
                if !matches!(v.fields, Fields::Unit) {
                    return Err(Error::new_spanned(v, "constant cases can't have fields")
                        .to_compile_error());
                }
                let constant = constant.to_tokens(&quote!(__crate::export));
                quote!(__crate::export::Some(#constant))
            }
            None => quote!(__crate::export::None),
        };

        let mut field_shapes = vec![];
        let mut field_takes = vec![];
        for (j, f) in v.fields.iter().enumerate() {
            let field_opt = WireFieldOptions::from_field(f).map_err(|err| err.write_errors())?;
            if field_opt.skip {
                return Err(Error::new_spanned(f, "`skip` is not supported on enum fields")
                    .to_compile_error());
            }

            let (member, name, default_wire_name) = match &f.ident {
                Some(ident) => (quote!(#ident), ident.to_string(), ident.to_string()),
                None => {
                    let index = Index::from(j);
                    (quote!(#index), j.to_string(), format!("${}", j))
                }
            };
            let field_wire_name = field_opt.rename.clone().unwrap_or(default_wire_name);

            let get = quote! {
                |__v| match __crate::export::downcast_ref::<Self>(__v)? {
                    Self::#ident { #member: __f, .. } => __crate::export::Ok(__f as &dyn __crate::export::Any),
                    _ => __crate::export::Err(__crate::export::Error::variant_mismatch::<Self>()),
                }
            };
            field_shapes.push(field_shape(
                &name,
                &field_wire_name,
                &f.ty,
                field_opt.date_format.as_ref(),
                get,
            ));
            field_takes.push(quote!(__crate::export::take(&mut __args)?));
        }

        let construct = match &v.fields {
            Fields::Named(named) => {
                let field = named.named.iter().map(|f| &f.ident);
                quote!(Self::#ident { #(#field: #field_takes,)* })
            }
            Fields::Unnamed(_) => quote!(Self::#ident(#(#field_takes,)*)),
            Fields::Unit => quote!(Self::#ident),
        };
        let positional = matches!(v.fields, Fields::Unnamed(_));

        cases.push(quote! {
            __crate::export::CaseShape {
                name: #name,
                wire_name: #wire_name,
                fields: __crate::export::Vec::from([#(#field_shapes,)*]),
                positional: #positional,
                constant: #constant,
                build: |__args| {
                    let mut __args = __args.into_iter();
                    __crate::export::Ok(
                        __crate::export::Box::new(#construct) as __crate::export::Box<dyn __crate::export::Any>
                    )
                },
            }
        });
        case_ident.push(ident);
        case_index.push(i);
    }

    let tag = match (&options.tag, options.untagged) {
        (Some(tag), _) => quote!(__crate::export::UnionTag::Named(#tag)),
        (None, true) => quote!(__crate::export::UnionTag::Untagged),
        (None, false) => quote!(__crate::export::UnionTag::Standard),
    };
    let null_case = options.null_case;
    let date_formats = options.date_format.iter().map(|f| {
        let (case, field, format) = (&f.case, &f.field, &f.format);
        quote! {
            __crate::export::CaseDateFormat { case: #case, field: #field, format: #format }
        }
    });

    Ok(quote! {
        __crate::export::Shape::Union(__crate::export::UnionShape {
            cases: __crate::export::Vec::from([#(#cases,)*]),
            tag: #tag,
            null_case: #null_case,
            date_formats: __crate::export::Vec::from([#(#date_formats,)*]),
            case_of: |__v| __crate::export::Ok(match __crate::export::downcast_ref::<Self>(__v)? {
                #(Self::#case_ident { .. } => #case_index,)*
            }),
        })
    })
}

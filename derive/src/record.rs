use darling::FromField;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{DataStruct, Error, Fields, Index};

use crate::common::*;
use crate::DeriveResult;

/// `FieldShape` constructor for one field.
pub fn field_shape(
    name: &str,
    wire_name: &str,
    ty: &syn::Type,
    date_format: Option<&String>,
    get: TokenStream,
) -> TokenStream {
    let date_format = date_format.map(|format| quote!(.date_format(#format)));
    quote! {
        __crate::export::FieldShape::new(#name, __crate::export::TypeRef::of::<#ty>(), #get)
            .rename(#wire_name)
            #date_format
    }
}

pub fn shape(options: &WireOptions, data: &DataStruct) -> DeriveResult<TokenStream> {
    match &data.fields {
        Fields::Named(_) if options.opaque => opaque(data),
        Fields::Named(_) => record(data),
        _ if options.opaque => Err(Error::new_spanned(
            &options.ident,
            "`opaque` needs a struct with named fields",
        )
        .to_compile_error()),
        Fields::Unnamed(_) => tuple(data),
        Fields::Unit => Ok(quote! {
            __crate::export::Shape::Tuple(__crate::export::TupleShape {
                items: __crate::export::Vec::new(),
                get: |__v, __i| __crate::export::Err(__crate::export::Error::encode_mismatch(
                    __crate::export::type_name::<Self>(),
                    "unit struct has no items",
                )),
                build: |__args| __crate::export::Ok(
                    __crate::export::Box::new(Self) as __crate::export::Box<dyn __crate::export::Any>
                ),
            })
        }),
    }
}

struct NamedField {
    ident: syn::Ident,
    shape: TokenStream,
    skip: bool,
}

fn named_fields(data: &DataStruct) -> Result<Vec<NamedField>, TokenStream> {
    let mut fields = vec![];
    for f in &data.fields {
        let opt = WireFieldOptions::from_field(f).map_err(|err| err.write_errors())?;
        let (ident, name) = match (&f.ident, opt.name()) {
            (Some(ident), Some(name)) => (ident.clone(), name),
            _ => unreachable!("named fields have idents"),
        };
        let wire_name = opt.rename.clone().unwrap_or_else(|| name.clone());
        let get = quote! {
            |__v| __crate::export::Ok(
                &__crate::export::downcast_ref::<Self>(__v)?.#ident as &dyn __crate::export::Any
            )
        };

        fields.push(NamedField {
            shape: field_shape(&name, &wire_name, &f.ty, opt.date_format.as_ref(), get),
            ident,
            skip: opt.skip,
        });
    }
    Ok(fields)
}

fn record(data: &DataStruct) -> DeriveResult<TokenStream> {
    let fields = named_fields(data)?;
    if fields.iter().any(|f| f.skip) {
        return Err(Error::new(
            Span::call_site(),
            "`skip` is only supported on `#[wire(opaque)]` structs",
        )
        .to_compile_error());
    }

    let field = fields.iter().map(|f| &f.ident);
    let field_shape = fields.iter().map(|f| &f.shape);

    Ok(quote! {
        __crate::export::Shape::Record(__crate::export::RecordShape {
            fields: __crate::export::Vec::from([#(#field_shape,)*]),
            build: |__args| {
                let mut __args = __args.into_iter();
                __crate::export::Ok(__crate::export::Box::new(Self {
                    #(#field: __crate::export::take(&mut __args)?,)*
                }) as __crate::export::Box<dyn __crate::export::Any>)
            },
        })
    })
}

fn opaque(data: &DataStruct) -> DeriveResult<TokenStream> {
    let fields = named_fields(data)?;

    let field = fields.iter().map(|f| &f.ident);
    let field_shape = fields.iter().map(|f| &f.shape);
    let serializable = fields.iter().map(|f| !f.skip);

    Ok(quote! {
        __crate::export::Shape::Opaque(__crate::export::OpaqueShape {
            fields: __crate::export::Vec::from([#(
                __crate::export::OpaqueField {
                    field: #field_shape,
                    serializable: #serializable,
                    set: |__v, __x| {
                        __crate::export::downcast_mut::<Self>(__v)?.#field = __crate::export::unbox(__x)?;
                        __crate::export::Ok(())
                    },
                },
            )*]),
            create: __crate::export::Some(
                (|| -> __crate::export::Box<dyn __crate::export::Any> {
                    __crate::export::Box::new(<Self as __crate::export::Default>::default())
                }) as fn() -> __crate::export::Box<dyn __crate::export::Any>
            ),
        })
    })
}

fn tuple(data: &DataStruct) -> DeriveResult<TokenStream> {
    let mut ty = vec![];
    let mut index = vec![];
    let mut literal = vec![];
    for (i, f) in data.fields.iter().enumerate() {
        WireFieldOptions::from_field(f).map_err(|err| err.write_errors())?;
        ty.push(&f.ty);
        index.push(Index::from(i));
        literal.push(make_literal_int(i));
    }

    Ok(quote! {
        __crate::export::Shape::Tuple(__crate::export::TupleShape {
            items: __crate::export::Vec::from([#(__crate::export::TypeRef::of::<#ty>(),)*]),
            get: |__v, __i| match __i {
                #(#literal => __crate::export::Ok(
                    &__crate::export::downcast_ref::<Self>(__v)?.#index as &dyn __crate::export::Any
                ),)*
                _ => __crate::export::Err(__crate::export::Error::encode_mismatch(
                    __crate::export::type_name::<Self>(),
                    "tuple index out of range",
                )),
            },
            build: |__args| {
                let mut __args = __args.into_iter();
                __crate::export::Ok(__crate::export::Box::new(
                    Self(#(__crate::export::take::<#ty>(&mut __args)?,)*)
                ) as __crate::export::Box<dyn __crate::export::Any>)
            },
        })
    })
}

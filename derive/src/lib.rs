#![recursion_limit = "128"]

extern crate proc_macro;

mod bound;
mod common;
mod record;
mod union;

use darling::FromDeriveInput;
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Error};

use crate::common::WireOptions;

type DeriveResult<T> = std::result::Result<T, T>;

#[proc_macro_derive(Wire, attributes(wire))]
pub fn derive_wire(input: TokenStream) -> TokenStream {
    derive(parse_macro_input!(input as DeriveInput))
        .unwrap_or_else(|err| err)
        .into()
}

fn derive(input: DeriveInput) -> DeriveResult<proc_macro2::TokenStream> {
    bound::reject_lifetimes(&input.generics).map_err(|err| err.to_compile_error())?;
    let options = WireOptions::from_derive_input(&input).map_err(|err| err.write_errors())?;

    let shape = match &input.data {
        Data::Struct(data) => record::shape(&options, data)?,
        Data::Enum(enumeration) => union::shape(&input, &options, enumeration)?,
        Data::Union(_) => {
            return Err(Error::new(Span::call_site(), "unions aren't supported").to_compile_error())
        }
    };

    let crate_path = options.crate_path_or_default();
    let bound = parse_quote!(__crate::Wire);
    let where_clause = bound::where_clause_with_bound(&input.generics, bound);

    let ident = &input.ident;
    let (impl_generics, ty_generics, _) = input.generics.split_for_impl();

    Ok(quote! {
        #[doc(hidden)]
        #[allow(
            non_upper_case_globals,
            unused_attributes,
            unused_qualifications,
            unused_mut,
            unused_variables,
            unreachable_patterns,
        )]
        const _: () = {
            use #crate_path as __crate;

            impl #impl_generics __crate::Wire for #ident #ty_generics #where_clause {
                fn shape() -> __crate::export::Shape {
                    #shape
                }
            }
        };
    })
}

use syn::punctuated::Punctuated;
use syn::{parse_quote, GenericParam, Generics, Token, WhereClause, WherePredicate};

/// Where clause of `generics` with `T: bound` added for every type parameter.
pub fn where_clause_with_bound(generics: &Generics, bound: syn::Path) -> WhereClause {
    let new_predicates = generics
        .type_params()
        .map::<WherePredicate, _>(|param| {
            let param = &param.ident;
            parse_quote!(#param : #bound)
        });

    let mut generics = generics.clone();
    generics
        .make_where_clause()
        .predicates
        .extend(new_predicates);
    generics.where_clause.unwrap_or_else(|| WhereClause {
        where_token: <Token![where]>::default(),
        predicates: Punctuated::new(),
    })
}

/// Fails on lifetime parameters; erased values must be `'static`.
pub fn reject_lifetimes(generics: &Generics) -> syn::Result<()> {
    match generics
        .params
        .iter()
        .find(|param| matches!(param, GenericParam::Lifetime(_)))
    {
        Some(lifetime) => Err(syn::Error::new_spanned(
            lifetime,
            "`Wire` types can't borrow, remove the lifetime parameter",
        )),
        None => Ok(()),
    }
}

//! Procedural macros for the memdoc project.
//!
//! `#[derive(Record)]` lets a structured type address its collection: the
//! store resolves the bare type name into the collection identifier.

#[allow(unused_extern_crates)]
extern crate self as memdoc_macros;

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

/// Implements `memdoc::record::RecordType` for a struct or enum.
///
/// ```ignore
/// use memdoc::prelude::*;
///
/// #[derive(Serialize, Record)]
/// struct Order {
///     total: f64,
/// }
///
/// let orders = store.typed_collection::<Order>(); // the "orders" collection
/// ```
#[proc_macro_derive(Record)]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::memdoc::record::RecordType for #name #ty_generics #where_clause {
            fn type_name() -> &'static str {
                stringify!(#name)
            }
        }
    };

    expanded.into()
}

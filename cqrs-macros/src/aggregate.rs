use crate::attr::TagAttrConfig;
use crate::derive_utils::apply_derives;
use crate::field_utils::ensure_required_fields;
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Item, Type, parse_macro_input};

/// #[aggregate] 宏实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as TagAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[aggregate] only on struct")
                .to_compile_error()
                .into();
        }
    };

    if !st.generics.params.is_empty() {
        return syn::Error::new(
            st.generics.span(),
            "#[aggregate] does not support generic structs",
        )
        .to_compile_error()
        .into();
    }

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let base_ty: Type = syn::parse_quote! { ::cqrs_domain::aggregate::AggregateBase };
    ensure_required_fields(fields_named, &[("base", &base_ty)]);

    apply_derives(
        &mut st.attrs,
        vec![syn::parse_quote!(Debug), syn::parse_quote!(Default)],
    );

    let ident = &st.ident;
    let tag = cfg.tag_or(ident);

    let expanded = quote! {
        #st

        impl ::cqrs_domain::aggregate::AggregateState for #ident {
            fn aggregate_type(&self) -> &'static str {
                <Self as ::cqrs_domain::aggregate::Aggregate>::TYPE
            }

            fn base(&self) -> &::cqrs_domain::aggregate::AggregateBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut ::cqrs_domain::aggregate::AggregateBase {
                &mut self.base
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }

        impl ::cqrs_domain::aggregate::Aggregate for #ident {
            const TYPE: &'static str = #tag;

            fn new(id: ::std::string::String) -> Self {
                Self {
                    base: ::cqrs_domain::aggregate::AggregateBase::new(id),
                    ..::std::default::Default::default()
                }
            }
        }
    };

    TokenStream::from(expanded)
}

use crate::attr::TagAttrConfig;
use crate::derive_utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Attribute, Generics, Ident, Item, parse_macro_input};

// 事件与命令都可写在结构体或枚举上
fn split_item(item: &Item, macro_name: &str) -> syn::Result<(Ident, Generics)> {
    match item {
        Item::Struct(s) => Ok((s.ident.clone(), s.generics.clone())),
        Item::Enum(e) => Ok((e.ident.clone(), e.generics.clone())),
        other => Err(syn::Error::new(
            other.span(),
            format!("#[{macro_name}] only on struct or enum"),
        )),
    }
}

fn attrs_mut(item: &mut Item) -> Option<&mut Vec<Attribute>> {
    match item {
        Item::Struct(s) => Some(&mut s.attrs),
        Item::Enum(e) => Some(&mut e.attrs),
        _ => None,
    }
}

/// #[event] 宏实现
pub(crate) fn expand_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as TagAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    let (ident, generics) = match split_item(&input, "event") {
        Ok(v) => v,
        Err(err) => return err.to_compile_error().into(),
    };

    if let Some(attrs) = attrs_mut(&mut input) {
        apply_derives(
            attrs,
            vec![
                syn::parse_quote!(Debug),
                syn::parse_quote!(Clone),
                syn::parse_quote!(PartialEq),
                syn::parse_quote!(serde::Serialize),
                syn::parse_quote!(serde::Deserialize),
            ],
        );
    }

    let tag = cfg.tag_or(&ident);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let out = quote! {
        #input

        impl #impl_generics ::cqrs_domain::message::Event for #ident #ty_generics #where_clause {
            const TYPE: &'static str = #tag;
        }
    };

    TokenStream::from(out)
}

/// #[command] 宏实现
pub(crate) fn expand_command(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as TagAttrConfig);
    let mut input = parse_macro_input!(item as Item);

    let (ident, generics) = match split_item(&input, "command") {
        Ok(v) => v,
        Err(err) => return err.to_compile_error().into(),
    };

    if let Some(attrs) = attrs_mut(&mut input) {
        apply_derives(attrs, vec![syn::parse_quote!(Debug)]);
    }

    let tag = cfg.tag_or(&ident);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let out = quote! {
        #input

        impl #impl_generics ::cqrs_domain::message::Command for #ident #ty_generics #where_clause {
            const NAME: &'static str = #tag;
        }
    };

    TokenStream::from(out)
}

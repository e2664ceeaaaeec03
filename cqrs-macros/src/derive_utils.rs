use quote::ToTokens;
use syn::{Attribute, Token};

// 提取非 derive 属性与已有 derive 列表
fn split_derives(attrs: &[Attribute]) -> (Vec<Attribute>, Vec<syn::Path>) {
    let mut retained = Vec::new();
    let mut existing = Vec::new();
    for attr in attrs.iter() {
        if attr.path().is_ident("derive") {
            if let Ok(list) = attr.parse_args_with(
                syn::punctuated::Punctuated::<syn::Path, Token![,]>::parse_terminated,
            ) {
                existing.extend(list);
            }
        } else {
            retained.push(attr.clone());
        }
    }
    (retained, existing)
}

// 合并默认与已有 derive（去重，优先保留已有写法）
fn merge_derives(existing: Vec<syn::Path>, required: Vec<syn::Path>) -> Attribute {
    let mut seen = std::collections::HashSet::<String>::new();
    let mut final_list: Vec<syn::Path> = Vec::new();
    for p in existing.into_iter().chain(required) {
        if seen.insert(derive_key(&p)) {
            final_list.push(p);
        }
    }
    syn::parse_quote!(#[derive(#(#final_list),*)])
}

// 归一化 derive 的 key，避免 Serialize/serde::Serialize 重复
fn derive_key(p: &syn::Path) -> String {
    match p.segments.last() {
        Some(last) => {
            let last_ident = last.ident.to_string();
            match last_ident.as_str() {
                "Serialize" | "Deserialize" => format!("serde::{last_ident}"),
                _ => last_ident,
            }
        }
        None => p.to_token_stream().to_string(),
    }
}

// 直接在 attrs 上应用默认派生合并；derive 必须位于其他属性（如 #[serde]）之前
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<syn::Path>) {
    let (retained, existing) = split_derives(attrs);
    let merged = merge_derives(existing, required);
    *attrs = std::iter::once(merged).chain(retained).collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_and_required_derives_are_deduplicated() {
        let mut attrs: Vec<Attribute> = vec![
            syn::parse_quote!(#[derive(Clone, Serialize)]),
            syn::parse_quote!(#[serde(rename_all = "camelCase")]),
        ];
        apply_derives(
            &mut attrs,
            vec![
                syn::parse_quote!(Debug),
                syn::parse_quote!(Clone),
                syn::parse_quote!(serde::Serialize),
            ],
        );

        assert_eq!(attrs.len(), 2);
        assert!(attrs[0].path().is_ident("derive"));
        assert!(attrs[1].path().is_ident("serde"));
        let (_, derives) = split_derives(&attrs);
        let keys: Vec<_> = derives.iter().map(derive_key).collect();
        assert_eq!(keys, vec!["Clone", "serde::Serialize", "Debug"]);
    }
}

use syn::punctuated::Punctuated;
use syn::{Ident, LitStr, Result, Token, parse::Parse, parse::ParseStream};

/// 解析 `type = "..."` 形式的类型标签参数
pub(crate) struct TagAttrConfig {
    tag: Option<LitStr>,
}

impl TagAttrConfig {
    /// 显式标签，缺省时取类型名
    pub(crate) fn tag_or(&self, ident: &Ident) -> LitStr {
        self.tag
            .clone()
            .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()))
    }
}

impl Parse for TagAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut tag: Option<LitStr> = None;

        if input.is_empty() {
            return Ok(Self { tag });
        }

        let pairs: Punctuated<TagKv, Token![,]> =
            Punctuated::<TagKv, Token![,]>::parse_terminated(input)?;

        for kv in pairs.into_iter() {
            if tag.is_some() {
                return Err(syn::Error::new(
                    kv.value.span(),
                    "duplicate key 'type' in attribute",
                ));
            }
            if kv.value.value().is_empty() {
                return Err(syn::Error::new(
                    kv.value.span(),
                    "type tag must not be empty",
                ));
            }
            tag = Some(kv.value);
        }

        Ok(Self { tag })
    }
}

struct TagKv {
    value: LitStr,
}

impl Parse for TagKv {
    fn parse(input: ParseStream) -> Result<Self> {
        if !input.peek(Token![type]) {
            return Err(input.error("unknown key in attribute; expected 'type'"));
        }
        let _key: Token![type] = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        let value: LitStr = input.parse()?;
        Ok(Self { value })
    }
}

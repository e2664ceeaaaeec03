use proc_macro::TokenStream;

mod aggregate;
mod attr;
mod derive_utils;
mod field_utils;
mod message;

/// 聚合宏
/// - 若缺失则追加字段 `base: ::cqrs_domain::aggregate::AggregateBase` 并置于最前
/// - 自动派生 `Debug`、`Default`，实现 `AggregateState` 与 `Aggregate`（`TYPE`/`new`）
/// - 参数：`#[aggregate(type = "...")]`，默认使用结构体名
/// - `AggregateRoot::apply` 仍由使用方实现
#[proc_macro_attribute]
pub fn aggregate(attr: TokenStream, item: TokenStream) -> TokenStream {
    aggregate::expand(attr, item)
}

/// 事件宏
/// - 自动派生 `Debug`、`Clone`、`PartialEq`、`Serialize`、`Deserialize`
/// - 实现 `::cqrs_domain::message::Event`，`TYPE` 默认为类型名
/// - 参数：`#[event(type = "...")]`
#[proc_macro_attribute]
pub fn event(attr: TokenStream, item: TokenStream) -> TokenStream {
    message::expand_event(attr, item)
}

/// 命令宏
/// - 自动派生 `Debug`
/// - 实现 `::cqrs_domain::message::Command`，`NAME` 默认为类型名
/// - 参数：`#[command(type = "...")]`
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    message::expand_command(attr, item)
}

use std::collections::HashMap;

/// 头部集合：与载荷一同持久化、但不属于载荷本身的元数据（顺序无关）
pub type Headers = HashMap<String, serde_json::Value>;

/// 保存时仓储为每个事件打上的聚合 ID 头
pub const AGGREGATE_ID_HEADER: &str = "AggregateID";

/// 保存时随追加请求一起下发的聚合类型头
pub const AGGREGATE_TYPE_HEADER: &str = "AggregateType";

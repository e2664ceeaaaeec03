use cqrs_domain::aggregate::{Aggregate, AggregateBase, AggregateRoot, AggregateState};
use cqrs_domain::message::EventMessage;
use cqrs_macros::aggregate;

// 已声明的 base 字段会被复用并移到最前
#[aggregate(type = "inventory.item")]
#[derive(Debug)]
pub struct InventoryItem {
    name: String,
    activated: bool,
    base: AggregateBase,
}

impl AggregateRoot for InventoryItem {
    fn apply(&mut self, _event: EventMessage, _is_new: bool) {}
}

fn main() {
    assert_eq!(InventoryItem::TYPE, "inventory.item");
    let item = InventoryItem::new("i-1".into());
    assert_eq!(item.aggregate_type(), "inventory.item");
    assert!(!item.activated);
    assert!(item.name.is_empty());

    let boxed: Box<dyn AggregateRoot> = Box::new(item);
    assert!(boxed.as_any().downcast_ref::<InventoryItem>().is_some());
}

use cqrs_domain::message::{Event, EventMessage};
use cqrs_macros::event;
use serde::{Deserialize, Serialize};

#[event]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemsCheckedIn {
    item_count: u32,
}

#[event(type = "item.renamed")]
struct ItemRenamed {
    new_name: String,
}

fn main() {
    assert_eq!(ItemsCheckedIn::TYPE, "ItemsCheckedIn");
    assert_eq!(ItemRenamed::TYPE, "item.renamed");

    let e = ItemsCheckedIn { item_count: 3 };
    assert_eq!(e.clone(), e);
    let value = serde_json::to_value(&e).unwrap();
    assert_eq!(value["itemCount"], 3);

    let msg = EventMessage::new(
        "item-1",
        ItemRenamed {
            new_name: "B".into(),
        },
    );
    assert_eq!(msg.event_type(), "item.renamed");
}

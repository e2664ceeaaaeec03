use cqrs_domain::message::{Command, CommandMessage};
use cqrs_macros::command;

#[command]
struct CreateInventoryItem {
    name: String,
}

#[command(type = "inventory.deactivate")]
struct DeactivateInventoryItem;

fn main() {
    assert_eq!(CreateInventoryItem::NAME, "CreateInventoryItem");
    assert_eq!(DeactivateInventoryItem::NAME, "inventory.deactivate");

    let cmd = CommandMessage::new(
        "item-1",
        CreateInventoryItem {
            name: "Widget".into(),
        },
    );
    assert_eq!(cmd.command_type(), "CreateInventoryItem");
    assert_eq!(
        cmd.downcast_ref::<CreateInventoryItem>().map(|c| c.name.as_str()),
        Some("Widget")
    );
    println!("{:?}", DeactivateInventoryItem);
}

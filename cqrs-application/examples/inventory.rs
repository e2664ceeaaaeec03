use async_trait::async_trait;
use cqrs_application::dispatcher::Dispatcher;
use cqrs_application::{AggregateCommandHandler, InMemoryDispatcher};
use cqrs_domain::aggregate::{Aggregate, AggregateRoot, ChangeTracker};
use cqrs_domain::error::{DomainError, DomainResult};
use cqrs_domain::eventing::{EventBus, EventHandler, InMemoryEventBus};
use cqrs_domain::factory::{DelegateAggregateFactory, DelegateEventFactory};
use cqrs_domain::message::{Command, CommandMessage, Event, EventMessage};
use cqrs_domain::new_id;
use cqrs_domain::persist::{CommonDomainRepository, InMemoryEventStore};
use cqrs_domain::stream_namer::DelegateStreamNamer;
use cqrs_macros::{aggregate, command, event};
use dashmap::DashMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[command]
struct CreateInventoryItem {
    name: String,
}

#[command]
struct RenameInventoryItem {
    new_name: String,
}

#[command]
struct CheckInItemsToInventory {
    count: u32,
}

#[command]
struct RemoveItemsFromInventory {
    count: u32,
}

#[command]
struct DeactivateInventoryItem;

#[event]
struct InventoryItemCreated {
    name: String,
}

#[event]
struct InventoryItemRenamed {
    new_name: String,
}

#[event]
struct ItemsCheckedIntoInventory {
    count: u32,
}

#[event]
struct ItemsRemovedFromInventory {
    count: u32,
}

#[event]
struct InventoryItemDeactivated;

#[aggregate]
struct InventoryItem {
    activated: bool,
    count: u32,
}

impl AggregateRoot for InventoryItem {
    fn apply(&mut self, event: EventMessage, is_new: bool) {
        if event.downcast_ref::<InventoryItemCreated>().is_some() {
            self.activated = true;
        } else if let Some(e) = event.downcast_ref::<ItemsCheckedIntoInventory>() {
            self.count += e.count;
        } else if let Some(e) = event.downcast_ref::<ItemsRemovedFromInventory>() {
            self.count -= e.count;
        } else if event.downcast_ref::<InventoryItemDeactivated>().is_some() {
            self.activated = false;
        }
        if is_new {
            self.track_change(event);
        }
    }

    fn handle(&mut self, command: &CommandMessage) -> DomainResult<()> {
        if let Some(cmd) = command.downcast_ref::<CreateInventoryItem>() {
            if cmd.name.is_empty() {
                return Err(DomainError::command_execution(command, "the name must not be empty"));
            }
            self.raise(InventoryItemCreated {
                name: cmd.name.clone(),
            });
        } else if let Some(cmd) = command.downcast_ref::<RenameInventoryItem>() {
            if cmd.new_name.is_empty() {
                return Err(DomainError::command_execution(command, "the name must not be empty"));
            }
            self.raise(InventoryItemRenamed {
                new_name: cmd.new_name.clone(),
            });
        } else if let Some(cmd) = command.downcast_ref::<CheckInItemsToInventory>() {
            if cmd.count == 0 {
                return Err(DomainError::command_execution(command, "must have a count greater than 0"));
            }
            self.raise(ItemsCheckedIntoInventory { count: cmd.count });
        } else if let Some(cmd) = command.downcast_ref::<RemoveItemsFromInventory>() {
            if cmd.count > self.count {
                return Err(DomainError::command_execution(command, "not enough items in stock"));
            }
            self.raise(ItemsRemovedFromInventory { count: cmd.count });
        } else if command.downcast_ref::<DeactivateInventoryItem>().is_some() {
            if !self.activated {
                return Err(DomainError::command_execution(command, "already deactivated"));
            }
            self.raise(InventoryItemDeactivated);
        } else {
            return Err(DomainError::UnsupportedCommand {
                aggregate_type: Self::TYPE.to_string(),
                command_type: command.command_type().to_string(),
            });
        }
        Ok(())
    }
}

/// 读模型：物品名称与库存数量
#[derive(Debug, Clone, Default)]
struct ItemDetail {
    name: String,
    count: u32,
    version: Option<usize>,
}

#[derive(Default)]
struct ItemDetailView {
    items: DashMap<String, ItemDetail>,
}

#[async_trait]
impl EventHandler for ItemDetailView {
    fn handler_name(&self) -> &str {
        "item_detail_view"
    }

    async fn handle(&self, event: &EventMessage) -> DomainResult<()> {
        let id = event.aggregate_id().to_string();
        if event.downcast_ref::<InventoryItemDeactivated>().is_some() {
            self.items.remove(&id);
            return Ok(());
        }

        let mut detail = self.items.entry(id).or_default();
        if let Some(e) = event.downcast_ref::<InventoryItemCreated>() {
            detail.name = e.name.clone();
        } else if let Some(e) = event.downcast_ref::<InventoryItemRenamed>() {
            detail.name = e.new_name.clone();
        } else if let Some(e) = event.downcast_ref::<ItemsCheckedIntoInventory>() {
            detail.count += e.count;
        } else if let Some(e) = event.downcast_ref::<ItemsRemovedFromInventory>() {
            detail.count -= e.count;
        }
        detail.version = event.version();
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let bus = Arc::new(InMemoryEventBus::new());
    let view = Arc::new(ItemDetailView::default());
    bus.add_handler(
        view.clone(),
        &[
            InventoryItemCreated::TYPE,
            InventoryItemRenamed::TYPE,
            ItemsCheckedIntoInventory::TYPE,
            ItemsRemovedFromInventory::TYPE,
            InventoryItemDeactivated::TYPE,
        ],
    )?;

    let aggregates = DelegateAggregateFactory::new();
    aggregates.register::<InventoryItem>()?;
    let events = DelegateEventFactory::new();
    events.register::<InventoryItemCreated>()?;
    events.register::<InventoryItemRenamed>()?;
    events.register::<ItemsCheckedIntoInventory>()?;
    events.register::<ItemsRemovedFromInventory>()?;
    events.register::<InventoryItemDeactivated>()?;
    let namer = DelegateStreamNamer::new();
    namer.register::<InventoryItem>()?;

    let repository = CommonDomainRepository::builder()
        .store(Arc::new(InMemoryEventStore::new()))
        .bus(bus)
        .aggregate_factory(Arc::new(aggregates))
        .event_factory(Arc::new(events))
        .stream_namer(Arc::new(namer))
        .build();

    let commands = [
        CreateInventoryItem::NAME,
        RenameInventoryItem::NAME,
        CheckInItemsToInventory::NAME,
        RemoveItemsFromInventory::NAME,
        DeactivateInventoryItem::NAME,
    ];
    let handler = Arc::new(AggregateCommandHandler::new(repository));
    handler.register::<InventoryItem>(&commands)?;

    let dispatcher = InMemoryDispatcher::new();
    dispatcher.register_handler(handler, &commands)?;

    let id = new_id();
    dispatcher
        .dispatch(&CommandMessage::new(
            &id,
            CreateInventoryItem {
                name: "Widget".into(),
            },
        ))
        .await?;
    dispatcher
        .dispatch(&CommandMessage::new(&id, CheckInItemsToInventory { count: 12 }))
        .await?;
    dispatcher
        .dispatch(&CommandMessage::new(
            &id,
            RenameInventoryItem {
                new_name: "Gadget".into(),
            },
        ))
        .await?;
    dispatcher
        .dispatch(&CommandMessage::new(&id, RemoveItemsFromInventory { count: 5 }))
        .await?;

    if let Some(detail) = view.items.get(&id) {
        println!("{id}: {detail:?}");
    }

    if let Err(err) = dispatcher
        .dispatch(&CommandMessage::new(&id, RemoveItemsFromInventory { count: 50 }))
        .await
    {
        println!("rejected: {err}");
    }

    dispatcher
        .dispatch(&CommandMessage::new(&id, DeactivateInventoryItem))
        .await?;
    println!("items in view after deactivation: {}", view.items.len());
    Ok(())
}

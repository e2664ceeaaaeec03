use cqrs_domain::aggregate::{Aggregate, AggregateRoot, AggregateState, ChangeTracker, Versioned};
use cqrs_domain::message::EventMessage;
use cqrs_macros::{aggregate, event};

#[event]
struct Opened {
    name: String,
}

#[aggregate]
struct Account {
    name: String,
}

impl AggregateRoot for Account {
    fn apply(&mut self, event: EventMessage, is_new: bool) {
        if let Some(e) = event.downcast_ref::<Opened>() {
            self.name = e.name.clone();
        }
        if is_new {
            self.track_change(event);
        }
    }
}

fn main() {
    assert_eq!(Account::TYPE, "Account");

    let mut account = Account::new("acc-1".to_string());
    assert_eq!(account.aggregate_id(), "acc-1");
    assert_eq!(account.aggregate_type(), "Account");
    assert_eq!(account.original_version(), 0);

    account.raise(Opened {
        name: "main".to_string(),
    });
    assert_eq!(account.name, "main");
    assert_eq!(account.current_version(), 1);
    assert_eq!(account.changes().len(), 1);
    println!("{account:?}");
}

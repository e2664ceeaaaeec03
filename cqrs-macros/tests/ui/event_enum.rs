use cqrs_domain::message::Event;
use cqrs_macros::event;

#[event(type = "account.changed")]
enum AccountChanged {
    Deposited { amount: u64 },
    Withdrawn { amount: u64 },
    Closed,
}

fn main() {
    assert_eq!(AccountChanged::TYPE, "account.changed");
    let e = AccountChanged::Deposited { amount: 5 };
    assert_ne!(e, AccountChanged::Closed);
    assert_ne!(e, AccountChanged::Withdrawn { amount: 5 });
}

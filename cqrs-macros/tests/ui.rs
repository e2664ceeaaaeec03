#[test]
fn ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/aggregate_basic.rs");
    t.pass("tests/ui/aggregate_custom_type.rs");
    t.pass("tests/ui/event_basic.rs");
    t.pass("tests/ui/event_enum.rs");
    t.pass("tests/ui/command_basic.rs");
}

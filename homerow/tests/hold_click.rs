use homerow::{
    testing::{DriverCall, Harness},
    Button, Controller, Settings,
};
use std::collections::BTreeMap;

fn two_hold_keys() -> Harness {
    let mut bindings = BTreeMap::new();
    bindings.insert(
        "hold:left".to_string(),
        vec!["space".to_string(), "g".to_string()],
    );
    let mut h = Harness::with_settings(Settings {
        bindings,
        ..Harness::default_settings()
    });
    h.press("alt");
    h
}

#[test]
fn overlapping_hold_keys_press_and_release_once() {
    let mut h = two_hold_keys();

    h.press("space");
    h.assert_hold_count(1);
    h.press("g");
    h.assert_hold_count(2);
    assert_eq!(h.calls(), vec![DriverCall::Press(Button::Left)]);

    // Released in a different order than pressed
    h.release("space");
    h.assert_hold_count(1);
    assert_eq!(h.calls(), vec![DriverCall::Press(Button::Left)]);

    h.release("g");
    h.assert_hold_count(0);
    assert_eq!(
        h.calls(),
        vec![
            DriverCall::Press(Button::Left),
            DriverCall::Release(Button::Left)
        ]
    );
}

#[test]
fn stray_release_does_not_release_again() {
    let mut h = two_hold_keys();
    h.tap("space");
    h.release("space").release("g");

    h.assert_hold_count(0);
    assert_eq!(
        h.calls(),
        vec![
            DriverCall::Press(Button::Left),
            DriverCall::Release(Button::Left)
        ]
    );
}

#[test]
fn repeated_press_counts_once() {
    let mut h = Controller::test();
    h.press("alt");
    h.press("space").press("space").press("space");
    h.assert_hold_count(1);
    assert_eq!(h.calls(), vec![DriverCall::Press(Button::Left)]);

    h.release("space");
    h.assert_hold_count(0);
    assert_eq!(
        h.calls(),
        vec![
            DriverCall::Press(Button::Left),
            DriverCall::Release(Button::Left)
        ]
    );
}

#[test]
fn drag_moves_with_button_down() {
    let mut h = Controller::test();
    h.press("alt").press("space").press("l");
    h.tick();
    h.release("l").release("space");

    assert_eq!(
        h.calls(),
        vec![
            DriverCall::Press(Button::Left),
            DriverCall::MoveRelative { dx: 2, dy: 0 },
            DriverCall::MoveRelative { dx: 2, dy: 0 },
            DriverCall::Release(Button::Left),
        ]
    );
}

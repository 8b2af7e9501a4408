use homerow::{
    testing::{DriverCall, Harness},
    BindingError, BindingTable, Button, Controller, Direction, Disposition, Feed, KeyEvent,
    KeyToken, LogicalAction, Settings,
};
use std::collections::BTreeMap;

fn settings_with(action: &str, tokens: &[&str]) -> Settings {
    let mut bindings = BTreeMap::new();
    bindings.insert(
        action.to_string(),
        tokens.iter().map(|t| t.to_string()).collect(),
    );
    Settings {
        bindings,
        ..Harness::default_settings()
    }
}

fn press(key: char) -> KeyEvent {
    KeyEvent::press(KeyToken::Char(key))
}

#[test]
fn each_click_token_clicks_exactly_once() {
    let mut h = Harness::with_settings(settings_with("click:left", &["h", "g"]));
    h.press("alt");

    for key in ["h", "g"] {
        h.clear_calls();
        h.tap(key);
        assert_eq!(
            h.calls(),
            vec![
                DriverCall::Press(Button::Left),
                DriverCall::Release(Button::Left)
            ],
            "{key}"
        );
    }
}

#[test]
fn right_click() {
    let mut h = Controller::test();
    h.press("alt").tap("semicolon");
    assert_eq!(
        h.calls(),
        vec![
            DriverCall::Press(Button::Right),
            DriverCall::Release(Button::Right)
        ]
    );
}

#[test]
fn consumed_intercepted_keys_are_suppressed() {
    let mut h = Controller::test();
    h.press("alt");

    assert_eq!(h.key(press('h'), Feed::Intercepted), Disposition::Suppress);
    assert_eq!(
        h.key(KeyEvent::release(KeyToken::Char('h')), Feed::Intercepted),
        Disposition::Suppress
    );
    assert_eq!(h.key(press('z'), Feed::Intercepted), Disposition::PassThrough);
}

#[test]
fn global_feed_never_suppresses() {
    let mut h = Controller::test();
    h.grab().refuse(KeyToken::Char('h'));
    h.press("alt");
    h.clear_calls();

    assert_eq!(h.key(press('h'), Feed::Global), Disposition::PassThrough);
    assert_eq!(h.calls().len(), 2);
}

#[test]
fn global_press_read_before_the_grab_is_applied() {
    let mut h = Controller::test();
    h.press("alt");

    // Read by the listener in the same batch as the Alt press
    assert_eq!(h.key(press('l'), Feed::Global), Disposition::PassThrough);
    assert_eq!(h.calls(), vec![DriverCall::MoveRelative { dx: 2, dy: 0 }]);
    h.assert_engine_running(true);

    h.release("l");
    h.assert_engine_running(false);
}

#[test]
fn unconsumed_intercepted_keys_are_forwarded() {
    let mut h = Controller::test();
    h.press("alt");
    h.intercept_press("z").intercept_press("l").intercept_release("z");

    assert_eq!(h.pump(), 3);
    assert_eq!(
        h.grab().forwarded(),
        vec![
            KeyEvent::press(KeyToken::Char('z')),
            KeyEvent::release(KeyToken::Char('z'))
        ]
    );
    assert_eq!(h.calls(), vec![DriverCall::MoveRelative { dx: 2, dy: 0 }]);
}

#[test]
fn alt_release_on_intercepted_feed_ends_mode_and_is_forwarded() {
    let mut h = Controller::test();
    h.press("alt").press("l");
    h.intercept_release("alt");

    assert_eq!(h.pump(), 1);
    h.assert_mode(false);
    h.assert_engine_running(false);
    assert_eq!(
        h.grab().forwarded(),
        vec![KeyEvent::release(KeyToken::parse("alt").unwrap())]
    );
}

#[test]
fn quit_combination_wins_over_bindings() {
    let mut h = Harness::with_settings(settings_with("click:left", &["q"]));
    h.press("alt").press("ctrl");

    assert_eq!(h.key(press('q'), Feed::Intercepted), Disposition::PassThrough);
    assert!(!h.controller().is_running());
    assert!(h.calls().is_empty());
}

#[test]
fn conflicting_bindings_are_rejected() {
    let settings = settings_with("navigate:left", &["h"]);
    assert_eq!(
        settings.binding_table().unwrap_err(),
        BindingError::Conflict {
            token: KeyToken::Char('h'),
            first: LogicalAction::Navigate(Direction::Left),
            second: LogicalAction::Click(Button::Left),
        }
    );
}

#[test]
fn custom_bindings_drive_the_controller() {
    let bindings = BindingTable::builder()
        .bind(LogicalAction::Navigate(Direction::Down), KeyToken::Char('s'))
        .build()
        .unwrap();
    let mut h = Harness::with_bindings(Harness::default_settings(), bindings);
    h.press("alt").press("s").press("k");

    assert_eq!(h.calls(), vec![DriverCall::MoveRelative { dx: 0, dy: 2 }]);
    assert_eq!(h.grab().grabbed(), vec![KeyToken::Char('s')]);
}

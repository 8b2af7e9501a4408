use homerow::{
    testing::{DriverCall, DriverLog, FakeGrab, GrabLog, RecordingDriver},
    BindingTable, Controller, Feed, KeyEvent, KeyToken, Scheduling, Settings,
};
use std::{
    thread,
    time::{Duration, Instant},
};

fn threaded() -> (Controller, DriverLog, GrabLog) {
    threaded_with(Settings {
        smooth_movement: false,
        movement_interval_ms: 1,
        ..Settings::default()
    })
}

fn threaded_with(settings: Settings) -> (Controller, DriverLog, GrabLog) {
    homerow_log::test();
    let (driver, driver_log) = RecordingDriver::with_log();
    let (grab, grab_log) = FakeGrab::with_log();
    let controller = Controller::new(
        settings,
        BindingTable::defaults(),
        Box::new(driver),
        Box::new(grab),
        Scheduling::Threaded,
    );
    (controller, driver_log, grab_log)
}

fn alt() -> KeyToken {
    KeyToken::parse("alt").unwrap()
}

fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

fn moves(log: &DriverLog) -> usize {
    log.calls()
        .iter()
        .filter(|call| matches!(call, DriverCall::MoveRelative { .. }))
        .count()
}

#[test]
fn engine_ticks_while_held_and_stops_on_release() {
    let (controller, driver, _grab) = threaded();
    controller.handle_key(KeyEvent::press(alt()), Feed::Global);
    controller.handle_key(KeyEvent::press(KeyToken::Char('l')), Feed::Intercepted);

    wait_until("engine ticks", || moves(&driver) >= 5);

    controller.handle_key(KeyEvent::release(KeyToken::Char('l')), Feed::Intercepted);
    // A tick already past its planning step may still land
    thread::sleep(Duration::from_millis(20));
    let settled = moves(&driver);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(moves(&driver), settled);

    controller.shutdown();
}

fn absolute_xs(log: &DriverLog) -> Vec<i32> {
    log.calls()
        .iter()
        .filter_map(|call| match call {
            DriverCall::MoveAbsolute(position) => Some(position.x),
            _ => None,
        })
        .collect()
}

#[test]
fn animated_moves_never_interleave() {
    let (controller, driver, _grab) = threaded_with(Settings {
        smooth_movement: true,
        animation_steps: 4,
        animation_delay_ms: 20,
        move_speed: 8,
        movement_interval_ms: 1,
        ..Settings::default()
    });
    controller.handle_key(KeyEvent::press(alt()), Feed::Global);
    // The immediate step races the engine's first tick
    controller.handle_key(KeyEvent::press(KeyToken::Char('l')), Feed::Intercepted);
    wait_until("two bursts", || absolute_xs(&driver).len() >= 8);
    controller.handle_key(KeyEvent::release(KeyToken::Char('l')), Feed::Intercepted);
    controller.shutdown();

    let xs = absolute_xs(&driver);
    assert!(
        xs.windows(2).all(|pair| pair[0] < pair[1]),
        "pointer moved backwards: {xs:?}"
    );
    assert_eq!(&xs[..8], &[502, 504, 506, 508, 510, 512, 514, 516]);
}

#[test]
fn intercepted_loop_drains_the_grab() {
    let (controller, driver, grab) = threaded();
    controller.handle_key(KeyEvent::press(alt()), Feed::Global);

    grab.push(KeyEvent::press(KeyToken::Char('h')));
    grab.push(KeyEvent::release(KeyToken::Char('h')));
    grab.push(KeyEvent::press(KeyToken::Char('z')));
    wait_until("click", || driver.calls().len() >= 2);
    wait_until("forward", || grab.forwarded().len() == 1);

    grab.push(KeyEvent::release(alt()));
    wait_until("mouse mode off", || !controller.mouse_mode());
    assert!(!grab.is_active());

    controller.shutdown();
}

#[test]
fn shutdown_joins_workers() {
    let (controller, driver, _grab) = threaded();
    controller.handle_key(KeyEvent::press(alt()), Feed::Global);
    controller.handle_key(KeyEvent::press(KeyToken::Char('j')), Feed::Intercepted);
    wait_until("engine ticks", || moves(&driver) >= 2);

    controller.shutdown();
    assert!(!controller.is_running());
    let settled = moves(&driver);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(moves(&driver), settled);
}

use crate::{banner, cli::Cli, signals::SignalGuard};
use anyhow::{anyhow, Context, Result};
use homerow::{Controller, KeyGrab, NoGrab, Scheduling, Settings};
use homerow_backend::{find_keyboard, open_pointer, DisplayToggles, EvdevGrab, GlobalListener};
use homerow_log::LogConfig;
use std::{thread, time::Duration};
use tracing::{debug, info, warn};

const MAINTENANCE_INTERVAL: Duration = Duration::from_millis(10);

pub fn run(cli: Cli) -> Result<()> {
    let log_guard = homerow_log::init(LogConfig {
        log_file_path: cli.log_file.clone(),
        debug: cli.debug,
    })
    .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;
    debug!(log_file = %log_guard.log_file.display(), "Logging initialized");

    let discovered = Settings::discover();
    let settings = Settings::load_with_overrides(cli.config.as_deref(), discovered.as_deref())
        .context("failed to load configuration")?;
    let bindings = settings
        .binding_table()
        .context("invalid key bindings")?;

    if cli.print_bindings {
        print!("{}", banner::bindings(&bindings));
        return Ok(());
    }

    let preferred = cli.backend.unwrap_or(settings.backend);
    let driver = open_pointer(preferred).context("no pointer backend could be opened")?;

    let keyboard = match cli.device.clone() {
        Some(path) => path,
        None => find_keyboard().context("no keyboard to listen to")?,
    };
    let grab: Box<dyn KeyGrab> = match EvdevGrab::open(&keyboard) {
        Ok(grab) => Box::new(grab),
        Err(e) => {
            warn!("Keyboard interception unavailable, bound keys will also reach other applications: {e}");
            Box::new(NoGrab)
        },
    };

    let disable_screensaver = settings.disable_screensaver;
    let controller = Controller::new(settings, bindings, driver, grab, Scheduling::Threaded);
    let screen = controller.probe_screen();
    info!(backend = controller.driver_name(), %screen, "Controller ready");

    let listener = GlobalListener::spawn(&keyboard, controller.clone())
        .with_context(|| format!("failed to listen on {}", keyboard.display()))?;
    let signals = SignalGuard::install(controller.clone()).context("failed to install signal handlers")?;

    let mut display = DisplayToggles::detect();
    display.apply(disable_screensaver);

    print!(
        "{}",
        banner::render(
            controller.driver_name(),
            controller.bindings(),
            controller.quit_token()
        )
    );

    while controller.is_running() {
        display.maintain(controller.idle_for());
        thread::sleep(MAINTENANCE_INTERVAL);
    }

    controller.shutdown();
    listener.stop();
    display.restore();
    drop(signals);
    println!("homerow stopped");
    Ok(())
}

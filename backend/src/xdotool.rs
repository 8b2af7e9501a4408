//! Pointer driver that shells out to `xdotool`.
//!
//! Every call spawns a process, which is slow but works on any X11 session without special
//! permissions.

use crate::{screen, BackendError, Tool};
use homerow::{BackendChoice, Button, DriverError, PointerDriver, Position, ScreenSize};
use tracing::debug;

#[derive(Debug)]
pub struct XdotoolDriver {
    xdotool: Tool,
    screen: Option<ScreenSize>,
}

impl XdotoolDriver {
    /// Locates `xdotool` and checks it can reach the display.
    pub fn new() -> Result<Self, BackendError> {
        let unavailable = |reason: String| BackendError::Unavailable {
            backend: BackendChoice::Xdotool,
            reason,
        };
        let xdotool =
            Tool::locate("xdotool").ok_or_else(|| unavailable("xdotool not found on PATH".into()))?;
        xdotool
            .run(&["getmouselocation"])
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(Self {
            xdotool,
            screen: None,
        })
    }
}

impl PointerDriver for XdotoolDriver {
    fn name(&self) -> &'static str {
        "xdotool"
    }

    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), DriverError> {
        self.xdotool.run(&[
            "mousemove_relative",
            "--",
            &dx.to_string(),
            &dy.to_string(),
        ])
    }

    fn move_absolute(&mut self, position: Position) -> Result<(), DriverError> {
        self.xdotool
            .run(&["mousemove", &position.x.to_string(), &position.y.to_string()])
    }

    fn press(&mut self, button: Button) -> Result<(), DriverError> {
        self.xdotool
            .run(&["mousedown", &button.number().to_string()])
    }

    fn release(&mut self, button: Button) -> Result<(), DriverError> {
        self.xdotool.run(&["mouseup", &button.number().to_string()])
    }

    fn click(&mut self, button: Button) -> Result<(), DriverError> {
        self.xdotool.run(&["click", &button.number().to_string()])
    }

    fn scroll(&mut self, ticks: i32) -> Result<(), DriverError> {
        let Some((button, repeat)) = wheel_clicks(ticks) else {
            return Ok(());
        };
        self.xdotool
            .run(&["click", "--repeat", &repeat.to_string(), button])
    }

    fn query_position(&mut self) -> Result<Position, DriverError> {
        let output = self.xdotool.output(&["getmouselocation"])?;
        parse_mouse_location(&output).ok_or(DriverError::Position { output })
    }

    fn screen_size(&mut self) -> ScreenSize {
        if let Some(screen) = self.screen {
            return screen;
        }
        let mut screen = screen::detect();
        if !screen.is_known() {
            match self.xdotool.output(&["getdisplaygeometry"]) {
                Ok(output) => {
                    screen = screen::parse_display_geometry(&output).unwrap_or(screen);
                },
                Err(e) => debug!("getdisplaygeometry failed: {e}"),
            }
        }
        self.screen = Some(screen);
        screen
    }
}

/// X11 wheel button and click count for a scroll of `ticks`. Button 4 scrolls up, 5 down.
fn wheel_clicks(ticks: i32) -> Option<(&'static str, u32)> {
    match ticks {
        0 => None,
        t if t > 0 => Some(("4", t.unsigned_abs())),
        t => Some(("5", t.unsigned_abs())),
    }
}

/// Parses `xdotool getmouselocation` output, e.g. `x:812 y:433 screen:0 window:62914567`.
pub fn parse_mouse_location(output: &str) -> Option<Position> {
    let (mut x, mut y) = (None, None);
    for field in output.split_whitespace() {
        match field.split_once(':') {
            Some(("x", value)) => x = value.parse().ok(),
            Some(("y", value)) => y = value.parse().ok(),
            _ => {},
        }
    }
    Some(Position::new(x?, y?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_location() {
        assert_eq!(
            parse_mouse_location("x:812 y:433 screen:0 window:62914567\n"),
            Some(Position::new(812, 433))
        );
        assert_eq!(parse_mouse_location("screen:0 window:1"), None);
        assert_eq!(parse_mouse_location("x:abc y:2"), None);
    }

    #[test]
    fn wheel_buttons() {
        assert_eq!(wheel_clicks(0), None);
        assert_eq!(wheel_clicks(2), Some(("4", 2)));
        assert_eq!(wheel_clicks(-1), Some(("5", 1)));
    }
}

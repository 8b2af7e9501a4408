//! Screen size discovery from `xrandr`.

use crate::Tool;
use homerow::ScreenSize;
use tracing::debug;

/// Asks `xrandr` for the primary output's size. [`ScreenSize::UNKNOWN`] when `xrandr` is
/// missing or its output has no connected output with a mode.
pub fn detect() -> ScreenSize {
    let Some(xrandr) = Tool::locate("xrandr") else {
        debug!("xrandr not found, screen size unknown");
        return ScreenSize::UNKNOWN;
    };
    match xrandr.output(&["--query"]) {
        Ok(output) => parse_xrandr(&output).unwrap_or(ScreenSize::UNKNOWN),
        Err(e) => {
            debug!("xrandr failed: {e}");
            ScreenSize::UNKNOWN
        },
    }
}

/// Size of the `connected primary` output, else of the first connected output with a mode.
pub fn parse_xrandr(output: &str) -> Option<ScreenSize> {
    let connected = || output.lines().filter(|line| line.contains(" connected"));
    connected()
        .filter(|line| line.contains(" connected primary"))
        .chain(connected())
        .find_map(|line| line.split_whitespace().find_map(parse_geometry))
}

/// Parses a `WxH+X+Y` geometry token.
fn parse_geometry(token: &str) -> Option<ScreenSize> {
    let mut parts = token.split('+');
    let (width, height) = parts.next()?.split_once('x')?;
    // A mode without an offset is a resolution in the mode list, not a geometry
    parts.next()?;
    let width = width.parse().ok()?;
    let height = height.parse().ok()?;
    Some(ScreenSize::new(width, height))
}

/// Parses `xdotool getdisplaygeometry` output, e.g. `1920 1080`.
pub fn parse_display_geometry(output: &str) -> Option<ScreenSize> {
    let mut numbers = output.split_whitespace().map(str::parse::<i32>);
    let width = numbers.next()?.ok()?;
    let height = numbers.next()?.ok()?;
    Some(ScreenSize::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUAL_HEAD: &str = "\
Screen 0: minimum 320 x 200, current 4480 x 1440, maximum 16384 x 16384
HDMI-1 connected 1920x1080+2560+0 (normal left inverted right x axis y axis) 527mm x 296mm
   1920x1080     60.00*+  50.00
DP-1 connected primary 2560x1440+0+0 (normal left inverted right x axis y axis) 597mm x 336mm
   2560x1440     59.95*+
DP-2 disconnected (normal left inverted right x axis y axis)
";

    #[test]
    fn primary_output_wins() {
        assert_eq!(parse_xrandr(DUAL_HEAD), Some(ScreenSize::new(2560, 1440)));
    }

    #[test]
    fn first_connected_output_without_primary() {
        let output = "\
eDP-1 connected 1366x768+0+0 (normal left inverted right x axis y axis) 309mm x 174mm
   1366x768      60.00*+
HDMI-1 connected 1920x1080+1366+0 (normal left inverted right x axis y axis) 527mm x 296mm
";
        assert_eq!(parse_xrandr(output), Some(ScreenSize::new(1366, 768)));
    }

    #[test]
    fn connected_output_without_mode_is_skipped() {
        let output = "\
VGA-1 connected (normal left inverted right x axis y axis)
HDMI-1 connected 1280x1024+0+0 (normal left inverted right x axis y axis) 338mm x 270mm
";
        assert_eq!(parse_xrandr(output), Some(ScreenSize::new(1280, 1024)));
    }

    #[test]
    fn nothing_connected() {
        assert_eq!(parse_xrandr("DP-2 disconnected (normal)\n"), None);
        assert_eq!(parse_xrandr(""), None);
    }

    #[test]
    fn display_geometry() {
        assert_eq!(
            parse_display_geometry("1920 1080\n"),
            Some(ScreenSize::new(1920, 1080))
        );
        assert_eq!(parse_display_geometry("garbage"), None);
    }
}

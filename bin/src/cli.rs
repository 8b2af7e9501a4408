use clap::Parser;
use homerow::BackendChoice;
use std::path::PathBuf;

/// Command-line interface configuration
#[derive(Debug, Parser)]
#[command(name = "homerow", version)]
#[command(about = "Drive the mouse pointer from the home row", long_about = None)]
pub struct Cli {
    #[arg(
        value_name = "BACKEND",
        value_parser = parse_backend,
        help = "Pointer backend to try first (uinput or xdotool)"
    )]
    pub backend: Option<BackendChoice>,

    #[arg(long, value_name = "PATH", help = "Configuration file to load")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Keyboard evdev node, e.g. /dev/input/event3")]
    pub device: Option<PathBuf>,

    #[arg(long, help = "Verbose logging for homerow crates")]
    pub debug: bool,

    #[arg(long, value_name = "PATH", help = "Write logs to this file or directory")]
    pub log_file: Option<PathBuf>,

    #[arg(long, help = "Print the active key bindings and exit")]
    pub print_bindings: bool,
}

fn parse_backend(value: &str) -> Result<BackendChoice, String> {
    BackendChoice::FALLBACK_ORDER
        .into_iter()
        .find(|backend| backend.name().eq_ignore_ascii_case(value))
        .ok_or_else(|| format!("unknown backend {value:?}, expected uinput or xdotool"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["homerow"]).unwrap();
        assert_eq!(cli.backend, None);
        assert!(!cli.debug);
        assert!(!cli.print_bindings);
        assert!(cli.config.is_none());
    }

    #[test]
    fn backend_and_flags() {
        let cli = Cli::try_parse_from([
            "homerow",
            "xdotool",
            "--config",
            "/tmp/homerow.toml",
            "--device",
            "/dev/input/event3",
            "--debug",
        ])
        .unwrap();
        assert_eq!(cli.backend, Some(BackendChoice::Xdotool));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/homerow.toml")));
        assert_eq!(cli.device, Some(PathBuf::from("/dev/input/event3")));
        assert!(cli.debug);
    }

    #[test]
    fn backend_is_case_insensitive() {
        let cli = Cli::try_parse_from(["homerow", "UINPUT"]).unwrap();
        assert_eq!(cli.backend, Some(BackendChoice::Uinput));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Cli::try_parse_from(["homerow", "xlib"]).is_err());
    }
}

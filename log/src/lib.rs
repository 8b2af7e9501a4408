//! Logging setup for homerow with file output and optional stdout.
//!
//! Logs always go to a file. Stdout logging is enabled when `HOMEROW_LOG` or `RUST_LOG` is
//! set, when `--debug` is passed, or in debug builds.
//!
//! ## Environment Variables
//!
//! 1. **`HOMEROW_LOG`** (highest priority) - homerow-specific logging control
//! 2. **`RUST_LOG`** - Standard tracing environment variable
//! 3. **Default** - `warn` globally, `info` for homerow crates
//!
//! `--debug` overrides all three with `debug` for the homerow crates.
//!
//! ## Log File Location
//!
//! Default: `<data_local_dir>/homerow/logs/homerow-<pid>.log`, typically
//! `~/.local/share/homerow/logs/homerow-12345.log`.
//!
//! Override with `--log-file <path>`.

use std::{
    env,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

const CRATES: [&str; 4] = ["homerow", "homerow_backend", "homerow_bin", "homerow_log"];

type Error = Box<dyn std::error::Error + Send + Sync>;

/// Returned from [`init`]; must be held alive to ensure log file flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub log_file_path: Option<PathBuf>,
    /// Verbose diagnostics for homerow crates, on both the file and stdout.
    pub debug: bool,
}

/// Initialize logging.
///
/// The returned [`LogGuard`] must be held for the lifetime of the program. Dropping it
/// flushes and stops the background file writer.
pub fn init(config: LogConfig) -> Result<LogGuard, Error> {
    let (log_dir, filename) = resolve_log_path(config.log_file_path);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_filter = if config.debug {
        debug_filter()
    } else {
        create_file_filter()
    };
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(file_filter);

    let stdout_enabled = config.debug
        || env::var("HOMEROW_LOG").is_ok()
        || env::var("RUST_LOG").is_ok()
        || cfg!(debug_assertions);

    let stdout_layer = stdout_enabled.then(|| {
        let filter = if config.debug {
            debug_filter()
        } else {
            create_filter()
        };
        fmt::layer().with_filter(filter)
    });

    Registry::default()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// Initialize logging for tests.
///
/// Stdout only, no file output. Will not crash if called multiple times or if logging is
/// already initialized by another test.
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("homerow-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir.to_path_buf(), name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("homerow")
        .join("logs");

    (dir, filename)
}

/// File filter: uses user-specified level if set, otherwise defaults to `warn`.
fn create_file_filter() -> EnvFilter {
    if env::var("HOMEROW_LOG").is_ok() || env::var("RUST_LOG").is_ok() {
        return create_filter();
    }
    EnvFilter::new("warn")
}

/// Implements the priority system: `HOMEROW_LOG` > `RUST_LOG` > defaults.
fn create_filter() -> EnvFilter {
    if let Ok(homerow_log) = env::var("HOMEROW_LOG") {
        return expand_homerow_log(&homerow_log);
    }

    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }

    EnvFilter::new(default_directives())
}

fn debug_filter() -> EnvFilter {
    EnvFilter::new(crate_directives("debug"))
}

fn default_directives() -> String {
    crate_directives("info")
}

fn crate_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for name in CRATES {
        directives.push_str(&format!(",{name}={level}"));
    }
    directives
}

/// Expand `HOMEROW_LOG` values into full tracing filter strings.
///
/// - `HOMEROW_LOG=debug` becomes `warn,homerow=debug,homerow_backend=debug,...`
/// - `HOMEROW_LOG=homerow_backend=trace` is used as-is
fn expand_homerow_log(homerow_log: &str) -> EnvFilter {
    EnvFilter::new(expand_directives(homerow_log))
}

fn expand_directives(homerow_log: &str) -> String {
    if homerow_log.contains('=') || homerow_log.contains(':') || homerow_log.contains(',') {
        return homerow_log.to_string();
    }
    crate_directives(homerow_log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_expands_to_every_crate() {
        assert_eq!(
            expand_directives("debug"),
            "warn,homerow=debug,homerow_backend=debug,homerow_bin=debug,homerow_log=debug"
        );
    }

    #[test]
    fn module_syntax_is_kept() {
        assert_eq!(
            expand_directives("homerow_backend=trace"),
            "homerow_backend=trace"
        );
        assert_eq!(expand_directives("info,homerow=trace"), "info,homerow=trace");
    }

    #[test]
    fn default_is_info_for_homerow() {
        assert!(default_directives().starts_with("warn,homerow=info"));
    }

    #[test]
    fn log_file_override() {
        let tmp_dir = tempfile::tempdir().unwrap();

        let file = tmp_dir.path().join("custom.log");
        let (dir, name) = resolve_log_path(Some(file));
        assert_eq!(dir, tmp_dir.path());
        assert_eq!(name, "custom.log");

        let (dir, name) = resolve_log_path(Some(tmp_dir.path().to_path_buf()));
        assert_eq!(dir, tmp_dir.path());
        assert_eq!(name, format!("homerow-{}.log", std::process::id()));
    }

    #[test]
    fn default_log_location() {
        let (dir, name) = resolve_log_path(None);
        assert!(dir.ends_with("homerow/logs"));
        assert!(name.starts_with("homerow-"));
    }
}

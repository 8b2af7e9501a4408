//! Runtime settings for the controller.
//!
//! Loads `config.toml` with priority CLI `--config` > `<config_dir>/homerow/config.toml` >
//! the defaults embedded from the repository's `config.toml`.
//!
//! # Testing
//!
//! Tests use [`Settings::load()`] with explicit paths to temporary directories.

use crate::{
    binding::{BindingError, BindingTable},
    key::KeyToken,
};
use serde::Deserialize;
use snafu::{ResultExt, Snafu};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::warn;

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read config file: {}", path.display()))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to parse config file: {}", path.display()))]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[snafu(display("Failed to parse embedded config.toml"))]
    Embedded { source: toml::de::Error },

    #[snafu(display("Invalid setting `{field}`: {reason}"))]
    Invalid { field: &'static str, reason: String },
}

/// Pointer backends, in the order they are tried when the preferred one is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Virtual pointer device created through `/dev/uinput`.
    Uinput,
    /// The `xdotool` command line tool.
    Xdotool,
}

impl BackendChoice {
    pub const FALLBACK_ORDER: [BackendChoice; 2] = [BackendChoice::Uinput, BackendChoice::Xdotool];

    pub fn name(self) -> &'static str {
        match self {
            BackendChoice::Uinput => "uinput",
            BackendChoice::Xdotool => "xdotool",
        }
    }

    /// `self` first, then every other backend in fallback order.
    pub fn preference(self) -> impl Iterator<Item = BackendChoice> {
        std::iter::once(self).chain(
            Self::FALLBACK_ORDER
                .into_iter()
                .filter(move |backend| *backend != self),
        )
    }
}

impl std::fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Controller settings, deserialized from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Preferred pointer backend.
    pub backend: BackendChoice,

    /// Pixels per tick along each axis.
    pub move_speed: i32,

    /// Multiplier applied to both axes when moving diagonally.
    pub acceleration: f64,

    /// Time between movement ticks.
    pub movement_interval_ms: u64,

    /// Pixels per tick along each axis while Ctrl is held.
    pub ctrl_leap_distance: i32,

    /// Split each tick's displacement into interpolated sub-moves.
    pub smooth_movement: bool,

    /// Sub-moves per tick when [`Self::smooth_movement`] is on.
    pub animation_steps: u32,

    /// Pause between sub-moves.
    pub animation_delay_ms: u64,

    /// Wheel ticks issued per movement tick while a scroll key is held.
    pub scroll_step: i32,

    /// Idle sleep of the intercepted event loop.
    pub intercept_poll_ms: u64,

    /// Turn the screensaver and DPMS off while running.
    pub disable_screensaver: bool,

    /// Together with Ctrl, exits the program.
    pub quit_key: String,

    /// Action name to key tokens. See [`crate::binding`].
    pub bindings: BTreeMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendChoice::Uinput,
            move_speed: 2,
            acceleration: 1.5,
            movement_interval_ms: 4,
            ctrl_leap_distance: 10,
            smooth_movement: true,
            animation_steps: 2,
            animation_delay_ms: 2,
            scroll_step: 1,
            intercept_poll_ms: 1,
            disable_screensaver: true,
            quit_key: "q".to_string(),
            bindings: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Read and deserialize a TOML config file from the given path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        let settings: Settings = toml::from_str(&contents).context(ParseSnafu { path })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration with priority: CLI override > discovered path > defaults.
    pub fn load_with_overrides(
        cli_override: Option<&Path>,
        discovered_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = cli_override {
            return Self::load(path);
        }
        if let Some(path) = discovered_path {
            return Self::load(path);
        }
        Self::load_embedded()
    }

    /// `<config_dir>/homerow/config.toml`, if it exists.
    pub fn discover() -> Option<PathBuf> {
        let path = dirs::config_dir()?.join("homerow").join("config.toml");
        path.is_file().then_some(path)
    }

    fn load_embedded() -> Result<Self, ConfigError> {
        let source = include_str!("../../config.toml");
        let settings: Settings = toml::from_str(source).context(EmbeddedSnafu)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation_steps == 0 {
            return InvalidSnafu {
                field: "animation_steps",
                reason: "must be at least 1",
            }
            .fail();
        }
        if self.movement_interval_ms == 0 {
            return InvalidSnafu {
                field: "movement_interval_ms",
                reason: "must be at least 1",
            }
            .fail();
        }
        if !(self.acceleration.is_finite() && self.acceleration > 0.0) {
            return InvalidSnafu {
                field: "acceleration",
                reason: format!("must be a positive number, got {}", self.acceleration),
            }
            .fail();
        }
        if self.move_speed < 0 || self.ctrl_leap_distance < 0 || self.scroll_step < 0 {
            return InvalidSnafu {
                field: "move_speed",
                reason: "step sizes must not be negative",
            }
            .fail();
        }
        Ok(())
    }

    pub fn movement_interval(&self) -> Duration {
        Duration::from_millis(self.movement_interval_ms)
    }

    pub fn animation_delay(&self) -> Duration {
        Duration::from_millis(self.animation_delay_ms)
    }

    pub fn intercept_poll(&self) -> Duration {
        Duration::from_millis(self.intercept_poll_ms)
    }

    pub fn binding_table(&self) -> Result<BindingTable, BindingError> {
        BindingTable::from_config(&self.bindings)
    }

    /// The key that exits together with Ctrl. Falls back to `q` when unparseable.
    pub fn quit_token(&self) -> KeyToken {
        match KeyToken::parse(&self.quit_key) {
            Some(token) if token.modifier().is_none() => token,
            _ => {
                warn!("Invalid quit_key {:?}, using q", self.quit_key);
                KeyToken::Char('q')
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_empty_config() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        let settings = Settings::load(&config_path).unwrap();
        assert_eq!(settings.move_speed, 2);
        assert_eq!(settings.backend, BackendChoice::Uinput);
    }

    #[test]
    fn errors_on_invalid_toml() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("config.toml");
        std::fs::write(&config_path, "invalid toml {{{{").unwrap();

        let result = Settings::load(&config_path);
        assert!(result.unwrap_err().to_string().contains("Failed to parse"));
    }

    #[test]
    fn errors_on_nonexistent_file() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("nonexistent.toml");

        let result = Settings::load(&config_path);
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("config.toml");
        std::fs::write(&config_path, "move_sped = 3").unwrap();

        assert!(Settings::load(&config_path).is_err());
    }

    #[test]
    fn embedded_defaults_match_default_impl() {
        let embedded = Settings::load_with_overrides(None, None).unwrap();
        let default = Settings::default();
        assert_eq!(embedded.move_speed, default.move_speed);
        assert_eq!(embedded.acceleration, default.acceleration);
        assert_eq!(embedded.movement_interval_ms, default.movement_interval_ms);
        assert_eq!(embedded.ctrl_leap_distance, default.ctrl_leap_distance);
        assert_eq!(embedded.animation_steps, default.animation_steps);
        assert_eq!(embedded.backend, default.backend);
        // The embedded file spells out the built-in layout
        let table = embedded.binding_table().unwrap();
        for (action, tokens) in BindingTable::defaults().iter() {
            assert_eq!(table.tokens_for(action), tokens);
        }
    }

    #[test]
    fn cli_override_takes_priority() {
        let tmp_dir = tempdir().unwrap();
        let cli_path = tmp_dir.path().join("cli.toml");
        let discovered_path = tmp_dir.path().join("discovered.toml");
        std::fs::write(&cli_path, "move_speed = 5").unwrap();
        std::fs::write(&discovered_path, "move_speed = 9").unwrap();

        let settings =
            Settings::load_with_overrides(Some(&cli_path), Some(&discovered_path)).unwrap();
        assert_eq!(settings.move_speed, 5);
    }

    #[test]
    fn discovered_path_used_when_no_cli_override() {
        let tmp_dir = tempdir().unwrap();
        let discovered_path = tmp_dir.path().join("discovered.toml");
        std::fs::write(&discovered_path, "backend = \"xdotool\"").unwrap();

        let settings = Settings::load_with_overrides(None, Some(&discovered_path)).unwrap();
        assert_eq!(settings.backend, BackendChoice::Xdotool);
    }

    #[test]
    fn validation() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("config.toml");

        std::fs::write(&config_path, "animation_steps = 0").unwrap();
        let err = Settings::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("animation_steps"));

        std::fs::write(&config_path, "acceleration = -1.0").unwrap();
        assert!(Settings::load(&config_path).is_err());

        std::fs::write(&config_path, "movement_interval_ms = 0").unwrap();
        assert!(Settings::load(&config_path).is_err());
    }

    #[test]
    fn bindings_section() {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[bindings]
"click:left" = ["g"]
"#,
        )
        .unwrap();

        let table = Settings::load(&config_path)
            .unwrap()
            .binding_table()
            .unwrap();
        assert_eq!(
            table.action_for(&KeyToken::Char('g')),
            Some(crate::LogicalAction::Click(crate::Button::Left))
        );
    }

    #[test]
    fn quit_token_falls_back() {
        let settings = Settings {
            quit_key: "ctrl".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.quit_token(), KeyToken::Char('q'));

        let settings = Settings {
            quit_key: "X".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.quit_token(), KeyToken::Char('x'));
    }

    #[test]
    fn backend_preference_order() {
        let order: Vec<_> = BackendChoice::Xdotool.preference().collect();
        assert_eq!(order, vec![BackendChoice::Xdotool, BackendChoice::Uinput]);
        let order: Vec<_> = BackendChoice::Uinput.preference().collect();
        assert_eq!(order, vec![BackendChoice::Uinput, BackendChoice::Xdotool]);
    }
}

//! Report configuration.
//!
//! Settings are read once from the environment on first use and can be
//! overridden in code with [`configure`].
//!
//! | Variable              | Values                          | Default   |
//! |-----------------------|---------------------------------|-----------|
//! | `RAISES_THEME`        | `unicode`, `ascii`, `plain`     | `unicode` |
//! | `RAISES_WIDTH`        | positive integer                | `120`     |
//! | `RAISES_DIFF`         | `1/0`, `true/false`, `yes/no`, `on/off` | `true` |
//! | `RAISES_QUIET_PANICS` | same as `RAISES_DIFF`           | `true`    |

use std::{
    fmt,
    str::FromStr,
    sync::{PoisonError, RwLock},
};

use once_cell::sync::Lazy;
use thiserror::Error;

pub const THEME_VAR: &str = "RAISES_THEME";
pub const WIDTH_VAR: &str = "RAISES_WIDTH";
pub const DIFF_VAR: &str = "RAISES_DIFF";
pub const QUIET_PANICS_VAR: &str = "RAISES_QUIET_PANICS";

/// How failure reports are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Graphical report with unicode box drawing, no color.
    #[default]
    Unicode,
    /// Graphical report restricted to ASCII.
    Ascii,
    /// Narrated plain text, one fact per line.
    Plain,
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unicode" => Ok(Theme::Unicode),
            "ascii" => Ok(Theme::Ascii),
            "plain" | "narrated" => Ok(Theme::Plain),
            _ => Err(ConfigError::InvalidValue {
                var: THEME_VAR,
                value: s.to_string(),
                expected: "unicode, ascii or plain",
            }),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Unicode => write!(f, "unicode"),
            Theme::Ascii => write!(f, "ascii"),
            Theme::Plain => write!(f, "plain"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: expected {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Settings for rendering failures and capturing panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub theme: Theme,
    /// Column width used by the graphical themes.
    pub width: usize,
    /// Include a character diff in message mismatch reports.
    pub show_diff: bool,
    /// Silence the panic hook for panics raised inside a block.
    pub quiet_panics: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            width: 120,
            show_diff: true,
            quiet_panics: true,
        }
    }
}

impl ReportConfig {
    /// Builds a config from environment variables, rejecting malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(THEME_VAR) {
            config.theme = value.parse()?;
        }
        if let Some(value) = lookup(WIDTH_VAR) {
            config.width = parse_width(&value)?;
        }
        if let Some(value) = lookup(DIFF_VAR) {
            config.show_diff = parse_flag(DIFF_VAR, &value)?;
        }
        if let Some(value) = lookup(QUIET_PANICS_VAR) {
            config.quiet_panics = parse_flag(QUIET_PANICS_VAR, &value)?;
        }
        Ok(config)
    }
}

fn parse_width(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(width) if width > 0 => Ok(width),
        _ => Err(ConfigError::InvalidValue {
            var: WIDTH_VAR,
            value: value.to_string(),
            expected: "a positive integer",
        }),
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            expected: "a boolean flag",
        }),
    }
}

static CONFIG: Lazy<RwLock<ReportConfig>> = Lazy::new(|| {
    let config = ReportConfig::from_env().unwrap_or_else(|error| {
        tracing::warn!(error = %error, "Ignoring report configuration from environment");
        ReportConfig::default()
    });
    RwLock::new(config)
});

/// Snapshot of the active configuration.
pub fn config() -> ReportConfig {
    snapshot(&CONFIG)
}

/// Mutates the process-wide configuration. Every test in the process sees the
/// change; prefer [`crate::Expect::with_config`] for a single expectation.
pub fn configure(update: impl FnOnce(&mut ReportConfig)) {
    apply(&CONFIG, update);
}

fn snapshot(slot: &RwLock<ReportConfig>) -> ReportConfig {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn apply(slot: &RwLock<ReportConfig>, update: impl FnOnce(&mut ReportConfig)) {
    let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
    update(&mut *guard);
    tracing::debug!(theme = %guard.theme, width = guard.width, "Report configuration updated");
}

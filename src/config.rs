//! Configuration loading and management
//!
//! Handles parsing of `.todos.toml` configuration files. Lookup order:
//! an explicit path (`--config` / `TODOS_CONFIG`), then `./.todos.toml`,
//! then `todos/config.toml` in the user config directory.

use std::path::{Path, PathBuf};

use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::reducer::RankRefresh;
use crate::selector::Route;

pub const LOCAL_CONFIG_FILE: &str = ".todos.toml";
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// New-task highlight
    #[serde(default)]
    pub attention: AttentionConfig,

    /// Recently-completed ranking
    #[serde(default)]
    pub ranks: RanksConfig,

    /// Presentation defaults
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionConfig {
    /// How long a new task keeps its attention color (e.g. "15s", "2m")
    #[serde(default = "default_delay")]
    pub delay: String,
}

fn default_delay() -> String {
    "15s".to_string()
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            delay: default_delay(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RanksConfig {
    /// When stored ranks are refreshed: every_mutation or toggle
    #[serde(default)]
    pub refresh: RankRefresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Route shown at startup: "/", "/active" or "/completed"
    #[serde(default = "default_route")]
    pub default_route: String,
}

fn default_route() -> String {
    "/".to_string()
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_route: default_route(),
        }
    }
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Explicit(PathBuf),
    Local(PathBuf),
    User(PathBuf),
    Defaults,
}

impl Config {
    /// Load configuration from a file. Errors are reported.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load a discovered file, falling back to defaults when it is
    /// missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Resolve the effective configuration.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<(Self, ConfigSource)> {
        if let Some(path) = explicit {
            let config = Self::load(path)?;
            return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
        }

        let local = cwd.join(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Ok((Self::load_or_default(&local), ConfigSource::Local(local)));
        }

        if let Some(user) = user_config_path() {
            if user.exists() {
                return Ok((Self::load_or_default(&user), ConfigSource::User(user)));
            }
        }

        Ok((Self::default(), ConfigSource::Defaults))
    }

    pub fn attention_delay(&self) -> Result<Duration> {
        parse_duration(&self.attention.delay)
    }

    pub fn default_route(&self) -> Route {
        Route::parse(&self.view.default_route)
    }

    fn validate(&self) -> Result<()> {
        let delay = parse_duration(&self.attention.delay)
            .map_err(|err| Error::InvalidConfig(format!("attention.delay: {err}")))?;
        if delay <= Duration::zero() {
            return Err(Error::InvalidConfig(
                "attention.delay must be > 0".to_string(),
            ));
        }
        if self.view.default_route.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "view.default_route cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// `todos/config.toml` under the platform config directory.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "todos").map(|dirs| dirs.config_dir().join(USER_CONFIG_FILE))
}

/// Parse a duration like `15s`, `2m` or `1h`. Bare numbers are seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    if s.is_empty() {
        return Err(Error::InvalidArgument("Duration cannot be empty".to_string()));
    }

    let (num_str, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(pos) => (&s[..pos], s[pos..].trim()),
        None => (s, "s"),
    };

    let num: i64 = num_str
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("Invalid duration number: '{}'", s)))?;

    let duration = match unit.to_lowercase().as_str() {
        "ms" => Duration::try_milliseconds(num),
        "s" | "sec" | "secs" | "second" | "seconds" => Duration::try_seconds(num),
        "m" | "min" | "mins" | "minute" | "minutes" => Duration::try_minutes(num),
        "h" | "hr" | "hour" | "hours" => Duration::try_hours(num),
        _ => {
            return Err(Error::InvalidArgument(format!(
                "Invalid duration unit '{}'. Expected: ms, s, m, h",
                unit
            )));
        }
    };

    duration.ok_or_else(|| Error::InvalidArgument(format!("duration out of range: '{}'", s)))
}

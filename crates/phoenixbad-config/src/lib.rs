//! Configuration for the phoenixbad CLI.
//!
//! A TOML file at the platform config path, overlaid by `PHOENIXBAD_*`
//! environment variables, translated into `phoenixbad_core::PollerConfig`.
//! Nested keys in environment variables are separated by a double
//! underscore, e.g. `PHOENIXBAD_POLLING__INTERVAL_SECS=900` or
//! `PHOENIXBAD_AREAS__SAUNA__ENABLED=false`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use phoenixbad_core::{
    Area, AreaSource, DEFAULT_SCAN_INTERVAL, POOL_URL, PollerConfig, SAUNA_URL,
};

const ENV_PREFIX: &str = "PHOENIXBAD_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Output defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,

    /// Polling schedule and HTTP settings.
    #[serde(default)]
    pub polling: Polling,

    /// Per-area endpoints.
    #[serde(default = "default_areas")]
    pub areas: BTreeMap<Area, AreaProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            polling: Polling::default(),
            areas: default_areas(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Polling {
    /// Seconds between poll cycles (clamped to 5 min .. 24 h at runtime).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Override the browser-like User-Agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

fn default_interval_secs() -> u64 {
    DEFAULT_SCAN_INTERVAL.as_secs()
}
fn default_timeout_secs() -> u64 {
    10
}

/// Endpoint settings for one area.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AreaProfile {
    /// Live visitor endpoint.
    pub url: String,

    /// Set to `false` to skip this area.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl AreaProfile {
    fn new(url: &str) -> Self {
        Self {
            url: url.into(),
            enabled: true,
            headers: BTreeMap::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_areas() -> BTreeMap<Area, AreaProfile> {
    BTreeMap::from([
        (Area::Pool, AreaProfile::new(POOL_URL)),
        (Area::Sauna, AreaProfile::new(SAUNA_URL)),
    ])
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("de", "phoenixbad", "phoenixbad").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("phoenixbad");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from `path` + environment. A missing file is not
/// an error; defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent
/// directories as needed.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `PollerConfig` from the loaded file + environment.
///
/// Disabled areas are skipped. The interval is passed through as-is; the
/// coordinator clamps it.
pub fn to_poller_config(cfg: &Config) -> Result<PollerConfig, ConfigError> {
    let mut sources = Vec::new();
    for (area, profile) in cfg.areas.iter().filter(|(_, p)| p.enabled) {
        let url = Url::parse(&profile.url).map_err(|e| ConfigError::Validation {
            field: format!("areas.{area}.url"),
            reason: format!("invalid URL '{}': {e}", profile.url),
        })?;
        let source = profile
            .headers
            .iter()
            .fold(AreaSource::new(*area, url), |s, (name, value)| {
                s.with_header(name, value)
            });
        sources.push(source);
    }

    if sources.is_empty() {
        return Err(ConfigError::Validation {
            field: "areas".into(),
            reason: "at least one area must be enabled".into(),
        });
    }
    if cfg.polling.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "polling.timeout_secs".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let defaults = PollerConfig::default();
    Ok(PollerConfig {
        sources,
        interval: Duration::from_secs(cfg.polling.interval_secs),
        timeout: Duration::from_secs(cfg.polling.timeout_secs),
        user_agent: cfg
            .polling
            .user_agent
            .clone()
            .unwrap_or(defaults.user_agent),
    })
}

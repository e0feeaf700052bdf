//! CLI-side configuration resolution.
//!
//! `phoenixbad-config` supplies file + environment; this module layers the
//! command-line flags on top and produces the `PollerConfig` core runs with.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use phoenixbad_config::{AreaProfile, Config, config_path, load_config_from, to_poller_config};
use phoenixbad_core::{Area, PollerConfig};

use crate::cli::{AreaArg, ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

impl From<AreaArg> for Area {
    fn from(arg: AreaArg) -> Self {
        match arg {
            AreaArg::Pool => Area::Pool,
            AreaArg::Sauna => Area::Sauna,
        }
    }
}

/// The config file in effect: `--config` if given, else the platform path.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load file + environment, then apply URL flags.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config_from(&config_file(global))?;
    apply_url_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_url_overrides(cfg: &mut Config, global: &GlobalOpts) {
    let overrides = [
        (Area::Pool, global.pool_url.as_ref()),
        (Area::Sauna, global.sauna_url.as_ref()),
    ];
    for (area, url) in overrides {
        let Some(url) = url else { continue };
        cfg.areas
            .entry(area)
            .and_modify(|p| {
                p.url.clone_from(url);
                p.enabled = true;
            })
            .or_insert_with(|| AreaProfile {
                url: url.clone(),
                enabled: true,
                headers: std::collections::BTreeMap::new(),
            });
    }
}

/// Build the `PollerConfig`, restricted to `areas` when non-empty.
pub fn poller_config(
    cfg: &Config,
    global: &GlobalOpts,
    areas: &[AreaArg],
    interval: Option<Duration>,
) -> Result<PollerConfig, CliError> {
    let mut poller = to_poller_config(cfg)?;

    if !areas.is_empty() {
        let selected: Vec<Area> = areas.iter().copied().map(Area::from).collect();
        poller.sources.retain(|s| selected.contains(&s.area));
        if poller.sources.is_empty() {
            return Err(CliError::Validation {
                field: "--area".into(),
                reason: "none of the selected areas is enabled in the configuration".into(),
            });
        }
    }

    if let Some(timeout) = global.timeout {
        if timeout.is_zero() {
            return Err(CliError::Validation {
                field: "--timeout".into(),
                reason: "must be greater than zero".into(),
            });
        }
        poller.timeout = timeout;
    }
    if let Some(interval) = interval {
        poller.interval = interval;
    }

    Ok(poller)
}

/// `--output`, else the config default, else table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// `--color`, else the config default, else auto.
pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> ColorMode {
    global
        .color
        .or_else(|| ColorMode::from_str(&cfg.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto)
}

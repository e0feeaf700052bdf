// ── Runtime polling configuration ──
//
// Describes *what* to poll and *how often*. Never touches disk: the CLI
// (via phoenixbad-config) builds a `PollerConfig` and hands it in.

use std::time::Duration;

use phoenixbad_api::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, TransportConfig};
use tracing::warn;
use url::Url;

use crate::error::CoreError;
use crate::model::{Area, AreaSource};

/// Default pool endpoint.
pub const POOL_URL: &str =
    "https://phoenixbad.de/wp-admin/admin-ajax.php?action=updateLiveVisitors&area=Bad";

/// Default sauna endpoint.
pub const SAUNA_URL: &str =
    "https://phoenixbad.de/wp-admin/admin-ajax.php?action=updateLiveVisitors&area=Sauna";

pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const MIN_SCAN_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const MAX_SCAN_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for one poller instance.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Areas to poll, in display order.
    pub sources: Vec<AreaSource>,
    /// Time between poll cycles. Clamped by [`clamp_interval`].
    pub interval: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            interval: DEFAULT_SCAN_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

impl PollerConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_timeout(self.timeout)
            .with_user_agent(self.user_agent.clone())
    }

    /// Reject configurations the coordinator cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.sources.is_empty() {
            return Err(CoreError::Config {
                message: "no areas configured".into(),
            });
        }
        for (i, source) in self.sources.iter().enumerate() {
            if self.sources[..i].iter().any(|s| s.area == source.area) {
                return Err(CoreError::Config {
                    message: format!("area '{}' configured more than once", source.area),
                });
            }
        }
        if self.timeout.is_zero() {
            return Err(CoreError::Config {
                message: "timeout must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// The configured areas, in order.
    pub fn areas(&self) -> Vec<Area> {
        self.sources.iter().map(|s| s.area).collect()
    }
}

/// The two production endpoints.
pub fn default_sources() -> Vec<AreaSource> {
    [(Area::Pool, POOL_URL), (Area::Sauna, SAUNA_URL)]
        .into_iter()
        .filter_map(|(area, url)| Url::parse(url).ok().map(|u| AreaSource::new(area, u)))
        .collect()
}

/// Bound `interval` to `[MIN_SCAN_INTERVAL, MAX_SCAN_INTERVAL]`.
pub fn clamp_interval(interval: Duration) -> Duration {
    let clamped = interval.clamp(MIN_SCAN_INTERVAL, MAX_SCAN_INTERVAL);
    if clamped != interval {
        warn!(
            requested_secs = interval.as_secs(),
            clamped_secs = clamped.as_secs(),
            "scan interval out of range, clamped"
        );
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_both_areas() {
        let cfg = PollerConfig::default();
        assert_eq!(cfg.areas(), vec![Area::Pool, Area::Sauna]);
        assert_eq!(cfg.interval, Duration::from_secs(3600));
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn interval_is_bounded() {
        assert_eq!(clamp_interval(Duration::from_secs(1)), MIN_SCAN_INTERVAL);
        assert_eq!(clamp_interval(Duration::from_secs(7 * 24 * 3600)), MAX_SCAN_INTERVAL);
        assert_eq!(
            clamp_interval(Duration::from_secs(900)),
            Duration::from_secs(900)
        );
    }

    #[test]
    fn empty_sources_are_rejected() {
        let cfg = PollerConfig {
            sources: Vec::new(),
            ..PollerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));
    }

    #[test]
    fn duplicate_areas_are_rejected() {
        let mut cfg = PollerConfig::default();
        let dup = cfg.sources[0].clone();
        cfg.sources.push(dup);
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));
    }
}

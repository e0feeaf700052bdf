// ── Cached per-area state ──

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::area::Area;
use super::reading::OccupancyReading;
use crate::error::ErrorKind;

/// How trustworthy the cached reading for an area is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Freshness {
    /// Never had a successful poll.
    Unknown,
    /// The latest poll succeeded within the allowed age.
    Fresh,
    /// Showing the last known value after a failed or overdue poll.
    Stale,
}

/// Why the latest poll of an area failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaFailure {
    pub kind: ErrorKind,
    pub message: String,
}

/// Everything the coordinator remembers about one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAreaState {
    pub area: Area,
    /// Most recent successful reading, kept across failures.
    pub last_reading: Option<OccupancyReading>,
    /// When `last_reading` was obtained.
    pub last_updated_at: Option<DateTime<Utc>>,
    /// When the area was last polled, successfully or not.
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// Failure of the latest poll; cleared on success.
    pub last_error: Option<AreaFailure>,
}

impl CachedAreaState {
    pub fn unknown(area: Area) -> Self {
        Self {
            area,
            last_reading: None,
            last_updated_at: None,
            last_attempt_at: None,
            last_error: None,
        }
    }

    pub(crate) fn succeeded(&self, reading: OccupancyReading, at: DateTime<Utc>) -> Self {
        Self {
            area: self.area,
            last_reading: Some(reading),
            last_updated_at: Some(at),
            last_attempt_at: Some(at),
            last_error: None,
        }
    }

    pub(crate) fn failed(&self, failure: AreaFailure, at: DateTime<Utc>) -> Self {
        Self {
            area: self.area,
            last_reading: self.last_reading,
            last_updated_at: self.last_updated_at,
            last_attempt_at: Some(at),
            last_error: Some(failure),
        }
    }

    pub fn freshness(&self, now: DateTime<Utc>, max_age: Duration) -> Freshness {
        let Some(updated) = self.last_updated_at else {
            return Freshness::Unknown;
        };
        if self.last_reading.is_none() {
            return Freshness::Unknown;
        }
        if self.last_error.is_some() || now - updated > max_age {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }
}

/// Consumer-facing view of one area: the cached value plus a freshness flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaView {
    pub area: Area,
    pub freshness: Freshness,
    pub reading: Option<OccupancyReading>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub last_error: Option<AreaFailure>,
}

impl AreaView {
    pub(crate) fn from_state(state: &CachedAreaState, now: DateTime<Utc>, max_age: Duration) -> Self {
        Self {
            area: state.area,
            freshness: state.freshness(now, max_age),
            reading: state.last_reading,
            last_updated_at: state.last_updated_at,
            last_error: state.last_error.clone(),
        }
    }

    /// No data yet, as opposed to a reading of zero.
    pub fn has_data(&self) -> bool {
        self.reading.is_some()
    }
}

#[cfg(test)]
mod tests {
    use phoenixbad_api::ResponseShape;

    use super::*;

    fn reading() -> OccupancyReading {
        OccupancyReading::new(40, 13, 25.0, false, ResponseShape::Widget)
    }

    fn failure() -> AreaFailure {
        AreaFailure {
            kind: ErrorKind::Timeout,
            message: "pool: request timed out after 10s".into(),
        }
    }

    #[test]
    fn never_polled_is_unknown() {
        let state = CachedAreaState::unknown(Area::Pool);
        assert_eq!(state.freshness(Utc::now(), Duration::hours(1)), Freshness::Unknown);
    }

    #[test]
    fn failure_without_prior_success_stays_unknown() {
        let now = Utc::now();
        let state = CachedAreaState::unknown(Area::Pool).failed(failure(), now);
        assert_eq!(state.freshness(now, Duration::hours(1)), Freshness::Unknown);
        assert!(state.last_reading.is_none());
        assert_eq!(state.last_attempt_at, Some(now));
    }

    #[test]
    fn success_is_fresh_until_max_age() {
        let at = Utc::now();
        let state = CachedAreaState::unknown(Area::Sauna).succeeded(reading(), at);
        assert_eq!(state.freshness(at, Duration::hours(1)), Freshness::Fresh);
        assert_eq!(
            state.freshness(at + Duration::minutes(61), Duration::hours(1)),
            Freshness::Stale
        );
    }

    #[test]
    fn failure_after_success_keeps_reading_but_is_stale() {
        let at = Utc::now();
        let state = CachedAreaState::unknown(Area::Pool)
            .succeeded(reading(), at)
            .failed(failure(), at + Duration::minutes(5));
        assert_eq!(state.last_reading, Some(reading()));
        assert_eq!(state.last_updated_at, Some(at));
        assert_eq!(
            state.freshness(at + Duration::minutes(5), Duration::hours(1)),
            Freshness::Stale
        );
    }

    #[test]
    fn success_clears_error() {
        let at = Utc::now();
        let state = CachedAreaState::unknown(Area::Pool)
            .failed(failure(), at)
            .succeeded(reading(), at + Duration::minutes(1));
        assert!(state.last_error.is_none());
        assert_eq!(
            state.freshness(at + Duration::minutes(1), Duration::hours(1)),
            Freshness::Fresh
        );
    }
}

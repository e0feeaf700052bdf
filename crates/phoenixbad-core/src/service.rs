// ── Occupancy service ──
//
// One poll cycle: fetch every configured area concurrently, parse and
// normalize each response, and keep failures local to their area.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use phoenixbad_api::OccupancyClient;
use tracing::{debug, warn};

use crate::convert::calculate;
use crate::error::CoreError;
use crate::model::{Area, AreaFailure, AreaSource, OccupancyReading};

/// Per-area results of one cycle in which at least one area succeeded.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub at: DateTime<Utc>,
    pub results: BTreeMap<Area, Result<OccupancyReading, AreaFailure>>,
}

impl CycleOutcome {
    pub fn successes(&self) -> impl Iterator<Item = (Area, &OccupancyReading)> {
        self.results
            .iter()
            .filter_map(|(area, r)| r.as_ref().ok().map(|reading| (*area, reading)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (Area, &AreaFailure)> {
        self.results
            .iter()
            .filter_map(|(area, r)| r.as_ref().err().map(|failure| (*area, failure)))
    }

    pub fn reading(&self, area: Area) -> Option<&OccupancyReading> {
        self.results.get(&area).and_then(|r| r.as_ref().ok())
    }

    pub fn is_partial(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Fetches and normalizes occupancy for a fixed set of areas.
#[derive(Debug, Clone)]
pub struct OccupancyService {
    client: OccupancyClient,
    sources: Vec<AreaSource>,
}

impl OccupancyService {
    pub fn new(client: OccupancyClient, sources: Vec<AreaSource>) -> Self {
        Self { client, sources }
    }

    pub fn sources(&self) -> &[AreaSource] {
        &self.sources
    }

    /// Fetch, parse and normalize a single area.
    pub async fn fetch_area(&self, source: &AreaSource) -> Result<OccupancyReading, CoreError> {
        let extraction = self
            .client
            .fetch_extraction(source.area.as_str(), &source.url, &source.headers)
            .await?;
        let reading = calculate(extraction);
        debug!(
            area = %source.area,
            free = reading.free(),
            occupied = reading.occupied(),
            percentage = reading.percentage(),
            "area parsed"
        );
        Ok(reading)
    }

    /// Fetch every configured area concurrently.
    ///
    /// Returns the per-area map when at least one area succeeded, and
    /// `AllAreasUnavailable` (carrying every per-area failure) otherwise.
    pub async fn fetch_all(&self) -> Result<CycleOutcome, CoreError> {
        if self.sources.is_empty() {
            return Err(CoreError::Config {
                message: "no areas configured".into(),
            });
        }

        let futs = self.sources.iter().map(|source| async move {
            let result = self.fetch_area(source).await.map_err(|e| {
                warn!(area = %source.area, error = %e, "area fetch failed");
                e.to_failure()
            });
            (source.area, result)
        });
        let results: BTreeMap<_, _> = futures_util::future::join_all(futs)
            .await
            .into_iter()
            .collect();
        let at = Utc::now();

        if results.values().all(Result::is_err) {
            let failures = results
                .into_iter()
                .filter_map(|(area, r)| r.err().map(|f| (area, f)))
                .collect();
            return Err(CoreError::AllAreasUnavailable { failures });
        }

        debug!(
            areas = results.len(),
            ok = results.values().filter(|r| r.is_ok()).count(),
            "cycle complete"
        );
        Ok(CycleOutcome { at, results })
    }
}

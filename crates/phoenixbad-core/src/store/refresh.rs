// ── Cycle application logic ──
//
// Applies the outcome of a poll cycle to the store. Every area is updated
// independently, so the final state does not depend on which fetch of the
// cycle finished first.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::OccupancyStore;
use crate::model::{Area, AreaFailure, OccupancyReading};
use crate::service::CycleOutcome;

impl OccupancyStore {
    /// Record a successful reading: new value, new timestamp, error cleared.
    pub(crate) fn apply_success(&self, area: Area, reading: OccupancyReading, at: DateTime<Utc>) {
        if let Some(slot) = self.areas.get(&area) {
            slot.rcu(|prev| prev.succeeded(reading, at));
        }
    }

    /// Record a failure: previous reading kept, error recorded.
    pub(crate) fn apply_failure(&self, area: Area, failure: &AreaFailure, at: DateTime<Utc>) {
        if let Some(slot) = self.areas.get(&area) {
            slot.rcu(|prev| prev.failed(failure.clone(), at));
        }
    }

    /// Apply a cycle in which at least one area succeeded.
    pub(crate) fn apply_cycle(&self, outcome: &CycleOutcome) {
        for (area, result) in &outcome.results {
            match result {
                Ok(reading) => self.apply_success(*area, *reading, outcome.at),
                Err(failure) => self.apply_failure(*area, failure, outcome.at),
            }
        }
        self.finish_cycle(outcome.at);
    }

    /// Apply a cycle in which every area failed.
    pub(crate) fn apply_all_failed(&self, failures: &[(Area, AreaFailure)], at: DateTime<Utc>) {
        for (area, failure) in failures {
            self.apply_failure(*area, failure, at);
        }
        self.finish_cycle(at);
    }

    fn finish_cycle(&self, at: DateTime<Utc>) {
        let _ = self.last_cycle.send_replace(Some(at));
        self.version.send_modify(|v| *v += 1);
        debug!(version = self.version(), "cycle applied to store");
    }
}

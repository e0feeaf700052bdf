// ── Per-area cached state store ──
//
// Written only by the coordinator, read by any number of consumers.
// Each area's state lives behind its own `ArcSwap`, so a reader always
// sees either the previous or the next complete state, never a mix.

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapAny};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;

use crate::model::{Area, AreaView, CachedAreaState};

/// Cached state for a fixed set of areas.
pub struct OccupancyStore {
    pub(super) areas: BTreeMap<Area, ArcSwap<CachedAreaState>>,
    /// Areas in configured order (for display).
    pub(super) order: Vec<Area>,
    /// Bumped once per applied cycle.
    pub(super) version: watch::Sender<u64>,
    pub(super) last_cycle: watch::Sender<Option<DateTime<Utc>>>,
}

impl OccupancyStore {
    /// Create a store with every area in the `Unknown` state.
    pub fn new(areas: impl IntoIterator<Item = Area>) -> Self {
        let mut map = BTreeMap::new();
        let mut order = Vec::new();
        for area in areas {
            if map
                .insert(area, ArcSwap::from_pointee(CachedAreaState::unknown(area)))
                .is_none()
            {
                order.push(area);
            }
        }
        let (version, _) = watch::channel(0u64);
        let (last_cycle, _) = watch::channel(None);

        Self {
            areas: map,
            order,
            version,
            last_cycle,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    /// Current state of one area, or `None` if it is not configured.
    pub fn state(&self, area: Area) -> Option<Arc<CachedAreaState>> {
        self.areas.get(&area).map(ArcSwapAny::load_full)
    }

    /// Current state of every area, in configured order.
    pub fn snapshot(&self) -> Vec<Arc<CachedAreaState>> {
        self.order.iter().filter_map(|a| self.state(*a)).collect()
    }

    pub fn areas(&self) -> &[Area] {
        &self.order
    }

    // ── Consumer views ───────────────────────────────────────────────

    /// Pull query for one area with a freshness flag.
    pub fn view(&self, area: Area, now: DateTime<Utc>, max_age: Duration) -> Option<AreaView> {
        self.state(area)
            .map(|s| AreaView::from_state(&s, now, max_age))
    }

    /// Pull query for every area, in configured order.
    pub fn views(&self, now: DateTime<Utc>, max_age: Duration) -> Vec<AreaView> {
        self.snapshot()
            .iter()
            .map(|s| AreaView::from_state(s, now, max_age))
            .collect()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// When the last cycle (successful or not) was applied.
    pub fn last_cycle_at(&self) -> Option<DateTime<Utc>> {
        *self.last_cycle.borrow()
    }

    /// Subscribe to cycle notifications; the value is the store version.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Freshness;

    #[test]
    fn new_store_is_unknown_everywhere() {
        let store = OccupancyStore::new([Area::Pool, Area::Sauna]);
        let views = store.views(Utc::now(), Duration::hours(1));
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.freshness == Freshness::Unknown));
        assert!(views.iter().all(|v| !v.has_data()));
        assert_eq!(store.version(), 0);
        assert!(store.last_cycle_at().is_none());
    }

    #[test]
    fn duplicate_areas_collapse() {
        let store = OccupancyStore::new([Area::Sauna, Area::Pool, Area::Sauna]);
        assert_eq!(store.areas(), &[Area::Sauna, Area::Pool]);
    }

    #[test]
    fn unconfigured_area_has_no_state() {
        let store = OccupancyStore::new([Area::Pool]);
        assert!(store.state(Area::Sauna).is_none());
        assert!(store.state(Area::Pool).is_some());
    }
}

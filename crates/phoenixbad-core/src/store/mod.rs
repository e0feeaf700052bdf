// ── Cached occupancy state ──

mod occupancy_store;
mod refresh;

pub use occupancy_store::OccupancyStore;

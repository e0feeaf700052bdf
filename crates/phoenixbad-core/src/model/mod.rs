// ── Domain model ──

pub mod area;
pub mod reading;
pub mod state;

pub use area::{Area, AreaSource};
pub use reading::OccupancyReading;
pub use state::{AreaFailure, AreaView, CachedAreaState, Freshness};

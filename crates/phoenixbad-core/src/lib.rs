//! Occupancy normalization and polling between `phoenixbad-api` and the CLI.
//!
//! - **[`Coordinator`]**: Owns the polling lifecycle:
//!   [`start()`](Coordinator::start) spawns a background task that runs one
//!   cycle per interval, [`reconfigure()`](Coordinator::reconfigure) changes
//!   the interval and [`shutdown()`](Coordinator::shutdown) stops it.
//!   [`Coordinator::oneshot()`](Coordinator::oneshot) runs a single cycle for
//!   CLI use.
//!
//! - **[`OccupancyService`]**: One poll cycle: concurrent per-area fetch,
//!   parse and normalization with failures isolated per area.
//!
//! - **[`OccupancyStore`]**: Per-area cached state behind `ArcSwap`, with a
//!   `watch` channel bumped once per applied cycle.
//!
//! - **Domain model** ([`model`]): [`Area`], [`OccupancyReading`],
//!   [`CachedAreaState`] and the consumer-facing [`AreaView`] with its
//!   [`Freshness`].

pub mod config;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod service;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    DEFAULT_SCAN_INTERVAL, MAX_SCAN_INTERVAL, MIN_SCAN_INTERVAL, POOL_URL, PollerConfig,
    SAUNA_URL, clamp_interval, default_sources,
};
pub use convert::{calculate, parse_reading};
pub use coordinator::Coordinator;
pub use error::{CoreError, ErrorKind};
pub use service::{CycleOutcome, OccupancyService};
pub use store::OccupancyStore;

pub use model::{
    Area, AreaFailure, AreaSource, AreaView, CachedAreaState, Freshness, OccupancyReading,
};

pub use phoenixbad_api::ResponseShape;

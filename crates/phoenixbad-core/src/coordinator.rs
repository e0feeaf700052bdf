// ── Poll coordinator ──
//
// Owns the polling lifecycle: a background task runs one cycle per
// interval and publishes results into the `OccupancyStore`. Cancellation
// is cooperative via `CancellationToken`; the parent token ends the
// coordinator for good, the child token only ends the current poll task
// so `reconfigure` can restart it with a new interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use phoenixbad_api::OccupancyClient;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{PollerConfig, clamp_interval};
use crate::error::CoreError;
use crate::model::{AreaView, CachedAreaState};
use crate::service::{CycleOutcome, OccupancyService};
use crate::store::OccupancyStore;

// ── Coordinator ──────────────────────────────────────────────────

/// Periodic poller for every configured area.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Call
/// [`start()`](Self::start) to begin polling and
/// [`shutdown()`](Self::shutdown) to stop it; the background task holds a
/// clone, so dropping the last handle alone does not stop polling.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: PollerConfig,
    service: OccupancyService,
    store: Arc<OccupancyStore>,
    interval: watch::Sender<Duration>,
    cancel: CancellationToken,
    /// Child token for the current poll task, replaced on every restart.
    cancel_child: Mutex<CancellationToken>,
    task_handle: Mutex<Option<JoinHandle<()>>>,
    /// Held across fetch + apply so cycles land in the store in order.
    cycle: Mutex<()>,
}

impl Coordinator {
    /// Validate `config` and build the HTTP client. Does NOT poll.
    pub fn new(config: PollerConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let client = OccupancyClient::new(&config.transport())?;
        Ok(Self::with_client(config, client))
    }

    /// Like [`new()`](Self::new) but with a caller-supplied client.
    pub fn with_client(mut config: PollerConfig, client: OccupancyClient) -> Self {
        config.interval = clamp_interval(config.interval);
        let store = Arc::new(OccupancyStore::new(config.areas()));
        let service = OccupancyService::new(client, config.sources.clone());
        let (interval, _) = watch::channel(config.interval);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                service,
                store,
                interval,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handle: Mutex::new(None),
                cycle: Mutex::new(()),
            }),
        }
    }

    /// The configuration this coordinator was built with.
    ///
    /// `interval` reflects the value at construction; see
    /// [`interval()`](Self::interval) for the current one.
    pub fn config(&self) -> &PollerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<OccupancyStore> {
        &self.inner.store
    }

    /// Current polling interval.
    pub fn interval(&self) -> Duration {
        *self.inner.interval.borrow()
    }

    /// Subscribe to interval changes made by [`reconfigure()`](Self::reconfigure).
    pub fn interval_changes(&self) -> watch::Receiver<Duration> {
        self.inner.interval.subscribe()
    }

    /// Age after which a successful reading is reported as stale: one
    /// interval plus one request timeout.
    pub fn max_age(&self) -> TimeDelta {
        let window = self.interval().saturating_add(self.inner.config.timeout);
        TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX)
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Run one poll cycle now and apply it to the store.
    ///
    /// Per-area failures are recorded in the store and reported in the
    /// returned outcome. If every area failed, each area's last reading is
    /// kept, its error is recorded and `AllAreasUnavailable` is returned.
    /// A cycle that finishes after [`shutdown()`](Self::shutdown) is
    /// discarded without touching the store. Concurrent calls run one after
    /// another.
    pub async fn refresh(&self) -> Result<CycleOutcome, CoreError> {
        let _cycle = self.inner.cycle.lock().await;
        if self.is_shut_down() {
            return Err(CoreError::Cancelled);
        }

        let result = self.inner.service.fetch_all().await;

        if self.is_shut_down() {
            debug!("poll cycle finished after shutdown, discarded");
            return Err(CoreError::Cancelled);
        }

        match result {
            Ok(outcome) => {
                self.inner.store.apply_cycle(&outcome);
                info!(
                    ok = outcome.successes().count(),
                    failed = outcome.failures().count(),
                    "poll cycle applied"
                );
                Ok(outcome)
            }
            Err(CoreError::AllAreasUnavailable { failures }) => {
                self.inner.store.apply_all_failed(&failures, Utc::now());
                warn!(areas = failures.len(), "all areas unavailable");
                Err(CoreError::AllAreasUnavailable { failures })
            }
            Err(e) => Err(e),
        }
    }

    /// Start the background poll task.
    ///
    /// The first cycle runs immediately. Calling `start` while already
    /// running is a no-op.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.is_shut_down() {
            return Err(CoreError::Cancelled);
        }
        let mut handle = self.inner.task_handle.lock().await;
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();
        let period = self.interval();
        *handle = Some(tokio::spawn(poll_task(
            self.clone(),
            Instant::now(),
            period,
            child,
        )));
        info!(interval_secs = period.as_secs(), "polling started");
        Ok(())
    }

    /// Change the polling interval.
    ///
    /// The value is clamped to the allowed range and returned. A running
    /// poll task is restarted; its next cycle is one new interval away and
    /// any cycle in flight is abandoned.
    pub async fn reconfigure(&self, interval: Duration) -> Duration {
        let interval = clamp_interval(interval);
        self.inner.interval.send_replace(interval);

        let mut handle = self.inner.task_handle.lock().await;
        if self.is_shut_down() {
            return interval;
        }
        let Some(running) = handle.take() else {
            return interval;
        };

        let mut cancel_child = self.inner.cancel_child.lock().await;
        cancel_child.cancel();
        let _ = running.await;

        let child = self.inner.cancel.child_token();
        *cancel_child = child.clone();
        *handle = Some(tokio::spawn(poll_task(
            self.clone(),
            Instant::now() + interval,
            interval,
            child,
        )));
        info!(interval_secs = interval.as_secs(), "polling interval changed");
        interval
    }

    /// Stop polling for good. In-flight cycles are abandoned, never applied.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task_handle.lock().await.take() {
            let _ = handle.await;
        }
        debug!("coordinator shut down");
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// Build a coordinator, run a single cycle, shut down, then hand the
    /// coordinator and the cycle result to `f`.
    ///
    /// Only construction errors are returned directly; the cycle result
    /// (including `AllAreasUnavailable`) goes to `f` so callers can still
    /// render the per-area views.
    pub async fn oneshot<F, T>(config: PollerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(&Coordinator, Result<CycleOutcome, CoreError>) -> T,
    {
        let coordinator = Coordinator::new(config)?;
        let result = coordinator.refresh().await;
        coordinator.shutdown().await;
        Ok(f(&coordinator, result))
    }

    // ── Snapshot accessors (delegate to OccupancyStore) ──────────

    pub fn views(&self) -> Vec<AreaView> {
        self.inner.store.views(Utc::now(), self.max_age())
    }

    pub fn snapshot(&self) -> Vec<Arc<CachedAreaState>> {
        self.inner.store.snapshot()
    }

    /// Subscribe to store updates; the value is bumped once per applied cycle.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.store.subscribe()
    }
}

// ── Background task ──────────────────────────────────────────────

async fn poll_task(
    coordinator: Coordinator,
    first: Instant,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval_at(first, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("in-flight poll cycle abandoned");
                        break;
                    }
                    result = coordinator.refresh() => {
                        if let Err(e) = result {
                            warn!(error = %e, "poll cycle failed");
                        }
                    }
                }
            }
        }
    }
}

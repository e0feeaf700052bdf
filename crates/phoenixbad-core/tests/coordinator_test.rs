#![allow(clippy::unwrap_used)]
// Integration tests for `Coordinator` against wiremock endpoints.

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use phoenixbad_core::{
    Area, AreaSource, Coordinator, CoreError, ErrorKind, Freshness, MIN_SCAN_INTERVAL,
    PollerConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

const WIDGET_40_FREE_25_PCT: &str = r#"
<div class="outer_wrapper" data-free="40">
  <div class="inner_wrapper" style="width: 25%"></div>
</div>"#;

fn area_url(server: &MockServer, area: &str) -> Url {
    Url::parse(&format!(
        "{}/wp-admin/admin-ajax.php?action=updateLiveVisitors&area={area}",
        server.uri()
    ))
    .unwrap()
}

fn config_for(server: &MockServer) -> PollerConfig {
    PollerConfig {
        sources: vec![
            AreaSource::new(Area::Pool, area_url(server, "Bad")),
            AreaSource::new(Area::Sauna, area_url(server, "Sauna")),
        ],
        timeout: Duration::from_secs(5),
        ..PollerConfig::default()
    }
}

async fn mount(server: &MockServer, area: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(query_param("area", area))
        .respond_with(response)
        .mount(server)
        .await;
}

fn view(coordinator: &Coordinator, area: Area) -> phoenixbad_core::AreaView {
    coordinator
        .views()
        .into_iter()
        .find(|v| v.area == area)
        .unwrap()
}

// ── Single cycles ───────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_applies_both_areas() {
    let server = MockServer::start().await;
    mount(&server, "Bad", ResponseTemplate::new(200).set_body_string(WIDGET_40_FREE_25_PCT)).await;
    mount(&server, "Sauna", ResponseTemplate::new(200).set_body_string("7")).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    let outcome = coordinator.refresh().await.unwrap();
    assert!(!outcome.is_partial());

    let pool = view(&coordinator, Area::Pool);
    assert_eq!(pool.freshness, Freshness::Fresh);
    let reading = pool.reading.unwrap();
    assert_eq!(reading.free(), 40);
    assert_eq!(reading.occupied(), 13);

    let sauna = view(&coordinator, Area::Sauna);
    assert_eq!(sauna.freshness, Freshness::Fresh);
    assert_eq!(sauna.reading.unwrap().occupied(), 7);

    assert_eq!(coordinator.store().version(), 1);
    assert!(coordinator.store().last_cycle_at().is_some());
}

#[tokio::test]
async fn test_partial_failure_isolated_to_area() {
    let server = MockServer::start().await;
    mount(&server, "Bad", ResponseTemplate::new(200).set_body_string(WIDGET_40_FREE_25_PCT)).await;
    mount(&server, "Sauna", ResponseTemplate::new(500)).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    let outcome = coordinator.refresh().await.unwrap();
    assert!(outcome.is_partial());
    assert!(outcome.reading(Area::Pool).is_some());

    assert_eq!(view(&coordinator, Area::Pool).freshness, Freshness::Fresh);

    let sauna = view(&coordinator, Area::Sauna);
    assert_eq!(sauna.freshness, Freshness::Unknown);
    assert!(sauna.reading.is_none());
    assert_eq!(sauna.last_error.unwrap().kind, ErrorKind::HttpStatus(500));
}

#[tokio::test]
async fn test_areas_are_fetched_concurrently() {
    let server = MockServer::start().await;
    let slow = |body: &str| {
        ResponseTemplate::new(200)
            .set_body_string(body)
            .set_delay(Duration::from_millis(800))
    };
    mount(&server, "Bad", slow(WIDGET_40_FREE_25_PCT)).await;
    mount(&server, "Sauna", slow("7")).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    let started = Instant::now();
    let outcome = coordinator.refresh().await.unwrap();
    let elapsed = started.elapsed();

    assert!(!outcome.is_partial());
    assert!(
        elapsed < Duration::from_millis(1400),
        "two 800ms fetches took {elapsed:?}"
    );
}

#[tokio::test]
async fn test_overlapping_refreshes_apply_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("area", "Bad"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("5")
                .set_delay(Duration::from_millis(600)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount(&server, "Bad", ResponseTemplate::new(200).set_body_string("9")).await;
    mount(&server, "Sauna", ResponseTemplate::new(200).set_body_string("1")).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    let (first, second) = tokio::join!(coordinator.refresh(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        coordinator.refresh().await
    });
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.reading(Area::Pool).unwrap().occupied(), 5);
    assert_eq!(second.reading(Area::Pool).unwrap().occupied(), 9);
    assert!(second.at >= first.at);

    let pool = view(&coordinator, Area::Pool);
    assert_eq!(pool.reading.unwrap().occupied(), 9);
    assert_eq!(pool.last_updated_at, Some(second.at));
    assert_eq!(coordinator.store().version(), 2);
}

#[tokio::test]
async fn test_total_failure_keeps_last_readings_as_stale() {
    let server = MockServer::start().await;
    mount(&server, "Bad", ResponseTemplate::new(200).set_body_string("12")).await;
    mount(&server, "Sauna", ResponseTemplate::new(200).set_body_string("3")).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    coordinator.refresh().await.unwrap();

    server.reset().await;
    mount(&server, "Bad", ResponseTemplate::new(503)).await;
    mount(&server, "Sauna", ResponseTemplate::new(200).set_body_string("<p>maintenance</p>")).await;

    let err = coordinator.refresh().await.unwrap_err();
    let CoreError::AllAreasUnavailable { failures } = err else {
        panic!("expected AllAreasUnavailable, got {err:?}");
    };
    assert_eq!(failures.len(), 2);

    let pool = view(&coordinator, Area::Pool);
    assert_eq!(pool.freshness, Freshness::Stale);
    assert_eq!(pool.reading.unwrap().occupied(), 12);
    assert_eq!(pool.last_error.unwrap().kind, ErrorKind::HttpStatus(503));

    let sauna = view(&coordinator, Area::Sauna);
    assert_eq!(sauna.freshness, Freshness::Stale);
    assert_eq!(sauna.reading.unwrap().occupied(), 3);
    assert!(sauna.last_error.unwrap().kind.is_parse());
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_polls_immediately() {
    let server = MockServer::start().await;
    mount(&server, "Bad", ResponseTemplate::new(200).set_body_string("1")).await;
    mount(&server, "Sauna", ResponseTemplate::new(200).set_body_string("2")).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    let mut updates = coordinator.subscribe();
    coordinator.start().await.unwrap();
    // Second start is a no-op.
    coordinator.start().await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(*updates.borrow(), 1);

    coordinator.shutdown().await;
    assert!(coordinator.is_shut_down());
}

#[tokio::test]
async fn test_shutdown_abandons_in_flight_cycle() {
    let server = MockServer::start().await;
    let slow = ResponseTemplate::new(200)
        .set_body_string("9")
        .set_delay(Duration::from_secs(3));
    mount(&server, "Bad", slow.clone()).await;
    mount(&server, "Sauna", slow).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    coordinator.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    coordinator.shutdown().await;
    assert!(started.elapsed() < Duration::from_secs(2));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(coordinator.store().version(), 0);
    assert_eq!(view(&coordinator, Area::Pool).freshness, Freshness::Unknown);
}

#[tokio::test]
async fn test_refresh_after_shutdown_is_discarded() {
    let server = MockServer::start().await;
    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    coordinator.shutdown().await;

    let err = coordinator.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::Cancelled));
    assert!(matches!(coordinator.start().await, Err(CoreError::Cancelled)));
}

#[tokio::test]
async fn test_reconfigure_clamps_and_updates_max_age() {
    let server = MockServer::start().await;
    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    let mut changes = coordinator.interval_changes();

    let applied = coordinator.reconfigure(Duration::from_secs(10)).await;
    assert_eq!(applied, MIN_SCAN_INTERVAL);
    assert!(changes.has_changed().unwrap());
    assert_eq!(*changes.borrow_and_update(), MIN_SCAN_INTERVAL);
    assert_eq!(coordinator.max_age(), chrono::TimeDelta::seconds(305));

    let applied = coordinator.reconfigure(Duration::from_secs(900)).await;
    assert_eq!(applied, Duration::from_secs(900));
    assert_eq!(coordinator.interval(), Duration::from_secs(900));
}

#[tokio::test]
async fn test_reconfigure_restarts_running_task() {
    let server = MockServer::start().await;
    mount(&server, "Bad", ResponseTemplate::new(200).set_body_string("1")).await;
    mount(&server, "Sauna", ResponseTemplate::new(200).set_body_string("2")).await;

    let coordinator = Coordinator::new(config_for(&server)).unwrap();
    let mut updates = coordinator.subscribe();
    coordinator.start().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .unwrap()
        .unwrap();

    // The restarted task waits a full interval before its first cycle.
    coordinator.reconfigure(Duration::from_secs(600)).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(coordinator.store().version(), 1);

    coordinator.shutdown().await;
}

// ── One-shot ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_oneshot_hands_over_views() {
    let server = MockServer::start().await;
    mount(&server, "Bad", ResponseTemplate::new(200).set_body_string("5")).await;
    mount(&server, "Sauna", ResponseTemplate::new(404)).await;

    let (views, partial) = Coordinator::oneshot(config_for(&server), |c, result| {
        (c.views(), result.unwrap().is_partial())
    })
    .await
    .unwrap();

    assert!(partial);
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].area, Area::Pool);
    assert!(views[0].has_data());
    assert!(!views[1].has_data());
}

#[tokio::test]
async fn test_oneshot_rejects_empty_config() {
    let config = PollerConfig {
        sources: Vec::new(),
        ..PollerConfig::default()
    };
    let result = Coordinator::oneshot(config, |_, _| ()).await;
    assert!(matches!(result, Err(CoreError::Config { .. })));
}

//! Behavior-driven tests for release discovery
//!
//! These tests verify HOW the discoverer anchors its walk, probes candidate
//! days window by window, and keeps one bad probe from spoiling the rest.

use std::sync::Arc;
use std::time::Duration;

use h41_core::http_client::HttpFuture;
use h41_core::{
    AnchorSource, DiscoveryError, DiscoveryPolicy, HttpClient, HttpError, HttpRequest,
    HttpResponse, IsoDate, ReleaseDiscoverer, ScriptedHttpClient, SourceConfig,
};

const BASE: &str = "https://h41.test/releases/h41";
const CURRENT_URL: &str = "https://h41.test/releases/h41/current/";
const INDEX_URL: &str = "https://h41.test/releases/h41/";
const EDITION: &str = include_str!("fixtures/h41_20260108.html");
const SHELL_PAGE: &str = "<html><body><h1>H.4.1</h1>\
    <h2>Factors Affecting Reserve Balances</h2><p>Tables are loading.</p></body></html>";

fn date(text: &str) -> IsoDate {
    IsoDate::parse(text).expect("valid date")
}

fn edition_url(compact: &str) -> String {
    format!("{BASE}/{compact}/")
}

fn fast_policy() -> DiscoveryPolicy {
    DiscoveryPolicy {
        probes_per_second: 10_000,
        probe_timeout: Duration::from_millis(200),
        ..DiscoveryPolicy::default()
    }
}

/// Four weekly editions, one of them only under the `default.htm` shape.
fn published_weeks() -> ScriptedHttpClient {
    ScriptedHttpClient::new()
        .route(CURRENT_URL, HttpResponse::ok(EDITION))
        .route(edition_url("20260108"), HttpResponse::ok(EDITION))
        .route(format!("{BASE}/20251231/default.htm"), HttpResponse::ok(EDITION))
        .route(edition_url("20251224"), HttpResponse::ok(EDITION))
        .route(edition_url("20251217"), HttpResponse::ok(EDITION))
}

fn discoverer(client: Arc<dyn HttpClient>) -> ReleaseDiscoverer {
    ReleaseDiscoverer::new(client, SourceConfig::with_base_url(BASE)).with_policy(fast_policy())
}

/// Delegates to a scripted client but stalls one URL far past any timeout.
struct StallingClient {
    inner: ScriptedHttpClient,
    stalled_url: String,
}

impl HttpClient for StallingClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        if request.url == self.stalled_url {
            return Box::pin(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(HttpResponse::ok(EDITION))
            });
        }
        self.inner.execute(request)
    }
}

// =============================================================================
// Discovery: Anchoring
// =============================================================================

#[tokio::test]
async fn when_current_page_declares_a_release_date_system_anchors_on_it() {
    // Given: The current page says "Release Date: January 8, 2026"
    let client = Arc::new(published_weeks());

    // When: The system establishes its anchor
    let (anchor, source) = discoverer(client.clone())
        .establish_anchor()
        .await
        .expect("anchor");

    // Then: The declared date is used without consulting the index
    assert_eq!(anchor, date("2026-01-08"));
    assert_eq!(source, AnchorSource::CurrentPage);
    assert_eq!(client.requests_to(INDEX_URL), 0);
}

#[tokio::test]
async fn when_neither_current_page_nor_index_respond_system_reports_missing_anchor() {
    // Given: Both anchor sources fail
    let client = Arc::new(
        ScriptedHttpClient::new()
            .route(CURRENT_URL, HttpResponse::new(503, "busy"))
            .route(INDEX_URL, HttpResponse::new(503, "busy")),
    );

    // When: The system tries to discover editions
    let error = discoverer(client.clone())
        .discover(4, 60)
        .await
        .expect_err("no anchor");

    // Then: Discovery fails before probing any date
    assert!(matches!(error, DiscoveryError::AnchorUnavailable { .. }));
    assert_eq!(error.code(), "discovery.anchor_unavailable");
    assert_eq!(client.recorded_requests().len(), 2);
}

// =============================================================================
// Discovery: Windows
// =============================================================================

#[tokio::test]
async fn when_target_needs_a_second_window_system_probes_it_and_stops() {
    // Given: Two editions in each of the first two 14-day windows
    let client = Arc::new(published_weeks());

    // When: The system asks for three dates within 30 days
    let outcome = discoverer(client)
        .discover_detailed(3, 30)
        .await
        .expect("discovery");

    // Then: Two full windows were probed and the newest three returned
    assert_eq!(outcome.anchor, date("2026-01-08"));
    assert_eq!(outcome.anchor_source, AnchorSource::CurrentPage);
    assert_eq!(outcome.windows, 2);
    assert_eq!(outcome.probes, 28);
    assert_eq!(
        outcome.dates,
        vec![date("2026-01-08"), date("2025-12-31"), date("2025-12-24")]
    );
}

#[tokio::test]
async fn when_first_window_meets_the_target_system_never_probes_older_days() {
    // Given: Two editions inside the first window
    let client = Arc::new(published_weeks());

    // When: The system asks for two dates
    let outcome = discoverer(client.clone())
        .discover_detailed(2, 60)
        .await
        .expect("discovery");

    // Then: Older windows were skipped entirely
    assert_eq!(outcome.windows, 1);
    assert_eq!(outcome.probes, 14);
    assert_eq!(outcome.dates, vec![date("2026-01-08"), date("2025-12-31")]);
    assert_eq!(client.requests_to(&edition_url("20251224")), 0);
    assert_eq!(client.requests_to(&edition_url("20251217")), 0);
}

#[tokio::test]
async fn when_lookback_is_exhausted_system_returns_what_it_found() {
    // Given: Only four editions exist
    let client = Arc::new(published_weeks());

    // When: The system asks for ten dates within 60 days
    let outcome = discoverer(client)
        .discover_detailed(10, 60)
        .await
        .expect("discovery");

    // Then: Every window ran and the four dates come back newest first
    assert_eq!(outcome.windows, 5);
    assert_eq!(outcome.probes, 61);
    assert_eq!(outcome.dates.len(), 4);
    assert!(outcome.dates.windows(2).all(|pair| pair[0] > pair[1]));
}

#[tokio::test]
async fn when_both_url_shapes_serve_an_edition_system_reports_the_date_once() {
    // Given: 2026-01-08 published under both path shapes
    let client = Arc::new(
        published_weeks().route(format!("{BASE}/20260108/default.htm"), HttpResponse::ok(EDITION)),
    );

    // When: The system discovers editions
    let dates = discoverer(client).discover(4, 30).await.expect("discovery");

    // Then: Dates are unique and strictly descending
    assert_eq!(
        dates,
        vec![
            date("2026-01-08"),
            date("2025-12-31"),
            date("2025-12-24"),
            date("2025-12-17"),
        ]
    );
}

// =============================================================================
// Discovery: Probe Isolation and Validation
// =============================================================================

#[tokio::test]
async fn when_probes_fail_or_stall_system_treats_them_as_not_found() {
    // Given: A transport error, a server error and a stalled probe among real editions
    let inner = published_weeks()
        .route_error(edition_url("20260107"), HttpError::new("connection reset"))
        .route(edition_url("20260106"), HttpResponse::new(503, "busy"));
    let client = Arc::new(StallingClient {
        inner,
        stalled_url: edition_url("20260105"),
    });

    // When: The system discovers two dates
    let outcome = discoverer(client.clone())
        .discover_detailed(2, 13)
        .await
        .expect("discovery");

    // Then: Siblings of the failing probes are still found
    assert_eq!(outcome.dates, vec![date("2026-01-08"), date("2025-12-31")]);
    assert_eq!(outcome.probes, 14);

    // And: The stalled date still had its second path shape probed
    assert_eq!(
        client
            .inner
            .requests_to(&format!("{BASE}/20260105/default.htm")),
        1
    );
}

#[tokio::test]
async fn when_a_page_lacks_figures_system_does_not_count_it_as_an_edition() {
    // Given: A shell page with signatures but no tables on 2026-01-01
    let client = Arc::new(published_weeks().route(edition_url("20260101"), HttpResponse::ok(SHELL_PAGE)));

    // When: The system discovers editions in the first window
    let outcome = discoverer(client.clone())
        .discover_detailed(3, 13)
        .await
        .expect("discovery");

    // Then: The shell page is skipped
    assert_eq!(outcome.dates, vec![date("2026-01-08"), date("2025-12-31")]);
    assert_eq!(client.requests_to(&edition_url("20260101")), 1);
}

#[tokio::test]
async fn when_policy_disables_concurrency_system_rejects_the_request() {
    // Given: A policy with zero concurrency
    let client = Arc::new(published_weeks());
    let discoverer = ReleaseDiscoverer::new(client.clone(), SourceConfig::with_base_url(BASE))
        .with_policy(DiscoveryPolicy {
            max_concurrency: 0,
            ..fast_policy()
        });

    // When: The system discovers editions
    let error = discoverer.discover(2, 30).await.expect_err("invalid policy");

    // Then: Nothing was requested
    assert_eq!(error.code(), "discovery.invalid_request");
    assert!(client.recorded_requests().is_empty());
}

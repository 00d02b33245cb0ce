//! Behavior-driven tests for edition fetching
//!
//! These tests verify HOW the fetcher walks its three attempts: default
//! headers, an alternate language, then confirmation through the index page.

use std::sync::Arc;

use h41_core::{
    EditionFetcher, FetchError, FetchPolicy, FetchStage, HttpError, HttpResponse, IsoDate,
    RetryConfig, ScriptedHttpClient, SourceConfig,
};

const BASE: &str = "https://h41.test/releases/h41";
const EDITION_URL: &str = "https://h41.test/releases/h41/20260108/";
const LINKED_URL: &str = "https://h41.test/releases/h41/20260108/default.htm";
const INDEX_URL: &str = "https://h41.test/releases/h41/";
const EDITION: &str = include_str!("fixtures/h41_20260108.html");
const CONSENT_PAGE: &str = "<html><body>\
    <div>An official website of the United States government</div>\
    <p>Please review our cookie preferences to continue.</p>\
    </body></html>";
const INDEX_PAGE: &str = "<html><body><ul>\
    <li><a href=\"/releases/h41/20260108/default.htm\">January 8, 2026</a></li>\
    <li><a href=\"/releases/h41/20251231/\">December 31, 2025</a></li>\
    <li><a href=\"/releases/h41/20251224/\">December 24, 2025</a></li>\
    </ul></body></html>";

fn date(text: &str) -> IsoDate {
    IsoDate::parse(text).expect("valid date")
}

fn fetcher(client: &Arc<ScriptedHttpClient>) -> EditionFetcher {
    EditionFetcher::new(client.clone(), SourceConfig::with_base_url(BASE)).with_policy(FetchPolicy {
        retry: RetryConfig::immediate(),
        ..FetchPolicy::default()
    })
}

// =============================================================================
// Fetch: Happy Path
// =============================================================================

#[tokio::test]
async fn when_first_request_returns_the_edition_system_accepts_it_immediately() {
    // Given: The edition URL serves the real page
    let client = Arc::new(ScriptedHttpClient::new().route(EDITION_URL, HttpResponse::ok(EDITION)));

    // When: The system fetches the edition
    let fetched = fetcher(&client).fetch(date("2026-01-08")).await.expect("edition");

    // Then: One request was enough and the edition is described
    assert_eq!(fetched.stage, FetchStage::DefaultHeaders);
    assert_eq!(fetched.edition.publication_date, date("2026-01-08"));
    assert_eq!(fetched.edition.source_url, EDITION_URL);
    assert_eq!(fetched.signature_score, 4);
    assert_eq!(client.recorded_requests().len(), 1);
}

#[tokio::test]
async fn when_first_body_is_an_interstitial_system_retries_with_alternate_language() {
    // Given: A consent page first, then the edition
    let client = Arc::new(
        ScriptedHttpClient::new()
            .route(EDITION_URL, HttpResponse::ok(CONSENT_PAGE))
            .route(EDITION_URL, HttpResponse::ok(EDITION)),
    );
    let policy = FetchPolicy::default();

    // When: The system fetches the edition
    let fetched = fetcher(&client).fetch(date("2026-01-08")).await.expect("edition");

    // Then: The second attempt succeeded with a different Accept-Language
    assert_eq!(fetched.stage, FetchStage::AlternateLanguage);
    assert_eq!(fetched.stage.attempt(), 2);
    let requests = client.recorded_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].header("accept-language"),
        Some(policy.accept_language.as_str())
    );
    assert_eq!(
        requests[1].header("accept-language"),
        Some(policy.alternate_accept_language.as_str())
    );
}

#[tokio::test]
async fn when_both_direct_attempts_are_blocked_system_follows_the_index_link() {
    // Given: Consent pages at the edition URL and the edition behind the index link
    let client = Arc::new(
        ScriptedHttpClient::new()
            .route(EDITION_URL, HttpResponse::ok(CONSENT_PAGE))
            .route(INDEX_URL, HttpResponse::ok(INDEX_PAGE))
            .route(LINKED_URL, HttpResponse::ok(EDITION)),
    );

    // When: The system fetches the edition
    let fetched = fetcher(&client).fetch(date("2026-01-08")).await.expect("edition");

    // Then: The third attempt came through the index
    assert_eq!(fetched.stage, FetchStage::IndexConfirmed);
    assert_eq!(fetched.edition.source_url, LINKED_URL);
    assert_eq!(client.requests_to(EDITION_URL), 2);
    assert_eq!(client.requests_to(INDEX_URL), 1);
    assert_eq!(client.requests_to(LINKED_URL), 1);
}

#[tokio::test]
async fn when_first_attempt_fails_in_transport_system_still_tries_the_second() {
    // Given: A dropped connection, then the edition
    let client = Arc::new(
        ScriptedHttpClient::new()
            .route_error(EDITION_URL, HttpError::new("connection reset"))
            .route(EDITION_URL, HttpResponse::ok(EDITION)),
    );

    // When: The system fetches the edition
    let fetched = fetcher(&client).fetch(date("2026-01-08")).await.expect("edition");

    // Then: Attempt two produced it
    assert_eq!(fetched.stage, FetchStage::AlternateLanguage);
}

// =============================================================================
// Fetch: Typed Failures
// =============================================================================

#[tokio::test]
async fn when_index_does_not_list_the_date_system_reports_no_release() {
    // Given: Interstitials for 2026-01-01 and an index without 20260101
    let url = "https://h41.test/releases/h41/20260101/";
    let client = Arc::new(
        ScriptedHttpClient::new()
            .route(url, HttpResponse::ok(CONSENT_PAGE))
            .route(INDEX_URL, HttpResponse::ok(INDEX_PAGE)),
    );

    // When: The system fetches that date
    let error = fetcher(&client)
        .fetch(date("2026-01-01"))
        .await
        .expect_err("date is not published");

    // Then: The failure says the release does not exist, not that it was blocked
    assert_eq!(
        error,
        FetchError::NoReleaseForDate {
            date: date("2026-01-01")
        }
    );
    assert!(!error.retryable());
    assert_eq!(client.requests_to(url), 2);
}

#[tokio::test]
async fn when_every_attempt_yields_unexpected_html_system_reports_blocked_fetch() {
    // Given: The index lists the date but its link also serves a shell page
    let client = Arc::new(
        ScriptedHttpClient::new()
            .route(EDITION_URL, HttpResponse::ok(CONSENT_PAGE))
            .route(INDEX_URL, HttpResponse::ok(INDEX_PAGE))
            .route(LINKED_URL, HttpResponse::ok("<html><body>Loading...</body></html>")),
    );

    // When: The system fetches the edition
    let error = fetcher(&client)
        .fetch(date("2026-01-08"))
        .await
        .expect_err("no valid body");

    // Then: All three attempts are accounted for
    assert_eq!(
        error,
        FetchError::FetchBlockedOrUnexpectedHtml {
            url: EDITION_URL.to_owned(),
            attempts: 3,
        }
    );
    assert_eq!(error.code(), "fetch.blocked");
}

#[tokio::test]
async fn when_first_attempt_returns_an_error_status_system_stops_there() {
    // Given: The edition URL answers 404
    let client = Arc::new(ScriptedHttpClient::new().route(EDITION_URL, HttpResponse::new(404, "")));

    // When: The system fetches the edition
    let error = fetcher(&client)
        .fetch(date("2026-01-08"))
        .await
        .expect_err("status is final");

    // Then: No further attempts or index lookups happen
    assert_eq!(
        error,
        FetchError::HttpError {
            status: 404,
            url: EDITION_URL.to_owned(),
        }
    );
    assert_eq!(client.recorded_requests().len(), 1);
    assert_eq!(client.requests_to(INDEX_URL), 0);
}

#[tokio::test]
async fn when_index_is_unreachable_system_reports_transport_failure() {
    // Given: Interstitials and an index that cannot be reached
    let client = Arc::new(
        ScriptedHttpClient::new()
            .route(EDITION_URL, HttpResponse::ok(CONSENT_PAGE))
            .route_error(INDEX_URL, HttpError::new("dns lookup failed")),
    );

    // When: The system fetches the edition
    let error = fetcher(&client)
        .fetch(date("2026-01-08"))
        .await
        .expect_err("index unavailable");

    // Then: The error is a retryable transport failure
    assert!(matches!(error, FetchError::Transport { .. }));
    assert!(error.retryable());
}

#[tokio::test]
async fn when_index_returns_server_error_system_reports_transport_failure() {
    // Given: Interstitials and an index answering 503
    let client = Arc::new(
        ScriptedHttpClient::new()
            .route(EDITION_URL, HttpResponse::ok(CONSENT_PAGE))
            .route(INDEX_URL, HttpResponse::new(503, "busy")),
    );

    // When: The system fetches the edition
    let error = fetcher(&client)
        .fetch(date("2026-01-08"))
        .await
        .expect_err("index unavailable");

    // Then: The status is surfaced in the message
    match error {
        FetchError::Transport { message } => assert!(message.contains("503")),
        other => panic!("unexpected error: {other:?}"),
    }
}

//! Finding which calendar dates have a published edition.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::{ContentSignatures, DiscoveryPolicy, SourceConfig};
use crate::domain::IsoDate;
use crate::fetch::{declared_release_date, edition_links, looks_like_edition};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::throttling::ProbeThrottle;
use crate::{DiscoveryError, ValidationError};

/// Where the discovery anchor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSource {
    /// "Release Date" declared by the current-edition page.
    CurrentPage,
    /// Newest dated link on the index page.
    IndexPage,
}

impl AnchorSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentPage => "current-page",
            Self::IndexPage => "index-page",
        }
    }
}

/// Dates found plus how the walk went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    pub anchor: IsoDate,
    pub anchor_source: AnchorSource,
    /// Most recent first, at most the requested count.
    pub dates: Vec<IsoDate>,
    pub probes: usize,
    pub windows: usize,
}

#[derive(Debug)]
struct ProbeResult {
    date: IsoDate,
    found: bool,
}

/// Probes backward from an anchor date for published editions.
///
/// Candidate days are grouped into windows probed one window at a time;
/// within a window up to `max_concurrency` probes run at once. A probe that
/// fails or times out counts as "not found" without affecting its siblings.
pub struct ReleaseDiscoverer {
    client: Arc<dyn HttpClient>,
    source: SourceConfig,
    policy: DiscoveryPolicy,
    signatures: ContentSignatures,
    throttle: ProbeThrottle,
}

impl ReleaseDiscoverer {
    pub fn new(client: Arc<dyn HttpClient>, source: SourceConfig) -> Self {
        let policy = DiscoveryPolicy::default();
        Self {
            client,
            source,
            throttle: ProbeThrottle::per_second(policy.probes_per_second),
            policy,
            signatures: ContentSignatures::default(),
        }
    }

    pub fn with_policy(mut self, policy: DiscoveryPolicy) -> Self {
        self.throttle = ProbeThrottle::per_second(policy.probes_per_second);
        self.policy = policy;
        self
    }

    pub fn with_signatures(mut self, signatures: ContentSignatures) -> Self {
        self.signatures = signatures;
        self
    }

    /// Up to `target_count` edition dates within `lookback_days` of the
    /// anchor, most recent first.
    pub async fn discover(
        &self,
        target_count: usize,
        lookback_days: u32,
    ) -> Result<Vec<IsoDate>, DiscoveryError> {
        self.discover_detailed(target_count, lookback_days)
            .await
            .map(|outcome| outcome.dates)
    }

    pub async fn discover_detailed(
        &self,
        target_count: usize,
        lookback_days: u32,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        if target_count == 0 {
            return Err(ValidationError::ZeroValue {
                field: "target_count",
            }
            .into());
        }
        self.policy.validate()?;

        let (anchor, anchor_source) = self.establish_anchor().await?;
        info!(%anchor, ?anchor_source, target_count, lookback_days, "discovery anchored");

        let candidates: Vec<IsoDate> = (0..=i64::from(lookback_days))
            .filter_map(|offset| anchor.minus_days(offset))
            .collect();
        let window_size = usize::try_from(self.policy.window_days).unwrap_or(usize::MAX).max(1);

        let mut found = BTreeSet::new();
        let mut probes = 0;
        let mut windows = 0;
        for window in candidates.chunks(window_size) {
            windows += 1;
            let results: Vec<ProbeResult> = stream::iter(window.iter().copied())
                .map(|date| self.probe(date))
                .buffer_unordered(self.policy.max_concurrency)
                .collect()
                .await;
            probes += results.len();

            let hits = results.iter().filter(|result| result.found).count();
            found.extend(results.into_iter().filter(|result| result.found).map(|result| result.date));
            debug!(window = windows, probed = window.len(), hits, total = found.len(), "window probed");

            if found.len() >= target_count {
                break;
            }
        }

        let dates: Vec<IsoDate> = found.into_iter().rev().take(target_count).collect();
        info!(found = dates.len(), probes, windows, "discovery finished");
        Ok(DiscoveryOutcome {
            anchor,
            anchor_source,
            dates,
            probes,
            windows,
        })
    }

    /// Reads the current page's declared release date, falling back to the
    /// newest dated index link.
    pub async fn establish_anchor(&self) -> Result<(IsoDate, AnchorSource), DiscoveryError> {
        let current = self.get(&self.source.current_url).await;
        match &current {
            Ok(response) if response.is_success() => {
                if let Some(date) = declared_release_date(&response.body) {
                    return Ok((date, AnchorSource::CurrentPage));
                }
                warn!(url = %self.source.current_url, "current page declares no release date");
            }
            Ok(response) => {
                warn!(url = %self.source.current_url, status = response.status, "current page unavailable");
            }
            Err(message) => {
                warn!(url = %self.source.current_url, error = %message, "current page unreachable");
            }
        }

        let index = self
            .get(&self.source.index_url)
            .await
            .map_err(|message| DiscoveryError::AnchorUnavailable {
                reason: format!("index page unreachable: {message}"),
            })?;
        if !index.is_success() {
            return Err(DiscoveryError::AnchorUnavailable {
                reason: format!("index page returned status {}", index.status),
            });
        }
        edition_links(&index.body, &self.source.index_url)
            .first()
            .map(|link| (link.date, AnchorSource::IndexPage))
            .ok_or_else(|| DiscoveryError::AnchorUnavailable {
                reason: String::from("neither the current page nor the index names a release date"),
            })
    }

    async fn probe(&self, date: IsoDate) -> ProbeResult {
        for url in self.source.edition_urls(date) {
            self.throttle.acquire().await;
            let request = HttpRequest::get(&url).with_timeout_ms(self.source.timeout_ms);
            let response = match tokio::time::timeout(self.policy.probe_timeout, self.client.execute(request)).await {
                Ok(Ok(response)) => response,
                Ok(Err(error)) => {
                    debug!(%date, %url, error = %error, "probe failed");
                    continue;
                }
                Err(_) => {
                    debug!(%date, %url, "probe timed out");
                    continue;
                }
            };
            if response.is_success()
                && looks_like_edition(
                    &response.body,
                    &self.signatures,
                    self.policy.min_signatures,
                    self.policy.min_large_numbers,
                )
            {
                debug!(%date, %url, "edition found");
                return ProbeResult { date, found: true };
            }
        }
        ProbeResult { date, found: false }
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, String> {
        let request = HttpRequest::get(url).with_timeout_ms(self.source.timeout_ms);
        self.client
            .execute(request)
            .await
            .map_err(|error| error.message().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::ScriptedHttpClient;

    const BASE: &str = "https://example.test/h41";

    #[tokio::test]
    async fn zero_target_is_rejected_before_any_request() {
        let client = Arc::new(ScriptedHttpClient::new());
        let discoverer = ReleaseDiscoverer::new(client.clone(), SourceConfig::with_base_url(BASE));

        let error = discoverer.discover(0, 30).await.expect_err("invalid request");

        assert_eq!(error.code(), "discovery.invalid_request");
        assert!(client.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn index_link_anchors_when_current_page_is_silent() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .route(format!("{BASE}/current/"), HttpResponse::ok("<p>No date here</p>"))
                .route(
                    format!("{BASE}/"),
                    HttpResponse::ok(r#"<a href="20251231/">Dec 31</a><a href="20260108/">Jan 8</a>"#),
                ),
        );
        let discoverer = ReleaseDiscoverer::new(client, SourceConfig::with_base_url(BASE));

        let (anchor, source) = discoverer.establish_anchor().await.expect("anchor");

        assert_eq!(anchor, IsoDate::parse("2026-01-08").expect("date"));
        assert_eq!(source, AnchorSource::IndexPage);
    }
}

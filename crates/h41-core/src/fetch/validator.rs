//! Edition fetching with staged fallbacks and content validation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::index::link_for;
use super::signatures::{classify_content, ContentVerdict};
use crate::config::{ContentSignatures, FetchPolicy, SourceConfig};
use crate::domain::{Edition, IsoDate};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::FetchError;

const ATTEMPTS: u32 = 3;

/// Which stage produced the accepted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    DefaultHeaders,
    AlternateLanguage,
    IndexConfirmed,
}

impl FetchStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DefaultHeaders => "default-headers",
            Self::AlternateLanguage => "alternate-language",
            Self::IndexConfirmed => "index-confirmed",
        }
    }

    pub const fn attempt(self) -> u32 {
        match self {
            Self::DefaultHeaders => 1,
            Self::AlternateLanguage => 2,
            Self::IndexConfirmed => 3,
        }
    }
}

/// A validated edition document.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedEdition {
    pub edition: Edition,
    pub html: String,
    pub stage: FetchStage,
    pub signature_score: usize,
}

/// Fetches one edition by publication date.
///
/// Attempt 1 uses default headers and gives up immediately on a non-2xx
/// status. Attempt 2 retries with an alternate `Accept-Language`. Attempt 3
/// consults the index page: a date the index does not list is reported as
/// [`FetchError::NoReleaseForDate`]; a listed one is fetched from the linked
/// URL. Every 2xx body must carry enough signature phrases to be accepted.
pub struct EditionFetcher {
    client: Arc<dyn HttpClient>,
    source: SourceConfig,
    policy: FetchPolicy,
    signatures: ContentSignatures,
}

impl EditionFetcher {
    pub fn new(client: Arc<dyn HttpClient>, source: SourceConfig) -> Self {
        Self {
            client,
            source,
            policy: FetchPolicy::default(),
            signatures: ContentSignatures::default(),
        }
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_signatures(mut self, signatures: ContentSignatures) -> Self {
        self.signatures = signatures;
        self
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    pub async fn fetch(&self, date: IsoDate) -> Result<FetchedEdition, FetchError> {
        let [url, _] = self.source.edition_urls(date);
        let mut stage = FetchStage::DefaultHeaders;

        loop {
            match stage {
                FetchStage::DefaultHeaders => {
                    match self.get(&url, &self.policy.accept_language).await {
                        Ok(response) if !response.is_success() => {
                            warn!(%date, %url, status = response.status, "edition request rejected");
                            return Err(FetchError::HttpError {
                                status: response.status,
                                url,
                            });
                        }
                        Ok(response) => {
                            if let Some(fetched) = self.accept(date, &url, response, stage) {
                                return Ok(fetched);
                            }
                        }
                        Err(message) => {
                            warn!(%date, %url, error = %message, "edition request failed");
                        }
                    }
                    stage = FetchStage::AlternateLanguage;
                }
                FetchStage::AlternateLanguage => {
                    self.pause(1).await;
                    match self.get(&url, &self.policy.alternate_accept_language).await {
                        Ok(response) if response.is_success() => {
                            if let Some(fetched) = self.accept(date, &url, response, stage) {
                                return Ok(fetched);
                            }
                        }
                        Ok(response) => {
                            debug!(%date, status = response.status, "alternate-language request rejected");
                        }
                        Err(message) => {
                            warn!(%date, %url, error = %message, "alternate-language request failed");
                        }
                    }
                    stage = FetchStage::IndexConfirmed;
                }
                FetchStage::IndexConfirmed => {
                    self.pause(2).await;
                    return self.confirm_via_index(date, &url).await;
                }
            }
        }
    }

    async fn confirm_via_index(&self, date: IsoDate, url: &str) -> Result<FetchedEdition, FetchError> {
        let index_url = &self.source.index_url;
        let index = self
            .get(index_url, &self.policy.accept_language)
            .await
            .map_err(|message| FetchError::Transport { message })?;
        if !index.is_success() {
            return Err(FetchError::Transport {
                message: format!("index page {index_url} returned status {}", index.status),
            });
        }

        let Some(link) = link_for(&index.body, index_url, date) else {
            info!(%date, "index lists no edition for date");
            return Err(FetchError::NoReleaseForDate { date });
        };

        match self.get(&link.url, &self.policy.accept_language).await {
            Ok(response) if response.is_success() => {
                if let Some(fetched) = self.accept(date, &link.url, response, FetchStage::IndexConfirmed) {
                    return Ok(fetched);
                }
            }
            Ok(response) => {
                debug!(%date, url = %link.url, status = response.status, "indexed edition rejected");
            }
            Err(message) => {
                warn!(%date, url = %link.url, error = %message, "indexed edition request failed");
            }
        }

        Err(FetchError::FetchBlockedOrUnexpectedHtml {
            url: url.to_owned(),
            attempts: ATTEMPTS,
        })
    }

    fn accept(
        &self,
        date: IsoDate,
        url: &str,
        response: HttpResponse,
        stage: FetchStage,
    ) -> Option<FetchedEdition> {
        let verdict = classify_content(&response.body, &self.signatures, self.policy.min_signatures);
        match verdict {
            ContentVerdict::Valid { score } => {
                info!(%date, %url, attempt = stage.attempt(), score, "edition accepted");
                Some(FetchedEdition {
                    edition: Edition::new(date, url),
                    html: response.body,
                    stage,
                    signature_score: score,
                })
            }
            ContentVerdict::BannerOnly { score } => {
                warn!(%date, %url, attempt = stage.attempt(), score, "interstitial page instead of edition");
                None
            }
            ContentVerdict::MissingSignatures { score } => {
                warn!(%date, %url, attempt = stage.attempt(), score, "edition signatures missing");
                None
            }
        }
    }

    async fn get(&self, url: &str, accept_language: &str) -> Result<HttpResponse, String> {
        let request = HttpRequest::get(url)
            .with_header("accept", "text/html,application/xhtml+xml")
            .with_header("accept-language", accept_language)
            .with_timeout_ms(self.source.timeout_ms);
        self.client
            .execute(request)
            .await
            .map_err(|error| error.message().to_owned())
    }

    async fn pause(&self, attempt: u32) {
        let delay = self.policy.retry.delay_for_attempt(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, ScriptedHttpClient};
    use crate::retry::RetryConfig;

    const BASE: &str = "https://example.test/h41";
    const EDITION: &str = "<h1>H.4.1</h1><h2>Factors Affecting Reserve Balances</h2>";

    fn fetcher(client: Arc<ScriptedHttpClient>) -> EditionFetcher {
        EditionFetcher::new(client, SourceConfig::with_base_url(BASE)).with_policy(FetchPolicy {
            retry: RetryConfig::immediate(),
            ..FetchPolicy::default()
        })
    }

    fn date() -> IsoDate {
        IsoDate::parse("2026-01-08").expect("valid date")
    }

    #[tokio::test]
    async fn first_attempt_success_sends_default_language() {
        let client = Arc::new(
            ScriptedHttpClient::new().route(format!("{BASE}/20260108/"), HttpResponse::ok(EDITION)),
        );

        let fetched = fetcher(client.clone()).fetch(date()).await.expect("edition");

        assert_eq!(fetched.stage, FetchStage::DefaultHeaders);
        assert_eq!(fetched.edition.publication_date, date());
        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].header("accept-language"), Some("en-US,en;q=0.9"));
    }

    #[tokio::test]
    async fn transport_error_moves_to_alternate_language() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .route_error(format!("{BASE}/20260108/"), HttpError::new("connection reset"))
                .route(format!("{BASE}/20260108/"), HttpResponse::ok(EDITION)),
        );

        let fetched = fetcher(client.clone()).fetch(date()).await.expect("edition");

        assert_eq!(fetched.stage, FetchStage::AlternateLanguage);
        let requests = client.recorded_requests();
        assert_eq!(requests[1].header("accept-language"), Some("en-GB,en;q=0.8,*;q=0.5"));
    }

    #[tokio::test]
    async fn hard_status_on_first_attempt_is_final() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .route(format!("{BASE}/20260108/"), HttpResponse::new(503, "unavailable")),
        );

        let error = fetcher(client.clone()).fetch(date()).await.expect_err("http error");

        assert_eq!(
            error,
            FetchError::HttpError {
                status: 503,
                url: format!("{BASE}/20260108/"),
            }
        );
        assert_eq!(client.recorded_requests().len(), 1);
    }
}

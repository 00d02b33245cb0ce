//! Publisher endpoints and tuning policies.
//!
//! Every constant the engine relies on lives here with a default, so a
//! redesigned publisher page or a stricter crawl budget is a configuration
//! change rather than a code change.

use std::time::Duration;

use crate::domain::IsoDate;
use crate::retry::RetryConfig;
use crate::ValidationError;

pub const DEFAULT_BASE_URL: &str = "https://www.federalreserve.gov/releases/h41";

/// Where editions and the rolling index live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub base_url: String,
    /// Page that always shows the most recent edition.
    pub current_url: String,
    /// Page listing recent editions as `YYYYMMDD` links.
    pub index_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl SourceConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_owned();
        Self {
            current_url: format!("{base_url}/current/"),
            index_url: format!("{base_url}/"),
            base_url,
            user_agent: concat!("h41/", env!("CARGO_PKG_VERSION")).to_owned(),
            timeout_ms: 5_000,
        }
    }

    /// Applies `H41_BASE_URL` and `H41_TIMEOUT_MS` when set.
    pub fn from_env() -> Result<Self, ValidationError> {
        let mut config = match std::env::var("H41_BASE_URL") {
            Ok(base_url) => Self::with_base_url(&base_url),
            Err(_) => Self::default(),
        };
        if let Some(timeout_ms) = std::env::var("H41_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
        {
            config.timeout_ms = timeout_ms;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for url in [&self.base_url, &self.current_url, &self.index_url] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ValidationError::InvalidUrl { value: url.clone() });
            }
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::ZeroValue { field: "timeout_ms" });
        }
        Ok(())
    }

    /// Both path shapes an edition may be published under, preferred first.
    pub fn edition_urls(&self, date: IsoDate) -> [String; 2] {
        let compact = date.format_compact();
        [
            format!("{}/{compact}/", self.base_url),
            format!("{}/{compact}/default.htm", self.base_url),
        ]
    }
}

/// Phrases that identify a genuine edition page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSignatures {
    /// Title token, top-level section heading, and well-known line items.
    pub phrases: Vec<String>,
    /// Generic site banner that interstitial and consent pages also carry.
    pub banner: String,
}

impl Default for ContentSignatures {
    fn default() -> Self {
        Self {
            phrases: vec![
                String::from("H.4.1"),
                String::from("Factors Affecting Reserve Balances"),
                String::from("Reserve Bank credit"),
                String::from("Securities held outright"),
            ],
            banner: String::from("official website of the United States government"),
        }
    }
}

/// Fetch-validator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPolicy {
    pub retry: RetryConfig,
    pub accept_language: String,
    /// Header sent on the second attempt to sidestep locale-keyed interstitials.
    pub alternate_accept_language: String,
    pub min_signatures: usize,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            accept_language: String::from("en-US,en;q=0.9"),
            alternate_accept_language: String::from("en-GB,en;q=0.8,*;q=0.5"),
            min_signatures: 2,
        }
    }
}

/// Release-discovery settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryPolicy {
    pub window_days: u32,
    pub max_concurrency: usize,
    pub probe_timeout: Duration,
    pub probes_per_second: u32,
    pub min_signatures: usize,
    /// Minimum count of thousands-separated figures a real edition carries.
    pub min_large_numbers: usize,
}

impl Default for DiscoveryPolicy {
    fn default() -> Self {
        Self {
            window_days: 14,
            max_concurrency: 5,
            probe_timeout: Duration::from_secs(4),
            probes_per_second: 10,
            min_signatures: 2,
            min_large_numbers: 10,
        }
    }
}

impl DiscoveryPolicy {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.window_days == 0 {
            return Err(ValidationError::ZeroValue { field: "window_days" });
        }
        if self.max_concurrency == 0 {
            return Err(ValidationError::ZeroValue {
                field: "max_concurrency",
            });
        }
        if self.probes_per_second == 0 {
            return Err(ValidationError::ZeroValue {
                field: "probes_per_second",
            });
        }
        Ok(())
    }
}

/// Extraction and comparison settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPolicy {
    pub yoy_target_days: i64,
    pub yoy_tolerance_days: i64,
    pub wow_target_days: i64,
    pub wow_tolerance_days: i64,
    /// Characters scanned after a label by the text-window fallback.
    pub text_window_chars: usize,
    pub enable_text_fallback: bool,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            yoy_target_days: 364,
            yoy_tolerance_days: 14,
            wow_target_days: 7,
            wow_tolerance_days: 3,
            text_window_chars: 400,
            enable_text_fallback: true,
        }
    }
}

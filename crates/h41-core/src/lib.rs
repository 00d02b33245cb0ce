//! # H.4.1 Core
//!
//! Release discovery, fetch validation and table extraction for the
//! Federal Reserve's weekly H.4.1 release ("Factors Affecting Reserve
//! Balances").
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Publisher endpoints and tuning policies |
//! | [`discovery`] | Windowed, rate-limited probing for published dates |
//! | [`domain`] | Dates, editions, field specs and extracted values |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`extract`] | Table location, row/column resolution and derived metrics |
//! | [`fetch`] | Staged edition fetching with content validation |
//! | [`http_client`] | HTTP client abstraction |
//! | [`retry`] | Backoff between fetch attempts |
//! | [`throttling`] | Shared probe rate limit |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use h41_core::{EditionFetcher, Extractor, IsoDate, ReqwestHttpClient, SourceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = EditionFetcher::new(Arc::new(ReqwestHttpClient::default()), SourceConfig::default());
//!     let fetched = fetcher.fetch(IsoDate::parse("2026-01-08")?).await?;
//!
//!     let extraction = Extractor::default().extract("2026-01-08", &fetched.html)?;
//!     if let Some(total) = extraction.field("totalAssets").and_then(|value| value.current) {
//!         println!("total assets: {total}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ ReleaseDiscoverer│────▶│ ProbeThrottle    │
//! └────────┬─────────┘     └──────────────────┘
//!          │ dates
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ EditionFetcher   │────▶│ HttpClient       │
//! └────────┬─────────┘     │ (reqwest/script) │
//!          │ html          └──────────────────┘
//!          ▼
//! ┌──────────────────┐
//! │ Extractor        │ TableLocator → rows → columns → values
//! └──────────────────┘
//! ```

pub mod config;
pub mod discovery;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod http_client;
pub mod retry;
pub mod throttling;

pub use config::{
    ContentSignatures, DiscoveryPolicy, ExtractionPolicy, FetchPolicy, SourceConfig,
    DEFAULT_BASE_URL,
};
pub use discovery::{AnchorSource, DiscoveryOutcome, ReleaseDiscoverer};
pub use domain::{
    percent_change, Edition, ExtractedValue, FieldMode, FieldSpec, HistoricalSnapshot, IsoDate,
    SourceDates, UtcDateTime,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{CoreError, DiscoveryError, FetchError, ValidationError};
pub use extract::{
    default_field_specs, extract, extract_with_history, parse_cell, Extraction,
    ExtractionStrategy, Extractor, FieldIssue, LogicalColumn, MatchedRow, ReportEntry,
    ValidationReport,
};
pub use fetch::{EditionFetcher, FetchStage, FetchedEdition};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, ScriptedHttpClient,
};
pub use retry::{Backoff, RetryConfig};
pub use throttling::ProbeThrottle;

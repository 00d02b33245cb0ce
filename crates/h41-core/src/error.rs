use thiserror::Error;

use crate::domain::IsoDate;

/// Validation and contract errors exposed by `h41-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("date must be a calendar date in YYYY-MM-DD form: '{value}'")]
    InvalidIsoDate { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("url must start with http:// or https://: '{value}'")]
    InvalidUrl { value: String },

    #[error("field '{field}' must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Typed failure for "could not even get the document".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("no release published for {date}")]
    NoReleaseForDate { date: IsoDate },

    #[error("fetch blocked or unexpected html at {url} after {attempts} attempts")]
    FetchBlockedOrUnexpectedHtml { url: String, attempts: u32 },

    #[error("http status {status} from {url}")]
    HttpError { status: u16, url: String },

    #[error("transport failure: {message}")]
    Transport { message: String },
}

impl FetchError {
    /// Whether a later retry may succeed. Client errors and confirmed
    /// missing releases are final.
    pub const fn retryable(&self) -> bool {
        match self {
            Self::NoReleaseForDate { .. } => false,
            Self::FetchBlockedOrUnexpectedHtml { .. } => true,
            Self::HttpError { status, .. } => *status >= 500,
            Self::Transport { .. } => true,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoReleaseForDate { .. } => "fetch.no_release",
            Self::FetchBlockedOrUnexpectedHtml { .. } => "fetch.blocked",
            Self::HttpError { .. } => "fetch.http_status",
            Self::Transport { .. } => "fetch.transport",
        }
    }
}

/// Failure of release discovery as a whole.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("could not establish the discovery anchor: {reason}")]
    AnchorUnavailable { reason: String },

    #[error(transparent)]
    InvalidRequest(#[from] ValidationError),
}

impl DiscoveryError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AnchorUnavailable { .. } => "discovery.anchor_unavailable",
            Self::InvalidRequest(_) => "discovery.invalid_request",
        }
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

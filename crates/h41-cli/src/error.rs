use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] h41_core::ValidationError),

    #[error(transparent)]
    Fetch(#[from] h41_core::FetchError),

    #[error(transparent)]
    Discovery(#[from] h41_core::DiscoveryError),

    #[error("strict mode failed: warnings={warning_count}, errors={error_count}")]
    StrictModeViolation {
        warning_count: usize,
        error_count: usize,
    },

    #[error("history file {path}: {message}")]
    History { path: String, message: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Serialization(_) => 4,
            Self::StrictModeViolation { .. } => 5,
            Self::Fetch(_) | Self::Discovery(_) => 6,
            Self::History { .. } | Self::Io(_) => 10,
        }
    }
}

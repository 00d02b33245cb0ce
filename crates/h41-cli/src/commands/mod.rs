mod discover;
mod extract;
mod fetch;

use std::sync::Arc;
use std::time::Instant;

use h41_core::{Envelope, EnvelopeError, HttpClient, ReqwestHttpClient, SourceConfig};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();
    let source = source_config(cli)?;
    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new(&source.user_agent));

    let CommandResult {
        data,
        warnings,
        errors,
    } = match &cli.command {
        Command::Discover(args) => discover::run(args, client, source).await?,
        Command::Fetch(args) => fetch::run(args, client, source).await?,
        Command::Extract(args) => extract::run(args, client, source).await?,
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut metadata = Metadata::new(latency_ms);
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let meta = metadata.into_envelope_meta()?;
    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

/// Environment first, then command-line overrides.
fn source_config(cli: &Cli) -> Result<SourceConfig, CliError> {
    let mut source = SourceConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        let timeout_ms = source.timeout_ms;
        source = SourceConfig::with_base_url(base_url);
        source.timeout_ms = timeout_ms;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        source.timeout_ms = timeout_ms;
    }
    source.validate()?;
    Ok(source)
}

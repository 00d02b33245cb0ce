use std::sync::Arc;

use h41_core::{Edition, EditionFetcher, HttpClient, IsoDate, SourceConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::FetchArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchResponseData {
    edition: Edition,
    stage: &'static str,
    attempt: u32,
    signature_score: usize,
    bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
}

pub async fn run(
    args: &FetchArgs,
    client: Arc<dyn HttpClient>,
    source: SourceConfig,
) -> Result<CommandResult, CliError> {
    let date = IsoDate::parse(&args.date)?;
    let fetched = EditionFetcher::new(client, source).fetch(date).await?;

    let saved_to = match &args.out {
        Some(path) => {
            std::fs::write(path, &fetched.html)?;
            info!(path = %path.display(), "edition saved");
            Some(path.display().to_string())
        }
        None => None,
    };

    let data = serde_json::to_value(FetchResponseData {
        bytes: fetched.html.len(),
        edition: fetched.edition,
        stage: fetched.stage.as_str(),
        attempt: fetched.stage.attempt(),
        signature_score: fetched.signature_score,
        saved_to,
    })?;
    Ok(CommandResult::ok(data))
}

use std::collections::BTreeMap;
use std::sync::Arc;

use h41_core::extract::DerivedMetrics;
use h41_core::{
    Edition, EditionFetcher, EnvelopeError, ExtractedValue, Extractor, HttpClient, IsoDate,
    SourceConfig, ValidationReport,
};
use serde::Serialize;
use tracing::info;

use crate::cli::ExtractArgs;
use crate::error::CliError;
use crate::history::HistoryFile;

use super::CommandResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractResponseData {
    edition: Edition,
    ok: bool,
    as_of_date: IsoDate,
    fields: BTreeMap<String, ExtractedValue>,
    derived: DerivedMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<ValidationReport>,
}

pub async fn run(
    args: &ExtractArgs,
    client: Arc<dyn HttpClient>,
    source: SourceConfig,
) -> Result<CommandResult, CliError> {
    let date = IsoDate::parse(&args.date)?;
    let (html, edition) = match &args.html {
        Some(path) => {
            let html = std::fs::read_to_string(path)?;
            (html, Edition::new(date, format!("file://{}", path.display())))
        }
        None => {
            let fetched = EditionFetcher::new(client, source).fetch(date).await?;
            (fetched.html, fetched.edition)
        }
    };

    let history = args.history.as_ref().map(HistoryFile::new);
    let snapshots = match &history {
        Some(history) => history.load()?,
        None => Vec::new(),
    };

    let extraction = Extractor::default().extract_with_history(&args.date, &html, &snapshots)?;

    if args.record {
        if let Some(history) = &history {
            let stored = history.record(extraction.to_snapshot())?;
            info!(path = %history.path().display(), stored, "snapshot recorded");
        }
    }

    let errors = if extraction.ok {
        Vec::new()
    } else {
        vec![EnvelopeError::new("extract.no_tables", "edition document contains no tables")?
            .with_retryable(false)]
    };

    let warnings = extraction.warnings.clone();
    let data = serde_json::to_value(ExtractResponseData {
        edition: edition.with_as_of_date(extraction.as_of_date),
        ok: extraction.ok,
        as_of_date: extraction.as_of_date,
        fields: extraction.fields,
        derived: extraction.derived,
        report: args.report.then_some(extraction.report),
    })?;

    Ok(CommandResult::ok(data)
        .with_warnings(warnings)
        .with_errors(errors))
}

use std::sync::Arc;

use h41_core::{DiscoveryPolicy, HttpClient, IsoDate, ReleaseDiscoverer, SourceConfig};
use serde::Serialize;

use crate::cli::DiscoverArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiscoverResponseData {
    anchor: IsoDate,
    anchor_source: &'static str,
    dates: Vec<IsoDate>,
    probes: usize,
    windows: usize,
}

pub async fn run(
    args: &DiscoverArgs,
    client: Arc<dyn HttpClient>,
    source: SourceConfig,
) -> Result<CommandResult, CliError> {
    let mut policy = DiscoveryPolicy::default();
    if let Some(window_days) = args.window_days {
        policy.window_days = window_days;
    }
    if let Some(concurrency) = args.concurrency {
        policy.max_concurrency = concurrency;
    }

    let outcome = ReleaseDiscoverer::new(client, source)
        .with_policy(policy)
        .discover_detailed(args.count, args.lookback_days)
        .await?;

    let mut warnings = Vec::new();
    if outcome.dates.len() < args.count {
        warnings.push(format!(
            "found {} of {} requested editions within {} days",
            outcome.dates.len(),
            args.count,
            args.lookback_days
        ));
    }

    let data = serde_json::to_value(DiscoverResponseData {
        anchor: outcome.anchor,
        anchor_source: outcome.anchor_source.as_str(),
        dates: outcome.dates,
        probes: outcome.probes,
        windows: outcome.windows,
    })?;
    Ok(CommandResult::ok(data).with_warnings(warnings))
}

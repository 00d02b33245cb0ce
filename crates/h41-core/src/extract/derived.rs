//! Ratios and group totals computed from extracted fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::fields::{
    CURRENCY, LIQUIDITY_SWAPS, MORTGAGE_BACKED, PRIMARY_CREDIT, REPURCHASE_AGREEMENTS,
    REVERSE_REPOS, SECURITIES_HELD, TOTAL_ASSETS, TREASURY_GENERAL_ACCOUNT, TREASURY_SECURITIES,
};
use crate::domain::{ExtractedValue, HistoricalSnapshot, IsoDate, SourceDates};

/// Fields reported as a share of [`TOTAL_ASSETS`].
pub const COMPOSITION_COMPONENTS: [&str; 5] = [
    SECURITIES_HELD,
    TREASURY_SECURITIES,
    MORTGAGE_BACKED,
    REPURCHASE_AGREEMENTS,
    LIQUIDITY_SWAPS,
];

/// A signed sum over member fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeGroup {
    pub key: &'static str,
    pub members: &'static [(&'static str, f64)],
}

pub const COMPOSITE_GROUPS: [CompositeGroup; 3] = [
    CompositeGroup {
        key: "liquidityFacilities",
        members: &[
            (REPURCHASE_AGREEMENTS, 1.0),
            (PRIMARY_CREDIT, 1.0),
            (LIQUIDITY_SWAPS, 1.0),
        ],
    },
    CompositeGroup {
        key: "reserveDrains",
        members: &[
            (TREASURY_GENERAL_ACCOUNT, 1.0),
            (REVERSE_REPOS, 1.0),
            (CURRENCY, 1.0),
        ],
    },
    CompositeGroup {
        key: "netLiquidity",
        members: &[
            (TOTAL_ASSETS, 1.0),
            (TREASURY_GENERAL_ACCOUNT, -1.0),
            (REVERSE_REPOS, -1.0),
        ],
    },
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Percent of total assets per component key.
    pub composition: BTreeMap<String, f64>,
    pub groups: BTreeMap<String, ExtractedValue>,
}

/// Snapshot dated closest to `as_of - target_days`, if within `tolerance_days`.
///
/// Equally distant snapshots resolve to the one listed first.
pub fn select_snapshot(
    snapshots: &[HistoricalSnapshot],
    as_of: IsoDate,
    target_days: i64,
    tolerance_days: i64,
) -> Option<&HistoricalSnapshot> {
    let target = as_of.minus_days(target_days)?;
    let closest = snapshots
        .iter()
        .min_by_key(|snapshot| snapshot.date.abs_days_between(target))?;
    let offset = closest.date.abs_days_between(target);
    if offset <= tolerance_days {
        debug!(%as_of, snapshot = %closest.date, offset, "snapshot matched");
        Some(closest)
    } else {
        debug!(%as_of, snapshot = %closest.date, offset, tolerance_days, "nearest snapshot outside tolerance");
        None
    }
}

/// Each present component as a percent of total assets; zero when the total
/// is missing or zero.
pub fn composition(fields: &BTreeMap<String, ExtractedValue>) -> BTreeMap<String, f64> {
    let total = fields.get(TOTAL_ASSETS).and_then(|value| value.current);
    COMPOSITION_COMPONENTS
        .iter()
        .filter_map(|key| {
            let component = fields.get(*key)?.current?;
            let share = match total {
                Some(total) if total != 0.0 => component / total * 100.0,
                _ => 0.0,
            };
            Some(((*key).to_owned(), share))
        })
        .collect()
}

/// Group totals with changes measured against snapshot sums rather than the
/// members' own reported changes.
///
/// `labels` maps field keys to the row labels snapshots are keyed by.
pub fn group_totals(
    fields: &BTreeMap<String, ExtractedValue>,
    labels: &BTreeMap<String, String>,
    weekly: Option<&HistoricalSnapshot>,
    yearly: Option<&HistoricalSnapshot>,
    as_of: Option<IsoDate>,
) -> BTreeMap<String, ExtractedValue> {
    COMPOSITE_GROUPS
        .iter()
        .map(|group| {
            let current = signed_sum(group, |key| fields.get(key).and_then(|value| value.current));
            let change_against = |snapshot: Option<&HistoricalSnapshot>| {
                let snapshot = snapshot?;
                let prior = signed_sum(group, |key| {
                    labels.get(key).and_then(|label| snapshot.value(label))
                })?;
                Some((current? - prior, snapshot.date))
            };
            let weekly_change = change_against(weekly);
            let yearly_change = change_against(yearly);
            let value = ExtractedValue::new(
                current,
                weekly_change.map(|(change, _)| change),
                yearly_change.map(|(change, _)| change),
                SourceDates {
                    current: as_of,
                    weekly: weekly_change.map(|(_, date)| date),
                    yearly: yearly_change.map(|(_, date)| date),
                },
            );
            (group.key.to_owned(), value)
        })
        .collect()
}

/// `None` unless every member has a value.
fn signed_sum(group: &CompositeGroup, value_of: impl Fn(&str) -> Option<f64>) -> Option<f64> {
    group
        .members
        .iter()
        .map(|&(key, sign)| value_of(key).map(|value| value * sign))
        .sum()
}

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::{IsoDate, UtcDateTime};

/// One weekly publication of the release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edition {
    pub publication_date: IsoDate,
    /// Balance date the figures describe; known only once the tables are read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_date: Option<IsoDate>,
    pub source_url: String,
    pub fetched_at: UtcDateTime,
}

impl Edition {
    pub fn new(publication_date: IsoDate, source_url: impl Into<String>) -> Self {
        Self {
            publication_date,
            as_of_date: None,
            source_url: source_url.into(),
            fetched_at: UtcDateTime::now(),
        }
    }

    pub fn with_as_of_date(mut self, as_of_date: IsoDate) -> Self {
        self.as_of_date = Some(as_of_date);
        self
    }
}

/// Column semantics applied when resolving a field's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldMode {
    /// Averages-of-daily-figures tables with "change from week ended" columns.
    WeeklyFactors,
    /// Statement-of-condition tables with "Wednesday" and "change since" columns.
    Statement,
}

impl FieldMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WeeklyFactors => "weekly-factors",
            Self::Statement => "statement",
        }
    }
}

impl Display for FieldMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named datum to extract from an edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub key: String,
    pub table_title_hint: String,
    /// Acceptable row labels, most specific first.
    pub row_label_candidates: Vec<String>,
    pub mode: FieldMode,
}

impl FieldSpec {
    pub fn new(
        key: impl Into<String>,
        table_title_hint: impl Into<String>,
        mode: FieldMode,
        row_label_candidates: &[&str],
    ) -> Self {
        Self {
            key: key.into(),
            table_title_hint: table_title_hint.into(),
            row_label_candidates: row_label_candidates
                .iter()
                .map(|label| (*label).to_owned())
                .collect(),
            mode,
        }
    }

    /// Label used to key this field inside historical snapshots.
    pub fn primary_label(&self) -> &str {
        self.row_label_candidates
            .first()
            .map(String::as_str)
            .unwrap_or(self.key.as_str())
    }
}

/// Header dates backing each value of an [`ExtractedValue`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<IsoDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly: Option<IsoDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yearly: Option<IsoDate>,
}

/// Result of applying one [`FieldSpec`] to one edition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedValue {
    pub current: Option<f64>,
    pub weekly_change: Option<f64>,
    pub yearly_change: Option<f64>,
    pub weekly_change_percent: Option<f64>,
    pub yearly_change_percent: Option<f64>,
    pub source_dates: SourceDates,
}

impl ExtractedValue {
    pub fn new(
        current: Option<f64>,
        weekly_change: Option<f64>,
        yearly_change: Option<f64>,
        source_dates: SourceDates,
    ) -> Self {
        Self {
            current,
            weekly_change,
            yearly_change,
            weekly_change_percent: percent_change(current, weekly_change),
            yearly_change_percent: percent_change(current, yearly_change),
            source_dates,
        }
    }

    pub fn no_data() -> Self {
        Self::default()
    }

    pub fn with_yearly_change(self, yearly_change: Option<f64>, yearly: Option<IsoDate>) -> Self {
        let source_dates = SourceDates {
            yearly,
            ..self.source_dates
        };
        Self::new(self.current, self.weekly_change, yearly_change, source_dates)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.weekly_change.is_none() && self.yearly_change.is_none()
    }
}

/// Relative change measured against the prior value `current - change`.
///
/// A zero prior value yields `0` rather than an infinite or NaN percentage.
pub fn percent_change(current: Option<f64>, change: Option<f64>) -> Option<f64> {
    let (current, change) = (current?, change?);
    let prior = current - change;
    if prior == 0.0 {
        return Some(0.0);
    }
    Some(change / prior * 100.0)
}

/// A prior edition's values keyed by row label, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSnapshot {
    pub date: IsoDate,
    pub fields: BTreeMap<String, f64>,
}

impl HistoricalSnapshot {
    pub fn new(date: IsoDate, fields: BTreeMap<String, f64>) -> Self {
        Self { date, fields }
    }

    pub fn value(&self, row_label: &str) -> Option<f64> {
        self.fields.get(row_label).copied()
    }
}

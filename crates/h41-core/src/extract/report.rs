//! Per-field trace of how each value was located.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::columns::ColumnSelection;
use crate::domain::FieldMode;

/// How a field's figures were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    Structural,
    TextWindow,
    Unresolved,
}

/// Why a field's structural lookup stopped short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldIssue {
    TableNotFound,
    RowNotFound,
    ColumnNotFound,
}

impl FieldIssue {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TableNotFound => "table not found",
            Self::RowNotFound => "row not found",
            Self::ColumnNotFound => "column not found",
        }
    }
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowTrace {
    pub table_ordinal: usize,
    pub label: String,
    pub score: u8,
    pub candidate: usize,
}

/// Raw cell text behind each reported figure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCells {
    pub current: Option<String>,
    pub weekly: Option<String>,
    pub yearly: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub key: String,
    pub mode: FieldMode,
    pub strategy: ExtractionStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_ordinal: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<RowTrace>,
    pub columns: ColumnSelection,
    pub raw: RawCells,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<FieldIssue>,
    /// Yearly change came from a caller-supplied snapshot.
    #[serde(default)]
    pub yearly_from_history: bool,
}

impl ReportEntry {
    pub fn new(key: impl Into<String>, mode: FieldMode) -> Self {
        Self {
            key: key.into(),
            mode,
            strategy: ExtractionStrategy::Unresolved,
            table_ordinal: None,
            row: None,
            columns: ColumnSelection::default(),
            raw: RawCells::default(),
            issue: None,
            yearly_from_history: false,
        }
    }

    /// Warning line for this entry, if it carries an issue.
    pub fn warning(&self) -> Option<String> {
        self.issue.map(|issue| match self.strategy {
            ExtractionStrategy::TextWindow => {
                format!("{}: {issue}; recovered from page text", self.key)
            }
            _ => format!("{}: {issue}", self.key),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub table_count: usize,
    pub entries: Vec<ReportEntry>,
}

impl ValidationReport {
    pub fn entry(&self, key: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }
}

//! Header grid flattening and date-column selection.

use serde::{Deserialize, Serialize};

use super::document::TableCell;
use super::label::normalize_label;
use crate::domain::{FieldMode, IsoDate};

/// One column of a table after rowspan/colspan expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalColumn {
    pub index: usize,
    /// Every header cell covering this column, top to bottom.
    pub header_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_date: Option<IsoDate>,
}

impl LogicalColumn {
    fn normalized(&self) -> String {
        normalize_label(&self.header_text)
    }

    fn has_marker(&self, markers: &[String]) -> bool {
        let header = self.normalized();
        markers
            .iter()
            .map(|marker| normalize_label(marker))
            .any(|marker| !marker.is_empty() && header.contains(&marker))
    }
}

/// Header phrases that give columns their role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMarkers {
    pub average: Vec<String>,
    pub period: Vec<String>,
    pub weekly_change: Vec<String>,
    pub as_of: Vec<String>,
    pub statement_change: Vec<String>,
}

impl Default for ColumnMarkers {
    fn default() -> Self {
        Self {
            average: vec![
                String::from("averages of daily figures"),
                String::from("average"),
            ],
            period: vec![String::from("week ended")],
            weekly_change: vec![String::from("change from")],
            as_of: vec![String::from("wednesday")],
            statement_change: vec![String::from("change since")],
        }
    }
}

impl ColumnMarkers {
    fn change_markers(&self, mode: FieldMode) -> &[String] {
        match mode {
            FieldMode::WeeklyFactors => &self.weekly_change,
            FieldMode::Statement => &self.statement_change,
        }
    }
}

/// Columns chosen for a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSelection {
    pub current: Option<LogicalColumn>,
    pub weekly: Option<LogicalColumn>,
    pub yearly: Option<LogicalColumn>,
}

/// Flattens stacked header rows into logical columns.
///
/// Cells spanning several columns contribute their text to each; cells
/// spanning several rows block the columns they cover in later rows. A
/// column's date is the last month-name date in its concatenated text.
pub fn logical_columns(header_rows: &[Vec<TableCell>]) -> Vec<LogicalColumn> {
    let mut texts: Vec<Vec<String>> = Vec::new();
    let mut occupied: Vec<usize> = Vec::new();

    for row in header_rows {
        let covered: Vec<bool> = occupied.iter().map(|rows| *rows > 0).collect();
        let mut next: Vec<usize> = occupied.iter().map(|rows| rows.saturating_sub(1)).collect();
        let mut column = 0;

        for cell in row {
            while covered.get(column).copied().unwrap_or(false) {
                column += 1;
            }
            let end = column + cell.colspan;
            if texts.len() < end {
                texts.resize_with(end, Vec::new);
            }
            if next.len() < end {
                next.resize(end, 0);
            }
            for slot in column..end {
                if !cell.text.is_empty() {
                    texts[slot].push(cell.text.clone());
                }
                next[slot] = cell.rowspan.saturating_sub(1);
            }
            column = end;
        }
        occupied = next;
    }

    texts
        .into_iter()
        .enumerate()
        .map(|(index, parts)| {
            let header_text = parts.join(" ");
            let resolved_date = IsoDate::find_all_in_text(&header_text).pop();
            LogicalColumn {
                index,
                header_text,
                resolved_date,
            }
        })
        .collect()
}

/// Picks the current-value column and the nearest and farthest dated
/// change columns for `requested`.
///
/// Columns below `label_span` hold row labels and are never selected.
pub fn select_columns(
    columns: &[LogicalColumn],
    label_span: usize,
    requested: IsoDate,
    mode: FieldMode,
    markers: &ColumnMarkers,
) -> ColumnSelection {
    let change_markers = markers.change_markers(mode);
    let (change, values): (Vec<&LogicalColumn>, Vec<&LogicalColumn>) = columns
        .iter()
        .filter(|column| column.index >= label_span)
        .partition(|column| column.has_marker(change_markers));

    let current = select_current(&values, requested, mode, markers).cloned();

    let dated_changes: Vec<&LogicalColumn> = change
        .into_iter()
        .filter(|column| column.resolved_date.is_some())
        .collect();
    let weekly = dated_changes
        .iter()
        .copied()
        .min_by_key(|column| distance(column, requested))
        .cloned();
    let yearly = dated_changes
        .iter()
        .copied()
        .rev()
        .max_by_key(|column| distance(column, requested))
        .filter(|column| Some(column.index) != weekly.as_ref().map(|weekly| weekly.index))
        .cloned();

    ColumnSelection {
        current,
        weekly,
        yearly,
    }
}

fn distance(column: &LogicalColumn, requested: IsoDate) -> i64 {
    column
        .resolved_date
        .map(|date| date.abs_days_between(requested))
        .unwrap_or(i64::MAX)
}

fn select_current<'c>(
    values: &[&'c LogicalColumn],
    requested: IsoDate,
    mode: FieldMode,
    markers: &ColumnMarkers,
) -> Option<&'c LogicalColumn> {
    let tiers: Vec<Vec<&'c LogicalColumn>> = match mode {
        FieldMode::WeeklyFactors => vec![
            values
                .iter()
                .copied()
                .filter(|column| column.has_marker(&markers.average) && column.has_marker(&markers.period))
                .collect(),
            values
                .iter()
                .copied()
                .filter(|column| column.has_marker(&markers.average))
                .collect(),
            values
                .iter()
                .copied()
                .filter(|column| column.has_marker(&markers.period))
                .collect(),
            values.to_vec(),
        ],
        FieldMode::Statement => vec![
            values
                .iter()
                .copied()
                .filter(|column| column.has_marker(&markers.as_of))
                .collect(),
            values.to_vec(),
        ],
    };

    let exact = normalize_label(&requested.format_long());
    for tier in &tiers {
        if let Some(column) = tier
            .iter()
            .copied()
            .find(|column| column.normalized().contains(&exact))
        {
            return Some(column);
        }
        if let Some(column) = tier
            .iter()
            .copied()
            .filter(|column| column.resolved_date.is_some())
            .min_by_key(|column| distance(column, requested))
        {
            return Some(column);
        }
    }

    tiers.iter().find_map(|tier| tier.first().copied())
}

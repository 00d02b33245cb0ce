//! Row lookup inside one table.

use serde::Serialize;

use super::document::{HtmlTable, TableCell};
use super::label::LabelTargets;
use super::value::parse_cell;

/// The body row that best matched a field's label candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRow {
    /// Position among the table's body rows.
    pub position: usize,
    pub label: String,
    pub score: u8,
    /// Index of the candidate label that produced `score`.
    pub candidate: usize,
    /// Raw cell text per logical column; label columns are `None`.
    pub cells: Vec<Option<String>>,
}

impl MatchedRow {
    pub fn raw(&self, column: usize) -> Option<&str> {
        self.cells.get(column).and_then(|cell| cell.as_deref())
    }

    pub fn value(&self, column: usize) -> Option<f64> {
        self.raw(column).and_then(parse_cell)
    }
}

/// Scores every body row's first cell and keeps the best.
///
/// Higher score wins; among equal scores the row appearing first wins,
/// whichever candidate it matched.
pub fn find_row(table: &HtmlTable, targets: &LabelTargets) -> Option<MatchedRow> {
    let mut best: Option<(u8, usize, usize)> = None;

    for (position, row) in table.body_rows.iter().enumerate() {
        let Some(label_cell) = row.first() else {
            continue;
        };
        let Some((score, candidate)) = targets.best_match(&label_cell.text) else {
            continue;
        };
        if best.map_or(true, |(best_score, _, _)| score > best_score) {
            best = Some((score, candidate, position));
        }
    }

    let (score, candidate, position) = best?;
    let row = &table.body_rows[position];
    Some(MatchedRow {
        position,
        label: row[0].text.clone(),
        score,
        candidate,
        cells: expand_cells(row),
    })
}

/// Lays cells out by logical column, repeating a spanned value across
/// every column it covers.
fn expand_cells(row: &[TableCell]) -> Vec<Option<String>> {
    let mut cells = Vec::new();
    let Some((label, values)) = row.split_first() else {
        return cells;
    };
    cells.extend(std::iter::repeat(None).take(label.colspan));
    for cell in values {
        cells.extend(std::iter::repeat(Some(cell.text.clone())).take(cell.colspan));
    }
    cells
}

//! Fallback that reads figures from flattened page text.
//!
//! Used when structural lookup fails for a field: the first occurrence of a
//! candidate label is located and the numeric tokens that follow it, within a
//! bounded window, are read as current, weekly change and yearly change.

use serde::Serialize;

use super::value::parse_cell;

/// Footnote markers are small unsigned integers glued after a label.
const MAX_FOOTNOTE: f64 = 99.0;
const MAX_VALUES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextWindowHit {
    pub label: String,
    /// Byte offset of the label in the scanned text.
    pub offset: usize,
    pub values: Vec<f64>,
}

impl TextWindowHit {
    pub fn current(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn weekly_change(&self) -> Option<f64> {
        self.values.get(1).copied()
    }

    pub fn yearly_change(&self) -> Option<f64> {
        self.values.get(2).copied()
    }
}

/// Tries each candidate in order and returns the first that is followed by
/// at least one figure.
pub fn scan<S: AsRef<str>>(text: &str, candidates: &[S], window_chars: usize) -> Option<TextWindowHit> {
    let haystack = text.to_ascii_lowercase();

    for candidate in candidates {
        let candidate = candidate.as_ref().trim();
        if candidate.is_empty() {
            continue;
        }
        let needle = candidate.to_ascii_lowercase();
        let mut search_from = 0;
        while let Some(found) = haystack[search_from..].find(&needle) {
            let offset = search_from + found;
            let end = offset + needle.len();
            let values = read_figures(window(text, end, window_chars));
            if !values.is_empty() {
                return Some(TextWindowHit {
                    label: candidate.to_owned(),
                    offset,
                    values,
                });
            }
            search_from = end;
        }
    }
    None
}

fn window(text: &str, start: usize, chars: usize) -> &str {
    let rest = &text[start..];
    match rest.char_indices().nth(chars) {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}

/// Reads the run of figures opening `window`, merging detached signs and
/// dropping a footnote marker that precedes a thousands-separated figure.
fn read_figures(window: &str) -> Vec<f64> {
    let tokens: Vec<&str> = window.split_whitespace().collect();
    let mut values = Vec::new();
    let mut raw = Vec::new();
    let mut index = 0;

    while index < tokens.len() && values.len() < MAX_VALUES + 1 {
        let token = tokens[index];
        let (merged, consumed) = match tokens.get(index + 1) {
            Some(next) if is_sign(token) => (format!("{token}{next}"), 2),
            _ => (token.to_owned(), 1),
        };
        let Some(value) = parse_cell(&merged) else {
            break;
        };
        raw.push(merged);
        values.push(value);
        index += consumed;
    }

    let leading_footnote = raw.len() > 1
        && raw[0].chars().all(|ch| ch.is_ascii_digit())
        && values[0] <= MAX_FOOTNOTE
        && raw[1].contains(',');
    if leading_footnote {
        values.remove(0);
    }
    values.truncate(MAX_VALUES);
    values
}

fn is_sign(token: &str) -> bool {
    matches!(token, "+" | "-" | "\u{2212}" | "\u{2013}" | "\u{2014}")
}

//! Parsed release HTML and table lookup by title context.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::label::{normalize_label, LabelTargets};
use super::rows::{find_row, MatchedRow};
use super::value::parse_cell;

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("static selector is valid"));
static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("static selector is valid"));
static CAPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("caption").expect("static selector is valid"));
static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("static selector is valid"));

/// Preceding sibling elements scanned for a table's title.
const CONTEXT_SIBLINGS: usize = 6;
const MAX_SPAN: usize = 1_000;

/// One `th`/`td` with its span attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub text: String,
    pub colspan: usize,
    pub rowspan: usize,
}

impl TableCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colspan: 1,
            rowspan: 1,
        }
    }

    pub fn spanning(text: impl Into<String>, colspan: usize, rowspan: usize) -> Self {
        Self {
            text: text.into(),
            colspan: colspan.clamp(1, MAX_SPAN),
            rowspan: rowspan.clamp(1, MAX_SPAN),
        }
    }
}

/// A table split into header rows and body rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlTable {
    pub header_rows: Vec<Vec<TableCell>>,
    pub body_rows: Vec<Vec<TableCell>>,
}

impl HtmlTable {
    pub fn new(header_rows: Vec<Vec<TableCell>>, body_rows: Vec<Vec<TableCell>>) -> Self {
        Self {
            header_rows,
            body_rows,
        }
    }

    /// Header rows come from `thead`; without one, the leading rows that
    /// hold no `td` cells, or no cell that reads as a figure, are the header.
    fn from_element(table: ElementRef<'_>) -> Self {
        let mut header_rows = Vec::new();
        let mut body_rows = Vec::new();
        let has_thead = table
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|element| element.value().name() == "thead" && owning_table(element) == Some(table));
        let mut in_leading_header = !has_thead;

        for row in table.select(&ROW).filter(|row| owning_table(*row) == Some(table)) {
            let cells: Vec<TableCell> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "th" | "td"))
                .map(|cell| {
                    TableCell::spanning(
                        element_text(cell),
                        span_attr(cell, "colspan"),
                        span_attr(cell, "rowspan"),
                    )
                })
                .collect();
            if cells.is_empty() {
                continue;
            }

            let is_header = if has_thead {
                row.parent()
                    .and_then(ElementRef::wrap)
                    .map(|parent| parent.value().name() == "thead")
                    .unwrap_or(false)
            } else {
                let has_td = row
                    .children()
                    .filter_map(ElementRef::wrap)
                    .any(|cell| cell.value().name() == "td");
                let has_figure = cells.iter().any(|cell| parse_cell(&cell.text).is_some());
                in_leading_header = in_leading_header && !(has_td && has_figure);
                in_leading_header
            };

            if is_header {
                header_rows.push(cells);
            } else {
                body_rows.push(cells);
            }
        }

        Self {
            header_rows,
            body_rows,
        }
    }

    /// Colspan of the label cell that opens the first header row.
    pub fn label_span(&self) -> usize {
        self.header_rows
            .first()
            .and_then(|row| row.first())
            .map(|cell| cell.colspan)
            .unwrap_or(1)
    }
}

/// A parsed edition page.
pub struct ReleaseDocument {
    html: Html,
    text: OnceCell<String>,
}

impl ReleaseDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            text: OnceCell::new(),
        }
    }

    pub fn has_tables(&self) -> bool {
        self.html.select(&TABLE).next().is_some()
    }

    pub fn table_count(&self) -> usize {
        self.html.select(&TABLE).count()
    }

    /// Visible body text with whitespace collapsed, computed once.
    pub fn plain_text(&self) -> &str {
        self.text.get_or_init(|| {
            let root = self
                .html
                .select(&BODY)
                .next()
                .unwrap_or_else(|| self.html.root_element());
            collapse_whitespace(&root.text().collect::<Vec<_>>().join(" "))
        })
    }

    pub fn locator(&self) -> TableLocator<'_> {
        TableLocator::new(self)
    }
}

struct TableEntry<'a> {
    element: ElementRef<'a>,
    context: String,
    table: OnceCell<HtmlTable>,
}

impl TableEntry<'_> {
    fn table(&self) -> &HtmlTable {
        self.table.get_or_init(|| HtmlTable::from_element(self.element))
    }
}

/// A table chosen for a title hint, with the row that satisfied the
/// label constraint when one did.
#[derive(Debug, Clone)]
pub struct LocatedTable<'l> {
    /// Position among all tables in the document.
    pub ordinal: usize,
    pub table: &'l HtmlTable,
    pub row: Option<MatchedRow>,
}

/// Finds tables by the text that introduces them.
///
/// Table contexts and title lookups are memoized for the lifetime of the
/// locator, so resolving many fields against one document scans it once.
pub struct TableLocator<'a> {
    document: &'a ReleaseDocument,
    entries: OnceCell<Vec<TableEntry<'a>>>,
    by_title: RefCell<HashMap<String, Vec<usize>>>,
}

impl<'a> TableLocator<'a> {
    fn new(document: &'a ReleaseDocument) -> Self {
        Self {
            document,
            entries: OnceCell::new(),
            by_title: RefCell::new(HashMap::new()),
        }
    }

    fn entries(&self) -> &[TableEntry<'a>] {
        self.entries.get_or_init(|| {
            self.document
                .html
                .select(&TABLE)
                .map(|element| TableEntry {
                    element,
                    context: table_context(element),
                    table: OnceCell::new(),
                })
                .collect()
        })
    }

    /// Ordinals of tables whose context contains `title`, in document order.
    pub fn tables_titled(&self, title: &str) -> Vec<usize> {
        let needle = normalize_label(title);
        if let Some(hits) = self.by_title.borrow().get(&needle) {
            return hits.clone();
        }

        let hits: Vec<usize> = if needle.is_empty() {
            Vec::new()
        } else {
            self.entries()
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.context.contains(&needle))
                .map(|(ordinal, _)| ordinal)
                .collect()
        };
        self.by_title.borrow_mut().insert(needle, hits.clone());
        hits
    }

    pub fn table(&self, ordinal: usize) -> Option<&HtmlTable> {
        self.entries().get(ordinal).map(TableEntry::table)
    }

    /// Prefers the titled table holding the highest-scoring row for
    /// `row_candidates` (earliest table on ties); otherwise the first titled
    /// table, rowless.
    pub fn locate(&self, title: &str, row_candidates: &[String]) -> Option<LocatedTable<'_>> {
        let titled = self.tables_titled(title);
        let targets = LabelTargets::new(row_candidates);

        if !targets.is_empty() {
            let mut best: Option<LocatedTable<'_>> = None;
            for &ordinal in &titled {
                let Some(table) = self.table(ordinal) else {
                    continue;
                };
                let Some(row) = find_row(table, &targets) else {
                    continue;
                };
                let better = best
                    .as_ref()
                    .and_then(|located| located.row.as_ref())
                    .map_or(true, |held| row.score > held.score);
                if better {
                    best = Some(LocatedTable {
                        ordinal,
                        table,
                        row: Some(row),
                    });
                }
            }
            if best.is_some() {
                return best;
            }
        }

        let ordinal = *titled.first()?;
        Some(LocatedTable {
            ordinal,
            table: self.table(ordinal)?,
            row: None,
        })
    }
}

fn owning_table(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(1)
}

/// Cell text without footnote superscripts.
fn element_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_footnote = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != element.id())
            .filter_map(ElementRef::wrap)
            .any(|ancestor| ancestor.value().name() == "sup");
        if !in_footnote {
            parts.push(&**text);
        }
    }
    collapse_breaking_whitespace(&parts.join(" "))
}

/// Collapses whitespace but keeps non-breaking spaces, which tie a sign to
/// its figure in cells like `+&nbsp;2,044`.
fn collapse_breaking_whitespace(text: &str) -> String {
    text.split(|ch: char| ch.is_whitespace() && ch != '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_table(element: ElementRef<'_>) -> bool {
    element.value().name() == "table" || element.select(&TABLE).next().is_some()
}

/// Text of up to [`CONTEXT_SIBLINGS`] elements before `element`, stopping at
/// an earlier table so one table's heading never leaks into the next.
fn preceding_text(element: ElementRef<'_>) -> Vec<String> {
    let mut parts = Vec::new();
    for sibling in element
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .take(CONTEXT_SIBLINGS)
    {
        if contains_table(sibling) {
            break;
        }
        parts.push(element_text(sibling));
    }
    parts
}

fn table_context(table: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    if let Some(caption) = table.select(&CAPTION).next() {
        parts.push(element_text(caption));
    }
    for attr in ["aria-label", "summary"] {
        if let Some(value) = table.value().attr(attr) {
            parts.push(value.to_owned());
        }
    }
    parts.extend(preceding_text(table));
    if let Some(parent) = table.parent().and_then(ElementRef::wrap) {
        if parent.value().name() != "body" {
            parts.extend(preceding_text(parent));
        }
    }
    normalize_label(&parts.join(" "))
}

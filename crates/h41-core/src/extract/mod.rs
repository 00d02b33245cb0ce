//! Table location, row matching, column resolution and value parsing.

pub mod columns;
pub mod derived;
pub mod document;
pub mod fields;
pub mod label;
pub mod orchestrator;
pub mod report;
pub mod rows;
pub mod text_window;
pub mod value;

pub use columns::{logical_columns, select_columns, ColumnMarkers, ColumnSelection, LogicalColumn};
pub use derived::{select_snapshot, DerivedMetrics};
pub use document::{HtmlTable, LocatedTable, ReleaseDocument, TableCell, TableLocator};
pub use fields::default_field_specs;
pub use label::{normalize_label, LabelTargets};
pub use orchestrator::{extract, extract_with_history, Extraction, Extractor};
pub use report::{ExtractionStrategy, FieldIssue, ReportEntry, ValidationReport};
pub use rows::{find_row, MatchedRow};
pub use value::parse_cell;

//! Field resolution over a whole edition.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use super::columns::{logical_columns, select_columns, ColumnMarkers, LogicalColumn};
use super::derived::{composition, group_totals, select_snapshot, DerivedMetrics};
use super::document::{LocatedTable, ReleaseDocument, TableLocator};
use super::fields::default_field_specs;
use super::report::{
    ExtractionStrategy, FieldIssue, RawCells, ReportEntry, RowTrace, ValidationReport,
};
use super::text_window;
use crate::config::ExtractionPolicy;
use crate::domain::{ExtractedValue, FieldSpec, HistoricalSnapshot, IsoDate, SourceDates};
use crate::ValidationError;

/// Everything read from one edition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    /// `false` only when the document holds no tables at all.
    pub ok: bool,
    pub requested_date: IsoDate,
    /// Date of the first field's current column, else the requested date.
    pub as_of_date: IsoDate,
    pub fields: BTreeMap<String, ExtractedValue>,
    pub derived: DerivedMetrics,
    pub warnings: Vec<String>,
    pub report: ValidationReport,
    #[serde(skip)]
    snapshot_labels: BTreeMap<String, String>,
}

impl Extraction {
    pub fn field(&self, key: &str) -> Option<&ExtractedValue> {
        self.fields.get(key)
    }

    /// Current values keyed by primary row label, dated by `as_of_date`.
    pub fn to_snapshot(&self) -> HistoricalSnapshot {
        let fields = self
            .fields
            .iter()
            .filter_map(|(key, value)| {
                let label = self.snapshot_labels.get(key)?;
                Some((label.clone(), value.current?))
            })
            .collect();
        HistoricalSnapshot::new(self.as_of_date, fields)
    }
}

/// Applies a set of [`FieldSpec`]s to edition HTML.
///
/// Extraction is a pure function of the document, the requested date and
/// the supplied snapshots; an `Extractor` can be shared across threads.
#[derive(Debug, Clone)]
pub struct Extractor {
    specs: Vec<FieldSpec>,
    policy: ExtractionPolicy,
    markers: ColumnMarkers,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(default_field_specs())
    }
}

impl Extractor {
    pub fn new(specs: Vec<FieldSpec>) -> Self {
        Self {
            specs,
            policy: ExtractionPolicy::default(),
            markers: ColumnMarkers::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExtractionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_markers(mut self, markers: ColumnMarkers) -> Self {
        self.markers = markers;
        self
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    /// Extracts `html` for `requested_date` (`YYYY-MM-DD`) without history.
    pub fn extract(&self, requested_date: &str, html: &str) -> Result<Extraction, ValidationError> {
        self.extract_with_history(requested_date, html, &[])
    }

    pub fn extract_with_history(
        &self,
        requested_date: &str,
        html: &str,
        snapshots: &[HistoricalSnapshot],
    ) -> Result<Extraction, ValidationError> {
        let requested = IsoDate::parse(requested_date)?;
        let document = ReleaseDocument::parse(html);
        Ok(self.extract_document(requested, &document, snapshots))
    }

    pub fn extract_document(
        &self,
        requested: IsoDate,
        document: &ReleaseDocument,
        snapshots: &[HistoricalSnapshot],
    ) -> Extraction {
        let locator = document.locator();
        let mut fields = BTreeMap::new();
        let mut report = ValidationReport {
            table_count: document.table_count(),
            entries: Vec::with_capacity(self.specs.len()),
        };

        for spec in &self.specs {
            let (value, entry) = self.resolve_field(spec, requested, document, &locator);
            fields.insert(spec.key.clone(), value);
            report.entries.push(entry);
        }

        let as_of_date = report
            .entries
            .iter()
            .find_map(|entry| entry.columns.current.as_ref()?.resolved_date)
            .unwrap_or(requested);
        let snapshot_labels: BTreeMap<String, String> = self
            .specs
            .iter()
            .map(|spec| (spec.key.clone(), spec.primary_label().to_owned()))
            .collect();

        let mut warnings = Vec::new();
        let ok = report.table_count > 0;
        if !ok {
            warnings.push(String::from("document contains no tables"));
        }

        let yearly_snapshot = select_snapshot(
            snapshots,
            as_of_date,
            self.policy.yoy_target_days,
            self.policy.yoy_tolerance_days,
        );
        let weekly_snapshot = select_snapshot(
            snapshots,
            as_of_date,
            self.policy.wow_target_days,
            self.policy.wow_tolerance_days,
        );
        if !snapshots.is_empty() && yearly_snapshot.is_none() {
            warnings.push(format!(
                "no snapshot within {} days of {} days before {as_of_date}",
                self.policy.yoy_tolerance_days, self.policy.yoy_target_days
            ));
        }

        if let Some(snapshot) = yearly_snapshot {
            for entry in &mut report.entries {
                let Some(value) = fields.get_mut(&entry.key) else {
                    continue;
                };
                if value.yearly_change.is_some() {
                    continue;
                }
                let (Some(current), Some(prior)) = (
                    value.current,
                    snapshot_labels
                        .get(&entry.key)
                        .and_then(|label| snapshot.value(label)),
                ) else {
                    continue;
                };
                *value = value
                    .clone()
                    .with_yearly_change(Some(current - prior), Some(snapshot.date));
                entry.yearly_from_history = true;
            }
        }

        warnings.extend(report.entries.iter().filter_map(ReportEntry::warning));

        let derived = DerivedMetrics {
            composition: composition(&fields),
            groups: group_totals(
                &fields,
                &snapshot_labels,
                weekly_snapshot,
                yearly_snapshot,
                Some(as_of_date),
            ),
        };

        debug!(
            %requested,
            %as_of_date,
            tables = report.table_count,
            warnings = warnings.len(),
            "edition extracted"
        );

        Extraction {
            ok,
            requested_date: requested,
            as_of_date,
            fields,
            derived,
            warnings,
            report,
            snapshot_labels,
        }
    }

    fn resolve_field(
        &self,
        spec: &FieldSpec,
        requested: IsoDate,
        document: &ReleaseDocument,
        locator: &TableLocator<'_>,
    ) -> (ExtractedValue, ReportEntry) {
        let mut entry = ReportEntry::new(spec.key.clone(), spec.mode);

        let issue = match locator.locate(&spec.table_title_hint, &spec.row_label_candidates) {
            None => FieldIssue::TableNotFound,
            Some(LocatedTable {
                ordinal, row: None, ..
            }) => {
                entry.table_ordinal = Some(ordinal);
                FieldIssue::RowNotFound
            }
            Some(LocatedTable {
                ordinal,
                table,
                row: Some(row),
            }) => {
                let columns = logical_columns(&table.header_rows);
                let selection =
                    select_columns(&columns, table.label_span(), requested, spec.mode, &self.markers);
                let index_of = |column: &Option<LogicalColumn>| {
                    column.as_ref().map(|column| column.index)
                };
                let (current, weekly, yearly) = (
                    index_of(&selection.current),
                    index_of(&selection.weekly),
                    index_of(&selection.yearly),
                );
                let value_at = |index: Option<usize>| index.and_then(|index| row.value(index));
                let raw_at = |index: Option<usize>| {
                    index.and_then(|index| row.raw(index)).map(str::to_owned)
                };
                let date_of = |column: &Option<LogicalColumn>| {
                    column.as_ref().and_then(|column| column.resolved_date)
                };

                let value = ExtractedValue::new(
                    value_at(current),
                    value_at(weekly),
                    value_at(yearly),
                    SourceDates {
                        current: date_of(&selection.current),
                        weekly: date_of(&selection.weekly),
                        yearly: date_of(&selection.yearly),
                    },
                );

                entry.strategy = ExtractionStrategy::Structural;
                entry.table_ordinal = Some(ordinal);
                entry.raw = RawCells {
                    current: raw_at(current),
                    weekly: raw_at(weekly),
                    yearly: raw_at(yearly),
                };
                entry.row = Some(RowTrace {
                    table_ordinal: ordinal,
                    label: row.label.clone(),
                    score: row.score,
                    candidate: row.candidate,
                });
                entry.columns = selection;
                if current.is_some() {
                    return (value, entry);
                }
                entry.issue = Some(FieldIssue::ColumnNotFound);
                debug!(field = %spec.key, "no current column in located table");
                let recovered = self.recover_from_text(spec, document, &mut entry);
                return (recovered.unwrap_or(value), entry);
            }
        };

        entry.issue = Some(issue);
        debug!(field = %spec.key, %issue, "structural lookup failed");

        let recovered = self.recover_from_text(spec, document, &mut entry);
        (recovered.unwrap_or_else(ExtractedValue::no_data), entry)
    }

    /// Second tier: scans the page text for the field's labels and records
    /// the switch in `entry` when figures are found.
    fn recover_from_text(
        &self,
        spec: &FieldSpec,
        document: &ReleaseDocument,
        entry: &mut ReportEntry,
    ) -> Option<ExtractedValue> {
        if !self.policy.enable_text_fallback {
            return None;
        }
        let hit = text_window::scan(
            document.plain_text(),
            &spec.row_label_candidates,
            self.policy.text_window_chars,
        )?;

        info!(field = %spec.key, label = %hit.label, "recovered from page text");
        entry.strategy = ExtractionStrategy::TextWindow;
        entry.raw = RawCells {
            current: hit.current().map(|value| value.to_string()),
            weekly: hit.weekly_change().map(|value| value.to_string()),
            yearly: hit.yearly_change().map(|value| value.to_string()),
        };
        Some(ExtractedValue::new(
            hit.current(),
            hit.weekly_change(),
            hit.yearly_change(),
            SourceDates::default(),
        ))
    }
}

/// [`Extractor::extract`] with the built-in field catalog.
pub fn extract(requested_date: &str, html: &str) -> Result<Extraction, ValidationError> {
    Extractor::default().extract(requested_date, html)
}

/// [`Extractor::extract_with_history`] with the built-in field catalog.
pub fn extract_with_history(
    requested_date: &str,
    html: &str,
    snapshots: &[HistoricalSnapshot],
) -> Result<Extraction, ValidationError> {
    Extractor::default().extract_with_history(requested_date, html, snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldMode;

    const TITLE: &str = "Factors Affecting Reserve Balances";

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body><h3>{TITLE}</h3><table>
            <tr><th>Item</th><th>Week ended Jan 7, 2026</th><th>Change from week ended Dec 31, 2025</th></tr>
            {rows}
            </table><p>Securities held outright 6,400,000 +2,000</p></body></html>"#
        )
    }

    fn specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("credit", TITLE, FieldMode::WeeklyFactors, &["Reserve Bank credit"]),
            FieldSpec::new("held", TITLE, FieldMode::WeeklyFactors, &["Securities held outright"]),
        ]
    }

    #[test]
    fn structural_values_carry_header_dates() {
        let html = page("<tr><th>Reserve Bank credit</th><td>6,600,000</td><td>+1,000</td></tr>");
        let extraction = Extractor::new(specs())
            .extract("2026-01-08", &html)
            .expect("valid date");

        let credit = extraction.field("credit").expect("field present");
        assert_eq!(credit.current, Some(6_600_000.0));
        assert_eq!(credit.weekly_change, Some(1_000.0));
        assert_eq!(
            credit.source_dates.weekly,
            Some(IsoDate::parse("2025-12-31").expect("date"))
        );
        assert_eq!(extraction.as_of_date, IsoDate::parse("2026-01-07").expect("date"));
        assert!(extraction.ok);
    }

    #[test]
    fn missing_row_falls_back_to_page_text() {
        let html = page("<tr><th>Reserve Bank credit</th><td>6,600,000</td><td>+1,000</td></tr>");
        let extraction = Extractor::new(specs())
            .extract("2026-01-08", &html)
            .expect("valid date");

        let held = extraction.field("held").expect("field present");
        assert_eq!(held.current, Some(6_400_000.0));
        assert_eq!(held.weekly_change, Some(2_000.0));

        let entry = extraction.report.entry("held").expect("entry");
        assert_eq!(entry.strategy, ExtractionStrategy::TextWindow);
        assert_eq!(entry.issue, Some(FieldIssue::RowNotFound));
        assert!(extraction.warnings.iter().any(|warning| warning.starts_with("held:")));
    }

    #[test]
    fn fallback_can_be_disabled() {
        let html = page("");
        let policy = ExtractionPolicy {
            enable_text_fallback: false,
            ..ExtractionPolicy::default()
        };
        let extraction = Extractor::new(specs())
            .with_policy(policy)
            .extract("2026-01-08", &html)
            .expect("valid date");

        assert!(extraction.field("held").expect("field").is_empty());
        assert_eq!(extraction.as_of_date, IsoDate::parse("2026-01-08").expect("date"));
    }

    #[test]
    fn invalid_requested_date_is_rejected() {
        let error = Extractor::default()
            .extract("2026-13-01", "<html></html>")
            .expect_err("invalid date");
        assert!(matches!(error, ValidationError::InvalidIsoDate { .. }));
    }

    #[test]
    fn snapshot_uses_primary_labels() {
        let html = page("<tr><th>Reserve Bank credit</th><td>6,600,000</td><td>+1,000</td></tr>");
        let extraction = Extractor::new(specs())
            .extract("2026-01-08", &html)
            .expect("valid date");
        let snapshot = extraction.to_snapshot();

        assert_eq!(snapshot.date, IsoDate::parse("2026-01-07").expect("date"));
        assert_eq!(snapshot.value("Reserve Bank credit"), Some(6_600_000.0));
        assert_eq!(snapshot.value("Securities held outright"), Some(6_400_000.0));
    }
}

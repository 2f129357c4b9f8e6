//! Maps raw tables onto canonical records.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

use super::rules::{CanonicalField, ColumnRules, MatchKind};
use crate::error::RecommendError;
use crate::table::{
    Category, RawTable, Record, RecordSet, MISSING_LOCATION, MISSING_PLACE, MISSING_REVIEW,
};

/// Header pattern left behind by spreadsheet exports with blank header cells.
static UNNAMED_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*unnamed").unwrap());

/// Whether a header is an export artifact rather than a real column.
pub(crate) fn is_unnamed(column: &str) -> bool {
    column.trim().is_empty() || UNNAMED_PATTERN.is_match(column)
}

/// Schema normalizer with a fixed rule set.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    rules: ColumnRules,
}

impl Normalizer {
    pub fn new(rules: ColumnRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ColumnRules {
        &self.rules
    }

    /// Normalize a raw table into a record set.
    ///
    /// Fails with [`RecommendError::Schema`] when any canonical column stays
    /// unresolved after the synonym and fragment passes.
    pub fn normalize(&self, table: &RawTable, category: Category) -> Result<RecordSet, RecommendError> {
        debug!(%category, columns = ?table.columns, rows = table.len(), "Normalizing table");

        let kept: Vec<(usize, String)> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !is_unnamed(name))
            .map(|(i, name)| (i, name.trim().to_lowercase()))
            .collect();

        let resolution = self.rules.resolve(&kept);
        if !resolution.is_complete() {
            return Err(RecommendError::Schema {
                category,
                missing: resolution.missing,
                available: kept.into_iter().map(|(_, name)| name).collect(),
            });
        }

        for (field, index, kind) in &resolution.resolved {
            if *kind == MatchKind::Fragment {
                info!(
                    %category,
                    field = %field,
                    column = %kept.iter().find(|(i, _)| i == index).map(|(_, n)| n.as_str()).unwrap_or(""),
                    "Resolved column by substring match"
                );
            }
        }

        // Resolution is complete, so every index is present.
        let (place_idx, location_idx, review_idx) = match (
            resolution.index_of(CanonicalField::Place),
            resolution.index_of(CanonicalField::Location),
            resolution.index_of(CanonicalField::Review),
        ) {
            (Some(p), Some(l), Some(r)) => (p, l, r),
            _ => return Err(RecommendError::Internal("column resolution incomplete".into())),
        };

        let records: Vec<Record> = (0..table.len())
            .map(|row| Record {
                place: table
                    .cell(row, place_idx)
                    .map(|s| s.trim())
                    .unwrap_or(MISSING_PLACE)
                    .to_string(),
                location: table
                    .cell(row, location_idx)
                    .unwrap_or(MISSING_LOCATION)
                    .trim()
                    .to_lowercase(),
                review: table
                    .cell(row, review_idx)
                    .map(|s| s.trim())
                    .unwrap_or(MISSING_REVIEW)
                    .to_string(),
            })
            .collect();

        debug!(%category, records = records.len(), "Table normalized");
        Ok(RecordSet::new(category, records))
    }
}

/// Normalize with the default rule set.
pub fn normalize(table: &RawTable, category: Category) -> Result<RecordSet, RecommendError> {
    Normalizer::default().normalize(table, category)
}

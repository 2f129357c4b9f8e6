//! Raw tabular input and the normalized record types built from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder review text for records whose review is missing.
pub const MISSING_REVIEW: &str = "No review available";
/// Fill value for a missing location (stored lowercased after normalization).
pub const MISSING_LOCATION: &str = "Unknown";
/// Fill value for a missing place name.
pub const MISSING_PLACE: &str = "Unknown Place";

// ============================================================================
// Raw Table
// ============================================================================

/// A heterogeneous table as delivered by a loader: arbitrary column names and
/// nullable text cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Build a table, padding short rows with nulls and dropping overflow cells.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Convenience constructor for literal string tables.
    pub fn from_strs(columns: &[&str], rows: &[&[&str]]) -> Self {
        Self::from_rows(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| Some(cell.to_string())).collect())
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, col)`, treating blank text as null.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

// ============================================================================
// Categories and Records
// ============================================================================

/// Which catalog a record set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Dining,
    Attraction,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dining => "dining",
            Self::Attraction => "attraction",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dining" => Ok(Self::Dining),
            "attraction" | "attractions" | "spots" => Ok(Self::Attraction),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

/// One normalized review entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub place: String,
    /// Lowercased and trimmed
    pub location: String,
    pub review: String,
}

impl Record {
    /// Whether the review carries text worth scoring.
    pub fn has_review(&self) -> bool {
        let review = self.review.trim();
        !review.is_empty() && review != MISSING_REVIEW
    }
}

/// Normalized records for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub category: Category,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(category: Category, records: Vec<Record>) -> Self {
        Self { category, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Re-emit the canonical three-column table.
    pub fn to_table(&self) -> RawTable {
        RawTable {
            columns: vec!["Place".into(), "Location".into(), "Review".into()],
            rows: self
                .records
                .iter()
                .map(|r| {
                    vec![
                        Some(r.place.clone()),
                        Some(r.location.clone()),
                        Some(r.review.clone()),
                    ]
                })
                .collect(),
        }
    }
}

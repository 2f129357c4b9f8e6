//! Column resolution rules.
//!
//! Rules are evaluated in a fixed priority order so the same input columns
//! always resolve the same way: an exact-synonym pass over every rule, then a
//! substring pass over the columns no rule has claimed.

use roam_common::config::{ColumnMatchConfig, ColumnRulesConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three fields every normalized record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    Place,
    Location,
    Review,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 3] = [Self::Place, Self::Location, Self::Review];

    /// Column header used when re-emitting normalized tables.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Place => "Place",
            Self::Location => "Location",
            Self::Review => "Review",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// How a column was matched to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Synonym,
    Fragment,
}

/// Synonyms and fragments for one canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRule {
    pub field: CanonicalField,
    pub synonyms: Vec<String>,
    pub fragments: Vec<String>,
}

impl ColumnRule {
    fn from_config(field: CanonicalField, config: &ColumnMatchConfig) -> Self {
        Self {
            field,
            synonyms: config.synonyms.iter().map(|s| s.trim().to_lowercase()).collect(),
            fragments: config.fragments.iter().map(|s| s.trim().to_lowercase()).collect(),
        }
    }

    /// Exact match. The canonical name itself always matches so that
    /// normalized tables re-normalize to themselves.
    fn matches_exact(&self, column: &str) -> bool {
        column == self.field.column_name().to_lowercase()
            || self.synonyms.iter().any(|s| s == column)
    }

    fn matches_fragment(&self, column: &str) -> bool {
        self.fragments
            .iter()
            .any(|f| !f.is_empty() && column.contains(f.as_str()))
    }
}

/// Ordered rule list (Place, Location, Review).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRules {
    rules: Vec<ColumnRule>,
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self::from(&ColumnRulesConfig::default())
    }
}

impl From<&ColumnRulesConfig> for ColumnRules {
    fn from(config: &ColumnRulesConfig) -> Self {
        Self {
            rules: vec![
                ColumnRule::from_config(CanonicalField::Place, &config.place),
                ColumnRule::from_config(CanonicalField::Location, &config.location),
                ColumnRule::from_config(CanonicalField::Review, &config.review),
            ],
        }
    }
}

impl ColumnRules {
    pub fn rules(&self) -> &[ColumnRule] {
        &self.rules
    }

    /// Resolve canonical fields against cleaned column names.
    ///
    /// `columns` holds `(source index, lowercased trimmed name)` pairs in source
    /// order; the leftmost candidate wins. A synonym match claims its column;
    /// fragment matches only skip claimed columns, so one column may fill
    /// several fields.
    pub fn resolve(&self, columns: &[(usize, String)]) -> ColumnResolution {
        let mut claimed = vec![false; columns.len()];
        let mut assignments: Vec<Option<(usize, MatchKind)>> = vec![None; self.rules.len()];

        for (slot, rule) in self.rules.iter().enumerate() {
            if let Some(pos) = columns
                .iter()
                .enumerate()
                .position(|(i, (_, name))| !claimed[i] && rule.matches_exact(name))
            {
                claimed[pos] = true;
                assignments[slot] = Some((columns[pos].0, MatchKind::Synonym));
            }
        }

        for (slot, rule) in self.rules.iter().enumerate() {
            if assignments[slot].is_some() {
                continue;
            }
            if let Some(pos) = columns
                .iter()
                .enumerate()
                .position(|(i, (_, name))| !claimed[i] && rule.matches_fragment(name))
            {
                assignments[slot] = Some((columns[pos].0, MatchKind::Fragment));
            }
        }

        let mut resolution = ColumnResolution::default();
        for (rule, assignment) in self.rules.iter().zip(assignments) {
            match assignment {
                Some((index, kind)) => resolution.resolved.push((rule.field, index, kind)),
                None => resolution.missing.push(rule.field),
            }
        }
        resolution
    }
}

/// Outcome of column resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnResolution {
    /// `(field, source column index, how it matched)`
    pub resolved: Vec<(CanonicalField, usize, MatchKind)>,
    pub missing: Vec<CanonicalField>,
}

impl ColumnResolution {
    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        self.resolved
            .iter()
            .find(|(f, _, _)| *f == field)
            .map(|(_, index, _)| *index)
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

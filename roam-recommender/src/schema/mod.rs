//! Schema normalization for heterogeneous review tables.
//!
//! Input tables name their columns however the exporting tool pleased
//! (`Name`, `place_name`, `City`, `feedback`, ...). The normalizer resolves
//! them onto the canonical triple {Place, Location, Review}:
//!
//! ```text
//! raw columns ──▶ drop "unnamed" ──▶ lowercase/trim ──▶ exact synonyms ──▶ substring fragments
//!                                                                 │
//!                                              unresolved ──▶ SchemaError
//! ```

pub mod normalizer;
pub mod rules;

pub use normalizer::{normalize, Normalizer};
pub use rules::{CanonicalField, ColumnResolution, ColumnRule, ColumnRules, MatchKind};

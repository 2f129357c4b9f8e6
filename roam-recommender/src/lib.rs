//! roam-recommender - Sentiment-ranked attraction and dining recommendations.
//!
//! Two review tables (dining and attractions) with arbitrary column names
//! are normalized onto `{Place, Location, Review}`, every review is scored
//! for polarity, places are aggregated by mean sentiment, and queries return
//! the top places per category for a location:
//!
//! ```text
//! RawTable ─▶ schema::normalize ─▶ SentimentAggregator::process ─▶ ranking::top_n ─▶ Recommender::format
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod error;
pub mod loader;
pub mod ranking;
pub mod recommender;
pub mod routes;
pub mod schema;
pub mod sentiment;
pub mod table;

pub use error::RecommendError;
pub use loader::{load_csv, read_table, CsvOptions, DataSources, TableReport};
pub use ranking::{top_n, Candidate};
pub use recommender::{
    normalize_location, sentiment_to_rating, Catalog, DatasetSummary, Recommendation,
    RecommendationResponse, Recommendations, Recommender, RecommenderOptions,
};
pub use routes::{build_router, AppState};
pub use schema::{normalize, CanonicalField, ColumnRules, Normalizer};
pub use sentiment::{
    CachedScorer, LexiconScorer, PolarityScorer, ProcessedSet, ScoredPlace, ScoredRecord,
    ScoringFailure, SentimentAggregator, SentimentIndex,
};
pub use table::{Category, RawTable, Record, RecordSet};

//! Review sentiment scoring and per-place aggregation.

pub mod aggregator;
pub mod lexicon;
pub mod scorer;

pub use aggregator::{ProcessedSet, ScoredPlace, ScoredRecord, SentimentAggregator, SentimentIndex};
pub use lexicon::{LexiconResult, ReviewLexicon};
pub use scorer::{CachedScorer, LexiconScorer, PolarityScorer, ScoringFailure, NEUTRAL_SCORE};

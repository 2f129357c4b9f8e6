//! Per-place sentiment aggregation.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::scorer::PolarityScorer;
use crate::table::{Category, Record, RecordSet};

/// Mean review sentiment for one place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPlace {
    pub name: String,
    /// Location of the first scored record
    pub location: String,
    pub sentiment_score: f64,
    pub review_count: usize,
    /// Review of the first scored record
    pub sample_review: String,
}

/// Scored places in first-encounter order, with lookup by name.
#[derive(Debug, Clone, Default)]
pub struct SentimentIndex {
    places: Vec<ScoredPlace>,
    lookup: HashMap<String, usize>,
}

impl SentimentIndex {
    pub fn get(&self, name: &str) -> Option<&ScoredPlace> {
        self.lookup.get(name).map(|&i| &self.places[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredPlace> {
        self.places.iter()
    }
}

/// A record with the mean score of its place attached (`None` when the place
/// has no scorable review).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: Record,
    pub sentiment_score: Option<f64>,
}

/// A record set after aggregation, ready for ranking.
#[derive(Debug, Clone)]
pub struct ProcessedSet {
    pub category: Category,
    pub records: Vec<ScoredRecord>,
    pub places: SentimentIndex,
}

impl ProcessedSet {
    /// Empty set for a category.
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            records: Vec::new(),
            places: SentimentIndex::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct normalized locations in first-encounter order.
    pub fn locations(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .map(|r| r.record.location.as_str())
            .filter(|loc| seen.insert(*loc))
            .collect()
    }
}

/// Running totals for one place within a single `analyze` call.
struct PlaceAccumulator {
    name: String,
    location: String,
    sample_review: String,
    sum: f64,
    count: usize,
}

/// Scores reviews and aggregates them per place.
#[derive(Clone)]
pub struct SentimentAggregator {
    scorer: Arc<dyn PolarityScorer>,
}

impl SentimentAggregator {
    pub fn new(scorer: Arc<dyn PolarityScorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &Arc<dyn PolarityScorer> {
        &self.scorer
    }

    /// Mean polarity per place. Places without a scorable review are absent.
    pub fn analyze(&self, set: &RecordSet) -> SentimentIndex {
        let mut accumulators: Vec<PlaceAccumulator> = Vec::new();
        let mut lookup: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0usize;

        for record in &set.records {
            if !record.has_review() {
                skipped += 1;
                continue;
            }
            let score = self.scorer.score(&record.review);

            match lookup.get(&record.place) {
                Some(&i) => {
                    accumulators[i].sum += score;
                    accumulators[i].count += 1;
                }
                None => {
                    lookup.insert(record.place.clone(), accumulators.len());
                    accumulators.push(PlaceAccumulator {
                        name: record.place.clone(),
                        location: record.location.clone(),
                        sample_review: record.review.clone(),
                        sum: score,
                        count: 1,
                    });
                }
            }
        }

        let places: Vec<ScoredPlace> = accumulators
            .into_iter()
            .map(|acc| ScoredPlace {
                sentiment_score: acc.sum / acc.count as f64,
                name: acc.name,
                location: acc.location,
                review_count: acc.count,
                sample_review: acc.sample_review,
            })
            .collect();

        debug!(
            category = %set.category,
            records = set.len(),
            places = places.len(),
            skipped,
            "Sentiment analysis complete"
        );

        SentimentIndex { places, lookup }
    }

    /// Analyze and attach each place's mean score to its records.
    pub fn process(&self, set: RecordSet) -> ProcessedSet {
        let places = self.analyze(&set);
        let category = set.category;

        let records: Vec<ScoredRecord> = set
            .records
            .into_iter()
            .map(|record| ScoredRecord {
                sentiment_score: places.get(&record.place).map(|p| p.sentiment_score),
                record,
            })
            .collect();

        info!(
            %category,
            records = records.len(),
            places = places.len(),
            "Record set processed"
        );

        ProcessedSet {
            category,
            records,
            places,
        }
    }
}

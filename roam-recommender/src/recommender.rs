//! Recommendation facade.
//!
//! Owns the processed catalog (dining and attraction sets) and answers
//! location queries against an immutable snapshot of it. Rebuilds compute a
//! fresh catalog off to the side and swap it in, so a query never sees a
//! half-built set.

use chrono::{DateTime, Utc};
use roam_common::config::Config;
use roam_common::util::{round_to, title_case, truncate_with_ellipsis};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info};

use crate::error::RecommendError;
use crate::ranking::{top_n, Candidate};
use crate::schema::{ColumnRules, Normalizer};
use crate::sentiment::{PolarityScorer, ProcessedSet, SentimentAggregator};
use crate::table::{Category, RawTable, MISSING_REVIEW};

/// Default number of results per category.
pub const DEFAULT_TOP_N: usize = 3;
/// Default upper bound for caller-supplied limits.
pub const DEFAULT_MAX_LIMIT: usize = 20;
/// Longest query location echoed back in messages.
const MAX_ECHOED_LOCATION: usize = 64;

/// Tuning knobs for the recommender.
#[derive(Debug, Clone)]
pub struct RecommenderOptions {
    pub top_n: usize,
    pub max_limit: usize,
    pub rules: ColumnRules,
}

impl Default for RecommenderOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            max_limit: DEFAULT_MAX_LIMIT,
            rules: ColumnRules::default(),
        }
    }
}

impl RecommenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_n: config.recommender.top_n,
            max_limit: config.recommender.max_limit,
            rules: ColumnRules::from(&config.columns),
        }
    }
}

/// Both processed record sets.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub dining: ProcessedSet,
    pub attractions: ProcessedSet,
    pub built_at: DateTime<Utc>,
}

/// Ranked candidates for one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Recommendations {
    pub tourist_places: Vec<Candidate>,
    pub dining_spots: Vec<Candidate>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.tourist_places.is_empty() && self.dining_spots.is_empty()
    }
}

/// Display-ready recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub location: String,
    pub sentiment_score: f64,
    pub rating: f64,
    pub sample_review: String,
}

/// Formatted answer for a location query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub places: Vec<Recommendation>,
    pub dining: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Summary of a rebuilt record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub category: Category,
    pub records: usize,
    pub places: usize,
}

impl From<&ProcessedSet> for DatasetSummary {
    fn from(set: &ProcessedSet) -> Self {
        Self {
            category: set.category,
            records: set.len(),
            places: set.places.len(),
        }
    }
}

/// Lowercase and trim a query location, rejecting blank input.
pub fn normalize_location(location: &str) -> roam_common::Result<String> {
    let normalized = location.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(roam_common::Error::InvalidInput(
            "location is required".to_string(),
        ));
    }
    Ok(normalized)
}

/// Map a [0, 1] sentiment score onto a 1-5 star rating (one decimal).
pub fn sentiment_to_rating(score: f64) -> f64 {
    round_to((1.0 + score * 4.0).clamp(1.0, 5.0), 1)
}

/// Location-based recommender over dining and attraction reviews.
pub struct Recommender {
    catalog: RwLock<Arc<Catalog>>,
    rebuild_lock: Mutex<()>,
    normalizer: Normalizer,
    aggregator: SentimentAggregator,
    options: RecommenderOptions,
}

impl Recommender {
    /// Normalize and score both tables. Any schema error fails the build.
    pub fn build(
        dining: &RawTable,
        attractions: &RawTable,
        scorer: Arc<dyn PolarityScorer>,
        options: RecommenderOptions,
    ) -> Result<Self, RecommendError> {
        let normalizer = Normalizer::new(options.rules.clone());
        let aggregator = SentimentAggregator::new(scorer);

        let catalog = Catalog {
            dining: Self::prepare(&normalizer, &aggregator, dining, Category::Dining)?,
            attractions: Self::prepare(&normalizer, &aggregator, attractions, Category::Attraction)?,
            built_at: Utc::now(),
        };

        info!(
            dining = catalog.dining.len(),
            attractions = catalog.attractions.len(),
            top_n = options.top_n,
            "Recommender built"
        );

        Ok(Self {
            catalog: RwLock::new(Arc::new(catalog)),
            rebuild_lock: Mutex::new(()),
            normalizer,
            aggregator,
            options,
        })
    }

    fn prepare(
        normalizer: &Normalizer,
        aggregator: &SentimentAggregator,
        table: &RawTable,
        category: Category,
    ) -> Result<ProcessedSet, RecommendError> {
        let records = normalizer.normalize(table, category)?;
        Ok(aggregator.process(records))
    }

    pub fn options(&self) -> &RecommenderOptions {
        &self.options
    }

    /// Current catalog. The swap is a single pointer store, so the snapshot
    /// is consistent even if a writer panicked.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn swap(&self, catalog: Catalog) {
        let mut guard = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(catalog);
    }

    /// Rebuild one record set from a new table. On error the current set
    /// stays in place.
    pub fn rebuild(&self, category: Category, table: &RawTable) -> Result<DatasetSummary, RecommendError> {
        let _rebuild = self.rebuild_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let processed = Self::prepare(&self.normalizer, &self.aggregator, table, category)?;
        let summary = DatasetSummary::from(&processed);

        let current = self.snapshot();
        let catalog = match category {
            Category::Dining => Catalog {
                dining: processed,
                attractions: current.attractions.clone(),
                built_at: Utc::now(),
            },
            Category::Attraction => Catalog {
                dining: current.dining.clone(),
                attractions: processed,
                built_at: Utc::now(),
            },
        };
        self.swap(catalog);

        info!(%category, records = summary.records, places = summary.places, "Record set rebuilt");
        Ok(summary)
    }

    /// Replace both record sets at once; nothing changes unless both succeed.
    pub fn replace(&self, dining: &RawTable, attractions: &RawTable) -> Result<[DatasetSummary; 2], RecommendError> {
        let _rebuild = self.rebuild_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let catalog = Catalog {
            dining: Self::prepare(&self.normalizer, &self.aggregator, dining, Category::Dining)?,
            attractions: Self::prepare(&self.normalizer, &self.aggregator, attractions, Category::Attraction)?,
            built_at: Utc::now(),
        };
        let summaries = [
            DatasetSummary::from(&catalog.dining),
            DatasetSummary::from(&catalog.attractions),
        ];
        self.swap(catalog);

        info!(
            dining = summaries[0].records,
            attractions = summaries[1].records,
            "Catalog replaced"
        );
        Ok(summaries)
    }

    /// Distinct normalized locations across both sets, sorted.
    pub fn locations(&self) -> Vec<String> {
        let catalog = self.snapshot();
        let mut locations: Vec<String> = catalog
            .dining
            .locations()
            .into_iter()
            .chain(catalog.attractions.locations())
            .map(str::to_string)
            .collect();
        locations.sort();
        locations.dedup();
        locations
    }

    /// Top candidates per category using the configured `top_n`.
    pub fn get_recommendations(&self, location: &str) -> Result<Recommendations, RecommendError> {
        self.get_recommendations_with_limit(location, self.options.top_n)
    }

    pub fn get_recommendations_with_limit(
        &self,
        location: &str,
        n: usize,
    ) -> Result<Recommendations, RecommendError> {
        let location = normalize_location(location)?;
        let catalog = self.snapshot();

        let recommendations = Recommendations {
            tourist_places: top_n(&catalog.attractions, &location, n),
            dining_spots: top_n(&catalog.dining, &location, n),
        };

        debug!(
            location = %location,
            places = recommendations.tourist_places.len(),
            dining = recommendations.dining_spots.len(),
            "Recommendations computed"
        );
        Ok(recommendations)
    }

    /// Convert candidates into display records.
    pub fn format(candidates: &[Candidate]) -> Vec<Recommendation> {
        candidates
            .iter()
            .map(|c| Recommendation {
                name: c.name.clone(),
                location: title_case(&c.location),
                sentiment_score: round_to(c.sentiment_score, 2),
                rating: sentiment_to_rating(c.sentiment_score),
                sample_review: c
                    .review
                    .clone()
                    .unwrap_or_else(|| MISSING_REVIEW.to_string()),
            })
            .collect()
    }

    /// Answer a location query. `limit` defaults to the configured `top_n`
    /// and is clamped to `[1, max_limit]`.
    pub fn recommend(&self, location: &str, limit: Option<usize>) -> Result<RecommendationResponse, RecommendError> {
        let n = limit
            .unwrap_or(self.options.top_n)
            .clamp(1, self.options.max_limit.max(1));
        let recommendations = self.get_recommendations_with_limit(location, n)?;

        let message = recommendations.is_empty().then(|| {
            format!(
                "No recommendations found for '{}'. Try another location.",
                truncate_with_ellipsis(location.trim(), MAX_ECHOED_LOCATION)
            )
        });

        Ok(RecommendationResponse {
            places: Self::format(&recommendations.tourist_places),
            dining: Self::format(&recommendations.dining_spots),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::LexiconScorer;
    use test_case::test_case;

    fn attractions() -> RawTable {
        RawTable::from_strs(
            &["Name", "City", "Review"],
            &[
                &["Park A", "Lakeview", "amazing and beautiful"],
                &["Park B", "Lakeview", "terrible, dirty"],
                &["Museum", "Hillside", "pleasant exhibits"],
            ],
        )
    }

    fn dining() -> RawTable {
        RawTable::from_strs(
            &["restaurant_name", "address", "comment"],
            &[&["Cafe Corner", "Hillside", "cozy and friendly"]],
        )
    }

    fn recommender() -> Recommender {
        Recommender::build(
            &dining(),
            &attractions(),
            Arc::new(LexiconScorer::new()),
            RecommenderOptions::default(),
        )
        .unwrap()
    }

    #[test_case(0.0, 1.0)]
    #[test_case(0.5, 3.0)]
    #[test_case(1.0, 5.0)]
    #[test_case(0.8765, 4.5)]
    #[test_case(0.0625, 1.2 ; "tie goes to even")]
    #[test_case(-0.2, 1.0 ; "clamped below")]
    #[test_case(1.3, 5.0 ; "clamped above")]
    fn test_sentiment_to_rating(score: f64, expected: f64) {
        assert_eq!(sentiment_to_rating(score), expected);
    }

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location("  LAKEVIEW ").unwrap(), "lakeview");
        assert!(matches!(
            normalize_location("   "),
            Err(roam_common::Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_park_a_ranks_above_park_b() {
        let recs = recommender().get_recommendations("Lakeview").unwrap();
        let names: Vec<_> = recs.tourist_places.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Park A", "Park B"]);
        assert!(recs.dining_spots.is_empty());
    }

    #[test]
    fn test_blank_location_is_invalid_query() {
        let err = recommender().get_recommendations("  ").unwrap_err();
        assert!(matches!(err, RecommendError::InvalidQuery(_)));
    }

    #[test]
    fn test_format() {
        let candidates = vec![Candidate {
            name: "Park A".into(),
            location: "lake view".into(),
            sentiment_score: 0.91234,
            review: None,
            backfilled: false,
        }];
        let formatted = Recommender::format(&candidates);
        assert_eq!(
            formatted,
            vec![Recommendation {
                name: "Park A".into(),
                location: "Lake View".into(),
                sentiment_score: 0.91,
                rating: 4.6,
                sample_review: MISSING_REVIEW.into(),
            }]
        );
    }

    #[test]
    fn test_recommend_empty_result_has_message() {
        let response = recommender().recommend("Atlantis", None).unwrap();
        assert!(response.places.is_empty());
        assert!(response.dining.is_empty());
        assert!(response.message.unwrap().contains("Atlantis"));
    }

    #[test]
    fn test_recommend_clamps_limit() {
        let recommender = recommender();
        let response = recommender.recommend("lakeview", Some(1)).unwrap();
        assert_eq!(response.places.len(), 1);
        assert_eq!(response.message, None);

        let response = recommender.recommend("lakeview", Some(0)).unwrap();
        assert_eq!(response.places.len(), 1);
    }

    #[test]
    fn test_locations_sorted_and_distinct() {
        assert_eq!(recommender().locations(), vec!["hillside", "lakeview"]);
    }

    #[test]
    fn test_rebuild_swaps_one_set() {
        let recommender = recommender();
        let table = RawTable::from_strs(
            &["place", "location", "review"],
            &[&["Noodle Bar", "Lakeview", "delicious"]],
        );
        let summary = recommender.rebuild(Category::Dining, &table).unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.places, 1);

        let recs = recommender.get_recommendations("lakeview").unwrap();
        assert_eq!(recs.dining_spots[0].name, "Noodle Bar");
        assert_eq!(recs.tourist_places.len(), 2);
    }

    #[test]
    fn test_rebuild_schema_error_keeps_current_set() {
        let recommender = recommender();
        let before = recommender.snapshot();
        let bad = RawTable::from_strs(&["title", "stars"], &[&["X", "5"]]);

        let err = recommender.rebuild(Category::Attraction, &bad).unwrap_err();
        assert!(matches!(err, RecommendError::Schema { .. }));
        assert!(Arc::ptr_eq(&before, &recommender.snapshot()));
    }

    #[test]
    fn test_build_fails_on_schema_error() {
        let bad = RawTable::from_strs(&["title", "stars"], &[]);
        let result = Recommender::build(
            &bad,
            &attractions(),
            Arc::new(LexiconScorer::new()),
            RecommenderOptions::default(),
        );
        assert!(matches!(
            result,
            Err(RecommendError::Schema {
                category: Category::Dining,
                ..
            })
        ));
    }
}

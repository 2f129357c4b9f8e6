//! End-to-end tests for the normalize → score → rank → format pipeline.

use proptest::prelude::*;
use roam_recommender::{
    normalize, sentiment_to_rating, top_n, Category, LexiconScorer, RawTable, Recommender,
    RecommenderOptions, SentimentAggregator,
};
use std::collections::HashSet;
use std::sync::Arc;

fn attractions() -> RawTable {
    RawTable::from_strs(
        &["Unnamed: 0", "spot_name", "city", "feedback"],
        &[
            &["0", "Park A", "Lakeview", "amazing and beautiful"],
            &["1", "Park B", "Lakeview", "terrible, dirty"],
            &["2", "Old Fort", "Hillside", "a charming little fort"],
        ],
    )
}

fn dining() -> RawTable {
    RawTable::from_strs(
        &["Restaurant Name", "Address", "Reviews"],
        &[
            &["Cafe Corner", "Hillside", "cozy and friendly"],
            &["Pizza Place", "Hillside", "stale crust, rude staff"],
        ],
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

#[test]
fn test_park_a_ranks_above_park_b() {
    let recs = recommender().get_recommendations("Lakeview").unwrap();

    let names: Vec<_> = recs.tourist_places.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Park A", "Park B"]);
    assert!(recs.tourist_places[0].sentiment_score > recs.tourist_places[1].sentiment_score);
    assert!(recs.dining_spots.is_empty());
}

#[test]
fn test_location_is_case_insensitive() {
    let recommender = recommender();
    let shouted = recommender.get_recommendations("LAKEVIEW ").unwrap();
    let plain = recommender.get_recommendations("lakeview").unwrap();
    assert_eq!(shouted, plain);
}

#[test]
fn test_formatted_response() {
    let response = recommender().recommend("hillside", None).unwrap();

    assert_eq!(response.places.len(), 1);
    assert_eq!(response.places[0].name, "Old Fort");
    assert_eq!(response.places[0].location, "Hillside");

    assert_eq!(response.dining[0].name, "Cafe Corner");
    assert_eq!(response.dining[1].name, "Pizza Place");
    assert!(response.dining[0].rating > response.dining[1].rating);
    for rec in response.places.iter().chain(&response.dining) {
        assert!((1.0..=5.0).contains(&rec.rating));
        assert!((0.0..=1.0).contains(&rec.sentiment_score));
    }
    assert!(response.message.is_none());
}

#[test]
fn test_backfill_from_unscored_places() {
    let table = RawTable::from_rows(
        vec!["name".into(), "city".into(), "review".into()],
        vec![
            vec![Some("Gallery".into()), Some("Lakeview".into()), None],
            vec![Some("Pier".into()), Some("Lakeview".into()), Some("lovely sunset".into())],
            vec![Some("Market".into()), Some("Lakeview".into()), None],
            vec![Some("Tower".into()), Some("Lakeview".into()), Some("boring".into())],
            vec![Some("Garden".into()), Some("Lakeview".into()), Some("   ".into())],
        ],
    );
    let set = normalize(&table, Category::Attraction).unwrap();
    let processed = SentimentAggregator::new(Arc::new(LexiconScorer::new())).process(set);

    let top = top_n(&processed, "lakeview", 3);
    let names: Vec<_> = top.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Pier", "Tower", "Gallery"]);
    assert_eq!(top[2].sentiment_score, 0.5);
    assert!(top[2].backfilled);
}

fn cell() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("   ".to_string())),
        "[A-Za-z ]{1,12}".prop_map(Some),
        prop::sample::select(vec!["great view", "dirty", "not bad", "No review available"])
            .prop_map(|s| Some(s.to_string())),
    ]
}

fn table() -> impl Strategy<Value = RawTable> {
    prop::collection::vec(prop::collection::vec(cell(), 3), 0..20).prop_map(|rows| {
        RawTable::from_rows(
            vec!["Place_Name".into(), " City ".into(), "comment".into()],
            rows,
        )
    })
}

proptest! {
    #[test]
    fn normalize_is_idempotent(table in table()) {
        let once = normalize(&table, Category::Dining).unwrap();
        let twice = normalize(&once.to_table(), Category::Dining).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn rating_is_monotonic_and_bounded(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(sentiment_to_rating(lo) <= sentiment_to_rating(hi));
        prop_assert!((1.0..=5.0).contains(&sentiment_to_rating(lo)));
        prop_assert!((1.0..=5.0).contains(&sentiment_to_rating(hi)));
    }

    #[test]
    fn top_n_is_bounded_and_distinct(table in table(), n in 0usize..6) {
        let set = normalize(&table, Category::Attraction).unwrap();
        let available: HashSet<String> = set
            .records
            .iter()
            .filter(|r| r.location == "unknown")
            .map(|r| r.place.clone())
            .collect();
        let processed = SentimentAggregator::new(Arc::new(LexiconScorer::new())).process(set);

        let top = top_n(&processed, "unknown", n);
        prop_assert_eq!(top.len(), n.min(available.len()));

        let names: HashSet<&str> = top.iter().map(|c| c.name.as_str()).collect();
        prop_assert_eq!(names.len(), top.len());
    }
}

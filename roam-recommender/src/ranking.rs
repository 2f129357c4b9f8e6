//! Location-filtered top-N ranking.

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::sentiment::{ProcessedSet, NEUTRAL_SCORE};

/// A ranked place before display formatting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub name: String,
    pub location: String,
    pub sentiment_score: f64,
    /// Representative review, if the place has one
    pub review: Option<String>,
    /// Filled in from unscored places with the neutral score
    pub backfilled: bool,
}

/// Per-place group built while ranking.
struct Group {
    name: String,
    location: String,
    review: Option<String>,
    sum: f64,
    count: usize,
}

/// Top `n` places at `location` by mean sentiment.
///
/// `location` must already be normalized (lowercased, trimmed). Scored places
/// come first in descending score order, ties keeping encounter order; if
/// fewer than `n` exist, distinct unscored places follow with the neutral
/// score.
pub fn top_n(set: &ProcessedSet, location: &str, n: usize) -> Vec<Candidate> {
    if n == 0 {
        return Vec::new();
    }

    let matching: Vec<_> = set
        .records
        .iter()
        .filter(|r| r.record.location == location)
        .collect();

    let mut groups: Vec<Group> = Vec::new();
    let scored = matching
        .iter()
        .filter_map(|r| r.sentiment_score.map(|score| (&r.record, score)));
    for (record, score) in scored {
        match groups.iter_mut().find(|g| g.name == record.place) {
            Some(group) => {
                group.sum += score;
                group.count += 1;
            }
            None => groups.push(Group {
                name: record.place.clone(),
                location: record.location.clone(),
                review: record.has_review().then(|| record.review.clone()),
                sum: score,
                count: 1,
            }),
        }
    }

    let mut ranked: Vec<Candidate> = groups
        .into_iter()
        .map(|g| Candidate {
            sentiment_score: g.sum / g.count as f64,
            name: g.name,
            location: g.location,
            review: g.review,
            backfilled: false,
        })
        .collect();

    // sort_by is stable, so equal scores keep encounter order
    ranked.sort_by(|a, b| {
        b.sentiment_score
            .partial_cmp(&a.sentiment_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(n);

    if ranked.len() < n {
        let mut seen: HashSet<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
        let mut backfill = Vec::new();

        for unscored in matching.iter().filter(|r| r.sentiment_score.is_none()) {
            if ranked.len() + backfill.len() >= n {
                break;
            }
            if !seen.insert(unscored.record.place.as_str()) {
                continue;
            }
            backfill.push(Candidate {
                name: unscored.record.place.clone(),
                location: unscored.record.location.clone(),
                sentiment_score: NEUTRAL_SCORE,
                review: unscored
                    .record
                    .has_review()
                    .then(|| unscored.record.review.clone()),
                backfilled: true,
            });
        }
        ranked.extend(backfill);
    }

    debug!(
        category = %set.category,
        location,
        matching = matching.len(),
        candidates = ranked.len(),
        "Ranked places"
    );

    ranked
}

//! Polarity scoring.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::warn;

use super::lexicon::ReviewLexicon;

/// Score assigned when a text cannot be scored.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Recoverable per-review scoring failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringFailure {
    #[error("review text is empty")]
    EmptyText,

    #[error("scorer unavailable: {0}")]
    Unavailable(String),
}

/// Maps review text to a polarity in [0, 1] (0 negative, 1 positive).
pub trait PolarityScorer: Send + Sync {
    /// Raw polarity. Implementations may fail on text they cannot handle.
    fn polarity(&self, text: &str) -> Result<f64, ScoringFailure>;

    /// Polarity that never fails: clamped to [0, 1], neutral on failure.
    fn score(&self, text: &str) -> f64 {
        match self.polarity(text) {
            Ok(value) if value.is_finite() => value.clamp(0.0, 1.0),
            Ok(value) => {
                warn!(value, "Scorer returned a non-finite polarity, using neutral score");
                NEUTRAL_SCORE
            }
            Err(e) => {
                warn!(error = %e, "Scoring failed, using neutral score");
                NEUTRAL_SCORE
            }
        }
    }
}

impl<S: PolarityScorer + ?Sized> PolarityScorer for Arc<S> {
    fn polarity(&self, text: &str) -> Result<f64, ScoringFailure> {
        (**self).polarity(text)
    }
}

/// Rule-based scorer backed by [`ReviewLexicon`].
#[derive(Default)]
pub struct LexiconScorer {
    lexicon: ReviewLexicon,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> Result<f64, ScoringFailure> {
        if text.trim().is_empty() {
            return Err(ScoringFailure::EmptyText);
        }
        let result = self.lexicon.analyze(text);
        Ok((result.compound + 1.0) / 2.0)
    }
}

/// LRU cache in front of another scorer, keyed by exact text.
pub struct CachedScorer<S> {
    inner: S,
    cache: Option<Mutex<LruCache<String, f64>>>,
}

impl<S: PolarityScorer> CachedScorer<S> {
    /// Wrap `inner`; a capacity of 0 disables caching.
    pub fn new(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            cache: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of cached entries.
    pub fn cached_len(&self) -> usize {
        self.cache
            .as_ref()
            .and_then(|c| c.lock().ok().map(|c| c.len()))
            .unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.lock() {
                cache.clear();
            }
        }
    }
}

impl<S: PolarityScorer> PolarityScorer for CachedScorer<S> {
    fn polarity(&self, text: &str) -> Result<f64, ScoringFailure> {
        let Some(cache) = &self.cache else {
            return self.inner.polarity(text);
        };

        if let Ok(mut cache) = cache.lock() {
            if let Some(value) = cache.get(text) {
                return Ok(*value);
            }
        }

        // Failures are not cached.
        let value = self.inner.polarity(text)?;
        if let Ok(mut cache) = cache.lock() {
            cache.put(text.to_string(), value);
        }
        Ok(value)
    }
}

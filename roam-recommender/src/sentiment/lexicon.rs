//! Review sentiment lexicon.
//!
//! Rule-based valence lookup tuned for travel and restaurant reviews. Word
//! valences use a -4..=4 scale; the per-text sum is squashed into [-1, 1].

use std::collections::HashMap;

/// Squashing constant for the compound score (`x / sqrt(x² + α)`).
const NORMALIZATION_ALPHA: f64 = 15.0;
/// Dampening applied to a negated valence (flips and shrinks it).
const NEGATION_SCALAR: f64 = -0.74;
/// Tokens after a negation that it can still reach.
const NEGATION_WINDOW: usize = 3;
/// Emphasis added per exclamation mark.
const EXCLAMATION_BOOST: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

/// Review sentiment lexicon.
pub struct ReviewLexicon {
    words: HashMap<&'static str, f64>,
    negations: Vec<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for ReviewLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewLexicon {
    /// Create a lexicon with the built-in review vocabulary.
    pub fn new() -> Self {
        let positive: &[(&str, f64)] = &[
            ("amazing", 2.8),
            ("awesome", 3.1),
            ("beautiful", 2.9),
            ("best", 3.2),
            ("breathtaking", 3.0),
            ("brilliant", 2.8),
            ("charming", 2.2),
            ("clean", 1.7),
            ("comfortable", 1.8),
            ("cozy", 1.9),
            ("delicious", 2.7),
            ("delightful", 2.8),
            ("enjoy", 2.2),
            ("enjoyed", 2.3),
            ("excellent", 3.2),
            ("fantastic", 2.6),
            ("fresh", 1.3),
            ("friendly", 2.2),
            ("fun", 2.3),
            ("gem", 2.0),
            ("good", 1.9),
            ("gorgeous", 3.0),
            ("great", 3.1),
            ("happy", 2.7),
            ("helpful", 1.8),
            ("impressive", 2.3),
            ("incredible", 2.6),
            ("love", 3.2),
            ("loved", 2.9),
            ("lovely", 2.8),
            ("memorable", 2.0),
            ("nice", 1.8),
            ("peaceful", 2.2),
            ("perfect", 2.7),
            ("pleasant", 2.3),
            ("polite", 1.8),
            ("recommend", 1.5),
            ("relaxing", 2.0),
            ("scenic", 1.9),
            ("spectacular", 2.9),
            ("stunning", 2.9),
            ("superb", 3.1),
            ("tasty", 2.2),
            ("welcoming", 2.0),
            ("wonderful", 2.7),
            ("worth", 1.3),
            ("yummy", 2.4),
        ];

        let negative: &[(&str, f64)] = &[
            ("awful", -2.0),
            ("bad", -2.5),
            ("bland", -1.3),
            ("boring", -1.3),
            ("broken", -1.6),
            ("closed", -0.8),
            ("cold", -0.6),
            ("crowded", -1.2),
            ("dangerous", -2.1),
            ("dirty", -1.9),
            ("disappointed", -1.9),
            ("disappointing", -2.2),
            ("disgusting", -2.4),
            ("expensive", -1.0),
            ("filthy", -2.4),
            ("gross", -2.1),
            ("hate", -2.7),
            ("horrible", -2.5),
            ("mediocre", -1.0),
            ("noisy", -1.2),
            ("overpriced", -1.6),
            ("poor", -2.1),
            ("rude", -2.0),
            ("sad", -2.1),
            ("scam", -2.6),
            ("slow", -1.0),
            ("smelly", -1.6),
            ("stale", -1.3),
            ("terrible", -2.5),
            ("unfriendly", -1.9),
            ("unsafe", -2.2),
            ("waste", -1.8),
            ("worse", -2.1),
            ("worst", -3.1),
        ];

        let negations = vec![
            "not", "no", "never", "neither", "nor", "nothing", "none", "nobody", "nowhere",
            "cannot", "cant", "can't", "don't", "dont", "doesn't", "doesnt", "didn't", "didnt",
            "won't", "wont", "wouldn't", "wouldnt", "isn't", "isnt", "aren't", "arent", "wasn't",
            "wasnt", "weren't", "werent", "hardly", "barely", "without",
        ];

        let intensifiers: HashMap<&'static str, f64> = [
            ("absolutely", 1.3),
            ("extremely", 1.4),
            ("incredibly", 1.3),
            ("really", 1.2),
            ("so", 1.2),
            ("super", 1.3),
            ("totally", 1.2),
            ("very", 1.3),
            ("fairly", 0.8),
            ("kinda", 0.7),
            ("slightly", 0.6),
            ("somewhat", 0.7),
        ]
        .into_iter()
        .collect();

        Self {
            words: positive.iter().chain(negative).copied().collect(),
            negations,
            intensifiers,
        }
    }

    /// Valence of a single lowercase token.
    pub fn valence(&self, word: &str) -> Option<f64> {
        self.words.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(&word)
    }

    pub fn intensifier(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(word).copied()
    }

    /// Analyze a text.
    ///
    /// Sentiment words are looked up per token; a negation flips (and damps)
    /// the next sentiment word within a short window, intensifiers scale the
    /// word that follows them, and clauses after "but" outweigh those before.
    pub fn analyze(&self, text: &str) -> LexiconResult {
        let tokens = tokenize(text);

        let mut valences: Vec<f64> = Vec::new();
        let mut matched_words: Vec<(String, f64)> = Vec::new();
        let mut negation_distance: Option<usize> = None;
        let mut intensifier: f64 = 1.0;
        let mut but_index: Option<usize> = None;

        for token in &tokens {
            let word = token.as_str();

            if word == "but" {
                but_index = Some(valences.len());
                negation_distance = None;
                intensifier = 1.0;
                continue;
            }

            if self.is_negation(word) {
                negation_distance = Some(0);
                continue;
            }

            if let Some(mult) = self.intensifier(word) {
                intensifier = mult;
                continue;
            }

            match self.valence(word) {
                Some(base) => {
                    let mut valence = base * intensifier;
                    if negation_distance.is_some() {
                        valence *= NEGATION_SCALAR;
                    }
                    negation_distance = None;
                    intensifier = 1.0;

                    valences.push(valence);
                    matched_words.push((word.to_string(), valence));
                }
                None => {
                    intensifier = 1.0;
                    negation_distance = match negation_distance {
                        Some(d) if d + 1 < NEGATION_WINDOW => Some(d + 1),
                        _ => None,
                    };
                }
            }
        }

        if let Some(split) = but_index {
            for (i, valence) in valences.iter_mut().enumerate() {
                *valence *= if i < split { 0.5 } else { 1.5 };
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            let bangs = text.matches('!').count().min(MAX_EXCLAMATIONS) as f64;
            sum += sum.signum() * bangs * EXCLAMATION_BOOST;
        }

        let compound = if valences.is_empty() {
            0.0
        } else {
            sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()
        };

        LexiconResult {
            compound: compound.clamp(-1.0, 1.0),
            matched_words,
            token_count: tokens.len(),
        }
    }
}

/// Split into lowercase word tokens, keeping in-word apostrophes.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .map(|t| t.trim_matches(|c| c == '\'' || c == '’').replace('’', "'"))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Result from lexicon-based analysis
#[derive(Debug, Clone)]
pub struct LexiconResult {
    /// Overall compound score (-1 to 1)
    pub compound: f64,
    /// Words that matched with their effective valence
    pub matched_words: Vec<(String, f64)>,
    /// Number of tokens in the text
    pub token_count: usize,
}

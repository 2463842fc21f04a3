use crate::domain::error::SourceError;
use crate::domain::ports::sentiment_scorer::SentimentScorer;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Normalization constant: `s / sqrt(s^2 + ALPHA)` maps any raw sum into
/// (-1, 1) and reaches ±0.5 around a raw sum of ±2.2.
const ALPHA: f64 = 15.0;

/// How many preceding tokens a negator reaches.
const NEGATION_WINDOW: usize = 3;

const BOOST: f64 = 1.5;

/// Word valences on a -4..=4 scale, tuned for market headlines.
const WORDS: &[(&str, i8)] = &[
    // positive
    ("beat", 2), ("beats", 2), ("bullish", 3), ("boost", 2), ("boosts", 2),
    ("breakthrough", 3), ("buy", 1), ("climb", 2), ("climbs", 2), ("confident", 2),
    ("gain", 2), ("gains", 2), ("good", 2), ("great", 3), ("growth", 2),
    ("high", 1), ("higher", 1), ("improve", 2), ("improves", 2), ("jump", 2),
    ("jumps", 2), ("outperform", 2), ("outperforms", 2), ("optimistic", 2), ("positive", 2),
    ("profit", 2), ("profits", 2), ("rally", 3), ("rallies", 3), ("record", 1),
    ("rebound", 2), ("rebounds", 2), ("rise", 2), ("rises", 2), ("soar", 3),
    ("soars", 3), ("strong", 2), ("stronger", 2), ("success", 2), ("surge", 3),
    ("surges", 3), ("top", 1), ("upbeat", 2), ("upgrade", 2), ("upgraded", 2),
    ("win", 2), ("wins", 2),
    // negative
    ("bad", -2), ("bankruptcy", -4), ("bearish", -3), ("crash", -4), ("crashes", -4),
    ("cut", -1), ("cuts", -1), ("decline", -2), ("declines", -2), ("default", -3),
    ("downgrade", -2), ("downgraded", -2), ("drop", -2), ("drops", -2), ("fall", -2),
    ("falls", -2), ("fear", -2), ("fears", -2), ("fraud", -4), ("lawsuit", -2),
    ("layoffs", -2), ("lose", -2), ("loses", -2), ("loss", -2), ("losses", -2),
    ("low", -1), ("lower", -1), ("miss", -2), ("misses", -2), ("negative", -2),
    ("plunge", -3), ("plunges", -3), ("probe", -2), ("recall", -2), ("recession", -3),
    ("risk", -1), ("risks", -1), ("selloff", -3), ("sink", -2), ("sinks", -2),
    ("slump", -3), ("slumps", -3), ("tumble", -3), ("tumbles", -3), ("underperform", -2),
    ("volatile", -1), ("warning", -2), ("weak", -2), ("weaker", -2), ("worst", -3),
];

const BOOSTERS: &[&str] = &["very", "extremely", "sharply", "hugely", "massive", "significantly"];

static LEXICON: Lazy<HashMap<&'static str, i8>> = Lazy::new(|| WORDS.iter().copied().collect());

/// Lexicon sentiment scorer with a short negation window and intensifiers.
#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    /// Raw valence sum before normalization.
    fn raw_score(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score = 0.0;

        for (i, tok) in tokens.iter().enumerate() {
            let Some(&base) = LEXICON.get(tok.as_str()) else {
                continue;
            };
            let mut v = f64::from(base);
            if i >= 1 && BOOSTERS.contains(&tokens[i - 1].as_str()) {
                v *= BOOST;
            }
            let negated = (1..=NEGATION_WINDOW).any(|k| i >= k && is_negator(&tokens[i - k]));
            if negated {
                v = -v;
            }
            score += v;
        }

        score
    }

    pub fn polarity(&self, text: &str) -> f64 {
        let s = self.raw_score(text);
        if s == 0.0 {
            return 0.0;
        }
        (s / (s * s + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

/// Alphanumeric, lower-cased tokens. Apostrophes stay inside words so that
/// "isn't" survives as a single negator.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "isn't" | "wasn't" | "aren't" | "won't" | "can't" | "cannot"
            | "without" | "didn't" | "doesn't" | "fails" | "failed"
    )
}

#[async_trait::async_trait]
impl SentimentScorer for LexiconScorer {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn score(&self, text: &str) -> Result<f64, SourceError> {
        Ok(self.polarity(text))
    }
}

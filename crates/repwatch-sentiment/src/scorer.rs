//! Sentiment scoring: the keyword fallback scorer, the `Scorer` capability
//! trait, and the analyzer that chains a remote provider in front of the
//! local scorer.

use std::sync::Arc;

use async_trait::async_trait;
use repwatch_core::Sentiment;

use crate::error::SentimentError;
use crate::remote::RemoteScorer;
use crate::types::{SentimentAnalysis, SentimentConfig};

/// Positive cues. Matched as lowercase substrings, so `super` also counts
/// inside `superb`.
pub(crate) const POSITIVE_CUES: &[&str] = &[
    // French
    "excellent",
    "super",
    "génial",
    "merci",
    "bravo",
    "félicitations",
    "parfait",
    "top",
    "recommandé",
    "satisfait",
    "content",
    "heureux",
    // English
    "great",
    "amazing",
    "awesome",
    "love",
    "perfect",
    "happy",
    "fantastic",
    "brilliant",
    "impressive",
    "thank",
];

/// Negative cues, matched the same way as [`POSITIVE_CUES`].
pub(crate) const NEGATIVE_CUES: &[&str] = &[
    // French
    "mauvais",
    "nul",
    "déçu",
    "problème",
    "erreur",
    "bug",
    "lent",
    "cher",
    "inutile",
    "décevant",
    "horrible",
    "catastrophe",
    "scandale",
    // English
    "bad",
    "terrible",
    "awful",
    "disappoint",
    "broken",
    "useless",
    "worst",
    "poor",
    "problem",
    "waste",
];

/// Upper bound on the magnitude of a keyword-derived score.
pub const LOCAL_SCORE_SATURATION: f64 = 0.7;

const LOCAL_SCORE_BASE: f64 = 0.3;
const LOCAL_SCORE_STEP: f64 = 0.1;

fn count_occurrences(haystack: &str, cues: &[&str]) -> usize {
    cues.iter().map(|cue| haystack.matches(cue).count()).sum()
}

/// Score text by counting keyword cues.
///
/// The majority side wins. Its magnitude starts at 0.3 and grows by 0.1 per
/// occurrence, saturating at [`LOCAL_SCORE_SATURATION`]. Ties (including no
/// cues at all) are neutral with a score of exactly `0.0`.
///
/// Every occurrence counts, not just each distinct cue: `"excellent
/// excellent"` scores 0.5, where a distinct-cue count would give 0.4.
#[must_use]
pub fn lexicon_score(text: &str) -> SentimentAnalysis {
    let lowered = text.to_lowercase();
    let positive = count_occurrences(&lowered, POSITIVE_CUES);
    let negative = count_occurrences(&lowered, NEGATIVE_CUES);

    #[allow(clippy::cast_precision_loss)]
    let magnitude = |count: usize| {
        (LOCAL_SCORE_BASE + LOCAL_SCORE_STEP * count as f64).min(LOCAL_SCORE_SATURATION)
    };

    let (sentiment, score) = match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => (Sentiment::Positive, magnitude(positive)),
        std::cmp::Ordering::Less => (Sentiment::Negative, -magnitude(negative)),
        std::cmp::Ordering::Equal => (Sentiment::Neutral, 0.0),
    };

    SentimentAnalysis {
        sentiment,
        score,
        confidence: None,
    }
}

/// A source of sentiment analyses.
///
/// Implementations may fail; callers that need a total result wrap them in
/// a [`SentimentAnalyzer`].
#[async_trait]
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(&self, text: &str, language: &str) -> Result<SentimentAnalysis, SentimentError>;
}

/// The keyword scorer as a [`Scorer`]. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScorer;

impl LocalScorer {
    /// Infallible form of [`Scorer::score`].
    #[must_use]
    pub fn analyze(&self, text: &str) -> SentimentAnalysis {
        lexicon_score(text)
    }
}

#[async_trait]
impl Scorer for LocalScorer {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn score(&self, text: &str, _language: &str) -> Result<SentimentAnalysis, SentimentError> {
        Ok(self.analyze(text))
    }
}

/// Runs an optional primary scorer and falls back to a [`LocalScorer`] on
/// any failure. `analyze` never returns an error.
#[derive(Clone)]
pub struct SentimentAnalyzer {
    primary: Option<Arc<dyn Scorer>>,
    fallback: LocalScorer,
}

impl SentimentAnalyzer {
    /// Analyzer that only uses the local keyword scorer.
    #[must_use]
    pub fn local() -> Self {
        Self {
            primary: None,
            fallback: LocalScorer,
        }
    }

    #[must_use]
    pub fn with_primary(primary: Arc<dyn Scorer>) -> Self {
        Self {
            primary: Some(primary),
            fallback: LocalScorer,
        }
    }

    /// Build an analyzer from configuration. The remote scorer is used only
    /// when both endpoint and key are present.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &SentimentConfig) -> Result<Self, SentimentError> {
        match (&config.endpoint, &config.api_key) {
            (Some(endpoint), Some(key)) => {
                let remote = RemoteScorer::new(endpoint, key, config.timeout)?;
                tracing::info!(endpoint = %endpoint, "remote sentiment scorer enabled");
                Ok(Self::with_primary(Arc::new(remote)))
            }
            _ => {
                tracing::info!("remote sentiment scorer not configured; using local keyword scorer");
                Ok(Self::local())
            }
        }
    }

    #[must_use]
    pub fn primary_name(&self) -> &'static str {
        self.primary
            .as_ref()
            .map_or_else(|| self.fallback.name(), |p| p.name())
    }

    pub async fn analyze(&self, text: &str, language: &str) -> SentimentAnalysis {
        if let Some(primary) = &self.primary {
            match primary.score(text, language).await {
                Ok(analysis) => return normalize(analysis),
                Err(e) => {
                    tracing::warn!(
                        scorer = primary.name(),
                        error = %e,
                        "sentiment scorer failed; falling back to local scorer"
                    );
                }
            }
        }
        self.fallback.analyze(text)
    }

    /// Score each text in order.
    pub async fn analyze_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        language: &str,
    ) -> Vec<SentimentAnalysis> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.analyze(text.as_ref(), language).await);
        }
        results
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::local()
    }
}

impl std::fmt::Debug for SentimentAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentAnalyzer")
            .field("primary", &self.primary_name())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

/// Keep provider output inside `[-1, 1]` and sign-consistent with its label.
fn normalize(mut analysis: SentimentAnalysis) -> SentimentAnalysis {
    analysis.score = if analysis.score.is_finite() {
        analysis.score.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let consistent = match analysis.sentiment {
        Sentiment::Positive => analysis.score > 0.0,
        Sentiment::Negative => analysis.score < 0.0,
        Sentiment::Neutral => true,
    };
    if !consistent {
        analysis.sentiment = Sentiment::Neutral;
        analysis.score = 0.0;
    }
    analysis
}

// ---------------------------------------------------------------------------
// Star ratings
// ---------------------------------------------------------------------------

/// Label for a 1-5 star rating: `>= 4` positive, `>= 2.5` neutral, else
/// negative. A NaN rating is neutral, matching its `0.0` score.
#[must_use]
pub fn sentiment_from_rating(rating: f64) -> Sentiment {
    if rating.is_nan() {
        Sentiment::Neutral
    } else if rating >= 4.0 {
        Sentiment::Positive
    } else if rating >= 2.5 {
        Sentiment::Neutral
    } else {
        Sentiment::Negative
    }
}

/// Map a rating onto `[-1, 1]`, clamping it to `[1, 5]` first.
#[must_use]
pub fn score_from_rating(rating: f64) -> f64 {
    let clamped = if rating.is_nan() { 3.0 } else { rating.clamp(1.0, 5.0) };
    (clamped - 3.0) / 2.0
}

#[must_use]
pub fn analysis_from_rating(rating: f64) -> SentimentAnalysis {
    SentimentAnalysis {
        sentiment: sentiment_from_rating(rating),
        score: score_from_rating(rating),
        confidence: None,
    }
}

//! Mention ingestion pipeline: score, classify, and evaluate alerts.
//!
//! The pipeline never fails. Storage of its output is the caller's concern.

use chrono::{DateTime, Utc};
use repwatch_core::{AlertDraft, NewMention, Reason, SourceType};
use serde::{Deserialize, Serialize};

use crate::alerts::evaluate_alert;
use crate::error::SentimentError;
use crate::reason::classify_reason;
use crate::scorer::{analysis_from_rating, SentimentAnalyzer};
use crate::types::{ConfidenceScores, SentimentAnalysis, SentimentConfig};

/// Longest stored mention body, in characters.
pub const MAX_CONTENT_CHARS: usize = 5000;

/// Raw mention text plus whatever metadata the caller already knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionInput {
    pub entity_id: i64,
    pub content: String,
    pub source: SourceType,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<Reason>,
    #[serde(default)]
    pub reason_detail: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl MentionInput {
    #[must_use]
    pub fn new(entity_id: i64, content: impl Into<String>, source: SourceType) -> Self {
        Self {
            entity_id,
            content: content.into(),
            source,
            source_url: None,
            author: None,
            published_at: None,
            reason: None,
            reason_detail: None,
            language: None,
        }
    }
}

/// Pipeline output: the mention to store and the alert, if one is due.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedMention {
    pub mention: NewMention,
    pub alert: Option<AlertDraft>,
    pub confidence: Option<ConfidenceScores>,
}

#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

#[derive(Debug, Clone)]
pub struct MentionPipeline {
    analyzer: SentimentAnalyzer,
    language: String,
}

impl MentionPipeline {
    #[must_use]
    pub fn new(analyzer: SentimentAnalyzer, language: &str) -> Self {
        Self {
            analyzer,
            language: language.to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns [`SentimentError`] if the remote scorer's HTTP client cannot
    /// be built.
    pub fn from_config(config: &SentimentConfig) -> Result<Self, SentimentError> {
        Ok(Self::new(
            SentimentAnalyzer::from_config(config)?,
            &config.language,
        ))
    }

    #[must_use]
    pub fn analyzer(&self) -> &SentimentAnalyzer {
        &self.analyzer
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Score the text with the analyzer and classify it.
    pub async fn prepare(&self, input: MentionInput, now: DateTime<Utc>) -> PreparedMention {
        let language = input
            .language
            .clone()
            .unwrap_or_else(|| self.language.clone());
        let analysis = self.analyzer.analyze(&input.content, &language).await;
        assemble(input, analysis, language, now)
    }

    /// Like [`prepare`](Self::prepare) but derives sentiment from a 1-5 star
    /// rating instead of the text.
    #[must_use]
    pub fn prepare_rated(&self, input: MentionInput, rating: f64, now: DateTime<Utc>) -> PreparedMention {
        let language = input
            .language
            .clone()
            .unwrap_or_else(|| self.language.clone());
        assemble(input, analysis_from_rating(rating), language, now)
    }
}

fn assemble(
    input: MentionInput,
    analysis: SentimentAnalysis,
    language: String,
    now: DateTime<Utc>,
) -> PreparedMention {
    let classified = classify_reason(
        &input.content,
        input.reason,
        input.reason_detail.as_deref(),
    );

    let mention = NewMention {
        entity_id: input.entity_id,
        content: truncate_chars(&input.content, MAX_CONTENT_CHARS).to_string(),
        source: input.source,
        source_url: input.source_url,
        author: input.author,
        sentiment: analysis.sentiment,
        sentiment_score: analysis.score,
        reason: Some(classified.reason),
        reason_detail: Some(classified.detail),
        published_at: input.published_at.unwrap_or(now),
        language,
    };

    // Alerts see the same untruncated text as the scorer and classifier.
    let mut scored = mention.to_scored();
    scored.text = input.content;
    let alert = evaluate_alert(&scored);

    PreparedMention {
        mention,
        alert,
        confidence: analysis.confidence,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use repwatch_core::{AlertSeverity, Sentiment};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()
    }

    fn pipeline() -> MentionPipeline {
        MentionPipeline::new(SentimentAnalyzer::local(), "fr")
    }

    #[tokio::test]
    async fn negative_text_is_scored_classified_and_alerted() {
        let input = MentionInput::new(
            4,
            "Batterie horrible, catastrophe totale, charge nulle",
            SourceType::Twitter,
        );
        let prepared = pipeline().prepare(input, now()).await;

        assert_eq!(prepared.mention.sentiment, Sentiment::Negative);
        assert_eq!(prepared.mention.reason, Some(Reason::Battery));
        assert_eq!(prepared.mention.published_at, now());
        assert_eq!(prepared.mention.language, "fr");
        let alert = prepared.alert.expect("negative mention should alert");
        assert_eq!(alert.severity, AlertSeverity::High);
        assert!(prepared.confidence.is_none());
    }

    #[tokio::test]
    async fn positive_text_raises_no_alert() {
        let input = MentionInput::new(4, "Super produit, merci", SourceType::Web);
        let prepared = pipeline().prepare(input, now()).await;
        assert_eq!(prepared.mention.sentiment, Sentiment::Positive);
        assert!(prepared.alert.is_none());
    }

    #[tokio::test]
    async fn provided_reason_and_date_are_kept() {
        let mut input = MentionInput::new(1, "rien de spécial", SourceType::News);
        input.reason = Some(Reason::Delivery);
        input.reason_detail = Some("Colis en retard".to_string());
        let published = now() - chrono::Duration::days(3);
        input.published_at = Some(published);
        input.language = Some("en".to_string());

        let prepared = pipeline().prepare(input, now()).await;
        assert_eq!(prepared.mention.reason, Some(Reason::Delivery));
        assert_eq!(prepared.mention.reason_detail.as_deref(), Some("Colis en retard"));
        assert_eq!(prepared.mention.published_at, published);
        assert_eq!(prepared.mention.language, "en");
    }

    #[tokio::test]
    async fn long_content_is_truncated() {
        let input = MentionInput::new(1, "é".repeat(MAX_CONTENT_CHARS + 10), SourceType::Web);
        let prepared = pipeline().prepare(input, now()).await;
        assert_eq!(prepared.mention.content.chars().count(), MAX_CONTENT_CHARS);
    }

    #[tokio::test]
    async fn critical_keyword_past_truncation_still_escalates() {
        let content = format!("horrible {} scandale", "x".repeat(MAX_CONTENT_CHARS));
        let input = MentionInput::new(1, content, SourceType::Reddit);
        let prepared = pipeline().prepare(input, now()).await;

        assert!(!prepared.mention.content.contains("scandale"));
        let alert = prepared.alert.expect("negative mention should alert");
        assert_eq!(alert.severity, AlertSeverity::High);
        assert_eq!(alert.message, "Mention containing critical keywords on reddit");
    }

    #[test]
    fn rated_import_uses_rating_not_text() {
        let input = MentionInput::new(2, "excellent excellent", SourceType::Web);
        let prepared = pipeline().prepare_rated(input, 1.0, now());
        assert_eq!(prepared.mention.sentiment, Sentiment::Negative);
        assert!((prepared.mention.sentiment_score + 1.0).abs() < 1e-9);
        assert_eq!(
            prepared.alert.map(|a| a.severity),
            Some(AlertSeverity::Critical)
        );
    }

    #[test]
    fn truncate_chars_keeps_short_text() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }
}

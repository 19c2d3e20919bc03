//! Sentiment scoring, reason classification and reputation analytics for
//! repwatch.
//!
//! Mentions flow through [`MentionPipeline`]: the text is scored by a
//! [`SentimentAnalyzer`] (remote provider with a local lexicon fallback),
//! assigned a [`Reason`](repwatch_core::Reason), and checked for alerts.
//! The aggregation modules are pure functions over
//! [`ScoredMention`](repwatch_core::ScoredMention) slices.

pub mod alerts;
pub mod error;
pub mod insights;
pub mod pipeline;
pub mod reason;
pub mod remote;
pub mod reputation;
pub mod scorer;
pub mod solutions;
pub mod types;

mod sources;

pub use alerts::{evaluate_alert, AlertDraft};
pub use error::SentimentError;
pub use insights::{generate_insights, Insights};
pub use pipeline::{MentionInput, MentionPipeline, PreparedMention, MAX_CONTENT_CHARS};
pub use reason::{classify_reason, ReasonMatch};
pub use remote::RemoteScorer;
pub use reputation::{
    aspect_sentiment, average_reputation, compute_reputation, compute_trend, mention_stats,
    reason_insights, AspectSentiment, MentionStats, ReasonInsights, ReputationScore,
};
pub use scorer::{lexicon_score, LocalScorer, Scorer, SentimentAnalyzer};
pub use solutions::{generate_bulk_solutions, generate_solution, BulkSolutions, Solution};
pub use sources::{CollectedMention, Collector};
pub use types::{CollectorConfig, ConfidenceScores, SentimentAnalysis, SentimentConfig};

//! Reputation aggregation over already-scored mentions.
//!
//! Everything here is recomputed from the mention set on every call. Time
//! windows are measured against an explicit `now`.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use repwatch_core::{Reason, ScoredMention, Sentiment, Trend};
use serde::Serialize;

/// Score reported for an entity with no mentions.
pub const NEUTRAL_BASELINE: f64 = 50.0;

/// Window separating "recent" from "older" mentions for the trend.
pub const TREND_WINDOW_DAYS: i64 = 30;

/// Minimum change in positive ratio that counts as a trend.
pub const TREND_MARGIN: f64 = 0.1;

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn percentage(count: usize, total: usize, decimals: i32) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_to(count as f64 / total as f64 * 100.0, decimals)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    #[must_use]
    pub fn tally<'a, I>(mentions: I) -> Self
    where
        I: IntoIterator<Item = &'a ScoredMention>,
    {
        let mut counts = Self::default();
        for m in mentions {
            match m.sentiment {
                Sentiment::Positive => counts.positive += 1,
                Sentiment::Neutral => counts.neutral += 1,
                Sentiment::Negative => counts.negative += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    #[must_use]
    pub fn distribution(&self, decimals: i32) -> SentimentDistribution {
        let total = self.total();
        SentimentDistribution {
            positive: percentage(self.positive, total, decimals),
            neutral: percentage(self.neutral, total, decimals),
            negative: percentage(self.negative, total, decimals),
        }
    }
}

/// Percentage of mentions per label. All zero when there are no mentions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReputationScore {
    pub entity_id: Option<i64>,
    pub entity_name: Option<String>,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
    pub total_mentions: usize,
    /// `0..=100`; neutral mentions earn half credit.
    pub reputation_score: f64,
    pub sentiment_distribution: SentimentDistribution,
    /// Only reasons with at least one mention appear.
    pub reason_distribution: BTreeMap<Reason, f64>,
    pub trend: Trend,
}

/// Aggregate mentions into a reputation score.
///
/// An empty set scores [`NEUTRAL_BASELINE`] with all-zero distributions and
/// a stable trend.
#[must_use]
pub fn compute_reputation(
    entity_id: Option<i64>,
    entity_name: Option<String>,
    mentions: &[ScoredMention],
    now: DateTime<Utc>,
) -> ReputationScore {
    let counts = SentimentCounts::tally(mentions);
    let total = mentions.len();

    #[allow(clippy::cast_precision_loss)]
    let reputation_score = if total == 0 {
        NEUTRAL_BASELINE
    } else {
        let credit = counts.positive as f64 + 0.5 * counts.neutral as f64;
        round_to(credit / total as f64 * 100.0, 2)
    };

    let reason_distribution = reason_counts(mentions)
        .into_iter()
        .map(|(reason, count)| (reason, percentage(count, total, 2)))
        .collect();

    ReputationScore {
        entity_id,
        entity_name,
        positive_count: counts.positive,
        neutral_count: counts.neutral,
        negative_count: counts.negative,
        total_mentions: total,
        reputation_score,
        sentiment_distribution: counts.distribution(2),
        reason_distribution,
        trend: compute_trend(mentions, now),
    }
}

/// Compare the positive ratio of the last 30 days with everything older.
///
/// Stable unless both windows have mentions and the ratios differ by more
/// than [`TREND_MARGIN`].
#[must_use]
pub fn compute_trend(mentions: &[ScoredMention], now: DateTime<Utc>) -> Trend {
    let since = now - Duration::days(TREND_WINDOW_DAYS);
    let (recent, older): (Vec<&ScoredMention>, Vec<&ScoredMention>) =
        mentions.iter().partition(|m| m.published_at >= since);

    if recent.is_empty() || older.is_empty() {
        return Trend::Stable;
    }

    #[allow(clippy::cast_precision_loss)]
    let positive_ratio = |set: &[&ScoredMention]| {
        let positive = set
            .iter()
            .filter(|m| m.sentiment == Sentiment::Positive)
            .count();
        positive as f64 / set.len() as f64
    };

    let recent_ratio = positive_ratio(recent.as_slice());
    let older_ratio = positive_ratio(older.as_slice());

    if recent_ratio > older_ratio + TREND_MARGIN {
        Trend::Improving
    } else if recent_ratio < older_ratio - TREND_MARGIN {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Count mentions per reason. Mentions without a reason are skipped.
#[must_use]
pub fn reason_counts(mentions: &[ScoredMention]) -> BTreeMap<Reason, usize> {
    let mut counts = BTreeMap::new();
    for reason in mentions.iter().filter_map(|m| m.reason) {
        *counts.entry(reason).or_insert(0) += 1;
    }
    counts
}

/// Mean sentiment score mapped from `[-1, 1]` to `[0, 100]`.
#[must_use]
pub fn average_reputation(mentions: &[ScoredMention]) -> f64 {
    if mentions.is_empty() {
        return NEUTRAL_BASELINE;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = mentions.iter().map(|m| m.sentiment_score).sum::<f64>() / mentions.len() as f64;
    round_to((mean + 1.0) / 2.0 * 100.0, 2)
}

// ---------------------------------------------------------------------------
// Reason insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopReason {
    pub reason: Reason,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReasonInsights {
    pub counts: BTreeMap<Reason, usize>,
    /// Share of mentions that carry a reason, not of all mentions.
    pub percentages: BTreeMap<Reason, f64>,
    pub top_reasons: Vec<TopReason>,
}

pub const TOP_REASON_LIMIT: usize = 5;

/// Global reason summary across all mentions.
#[must_use]
pub fn reason_insights(mentions: &[ScoredMention]) -> ReasonInsights {
    let counts = reason_counts(mentions);
    let with_reason: usize = counts.values().sum();

    let percentages: BTreeMap<Reason, f64> = counts
        .iter()
        .map(|(reason, count)| (*reason, percentage(*count, with_reason, 2)))
        .collect();

    let top_reasons = ranked_by_count(&counts)
        .into_iter()
        .take(TOP_REASON_LIMIT)
        .map(|(reason, count)| TopReason {
            reason,
            count,
            percentage: percentages.get(&reason).copied().unwrap_or(0.0),
        })
        .collect();

    ReasonInsights {
        counts,
        percentages,
        top_reasons,
    }
}

/// Highest count first; ties keep canonical reason order, not the order in
/// which reasons were first seen.
pub(crate) fn ranked_by_count(counts: &BTreeMap<Reason, usize>) -> Vec<(Reason, usize)> {
    let mut ranked: Vec<(Reason, usize)> = counts.iter().map(|(r, c)| (*r, *c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

// ---------------------------------------------------------------------------
// Aspect breakdown
// ---------------------------------------------------------------------------

/// Product aspects shown on the dashboard and the reason each maps to.
pub const ASPECTS: [(&str, Reason); 5] = [
    ("camera", Reason::Camera),
    ("battery", Reason::Battery),
    ("performance", Reason::Performance),
    ("design", Reason::BuildQuality),
    ("price", Reason::Price),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AspectSentiment {
    pub total_mentions: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub positive_percentage: f64,
    pub neutral_percentage: f64,
    pub negative_percentage: f64,
}

#[must_use]
pub fn aspect_sentiment(mentions: &[ScoredMention]) -> BTreeMap<&'static str, AspectSentiment> {
    ASPECTS
        .iter()
        .map(|(aspect, reason)| {
            let counts =
                SentimentCounts::tally(mentions.iter().filter(|m| m.reason == Some(*reason)));
            let dist = counts.distribution(1);
            (
                *aspect,
                AspectSentiment {
                    total_mentions: counts.total(),
                    positive: counts.positive,
                    neutral: counts.neutral,
                    negative: counts.negative,
                    positive_percentage: dist.positive,
                    neutral_percentage: dist.neutral,
                    negative_percentage: dist.negative,
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Per-entity window stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MentionStats {
    pub period_days: i64,
    pub total_mentions: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub reason_counts: BTreeMap<Reason, usize>,
}

/// Stats over mentions published in the last `days` days.
#[must_use]
pub fn mention_stats(mentions: &[ScoredMention], days: i64, now: DateTime<Utc>) -> MentionStats {
    let since = now - Duration::days(days);
    let window: Vec<ScoredMention> = mentions
        .iter()
        .filter(|m| m.published_at >= since)
        .cloned()
        .collect();
    let counts = SentimentCounts::tally(&window);

    MentionStats {
        period_days: days,
        total_mentions: window.len(),
        positive: counts.positive,
        neutral: counts.neutral,
        negative: counts.negative,
        sentiment_distribution: counts.distribution(2),
        reason_counts: reason_counts(&window),
    }
}

//! Template-driven insight summary for the demo dashboard.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use repwatch_core::{Reason, ScoredMention, Sentiment};
use serde::Serialize;

use crate::reputation::{percentage, ranked_by_count, SentimentCounts};

const RECENT_WINDOW_DAYS: i64 = 14;
const MAX_ENTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightsOverview {
    Empty {
        message: String,
    },
    Totals {
        total_mentions: usize,
        positive: usize,
        neutral: usize,
        negative: usize,
        recent_mentions: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasonShare {
    pub reason: String,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub topic: String,
    pub recommended_action: String,
    pub estimated_impact: String,
    pub sample_quote: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub generated_at: DateTime<Utc>,
    pub overview: InsightsOverview,
    pub top_reasons: Vec<ReasonShare>,
    pub recommendations: Vec<Recommendation>,
}

#[must_use]
pub fn reason_label(reason: Reason) -> &'static str {
    match reason {
        Reason::Performance => "Performance & stability",
        Reason::Camera => "Camera quality",
        Reason::Battery => "Battery & charging",
        Reason::BuildQuality => "Build quality & design",
        Reason::Price => "Pricing & value",
        Reason::Software => "Software experience",
        Reason::Connectivity => "Connectivity & audio",
        Reason::CustomerSupport => "Customer support",
        Reason::Delivery => "Delivery & packaging",
        Reason::Experience => "Overall experience",
        Reason::Other => "Miscellaneous feedback",
    }
}

fn action_for(reason: Reason) -> &'static str {
    match reason {
        Reason::Performance => {
            "Review recent firmware updates, reproduce lag scenarios and publish a patch roadmap."
        }
        Reason::Camera => {
            "Plan a camera tuning update and share before/after samples to reassure customers."
        }
        Reason::Battery => {
            "Communicate charging best practices and investigate reports of overheating."
        }
        Reason::BuildQuality => {
            "Launch a quality inspection campaign and consider proactive replacements for defective units."
        }
        Reason::Price => {
            "Review promotional strategy or bundle added value to justify the price point."
        }
        Reason::Software => {
            "Accelerate the next software update and publish a known issues tracker."
        }
        Reason::Connectivity => {
            "Validate antenna and audio calibration, provide troubleshooting guidance."
        }
        Reason::CustomerSupport => {
            "Improve first-response SLAs and escalate unresolved tickets with a dedicated task force."
        }
        Reason::Delivery => {
            "Audit the logistics partner workflow and send proactive status updates to buyers."
        }
        Reason::Experience => "Launch a satisfaction survey and announce concrete improvements.",
        Reason::Other => {
            "Review the detailed comments to identify emerging topics requiring attention."
        }
    }
}

/// Pick one of three impact phrasings. The template index comes from the raw
/// share; the displayed percentage is clamped to `[10%, 90%]`.
fn impact_message(negative_share: f64) -> String {
    let shown = format!("{:.0}%", negative_share.clamp(0.1, 0.9) * 100.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (negative_share * 3.0).floor() as usize % 3;
    match index {
        0 => format!("High visibility issue: resolving it could reduce negative feedback by ~{shown}."),
        1 => format!(
            "Addressing this topic first could recover an estimated {shown} of dissatisfied customers."
        ),
        _ => format!("Quick wins here could improve overall sentiment by around {shown}."),
    }
}

fn reason_or_other(m: &ScoredMention) -> Reason {
    m.reason.unwrap_or(Reason::Other)
}

fn count_by_reason<'a, I>(mentions: I) -> BTreeMap<Reason, usize>
where
    I: IntoIterator<Item = &'a ScoredMention>,
{
    let mut counts = BTreeMap::new();
    for m in mentions {
        *counts.entry(reason_or_other(m)).or_insert(0) += 1;
    }
    counts
}

/// Summarize feedback into an overview, top reasons and recommendations.
///
/// Mentions without a reason are grouped under `Other`. Recommendations
/// cover the reasons with the most negative mentions.
#[must_use]
pub fn generate_insights(mentions: &[ScoredMention], now: DateTime<Utc>) -> Insights {
    if mentions.is_empty() {
        return Insights {
            generated_at: now,
            overview: InsightsOverview::Empty {
                message: "No customer feedback found yet.".to_string(),
            },
            top_reasons: Vec::new(),
            recommendations: Vec::new(),
        };
    }

    let total = mentions.len();
    let counts = SentimentCounts::tally(mentions);
    let since = now - Duration::days(RECENT_WINDOW_DAYS);
    let recent = mentions.iter().filter(|m| m.published_at >= since).count();

    let negatives: Vec<&ScoredMention> = mentions
        .iter()
        .filter(|m| m.sentiment == Sentiment::Negative)
        .collect();
    let reason_counts = count_by_reason(mentions);
    let negative_counts = count_by_reason(negatives.iter().copied());

    let top_reasons = ranked_by_count(&reason_counts)
        .into_iter()
        .take(MAX_ENTRIES)
        .map(|(reason, count)| ReasonShare {
            reason: reason_label(reason).to_string(),
            share: percentage(count, total, 1),
        })
        .collect();

    let recommendations = ranked_by_count(&negative_counts)
        .into_iter()
        .take(MAX_ENTRIES)
        .map(|(reason, negative)| {
            let reason_total = reason_counts.get(&reason).copied().unwrap_or(1).max(1);
            #[allow(clippy::cast_precision_loss)]
            let negative_share = negative as f64 / reason_total as f64;
            let sample_quote = negatives
                .iter()
                .find(|m| reason_or_other(m) == reason && !m.text.is_empty())
                .map(|m| m.text.clone());
            Recommendation {
                topic: reason_label(reason).to_string(),
                recommended_action: action_for(reason).to_string(),
                estimated_impact: impact_message(negative_share),
                sample_quote,
            }
        })
        .collect();

    Insights {
        generated_at: now,
        overview: InsightsOverview::Totals {
            total_mentions: total,
            positive: counts.positive,
            neutral: counts.neutral,
            negative: counts.negative,
            recent_mentions: recent,
        },
        top_reasons,
        recommendations,
    }
}

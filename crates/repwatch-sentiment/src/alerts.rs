//! Alert evaluation for freshly scored mentions.

pub use repwatch_core::AlertDraft;
use repwatch_core::{AlertSeverity, ScoredMention, Sentiment};

/// Phrases that escalate a negative mention to at least `high`.
pub const CRITICAL_KEYWORDS: &[&str] = &[
    "scandale",
    "crise",
    "problème grave",
    "erreur critique",
    "bug majeur",
    "défaillance",
    "incident",
    "scandal",
    "crisis",
    "critical error",
    "major bug",
    "outage",
];

pub const CRITICAL_THRESHOLD: f64 = -0.7;
pub const HIGH_THRESHOLD: f64 = -0.5;

/// Decide whether a scored mention raises an alert.
///
/// Only negative mentions alert: below -0.7 is critical, below -0.5 high,
/// anything else medium. A critical keyword in the text raises a non-critical
/// alert to high. Keywords alone never create an alert for a neutral or
/// positive mention.
#[must_use]
pub fn evaluate_alert(mention: &ScoredMention) -> Option<AlertDraft> {
    if mention.sentiment != Sentiment::Negative {
        return None;
    }

    let source = mention.source;
    let mut draft = if mention.sentiment_score < CRITICAL_THRESHOLD {
        AlertDraft {
            severity: AlertSeverity::Critical,
            message: format!("Very negative mention detected on {source}"),
        }
    } else if mention.sentiment_score < HIGH_THRESHOLD {
        AlertDraft {
            severity: AlertSeverity::High,
            message: format!("Negative mention detected on {source}"),
        }
    } else {
        AlertDraft {
            severity: AlertSeverity::Medium,
            message: format!("Moderately negative mention on {source}"),
        }
    };

    if draft.severity != AlertSeverity::Critical && contains_critical_keyword(&mention.text) {
        draft.severity = AlertSeverity::High;
        draft.message = format!("Mention containing critical keywords on {source}");
    }

    Some(draft)
}

#[must_use]
pub fn contains_critical_keyword(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CRITICAL_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

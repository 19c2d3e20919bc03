//! Mention-level domain types shared by the scorer, storage and API layers.
//!
//! Every enum here round-trips through its lowercase `snake_case` string form,
//! which is also the value stored in Postgres `TEXT` columns.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Web,
    Twitter,
    Reddit,
    News,
    Facebook,
    Linkedin,
}

impl SourceType {
    pub const ALL: [SourceType; 6] = [
        SourceType::Web,
        SourceType::Twitter,
        SourceType::Reddit,
        SourceType::News,
        SourceType::Facebook,
        SourceType::Linkedin,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Web => "web",
            SourceType::Twitter => "twitter",
            SourceType::Reddit => "reddit",
            SourceType::News => "news",
            SourceType::Facebook => "facebook",
            SourceType::Linkedin => "linkedin",
        }
    }
}

/// Why a mention is positive or negative.
///
/// Declaration order is the canonical order used for tie-breaking and for
/// keyed distributions (`Ord` is derived from it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Performance,
    Camera,
    Battery,
    BuildQuality,
    Price,
    Software,
    Connectivity,
    CustomerSupport,
    Delivery,
    Experience,
    Other,
}

impl Reason {
    pub const ALL: [Reason; 11] = [
        Reason::Performance,
        Reason::Camera,
        Reason::Battery,
        Reason::BuildQuality,
        Reason::Price,
        Reason::Software,
        Reason::Connectivity,
        Reason::CustomerSupport,
        Reason::Delivery,
        Reason::Experience,
        Reason::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Performance => "performance",
            Reason::Camera => "camera",
            Reason::Battery => "battery",
            Reason::BuildQuality => "build_quality",
            Reason::Price => "price",
            Reason::Software => "software",
            Reason::Connectivity => "connectivity",
            Reason::CustomerSupport => "customer_support",
            Reason::Delivery => "delivery",
            Reason::Experience => "experience",
            Reason::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub const ALL: [AlertSeverity; 3] = [
        AlertSeverity::Medium,
        AlertSeverity::High,
        AlertSeverity::Critical,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }
}

/// Direction of an entity's positive ratio, recent window against older mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    pub const ALL: [Trend; 3] = [Trend::Improving, Trend::Stable, Trend::Declining];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
        }
    }
}

/// Remediation urgency. `rank` orders critical first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Critical, Priority::High, Priority::Medium];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
        }
    }

    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
        }
    }
}

macro_rules! impl_text_enum {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase();
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| CoreError::InvalidValue {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

impl_text_enum!(Sentiment, "sentiment");
impl_text_enum!(SourceType, "source");
impl_text_enum!(Reason, "reason");
impl_text_enum!(AlertSeverity, "alert severity");
impl_text_enum!(Trend, "trend");
impl_text_enum!(Priority, "priority");

/// A mention after sentiment scoring and reason classification.
///
/// `sentiment_score` lies in `[-1.0, 1.0]` and agrees in sign with
/// `sentiment`: positive labels carry a score above zero, negative labels a
/// score below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMention {
    pub text: String,
    pub entity_id: i64,
    pub source: SourceType,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub reason: Option<Reason>,
    pub reason_detail: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl ScoredMention {
    /// Whether the score agrees in sign with the label.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (-1.0..=1.0).contains(&self.sentiment_score)
            && match self.sentiment {
                Sentiment::Positive => self.sentiment_score > 0.0,
                Sentiment::Negative => self.sentiment_score < 0.0,
                Sentiment::Neutral => true,
            }
    }
}

/// A scored mention ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMention {
    pub entity_id: i64,
    pub content: String,
    pub source: SourceType,
    pub source_url: Option<String>,
    pub author: Option<String>,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub reason: Option<Reason>,
    pub reason_detail: Option<String>,
    pub published_at: DateTime<Utc>,
    pub language: String,
}

impl NewMention {
    #[must_use]
    pub fn to_scored(&self) -> ScoredMention {
        ScoredMention {
            text: self.content.clone(),
            entity_id: self.entity_id,
            source: self.source,
            sentiment: self.sentiment,
            sentiment_score: self.sentiment_score,
            reason: self.reason,
            reason_detail: self.reason_detail.clone(),
            published_at: self.published_at,
        }
    }
}

/// An alert to be stored alongside its mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDraft {
    pub severity: AlertSeverity,
    pub message: String,
}

//! Keyword-based reason classification.

use repwatch_core::Reason;
use serde::Serialize;

/// Reason keyword table, in priority order. The first category with any
/// matching keyword wins, so a text mentioning both camera and battery is
/// classified as camera.
pub(crate) const REASON_KEYWORDS: &[(Reason, &[&str])] = &[
    (
        Reason::Performance,
        &[
            "performance", "lag", "lent", "slow", "bug", "freeze", "hang", "stutter", "fps",
            "gaming", "processor", "cpu", "heat", "heating", "overheat", "temperature", "speed",
        ],
    ),
    (
        Reason::Camera,
        &[
            "camera", "photo", "photos", "picture", "image", "video", "selfie", "portrait",
            "night mode", "megapixel", "mp", "hdr",
        ],
    ),
    (
        Reason::Battery,
        &[
            "battery", "charge", "charging", "autonomie", "backup", "drain", "power",
            "fast charge", "65w", "charger", "recharge",
        ],
    ),
    (
        Reason::BuildQuality,
        &[
            "build", "quality", "back panel", "design", "look", "feel", "weight", "material",
            "glass", "plastic", "finish",
        ],
    ),
    (
        Reason::Price,
        &[
            "price", "cost", "expensive", "worth", "value", "money", "budget", "overpriced",
            "deal", "discount",
        ],
    ),
    (
        Reason::Software,
        &[
            "software", "os", "oxygen", "android", "update", "ui", "interface", "coloros",
            "buggy", "apps", "app", "bloatware", "feature",
        ],
    ),
    (
        Reason::Connectivity,
        &[
            "network", "5g", "wifi", "bluetooth", "signal", "connectivity", "hotspot", "sim",
            "slot", "nfc", "audio jack", "speaker", "sound",
        ],
    ),
    (
        Reason::CustomerSupport,
        &[
            "service", "support", "customer", "amazon", "delivery agent", "replacement",
            "warranty", "technician", "return", "exchange", "support team",
        ],
    ),
    (
        Reason::Delivery,
        &[
            "delivery", "packaging", "box", "damaged", "replacement", "shipping", "courier",
        ],
    ),
    (
        Reason::Experience,
        &[
            "experience", "overall", "usage", "daily", "everyday", "satisfied", "disappointed",
            "recommend", "value for money",
        ],
    ),
];

/// Canonical human-readable detail for a reason.
#[must_use]
pub fn default_detail(reason: Reason) -> &'static str {
    match reason {
        Reason::Performance => "General performance, smoothness and heating",
        Reason::Camera => "Photo and video quality, sensors",
        Reason::Battery => "Battery life and charging speed",
        Reason::BuildQuality => "Build quality and design",
        Reason::Price => "Price and value for money",
        Reason::Software => "System, updates and applications",
        Reason::Connectivity => "Network connectivity, audio and accessories",
        Reason::CustomerSupport => "Customer support and after-sales service",
        Reason::Delivery => "Delivery, packaging and condition on arrival",
        Reason::Experience => "Overall user experience",
        Reason::Other => "Other reasons",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonMatch {
    pub reason: Reason,
    pub detail: String,
}

/// Classify why a text is positive or negative.
///
/// A caller-supplied reason always wins. A non-blank caller-supplied detail
/// is kept; otherwise the reason's [`default_detail`] is used.
#[must_use]
pub fn classify_reason(
    text: &str,
    provided_reason: Option<Reason>,
    provided_detail: Option<&str>,
) -> ReasonMatch {
    let reason = provided_reason.unwrap_or_else(|| match_reason(text));
    let detail = provided_detail
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map_or_else(|| default_detail(reason).to_string(), ToString::to_string);
    ReasonMatch { reason, detail }
}

/// First reason in [`REASON_KEYWORDS`] with a keyword in `text`, or `Other`.
#[must_use]
pub fn match_reason(text: &str) -> Reason {
    let lowered = text.to_lowercase();
    REASON_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map_or(Reason::Other, |(reason, _)| *reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_outranks_battery() {
        let result = classify_reason("Great camera and the battery lasts", None, None);
        assert_eq!(result.reason, Reason::Camera);
        assert_eq!(result.detail, default_detail(Reason::Camera));
    }

    #[test]
    fn performance_has_highest_priority() {
        let result = classify_reason("Camera is fine but the phone is slow", None, None);
        assert_eq!(result.reason, Reason::Performance);
    }

    #[test]
    fn no_keyword_falls_back_to_other() {
        let result = classify_reason("Je n'ai rien à dire", None, None);
        assert_eq!(result.reason, Reason::Other);
        assert_eq!(result.detail, "Other reasons");
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(match_reason("BATTERY died"), Reason::Battery);
    }

    #[test]
    fn multi_word_keywords_match() {
        assert_eq!(match_reason("the back panel cracked"), Reason::BuildQuality);
    }

    #[test]
    fn provided_reason_takes_precedence() {
        let result = classify_reason("slow and laggy", Some(Reason::Price), None);
        assert_eq!(result.reason, Reason::Price);
        assert_eq!(result.detail, default_detail(Reason::Price));
    }

    #[test]
    fn provided_detail_is_kept() {
        let result = classify_reason("x", Some(Reason::Delivery), Some("Box arrived crushed"));
        assert_eq!(result.detail, "Box arrived crushed");

        let matched = classify_reason("the courier was late", None, Some("Late courier"));
        assert_eq!(matched.reason, Reason::Delivery);
        assert_eq!(matched.detail, "Late courier");
    }

    #[test]
    fn blank_provided_detail_uses_default() {
        let result = classify_reason("x", Some(Reason::Software), Some("   "));
        assert_eq!(result.detail, default_detail(Reason::Software));
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "Overheating while gaming, and the charger is slow";
        assert_eq!(
            classify_reason(text, None, None),
            classify_reason(text, None, None)
        );
    }

    #[test]
    fn table_covers_every_reason_but_other_in_order() {
        let order: Vec<Reason> = REASON_KEYWORDS.iter().map(|(r, _)| *r).collect();
        assert_eq!(order, Reason::ALL[..Reason::ALL.len() - 1].to_vec());
    }
}

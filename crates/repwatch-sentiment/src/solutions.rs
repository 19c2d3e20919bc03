//! Remediation plans for problem mentions.

use repwatch_core::{Priority, Reason, ScoredMention};
use serde::Serialize;

const QUOTE_LIMIT: usize = 100;
const SAMPLE_QUOTES: usize = 3;

struct SolutionTemplate {
    summary: &'static str,
    priority: Priority,
    actions: [&'static str; 4],
}

fn template_for(reason: Reason) -> SolutionTemplate {
    match reason {
        Reason::Camera => SolutionTemplate {
            summary: "Improve camera quality",
            priority: Priority::High,
            actions: [
                "Release a software update to enhance camera processing algorithms",
                "Provide camera optimization tips to users via in-app notifications",
                "Consider offering a camera module replacement program for affected devices",
                "Engage with users on camera settings and best practices",
            ],
        },
        Reason::Battery => SolutionTemplate {
            summary: "Optimize battery performance",
            priority: Priority::High,
            actions: [
                "Release a battery optimization update addressing drain issues",
                "Provide power-saving mode recommendations to users",
                "Offer battery health diagnostics through customer support",
                "Consider extending warranty for battery-related issues",
            ],
        },
        Reason::Performance => SolutionTemplate {
            summary: "Enhance device performance",
            priority: Priority::Medium,
            actions: [
                "Release performance optimization update",
                "Provide RAM management tips and app optimization guides",
                "Offer device diagnostics and cleanup tools",
                "Consider offering trade-in programs for severely affected devices",
            ],
        },
        Reason::BuildQuality => SolutionTemplate {
            summary: "Address build quality concerns",
            priority: Priority::Critical,
            actions: [
                "Review quality control processes in manufacturing",
                "Offer replacement or repair for devices with build defects",
                "Improve quality assurance testing procedures",
                "Provide transparent communication about quality improvements",
            ],
        },
        Reason::Price => SolutionTemplate {
            summary: "Review pricing strategy",
            priority: Priority::Medium,
            actions: [
                "Consider promotional pricing or discounts for affected customers",
                "Offer trade-in programs with better value",
                "Provide transparent pricing communication",
                "Review competitive pricing in the market",
            ],
        },
        Reason::Software => SolutionTemplate {
            summary: "Fix software issues",
            priority: Priority::High,
            actions: [
                "Release bug fix updates addressing reported issues",
                "Improve software testing and QA processes",
                "Provide beta testing programs for early feedback",
                "Enhance customer support for software-related queries",
            ],
        },
        Reason::CustomerSupport => SolutionTemplate {
            summary: "Improve customer service",
            priority: Priority::High,
            actions: [
                "Train support staff on common issues and solutions",
                "Reduce response times and improve communication channels",
                "Implement customer feedback loops",
                "Offer proactive support outreach for affected users",
            ],
        },
        Reason::Connectivity => SolutionTemplate {
            summary: "Improve connectivity",
            priority: Priority::Medium,
            actions: [
                "Release network optimization updates",
                "Provide connectivity troubleshooting guides",
                "Improve signal strength and network compatibility",
                "Offer network diagnostic tools",
            ],
        },
        Reason::Experience => SolutionTemplate {
            summary: "Enhance user experience",
            priority: Priority::Medium,
            actions: [
                "Gather detailed user feedback on experience issues",
                "Implement UX improvements based on feedback",
                "Provide user guides and tutorials",
                "Engage with users to understand pain points",
            ],
        },
        Reason::Delivery => SolutionTemplate {
            summary: "Improve delivery experience",
            priority: Priority::Medium,
            actions: [
                "Partner with reliable delivery services",
                "Provide real-time tracking and updates",
                "Offer expedited shipping options",
                "Improve packaging to prevent damage during transit",
            ],
        },
        Reason::Other => SolutionTemplate {
            summary: "Address customer concerns",
            priority: Priority::Medium,
            actions: [
                "Review customer feedback and identify common themes",
                "Engage directly with affected customers",
                "Implement feedback-driven improvements",
                "Provide transparent communication about resolutions",
            ],
        },
    }
}

/// Secondary signals: issue text, trigger words, and the immediate action
/// they prepend (if any).
const SPECIFIC_ISSUES: &[(&str, &[&str], Option<&str>)] = &[
    (
        "Device freezing/hanging issues detected",
        &["hang", "freeze"],
        Some("Immediate: Release emergency patch for freezing issues"),
    ),
    (
        "Overheating concerns identified",
        &["heating", "overheat"],
        Some("Immediate: Provide thermal management update"),
    ),
    ("Performance lag reported", &["slow", "lag"], None),
    ("Display-related issues found", &["display", "screen"], None),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub reason: Reason,
    pub reason_detail: String,
    pub summary: String,
    pub priority: Priority,
    pub recommended_actions: Vec<String>,
    pub specific_issues: Vec<String>,
    pub estimated_impact: String,
    pub timeline: String,
}

#[must_use]
pub fn estimate_impact(sentiment_score: f64) -> &'static str {
    if sentiment_score < -0.7 {
        "High - Negative sentiment may affect brand reputation"
    } else if sentiment_score < -0.5 {
        "Medium - Moderate negative impact expected"
    } else {
        "Low - Limited impact but should be addressed"
    }
}

#[must_use]
pub fn estimate_timeline(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "1-2 weeks - Urgent action required",
        Priority::High => "2-4 weeks - High priority resolution",
        Priority::Medium => "1-2 months - Standard resolution timeline",
    }
}

/// Build a remediation plan for one mention.
///
/// Each immediate action is inserted at the front of the action list as its
/// signal is found, so when both freezing and heating are detected the
/// heating action ends up first.
#[must_use]
pub fn generate_solution(mention: &ScoredMention) -> Solution {
    let reason = mention.reason.unwrap_or(Reason::Other);
    let template = template_for(reason);
    let lowered = mention.text.to_lowercase();

    let mut actions: Vec<String> = template.actions.iter().map(ToString::to_string).collect();
    let mut specific_issues = Vec::new();

    for (issue, triggers, immediate) in SPECIFIC_ISSUES {
        if triggers.iter().any(|t| lowered.contains(t)) {
            specific_issues.push((*issue).to_string());
            if let Some(action) = immediate {
                actions.insert(0, (*action).to_string());
            }
        }
    }

    Solution {
        reason,
        reason_detail: mention
            .reason_detail
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| "General issue".to_string()),
        summary: template.summary.to_string(),
        priority: template.priority,
        recommended_actions: actions,
        specific_issues,
        estimated_impact: estimate_impact(mention.sentiment_score).to_string(),
        timeline: estimate_timeline(template.priority).to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSolution {
    #[serde(flatten)]
    pub solution: Solution,
    pub affected_count: usize,
    pub sample_quotes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkSolutions {
    pub total_issues: usize,
    /// One entry per reason, in order of first appearance.
    pub solutions: Vec<GroupSolution>,
    /// Same entries sorted critical first; stable within a tier.
    pub priority_order: Vec<GroupSolution>,
}

fn truncate_quote(text: &str) -> String {
    match text.char_indices().nth(QUOTE_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Group mentions by reason and build one plan per group from its first
/// mention. Mentions without a reason are ignored.
#[must_use]
pub fn generate_bulk_solutions(mentions: &[ScoredMention]) -> BulkSolutions {
    let mut groups: Vec<(Reason, Vec<&ScoredMention>)> = Vec::new();
    for mention in mentions {
        let Some(reason) = mention.reason else {
            continue;
        };
        match groups.iter_mut().find(|(r, _)| *r == reason) {
            Some((_, members)) => members.push(mention),
            None => groups.push((reason, vec![mention])),
        }
    }

    let solutions: Vec<GroupSolution> = groups
        .iter()
        .map(|(_, members)| GroupSolution {
            solution: generate_solution(members[0]),
            affected_count: members.len(),
            sample_quotes: members
                .iter()
                .take(SAMPLE_QUOTES)
                .map(|m| truncate_quote(&m.text))
                .collect(),
        })
        .collect();

    let mut priority_order = solutions.clone();
    priority_order.sort_by_key(|s| s.solution.priority.rank());

    BulkSolutions {
        total_issues: mentions.len(),
        solutions,
        priority_order,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use repwatch_core::{Sentiment, SourceType};

    use super::*;

    fn mention(text: &str, reason: Option<Reason>, score: f64) -> ScoredMention {
        ScoredMention {
            text: text.to_string(),
            entity_id: 3,
            source: SourceType::Web,
            sentiment: Sentiment::Negative,
            sentiment_score: score,
            reason,
            reason_detail: None,
            published_at: Utc::now(),
        }
    }

    #[test]
    fn build_quality_is_critical_with_urgent_timeline() {
        let solution = generate_solution(&mention("cracked glass", Some(Reason::BuildQuality), -0.2));
        assert_eq!(solution.priority, Priority::Critical);
        assert_eq!(solution.timeline, "1-2 weeks - Urgent action required");
        assert_eq!(solution.summary, "Address build quality concerns");
        assert_eq!(solution.recommended_actions.len(), 4);
    }

    #[test]
    fn missing_reason_uses_other_template() {
        let solution = generate_solution(&mention("meh", None, -0.1));
        assert_eq!(solution.reason, Reason::Other);
        assert_eq!(solution.summary, "Address customer concerns");
        assert_eq!(solution.reason_detail, "General issue");
        assert_eq!(solution.timeline, "1-2 months - Standard resolution timeline");
    }

    #[test]
    fn impact_tracks_sentiment_score() {
        assert!(estimate_impact(-0.8).starts_with("High"));
        assert!(estimate_impact(-0.6).starts_with("Medium"));
        assert!(estimate_impact(-0.5).starts_with("Low"));
        assert!(estimate_impact(0.3).starts_with("Low"));
    }

    #[test]
    fn freezing_prepends_emergency_patch() {
        let solution = generate_solution(&mention("the phone freezes constantly", Some(Reason::Performance), -0.6));
        assert_eq!(
            solution.specific_issues,
            vec!["Device freezing/hanging issues detected"]
        );
        assert_eq!(
            solution.recommended_actions[0],
            "Immediate: Release emergency patch for freezing issues"
        );
        assert_eq!(solution.recommended_actions.len(), 5);
    }

    #[test]
    fn heating_lands_before_freezing_when_both_present() {
        let solution = generate_solution(&mention(
            "It hangs and overheats, screen is slow",
            Some(Reason::Performance),
            -0.8,
        ));
        assert_eq!(
            solution.specific_issues,
            vec![
                "Device freezing/hanging issues detected",
                "Overheating concerns identified",
                "Performance lag reported",
                "Display-related issues found",
            ]
        );
        assert_eq!(
            &solution.recommended_actions[..2],
            &[
                "Immediate: Provide thermal management update".to_string(),
                "Immediate: Release emergency patch for freezing issues".to_string(),
            ]
        );
        assert_eq!(solution.recommended_actions.len(), 6);
    }

    #[test]
    fn bulk_groups_by_reason_and_orders_by_priority() {
        let long = "x".repeat(150);
        let mentions = vec![
            mention("price too high", Some(Reason::Price), -0.4),
            mention("glass cracked", Some(Reason::BuildQuality), -0.8),
            mention(&long, Some(Reason::Price), -0.4),
            mention("no reason", None, -0.4),
            mention("camera blurry", Some(Reason::Camera), -0.6),
        ];
        let bulk = generate_bulk_solutions(&mentions);

        assert_eq!(bulk.total_issues, 5);
        let reasons: Vec<Reason> = bulk.solutions.iter().map(|s| s.solution.reason).collect();
        assert_eq!(reasons, vec![Reason::Price, Reason::BuildQuality, Reason::Camera]);

        let ordered: Vec<Reason> = bulk
            .priority_order
            .iter()
            .map(|s| s.solution.reason)
            .collect();
        assert_eq!(ordered, vec![Reason::BuildQuality, Reason::Camera, Reason::Price]);

        let price = &bulk.solutions[0];
        assert_eq!(price.affected_count, 2);
        assert_eq!(price.sample_quotes[0], "price too high");
        assert_eq!(price.sample_quotes[1].chars().count(), 103);
        assert!(price.sample_quotes[1].ends_with("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(120);
        let quote = truncate_quote(&text);
        assert_eq!(quote.chars().count(), 103);
        assert_eq!(truncate_quote("short"), "short");
        assert_eq!(truncate_quote(&"a".repeat(100)), "a".repeat(100));
    }
}

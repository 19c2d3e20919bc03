//! Mention collectors for external sources.

mod newsapi;
mod reddit;
mod twitter;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use repwatch_core::SourceType;
use serde::Serialize;

use crate::error::SentimentError;
use crate::pipeline::MentionInput;
use crate::types::CollectorConfig;

/// A mention fetched from a source, not yet scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectedMention {
    pub content: String,
    pub source: SourceType,
    pub source_url: Option<String>,
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl CollectedMention {
    #[must_use]
    pub fn into_input(self, entity_id: i64) -> MentionInput {
        MentionInput {
            entity_id,
            content: self.content,
            source: self.source,
            source_url: self.source_url,
            author: self.author,
            published_at: Some(self.published_at),
            reason: None,
            reason_detail: None,
            language: None,
        }
    }
}

/// Parse an RFC 3339 timestamp, falling back to `now`.
pub(crate) fn parse_timestamp(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or(now, |dt| dt.with_timezone(&Utc))
}

pub(crate) fn join_text(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn ensure_success(
    service: &'static str,
    response: &reqwest::Response,
) -> Result<(), SentimentError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(SentimentError::UnexpectedStatus {
            service,
            status: status.as_u16(),
        })
    }
}

/// Fetches mentions from every configured source.
#[derive(Debug, Clone)]
pub struct Collector {
    client: reqwest::Client,
    config: CollectorConfig,
}

impl Collector {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(config: CollectorConfig) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Collect mentions for one entity, searching its name then its keywords.
    pub async fn collect_for_entity(
        &self,
        name: &str,
        keywords: &[String],
        force: bool,
    ) -> Vec<CollectedMention> {
        let terms = repwatch_core::search_terms(name, keywords);
        self.collect(&terms, force).await
    }

    /// Collect mentions for the given search terms from all configured
    /// sources.
    ///
    /// Unconfigured sources are skipped. A failing source is logged and
    /// skipped. Results are de-duplicated by URL across sources.
    pub async fn collect(&self, search_terms: &[String], force: bool) -> Vec<CollectedMention> {
        let now = Utc::now();
        let mut mentions = Vec::new();
        let label = search_terms.first().map_or("", String::as_str);

        if let Some(key) = &self.config.newsapi_key {
            match newsapi::fetch_news(&self.client, &self.config, key, search_terms, force, now)
                .await
            {
                Ok(found) => {
                    tracing::debug!(entity = label, count = found.len(), "collected news mentions");
                    mentions.extend(found);
                }
                Err(e) => {
                    tracing::warn!(entity = label, source = "newsapi", error = %e, "NewsAPI fetch failed");
                }
            }
        }

        if let Some(token) = &self.config.twitter_bearer_token {
            match twitter::fetch_tweets(&self.client, &self.config, token, search_terms, now).await
            {
                Ok(found) => {
                    tracing::debug!(entity = label, count = found.len(), "collected tweets");
                    mentions.extend(found);
                }
                Err(e) => {
                    tracing::warn!(entity = label, source = "twitter", error = %e, "Twitter search failed");
                }
            }
        }

        if let (Some(id), Some(secret)) = (
            &self.config.reddit_client_id,
            &self.config.reddit_client_secret,
        ) {
            match reddit::RedditClient::connect(&self.client, &self.config, id, secret).await {
                Ok(client) => match client.search(search_terms, now).await {
                    Ok(found) => {
                        tracing::debug!(entity = label, count = found.len(), "collected Reddit posts");
                        mentions.extend(found);
                    }
                    Err(e) => {
                        tracing::warn!(entity = label, source = "reddit", error = %e, "Reddit search failed");
                    }
                },
                Err(e) => {
                    tracing::warn!(entity = label, source = "reddit", error = %e, "Reddit authentication failed");
                }
            }
        }

        dedup_by_url(&mut mentions);
        mentions
    }
}

/// Drop later mentions whose URL was already seen. Mentions without a URL
/// are kept.
pub(crate) fn dedup_by_url(mentions: &mut Vec<CollectedMention>) {
    let mut seen: HashSet<String> = HashSet::new();
    mentions.retain(|m| match &m.source_url {
        Some(url) => seen.insert(url.clone()),
        None => true,
    });
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn collected(url: Option<&str>) -> CollectedMention {
        CollectedMention {
            content: "text".to_string(),
            source: SourceType::News,
            source_url: url.map(ToString::to_string),
            author: None,
            published_at: Utc::now(),
        }
    }

    #[test]
    fn dedup_keeps_first_url_and_unlinked_mentions() {
        let mut mentions = vec![
            collected(Some("https://a")),
            collected(None),
            collected(Some("https://a")),
            collected(None),
            collected(Some("https://b")),
        ];
        dedup_by_url(&mut mentions);
        assert_eq!(mentions.len(), 4);
    }

    #[test]
    fn parse_timestamp_falls_back_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp(None, now), now);
        assert_eq!(parse_timestamp(Some("yesterday"), now), now);
        assert_eq!(
            parse_timestamp(Some("2023-12-31T10:00:00Z"), now),
            Utc.with_ymd_and_hms(2023, 12, 31, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn join_text_skips_missing_and_blank_parts() {
        assert_eq!(join_text(&[Some("Title"), None, Some("  "), Some("body")]), "Title body");
    }

    #[test]
    fn into_input_carries_metadata() {
        let input = collected(Some("https://a")).into_input(9);
        assert_eq!(input.entity_id, 9);
        assert_eq!(input.source_url.as_deref(), Some("https://a"));
        assert!(input.published_at.is_some());
        assert!(input.reason.is_none());
    }
}

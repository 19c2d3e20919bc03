//! Twitter API v2 recent-search collector.

use chrono::{DateTime, Utc};
use repwatch_core::SourceType;
use serde::Deserialize;

use super::{ensure_success, parse_timestamp, CollectedMention};
use crate::error::SentimentError;
use crate::types::CollectorConfig;

const MAX_TERMS: usize = 2;
const MAX_RESULTS: &str = "20";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    author_id: Option<String>,
    created_at: Option<String>,
}

pub(super) async fn fetch_tweets(
    client: &reqwest::Client,
    config: &CollectorConfig,
    bearer_token: &str,
    search_terms: &[String],
    now: DateTime<Utc>,
) -> Result<Vec<CollectedMention>, SentimentError> {
    let url = format!(
        "{}/2/tweets/search/recent",
        config.twitter_base_url.trim_end_matches('/')
    );
    let mut mentions = Vec::new();

    for term in search_terms.iter().take(MAX_TERMS) {
        let query = format!("{term} lang:{}", config.language);
        let response = client
            .get(&url)
            .bearer_auth(bearer_token)
            .query(&[
                ("query", query.as_str()),
                ("max_results", MAX_RESULTS),
                ("tweet.fields", "created_at,author_id"),
            ])
            .send()
            .await?;
        ensure_success("twitter", &response)?;

        let body: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| SentimentError::MalformedResponse {
                    service: "twitter",
                    reason: e.to_string(),
                })?;

        mentions.extend(body.data.into_iter().map(|tweet| CollectedMention {
            source_url: Some(format!("https://twitter.com/i/web/status/{}", tweet.id)),
            author: tweet.author_id.map(|id| format!("user_{id}")),
            published_at: parse_timestamp(tweet.created_at.as_deref(), now),
            content: tweet.text,
            source: SourceType::Twitter,
        }));
    }

    Ok(mentions)
}

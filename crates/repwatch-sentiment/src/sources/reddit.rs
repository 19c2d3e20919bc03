//! Reddit search collector (client-credentials OAuth).

use chrono::{DateTime, Utc};
use repwatch_core::SourceType;
use serde::Deserialize;

use super::{ensure_success, join_text, CollectedMention};
use crate::error::SentimentError;
use crate::types::CollectorConfig;

const MAX_TERMS: usize = 2;
const PAGE_LIMIT: &str = "20";

/// Reddit OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Reddit search listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    title: Option<String>,
    selftext: Option<String>,
    permalink: Option<String>,
    author: Option<String>,
    created_utc: Option<f64>,
}

/// Reddit API client holding a valid access token.
pub(super) struct RedditClient<'a> {
    client: &'a reqwest::Client,
    api_url: String,
    token: String,
}

impl<'a> RedditClient<'a> {
    /// Exchange client credentials for an application token.
    pub(super) async fn connect(
        client: &'a reqwest::Client,
        config: &CollectorConfig,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, SentimentError> {
        let response = client
            .post(format!(
                "{}/api/v1/access_token",
                config.reddit_auth_url.trim_end_matches('/')
            ))
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        ensure_success("reddit auth", &response)?;

        let token: TokenResponse =
            response
                .json()
                .await
                .map_err(|e| SentimentError::MalformedResponse {
                    service: "reddit auth",
                    reason: e.to_string(),
                })?;

        Ok(Self {
            client,
            api_url: config.reddit_api_url.trim_end_matches('/').to_string(),
            token: token.access_token,
        })
    }

    pub(super) async fn search(
        &self,
        search_terms: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<CollectedMention>, SentimentError> {
        let url = format!("{}/search", self.api_url);
        let mut mentions = Vec::new();

        for term in search_terms.iter().take(MAX_TERMS) {
            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .query(&[("q", term.as_str()), ("limit", PAGE_LIMIT), ("sort", "new")])
                .send()
                .await?;
            ensure_success("reddit", &response)?;

            let listing: Listing =
                response
                    .json()
                    .await
                    .map_err(|e| SentimentError::MalformedResponse {
                        service: "reddit",
                        reason: e.to_string(),
                    })?;

            mentions.extend(
                listing
                    .data
                    .children
                    .into_iter()
                    .filter_map(|post| to_mention(post.data, now)),
            );
        }

        Ok(mentions)
    }
}

fn to_mention(post: PostData, now: DateTime<Utc>) -> Option<CollectedMention> {
    let content = join_text(&[post.title.as_deref(), post.selftext.as_deref()]);
    if content.is_empty() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let published_at = post
        .created_utc
        .and_then(|ts| DateTime::from_timestamp(ts as i64, 0))
        .unwrap_or(now);
    Some(CollectedMention {
        content,
        source: SourceType::Reddit,
        source_url: post.permalink.map(|p| format!("https://reddit.com{p}")),
        author: post.author,
        published_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_without_text_is_skipped() {
        let post = PostData {
            title: None,
            selftext: Some(String::new()),
            permalink: Some("/r/x/1".to_string()),
            author: None,
            created_utc: None,
        };
        assert!(to_mention(post, Utc::now()).is_none());
    }

    #[test]
    fn post_maps_permalink_and_timestamp() {
        let post = PostData {
            title: Some("Nord 3 review".to_string()),
            selftext: Some("Battery is great".to_string()),
            permalink: Some("/r/oneplus/comments/abc".to_string()),
            author: Some("someone".to_string()),
            created_utc: Some(1_700_000_000.0),
        };
        let mention = to_mention(post, Utc::now()).unwrap();
        assert_eq!(mention.content, "Nord 3 review Battery is great");
        assert_eq!(
            mention.source_url.as_deref(),
            Some("https://reddit.com/r/oneplus/comments/abc")
        );
        assert_eq!(mention.published_at.timestamp(), 1_700_000_000);
    }
}

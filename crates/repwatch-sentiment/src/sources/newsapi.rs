//! NewsAPI `/v2/everything` collector.

use chrono::{DateTime, Duration, Utc};
use repwatch_core::SourceType;
use serde::Deserialize;

use super::{ensure_success, join_text, parse_timestamp, CollectedMention};
use crate::error::SentimentError;
use crate::types::CollectorConfig;

const MAX_TERMS: usize = 3;
const PAGE_SIZE: &str = "20";
const LOOKBACK_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    source: Option<ArticleSource>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

/// Search the first three terms. Without `force`, only articles from the
/// last seven days are requested.
pub(super) async fn fetch_news(
    client: &reqwest::Client,
    config: &CollectorConfig,
    api_key: &str,
    search_terms: &[String],
    force: bool,
    now: DateTime<Utc>,
) -> Result<Vec<CollectedMention>, SentimentError> {
    let url = format!("{}/v2/everything", config.newsapi_base_url.trim_end_matches('/'));
    let from = (now - Duration::days(LOOKBACK_DAYS))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();
    let mut mentions = Vec::new();

    for term in search_terms.iter().take(MAX_TERMS) {
        let mut params: Vec<(&str, &str)> = vec![
            ("q", term.as_str()),
            ("language", config.language.as_str()),
            ("sortBy", "publishedAt"),
            ("pageSize", PAGE_SIZE),
            ("apiKey", api_key),
        ];
        if !force {
            params.push(("from", from.as_str()));
        }

        let response = client.get(&url).query(&params).send().await?;
        ensure_success("newsapi", &response)?;

        let body: EverythingResponse =
            response
                .json()
                .await
                .map_err(|e| SentimentError::MalformedResponse {
                    service: "newsapi",
                    reason: e.to_string(),
                })?;

        mentions.extend(body.articles.into_iter().filter_map(|article| {
            let content = join_text(&[article.title.as_deref(), article.description.as_deref()]);
            if content.is_empty() {
                return None;
            }
            Some(CollectedMention {
                content,
                source: SourceType::News,
                source_url: article.url,
                author: article.source.and_then(|s| s.name),
                published_at: parse_timestamp(article.published_at.as_deref(), now),
            })
        }));
    }

    Ok(mentions)
}

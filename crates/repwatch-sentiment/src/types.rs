use std::time::Duration;

use repwatch_core::{AppConfig, Sentiment};
use serde::{Deserialize, Serialize};

/// Provider confidence for each label, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// Result of scoring one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    /// Signed polarity in `[-1.0, 1.0]`.
    pub score: f64,
    /// Only present when a remote provider produced the result.
    pub confidence: Option<ConfidenceScores>,
}

impl SentimentAnalysis {
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            score: 0.0,
            confidence: None,
        }
    }
}

/// Settings for the sentiment analyzer.
#[derive(Clone)]
pub struct SentimentConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub language: String,
}

impl SentimentConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            endpoint: config.sentiment_endpoint.clone(),
            api_key: config.sentiment_api_key.clone(),
            timeout: Duration::from_secs(config.sentiment_timeout_secs),
            language: config.sentiment_language.clone(),
        }
    }

    /// Local-only configuration: no remote provider.
    #[must_use]
    pub fn local(language: &str) -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout: Duration::from_secs(5),
            language: language.to_string(),
        }
    }
}

impl std::fmt::Debug for SentimentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("timeout", &self.timeout)
            .field("language", &self.language)
            .finish()
    }
}

/// Credentials and limits for the mention collectors.
///
/// A source is skipped when its credentials are absent. Base URLs default to
/// the public APIs and are only overridden in tests.
#[derive(Clone)]
pub struct CollectorConfig {
    pub newsapi_key: Option<String>,
    pub twitter_bearer_token: Option<String>,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
    /// Language filter passed to the news and Twitter searches.
    pub language: String,
    pub newsapi_base_url: String,
    pub twitter_base_url: String,
    pub reddit_auth_url: String,
    pub reddit_api_url: String,
}

impl CollectorConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            newsapi_key: config.newsapi_key.clone(),
            twitter_bearer_token: config.twitter_bearer_token.clone(),
            reddit_client_id: config.reddit_client_id.clone(),
            reddit_client_secret: config.reddit_client_secret.clone(),
            user_agent: config.collector_user_agent.clone(),
            timeout: Duration::from_secs(config.collector_timeout_secs),
            language: config.sentiment_language.clone(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn any_source_enabled(&self) -> bool {
        self.newsapi_key.is_some()
            || self.twitter_bearer_token.is_some()
            || (self.reddit_client_id.is_some() && self.reddit_client_secret.is_some())
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            newsapi_key: None,
            twitter_bearer_token: None,
            reddit_client_id: None,
            reddit_client_secret: None,
            user_agent: "repwatch/0.1 (reputation-monitor)".to_string(),
            timeout: Duration::from_secs(10),
            language: "fr".to_string(),
            newsapi_base_url: "https://newsapi.org".to_string(),
            twitter_base_url: "https://api.twitter.com".to_string(),
            reddit_auth_url: "https://www.reddit.com".to_string(),
            reddit_api_url: "https://oauth.reddit.com".to_string(),
        }
    }
}

impl std::fmt::Debug for CollectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("CollectorConfig")
            .field("newsapi_key", &redact(&self.newsapi_key))
            .field("twitter_bearer_token", &redact(&self.twitter_bearer_token))
            .field("reddit_client_id", &redact(&self.reddit_client_id))
            .field("reddit_client_secret", &redact(&self.reddit_client_secret))
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("language", &self.language)
            .field("newsapi_base_url", &self.newsapi_base_url)
            .field("twitter_base_url", &self.twitter_base_url)
            .field("reddit_auth_url", &self.reddit_auth_url)
            .field("reddit_api_url", &self.reddit_api_url)
            .finish()
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub entities_path: PathBuf,
    pub api_keys: Vec<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub sentiment_endpoint: Option<String>,
    pub sentiment_api_key: Option<String>,
    pub sentiment_timeout_secs: u64,
    pub sentiment_language: String,
    pub newsapi_key: Option<String>,
    pub twitter_bearer_token: Option<String>,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub collector_user_agent: String,
    pub collector_timeout_secs: u64,
    pub collector_max_concurrent_entities: usize,
    pub collection_cron: String,
}

impl AppConfig {
    /// The remote scorer is only usable when both its endpoint and key are set.
    #[must_use]
    pub fn remote_sentiment_enabled(&self) -> bool {
        self.sentiment_endpoint.is_some() && self.sentiment_api_key.is_some()
    }
}

fn redact(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "[redacted]")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("entities_path", &self.entities_path)
            .field("database_url", &"[redacted]")
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("sentiment_endpoint", &self.sentiment_endpoint)
            .field(
                "sentiment_api_key",
                &redact(self.sentiment_api_key.as_ref()),
            )
            .field("sentiment_timeout_secs", &self.sentiment_timeout_secs)
            .field("sentiment_language", &self.sentiment_language)
            .field("newsapi_key", &redact(self.newsapi_key.as_ref()))
            .field(
                "twitter_bearer_token",
                &redact(self.twitter_bearer_token.as_ref()),
            )
            .field("reddit_client_id", &redact(self.reddit_client_id.as_ref()))
            .field(
                "reddit_client_secret",
                &redact(self.reddit_client_secret.as_ref()),
            )
            .field("collector_user_agent", &self.collector_user_agent)
            .field("collector_timeout_secs", &self.collector_timeout_secs)
            .field(
                "collector_max_concurrent_entities",
                &self.collector_max_concurrent_entities,
            )
            .field("collection_cron", &self.collection_cron)
            .finish()
    }
}

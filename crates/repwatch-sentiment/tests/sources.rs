//! Integration tests for the mention `Collector` using wiremock HTTP mocks.

use std::time::Duration;

use repwatch_core::SourceType;
use repwatch_sentiment::{Collector, CollectorConfig};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> CollectorConfig {
    CollectorConfig {
        timeout: Duration::from_secs(5),
        newsapi_base_url: server.uri(),
        twitter_base_url: server.uri(),
        reddit_auth_url: server.uri(),
        reddit_api_url: server.uri(),
        ..CollectorConfig::default()
    }
}

fn terms(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn no_configured_source_collects_nothing() {
    let server = MockServer::start().await;
    let collector = Collector::new(config(&server)).expect("collector should build");

    let mentions = collector.collect(&terms(&["Acme"]), false).await;

    assert!(mentions.is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn news_articles_are_mapped() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "ok",
        "articles": [
            {
                "title": "Acme recalls phones",
                "description": "Battery overheating reported",
                "url": "https://news.example/acme-recall",
                "publishedAt": "2024-05-01T09:30:00Z",
                "source": { "name": "Example News" }
            },
            {
                "title": null,
                "description": null,
                "url": "https://news.example/empty",
                "publishedAt": null,
                "source": null
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "Acme"))
        .and(query_param("apiKey", "news-key"))
        .and(query_param("language", "fr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let collector = Collector::new(CollectorConfig {
        newsapi_key: Some("news-key".to_string()),
        ..config(&server)
    })
    .expect("collector should build");

    let mentions = collector.collect(&terms(&["Acme"]), true).await;

    assert_eq!(mentions.len(), 1);
    let mention = &mentions[0];
    assert_eq!(mention.source, SourceType::News);
    assert_eq!(mention.content, "Acme recalls phones Battery overheating reported");
    assert_eq!(mention.author.as_deref(), Some("Example News"));
    assert_eq!(mention.published_at.to_rfc3339(), "2024-05-01T09:30:00+00:00");
}

#[tokio::test]
async fn reddit_authenticates_then_searches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "reddit-token",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = serde_json::json!({
        "data": {
            "children": [{
                "data": {
                    "title": "Acme X2 review",
                    "selftext": "Camera is blurry",
                    "permalink": "/r/phones/comments/abc/acme_x2/",
                    "author": "phonefan",
                    "created_utc": 1_714_550_400.0
                }
            }]
        }
    });

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer reddit-token"))
        .and(query_param("sort", "new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&listing))
        .mount(&server)
        .await;

    let collector = Collector::new(CollectorConfig {
        reddit_client_id: Some("id".to_string()),
        reddit_client_secret: Some("secret".to_string()),
        ..config(&server)
    })
    .expect("collector should build");

    let mentions = collector.collect(&terms(&["Acme X2"]), false).await;

    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].source, SourceType::Reddit);
    assert_eq!(
        mentions[0].source_url.as_deref(),
        Some("https://reddit.com/r/phones/comments/abc/acme_x2/")
    );
    assert_eq!(mentions[0].author.as_deref(), Some("phonefan"));
}

#[tokio::test]
async fn failing_source_is_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "articles": [{
                "title": "Acme launches",
                "description": "New flagship",
                "url": "https://news.example/launch",
                "publishedAt": "2024-05-02T10:00:00Z",
                "source": { "name": "Wire" }
            }]
        })))
        .mount(&server)
        .await;

    let collector = Collector::new(CollectorConfig {
        newsapi_key: Some("news-key".to_string()),
        twitter_bearer_token: Some("tw-token".to_string()),
        ..config(&server)
    })
    .expect("collector should build");

    let mentions = collector.collect(&terms(&["Acme"]), false).await;

    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].source, SourceType::News);
}

#[tokio::test]
async fn duplicate_urls_across_terms_are_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(header("authorization", "Bearer tw-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {
                    "id": "111",
                    "text": "Acme support never answers",
                    "author_id": "42",
                    "created_at": "2024-05-03T08:00:00.000Z"
                }
            ]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let collector = Collector::new(CollectorConfig {
        twitter_bearer_token: Some("tw-token".to_string()),
        ..config(&server)
    })
    .expect("collector should build");

    let mentions = collector
        .collect(&terms(&["Acme", "Acme Phone", "ignored third term"]), false)
        .await;

    assert_eq!(mentions.len(), 1);
    assert_eq!(
        mentions[0].source_url.as_deref(),
        Some("https://twitter.com/i/web/status/111")
    );
    assert_eq!(mentions[0].author.as_deref(), Some("user_42"));
}

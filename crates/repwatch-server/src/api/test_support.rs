//! Helpers for router tests.

use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use repwatch_sentiment::{MentionPipeline, SentimentAnalyzer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::AppState;
use crate::collection::CollectionTracker;

pub(crate) fn state_with_pool(pool: PgPool) -> AppState {
    AppState {
        pool,
        pipeline: Arc::new(MentionPipeline::new(SentimentAnalyzer::local(), "fr")),
        collector: None,
        collection: CollectionTracker::default(),
        max_concurrent_entities: 2,
    }
}

/// State whose pool never connects. For tests that fail before any query.
pub(crate) fn lazy_state() -> AppState {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://repwatch@localhost/repwatch_unused")
        .expect("lazy pool");
    state_with_pool(pool)
}

pub(crate) async fn body_json(response: Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

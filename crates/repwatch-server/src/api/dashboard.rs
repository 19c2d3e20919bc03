//! Dashboard aggregates computed from stored mentions.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use repwatch_db::MentionRow;
use repwatch_sentiment::reputation::{
    aspect_sentiment, average_reputation, compute_reputation, reason_insights, AspectSentiment,
    ReasonInsights, ReputationScore, SentimentCounts,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

const RECENT_DAYS: i64 = 7;
const RECENT_LIMIT: i64 = 10;
const TOP_ENTITIES: i64 = 5;

#[derive(Debug, Serialize)]
pub(super) struct DashboardStats {
    pub total_entities: i64,
    pub total_mentions: i64,
    pub active_alerts: i64,
    pub positive_mentions: usize,
    pub neutral_mentions: usize,
    pub negative_mentions: usize,
    pub average_reputation: f64,
    pub recent_mentions: Vec<MentionRow>,
    pub top_entities: Vec<ReputationScore>,
    pub reason_insights: ReasonInsights,
}

#[derive(Debug, Deserialize)]
pub(super) struct AspectQuery {
    pub entity_id: Option<i64>,
}

/// GET /api/v1/dashboard/stats
pub(super) async fn stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let rid = &req_id.0;
    let db_err = |e: repwatch_db::DbError| map_db_error(rid.clone(), &e);
    let now = Utc::now();

    let total_entities = repwatch_db::count_active_entities(&state.pool)
        .await
        .map_err(db_err)?;
    let total_mentions = repwatch_db::count_mentions(&state.pool)
        .await
        .map_err(db_err)?;
    let active_alerts = repwatch_db::active_alert_count(&state.pool)
        .await
        .map_err(db_err)?;
    let mentions = repwatch_db::scored_mentions(&state.pool, None)
        .await
        .map_err(db_err)?;
    let recent_mentions =
        repwatch_db::recent_mentions(&state.pool, now - Duration::days(RECENT_DAYS), RECENT_LIMIT)
            .await
            .map_err(db_err)?;
    let top = repwatch_db::top_entities_by_mentions(&state.pool, TOP_ENTITIES)
        .await
        .map_err(db_err)?;

    let top_entities = top
        .into_iter()
        .map(|entity| {
            let own: Vec<_> = mentions
                .iter()
                .filter(|m| m.entity_id == entity.entity_id)
                .cloned()
                .collect();
            compute_reputation(Some(entity.entity_id), Some(entity.entity_name), &own, now)
        })
        .collect();

    let counts = SentimentCounts::tally(&mentions);
    let data = DashboardStats {
        total_entities,
        total_mentions,
        active_alerts,
        positive_mentions: counts.positive,
        neutral_mentions: counts.neutral,
        negative_mentions: counts.negative,
        average_reputation: average_reputation(&mentions),
        recent_mentions,
        top_entities,
        reason_insights: reason_insights(&mentions),
    };
    Ok(ApiResponse::new(data, req_id.0))
}

/// GET /api/v1/dashboard/reputation-scores
pub(super) async fn reputation_scores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ReputationScore>>>, ApiError> {
    let rid = &req_id.0;
    let now = Utc::now();
    let entities = repwatch_db::list_active_entities(&state.pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let mut scores = Vec::with_capacity(entities.len());
    for entity in entities {
        let mentions = repwatch_db::scored_mentions(&state.pool, Some(entity.id))
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?;
        scores.push(compute_reputation(
            Some(entity.id),
            Some(entity.name),
            &mentions,
            now,
        ));
    }
    Ok(ApiResponse::new(scores, req_id.0))
}

/// GET /api/v1/dashboard/reputation-scores/{entity_id}
pub(super) async fn entity_reputation(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(entity_id): Path<i64>,
) -> Result<Json<ApiResponse<ReputationScore>>, ApiError> {
    let rid = &req_id.0;
    let entity = repwatch_db::get_entity(&state.pool, entity_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(rid, "entity"))?;
    let mentions = repwatch_db::scored_mentions(&state.pool, Some(entity.id))
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let score = compute_reputation(Some(entity.id), Some(entity.name), &mentions, Utc::now());
    Ok(ApiResponse::new(score, req_id.0))
}

/// GET /api/v1/dashboard/aspect-sentiment
pub(super) async fn aspect_breakdown(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AspectQuery>,
) -> Result<Json<ApiResponse<BTreeMap<&'static str, AspectSentiment>>>, ApiError> {
    let mentions = repwatch_db::scored_mentions(&state.pool, query.entity_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(aspect_sentiment(&mentions), req_id.0))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::test_support::{body_json, state_with_pool};
    use crate::api::{build_app, default_rate_limit_state};
    use crate::middleware::AuthState;

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn seed(pool: &sqlx::PgPool) -> i64 {
        let entity_id: i64 =
            sqlx::query_scalar("INSERT INTO entities (name) VALUES ('Nova X') RETURNING id")
                .fetch_one(pool)
                .await
                .expect("insert entity");
        for (sentiment, score, reason) in [
            ("positive", 0.8, "camera"),
            ("negative", -0.6, "battery"),
            ("neutral", 0.0, "camera"),
        ] {
            sqlx::query(
                "INSERT INTO mentions (entity_id, content, source, sentiment, sentiment_score, \
                                       reason, reason_detail, published_at) \
                 VALUES ($1, 'text', 'web', $2, $3, $4, 'detail', NOW())",
            )
            .bind(entity_id)
            .bind(sentiment)
            .bind(score)
            .bind(reason)
            .execute(pool)
            .await
            .expect("insert mention");
        }
        entity_id
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn stats_and_reputation_reflect_stored_mentions(pool: sqlx::PgPool) {
        let entity_id = seed(&pool).await;
        let app = build_app(
            state_with_pool(pool),
            AuthState::disabled(),
            default_rate_limit_state(),
        );

        let stats = app
            .clone()
            .oneshot(get("/api/v1/dashboard/stats"))
            .await
            .expect("response");
        assert_eq!(stats.status(), StatusCode::OK);
        let json = body_json(stats).await;
        assert_eq!(json["data"]["total_entities"], 1);
        assert_eq!(json["data"]["total_mentions"], 3);
        assert_eq!(json["data"]["negative_mentions"], 1);
        assert_eq!(json["data"]["recent_mentions"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["data"]["top_entities"][0]["entity_name"], "Nova X");
        assert_eq!(json["data"]["reason_insights"]["top_reasons"][0]["reason"], "camera");

        let score = app
            .clone()
            .oneshot(get(&format!("/api/v1/dashboard/reputation-scores/{entity_id}")))
            .await
            .expect("response");
        let json = body_json(score).await;
        // one positive plus half of one neutral over three mentions
        assert_eq!(json["data"]["reputation_score"], 50.0);

        let aspects = app
            .clone()
            .oneshot(get("/api/v1/dashboard/aspect-sentiment"))
            .await
            .expect("response");
        let json = body_json(aspects).await;
        assert_eq!(json["data"]["camera"]["total_mentions"], 2);
        assert_eq!(json["data"]["price"]["total_mentions"], 0);

        let missing = app
            .oneshot(get("/api/v1/dashboard/reputation-scores/999999"))
            .await
            .expect("response");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}

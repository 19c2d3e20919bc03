//! Mention handlers: filtered listing, ingestion through the pipeline, and
//! per-entity stats.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use repwatch_core::{Reason, Sentiment, SourceType};
use repwatch_db::{AlertRow, MentionFilter, MentionRow};
use repwatch_sentiment::reputation::{mention_stats, MentionStats};
use repwatch_sentiment::MentionInput;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, normalize_skip, parse_filter, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct ListMentionsQuery {
    pub entity_id: Option<i64>,
    pub source: Option<String>,
    pub sentiment: Option<String>,
    pub reason: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateMentionRequest {
    pub entity_id: i64,
    pub content: String,
    pub source: String,
    pub source_url: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    pub reason_detail: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatedMention {
    pub mention: MentionRow,
    pub alert_created: bool,
    pub alert: Option<AlertRow>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StatsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct EntityStats {
    pub entity_id: i64,
    pub entity_name: String,
    #[serde(flatten)]
    pub stats: MentionStats,
}

/// GET /api/v1/mentions
pub(super) async fn list_mentions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListMentionsQuery>,
) -> Result<Json<ApiResponse<Vec<MentionRow>>>, ApiError> {
    let rid = &req_id.0;
    let filter = MentionFilter {
        entity_id: query.entity_id,
        source: parse_filter::<SourceType>(rid, "source", query.source.as_deref())?,
        sentiment: parse_filter::<Sentiment>(rid, "sentiment", query.sentiment.as_deref())?,
        reason: parse_filter::<Reason>(rid, "reason", query.reason.as_deref())?,
        skip: normalize_skip(query.skip),
        limit: normalize_limit(query.limit),
    };

    let rows = repwatch_db::list_mentions(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(ApiResponse::new(rows, req_id.0))
}

/// GET /api/v1/mentions/{id}
pub(super) async fn get_mention(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MentionRow>>, ApiError> {
    let row = repwatch_db::get_mention(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "mention"))?;
    Ok(ApiResponse::new(row, req_id.0))
}

/// POST /api/v1/mentions
///
/// Scores, classifies and stores the mention, raising an alert when due.
pub(super) async fn create_mention(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateMentionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedMention>>), ApiError> {
    let rid = &req_id.0;
    if body.content.trim().is_empty() {
        return Err(ApiError::validation(rid, "content must not be empty"));
    }
    let source = parse_filter::<SourceType>(rid, "source", Some(&body.source))?
        .ok_or_else(|| ApiError::validation(rid, "source is required"))?;
    let reason = parse_filter::<Reason>(rid, "reason", body.reason.as_deref())?;

    repwatch_db::get_entity(&state.pool, body.entity_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(rid, "entity"))?;

    let input = MentionInput {
        entity_id: body.entity_id,
        content: body.content,
        source,
        source_url: body.source_url,
        author: body.author,
        published_at: body.published_at,
        reason,
        reason_detail: body.reason_detail,
        language: body.language,
    };
    let prepared = state.pipeline.prepare(input, Utc::now()).await;

    let ingested =
        repwatch_db::ingest_mention(&state.pool, &prepared.mention, prepared.alert.as_ref())
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?;

    let data = CreatedMention {
        alert_created: ingested.alert.is_some(),
        mention: ingested.mention,
        alert: ingested.alert,
    };
    Ok((StatusCode::CREATED, ApiResponse::new(data, req_id.0)))
}

/// GET /api/v1/mentions/entity/{id}/stats?days=
pub(super) async fn entity_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(entity_id): Path<i64>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<EntityStats>>, ApiError> {
    let rid = &req_id.0;
    let days = query.days.unwrap_or(30);
    if !(1..=365).contains(&days) {
        return Err(ApiError::validation(rid, "days must be between 1 and 365"));
    }

    let entity = repwatch_db::get_entity(&state.pool, entity_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(rid, "entity"))?;

    let now = Utc::now();
    let rows =
        repwatch_db::list_mentions_for_entity(&state.pool, entity_id, Some(now - Duration::days(days)))
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?;
    let mentions = rows
        .iter()
        .map(MentionRow::to_scored)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let data = EntityStats {
        entity_id,
        entity_name: entity.name,
        stats: mention_stats(&mentions, days, now),
    };
    Ok(ApiResponse::new(data, req_id.0))
}

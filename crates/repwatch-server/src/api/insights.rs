use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use repwatch_sentiment::{generate_insights, Insights};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct InsightsQuery {
    pub entity_id: Option<i64>,
}

/// GET /api/v1/insights/demo
pub(super) async fn demo_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<ApiResponse<Insights>>, ApiError> {
    let mentions = repwatch_db::scored_mentions(&state.pool, query.entity_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(
        generate_insights(&mentions, Utc::now()),
        req_id.0,
    ))
}

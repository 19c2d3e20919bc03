//! Alert handlers, including solution recommendations for alerted mentions.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use repwatch_core::AlertSeverity;
use repwatch_db::{AlertFilter, AlertRow};
use repwatch_sentiment::{generate_bulk_solutions, generate_solution, BulkSolutions, Solution};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, normalize_skip, parse_filter, ApiError, ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub(super) struct ListAlertsQuery {
    pub resolved: Option<bool>,
    pub severity: Option<String>,
    pub entity_id: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BulkQuery {
    pub entity_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct AlertSolution {
    pub alert_id: i64,
    pub mention_id: i64,
    pub solution: Solution,
}

#[derive(Debug, Serialize)]
pub(super) struct ResolvedAlert {
    pub alert: AlertRow,
    pub solution_applied: Option<Solution>,
}

#[derive(Debug, Serialize)]
pub(super) struct ActiveCount {
    pub active_alerts: i64,
}

/// GET /api/v1/alerts
pub(super) async fn list_alerts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListAlertsQuery>,
) -> Result<Json<ApiResponse<Vec<AlertRow>>>, ApiError> {
    let rid = &req_id.0;
    let filter = AlertFilter {
        resolved: query.resolved,
        severity: parse_filter::<AlertSeverity>(rid, "severity", query.severity.as_deref())?,
        entity_id: query.entity_id,
        skip: normalize_skip(query.skip),
        limit: normalize_limit(query.limit),
    };

    let rows = repwatch_db::list_alerts(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    Ok(ApiResponse::new(rows, req_id.0))
}

async fn load_alert(state: &AppState, rid: &str, id: i64) -> Result<AlertRow, ApiError> {
    repwatch_db::get_alert(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.to_string(), &e))?
        .ok_or_else(|| ApiError::not_found(rid, "alert"))
}

async fn solution_for(state: &AppState, rid: &str, alert: &AlertRow) -> Result<Option<Solution>, ApiError> {
    let Some(mention) = repwatch_db::get_mention(&state.pool, alert.mention_id)
        .await
        .map_err(|e| map_db_error(rid.to_string(), &e))?
    else {
        return Ok(None);
    };
    let scored = mention
        .to_scored()
        .map_err(|e| map_db_error(rid.to_string(), &e))?;
    Ok(Some(generate_solution(&scored)))
}

/// GET /api/v1/alerts/{id}
pub(super) async fn get_alert(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AlertRow>>, ApiError> {
    let alert = load_alert(&state, &req_id.0, id).await?;
    Ok(ApiResponse::new(alert, req_id.0))
}

/// GET /api/v1/alerts/{id}/solution
pub(super) async fn alert_solution(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AlertSolution>>, ApiError> {
    let rid = &req_id.0;
    let alert = load_alert(&state, rid, id).await?;
    let solution = solution_for(&state, rid, &alert)
        .await?
        .ok_or_else(|| ApiError::not_found(rid, "mention"))?;

    let data = AlertSolution {
        alert_id: alert.id,
        mention_id: alert.mention_id,
        solution,
    };
    Ok(ApiResponse::new(data, req_id.0))
}

/// POST /api/v1/alerts/{id}/resolve
pub(super) async fn resolve_alert(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ResolvedAlert>>, ApiError> {
    let rid = &req_id.0;
    let alert = repwatch_db::resolve_alert(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let solution_applied = solution_for(&state, rid, &alert).await?;

    tracing::info!(alert = alert.id, "alert resolved");
    let data = ResolvedAlert {
        alert,
        solution_applied,
    };
    Ok(ApiResponse::new(data, req_id.0))
}

/// GET /api/v1/alerts/active/count
pub(super) async fn active_count(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ActiveCount>>, ApiError> {
    let active_alerts = repwatch_db::active_alert_count(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(ActiveCount { active_alerts }, req_id.0))
}

/// GET /api/v1/alerts/solutions/bulk
pub(super) async fn bulk_solutions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BulkQuery>,
) -> Result<Json<ApiResponse<BulkSolutions>>, ApiError> {
    let rid = &req_id.0;
    let rows = repwatch_db::list_unresolved_alert_mentions(&state.pool, query.entity_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let mentions = rows
        .iter()
        .map(repwatch_db::MentionRow::to_scored)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(ApiResponse::new(generate_bulk_solutions(&mentions), req_id.0))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::test_support::{body_json, lazy_state, state_with_pool};
    use crate::api::{build_app, default_rate_limit_state};
    use crate::middleware::AuthState;

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn unknown_severity_is_rejected() {
        let app = build_app(lazy_state(), AuthState::disabled(), default_rate_limit_state());
        let response = app
            .oneshot(get("/api/v1/alerts?severity=low"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    async fn seed_alert(pool: &sqlx::PgPool) -> i64 {
        let entity_id: i64 =
            sqlx::query_scalar("INSERT INTO entities (name) VALUES ('Acme') RETURNING id")
                .fetch_one(pool)
                .await
                .expect("insert entity");
        let mention_id: i64 = sqlx::query_scalar(
            "INSERT INTO mentions (entity_id, content, source, sentiment, sentiment_score, \
                                   reason, reason_detail, published_at) \
             VALUES ($1, 'Support never answers my tickets', 'twitter', 'negative', -0.8, \
                     'customer_support', 'Slow support', NOW()) \
             RETURNING id",
        )
        .bind(entity_id)
        .fetch_one(pool)
        .await
        .expect("insert mention");
        sqlx::query_scalar(
            "INSERT INTO alerts (mention_id, entity_id, severity, message) \
             VALUES ($1, $2, 'critical', 'Very negative mention detected on twitter') \
             RETURNING id",
        )
        .bind(mention_id)
        .bind(entity_id)
        .fetch_one(pool)
        .await
        .expect("insert alert")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn solution_resolve_and_count(pool: sqlx::PgPool) {
        let alert_id = seed_alert(&pool).await;
        let app = build_app(
            state_with_pool(pool),
            AuthState::disabled(),
            default_rate_limit_state(),
        );

        let solution = app
            .clone()
            .oneshot(get(&format!("/api/v1/alerts/{alert_id}/solution")))
            .await
            .expect("response");
        assert_eq!(solution.status(), StatusCode::OK);
        let json = body_json(solution).await;
        assert_eq!(json["data"]["solution"]["priority"], "high");
        assert_eq!(json["data"]["solution"]["reason"], "customer_support");

        let bulk = app
            .clone()
            .oneshot(get("/api/v1/alerts/solutions/bulk"))
            .await
            .expect("response");
        let json = body_json(bulk).await;
        assert_eq!(json["data"]["total_issues"], 1);

        let resolved = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/alerts/{alert_id}/resolve"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(resolved.status(), StatusCode::OK);
        let json = body_json(resolved).await;
        assert_eq!(json["data"]["alert"]["is_resolved"], true);
        assert!(json["data"]["solution_applied"].is_object());

        let count = app
            .clone()
            .oneshot(get("/api/v1/alerts/active/count"))
            .await
            .expect("response");
        let json = body_json(count).await;
        assert_eq!(json["data"]["active_alerts"], 0);

        let missing = app
            .oneshot(get("/api/v1/alerts/424242"))
            .await
            .expect("response");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}

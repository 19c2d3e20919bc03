//! Manual collection trigger and run status.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::collection::{run_collection, CollectionStatus};
use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TriggerRequest {
    pub entity_id: Option<i64>,
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct TriggerAccepted {
    pub status: &'static str,
    pub entity_id: Option<i64>,
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct StatusView {
    pub enabled: bool,
    #[serde(flatten)]
    pub status: CollectionStatus,
}

/// POST /api/v1/collection/trigger
///
/// Starts a run in the background and returns 202 straight away.
pub(super) async fn trigger_collection(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<TriggerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TriggerAccepted>>), ApiError> {
    let rid = &req_id.0;

    if let Some(id) = body.entity_id {
        repwatch_db::get_entity(&state.pool, id)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?
            .ok_or_else(|| ApiError::not_found(rid, "entity"))?;
    }

    if !state.collection.try_start().await {
        return Err(ApiError::new(
            rid.as_str(),
            "conflict",
            "a collection run is already in progress",
        ));
    }

    let entity_id = body.entity_id;
    let force = body.force;
    let task_state = state.clone();
    tokio::spawn(async move {
        let result = run_collection(&task_state, entity_id, force).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "collection: run failed");
        }
        task_state.collection.finish(&result).await;
    });

    tracing::info!(?entity_id, force, "collection: triggered");
    let data = TriggerAccepted {
        status: "started",
        entity_id,
        force,
    };
    Ok((StatusCode::ACCEPTED, ApiResponse::new(data, req_id.0)))
}

/// GET /api/v1/collection/status
pub(super) async fn collection_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<StatusView>> {
    let data = StatusView {
        enabled: state.collector.is_some(),
        status: state.collection.snapshot().await,
    };
    ApiResponse::new(data, req_id.0)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::test_support::{body_json, lazy_state};
    use crate::api::{build_app, default_rate_limit_state};
    use crate::middleware::AuthState;

    fn trigger(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/collection/trigger")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn trigger_is_accepted_and_status_reports_disabled() {
        let state = lazy_state();
        let app = build_app(state.clone(), AuthState::disabled(), default_rate_limit_state());

        let response = app.clone().oneshot(trigger("{}")).await.expect("response");
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "started");
        assert_eq!(json["data"]["force"], false);

        let status = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/collection/status")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let json = body_json(status).await;
        assert_eq!(json["data"]["enabled"], false);
    }

    #[tokio::test]
    async fn second_trigger_while_running_conflicts() {
        let state = lazy_state();
        assert!(state.collection.try_start().await);
        let app = build_app(state, AuthState::disabled(), default_rate_limit_state());

        let response = app
            .oneshot(trigger(r#"{"force": true}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "conflict");
    }
}

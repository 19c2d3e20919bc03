//! Entity handlers: list, create, read, update, delete.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use repwatch_db::{EntityRow, EntityUpdate, NewEntity};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Deserialize)]
pub(super) struct ListEntitiesQuery {
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateEntityRequest {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateEntityRequest {
    pub name: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

fn validate_name(req_id: &str, name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::validation(
            req_id,
            format!("name must be 1-{MAX_NAME_LEN} characters"),
        ));
    }
    Ok(name.to_string())
}

/// Trim keywords and drop blanks.
fn clean_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

/// GET /api/v1/entities
pub(super) async fn list_entities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListEntitiesQuery>,
) -> Result<Json<ApiResponse<Vec<EntityRow>>>, ApiError> {
    let rows = repwatch_db::list_entities(&state.pool, query.active_only)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(rows, req_id.0))
}

/// POST /api/v1/entities
pub(super) async fn create_entity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateEntityRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EntityRow>>), ApiError> {
    let entity = NewEntity {
        name: validate_name(&req_id.0, &body.name)?,
        keywords: clean_keywords(body.keywords),
        description: body.description,
        is_active: body.is_active.unwrap_or(true),
    };

    let row = repwatch_db::create_entity(&state.pool, &entity)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(entity = row.id, name = %row.name, "entity created");
    Ok((StatusCode::CREATED, ApiResponse::new(row, req_id.0)))
}

/// GET /api/v1/entities/{id}
pub(super) async fn get_entity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<EntityRow>>, ApiError> {
    let row = repwatch_db::get_entity(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "entity"))?;
    Ok(ApiResponse::new(row, req_id.0))
}

/// PUT /api/v1/entities/{id}
pub(super) async fn update_entity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateEntityRequest>,
) -> Result<Json<ApiResponse<EntityRow>>, ApiError> {
    let update = EntityUpdate {
        name: body
            .name
            .as_deref()
            .map(|n| validate_name(&req_id.0, n))
            .transpose()?,
        keywords: body.keywords.map(clean_keywords),
        description: body.description,
        is_active: body.is_active,
    };

    let row = repwatch_db::update_entity(&state.pool, id, &update)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id.0, "entity"))?;
    Ok(ApiResponse::new(row, req_id.0))
}

/// DELETE /api/v1/entities/{id}
pub(super) async fn delete_entity(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    repwatch_db::delete_entity(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(entity = id, "entity deleted");
    Ok(StatusCode::NO_CONTENT)
}

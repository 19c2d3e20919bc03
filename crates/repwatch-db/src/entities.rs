//! Database operations for the `entities` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const ENTITY_COLUMNS: &str =
    "id, public_id, name, keywords, description, is_active, created_at, updated_at";

/// A row from the `entities` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EntityRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub keywords: Vec<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntityRow {
    #[must_use]
    pub fn search_terms(&self) -> Vec<String> {
        repwatch_core::search_terms(&self.name, &self.keywords)
    }
}

#[derive(Debug, Clone)]
pub struct NewEntity {
    pub name: String,
    pub keywords: Vec<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct EntityUpdate {
    pub name: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Map a unique-index violation on `entities.name` to [`DbError::DuplicateName`].
fn map_unique(err: sqlx::Error, name: &str) -> DbError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DbError::DuplicateName(name.to_string())
        }
        _ => DbError::Sqlx(err),
    }
}

/// Returns entities ordered by name, optionally only active ones.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_entities(pool: &PgPool, active_only: bool) -> Result<Vec<EntityRow>, DbError> {
    let rows = sqlx::query_as::<_, EntityRow>(&format!(
        "SELECT {ENTITY_COLUMNS} FROM entities \
         WHERE ($1 = false OR is_active = true) \
         ORDER BY name"
    ))
    .bind(active_only)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns all active entities, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_entities(pool: &PgPool) -> Result<Vec<EntityRow>, DbError> {
    list_entities(pool, true).await
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_entity(pool: &PgPool, id: i64) -> Result<Option<EntityRow>, DbError> {
    let row = sqlx::query_as::<_, EntityRow>(&format!(
        "SELECT {ENTITY_COLUMNS} FROM entities WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Case-insensitive lookup by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_entity_by_name(pool: &PgPool, name: &str) -> Result<Option<EntityRow>, DbError> {
    let row = sqlx::query_as::<_, EntityRow>(&format!(
        "SELECT {ENTITY_COLUMNS} FROM entities WHERE lower(name) = lower($1)"
    ))
    .bind(name.trim())
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::DuplicateName`] if the name is already taken
/// (case-insensitive), or [`DbError::Sqlx`] if the insert fails.
pub async fn create_entity(pool: &PgPool, entity: &NewEntity) -> Result<EntityRow, DbError> {
    let name = entity.name.trim();
    sqlx::query_as::<_, EntityRow>(&format!(
        "INSERT INTO entities (public_id, name, keywords, description, is_active) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {ENTITY_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(&entity.keywords)
    .bind(&entity.description)
    .bind(entity.is_active)
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique(e, name))
}

/// Apply a partial update. Returns `None` when the entity does not exist.
///
/// # Errors
///
/// Returns [`DbError::DuplicateName`] if the new name is taken, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_entity(
    pool: &PgPool,
    id: i64,
    update: &EntityUpdate,
) -> Result<Option<EntityRow>, DbError> {
    let name = update.name.as_deref().map(str::trim);
    sqlx::query_as::<_, EntityRow>(&format!(
        "UPDATE entities SET \
             name = COALESCE($2, name), \
             keywords = COALESCE($3, keywords), \
             description = COALESCE($4, description), \
             is_active = COALESCE($5, is_active), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {ENTITY_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(&update.keywords)
    .bind(&update.description)
    .bind(update.is_active)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_unique(e, name.unwrap_or_default()))
}

/// Delete an entity and, by cascade, its mentions and alerts.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no entity has this id.
pub async fn delete_entity(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM entities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_active_entities(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM entities WHERE is_active")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

//! Database operations for the `alerts` table.

use chrono::{DateTime, Utc};
use repwatch_core::AlertSeverity;
use serde::Serialize;
use sqlx::PgPool;

use crate::mentions::{MentionRow, MENTION_COLUMNS};
use crate::{parse_column, DbError};

pub(crate) const ALERT_COLUMNS: &str =
    "id, mention_id, entity_id, severity, message, is_resolved, created_at, resolved_at";

/// A row from the `alerts` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AlertRow {
    pub id: i64,
    pub mention_id: i64,
    pub entity_id: i64,
    pub severity: String,
    pub message: String,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl AlertRow {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] if the stored severity is unknown.
    pub fn severity(&self) -> Result<AlertSeverity, DbError> {
        parse_column("severity", &self.severity)
    }
}

/// Filters for [`list_alerts`]. Results are newest first.
#[derive(Debug, Clone)]
pub struct AlertFilter {
    pub resolved: Option<bool>,
    pub severity: Option<AlertSeverity>,
    pub entity_id: Option<i64>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for AlertFilter {
    fn default() -> Self {
        Self {
            resolved: None,
            severity: None,
            entity_id: None,
            skip: 0,
            limit: 100,
        }
    }
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_alerts(pool: &PgPool, filter: &AlertFilter) -> Result<Vec<AlertRow>, DbError> {
    let rows = sqlx::query_as::<_, AlertRow>(&format!(
        "SELECT {ALERT_COLUMNS} FROM alerts \
         WHERE ($1::BOOLEAN IS NULL OR is_resolved = $1) \
           AND ($2::TEXT IS NULL OR severity = $2) \
           AND ($3::BIGINT IS NULL OR entity_id = $3) \
         ORDER BY created_at DESC, id DESC \
         OFFSET $4 LIMIT $5"
    ))
    .bind(filter.resolved)
    .bind(filter.severity.map(AlertSeverity::as_str))
    .bind(filter.entity_id)
    .bind(filter.skip.max(0))
    .bind(filter.limit.max(0))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_alert(pool: &PgPool, id: i64) -> Result<Option<AlertRow>, DbError> {
    let row = sqlx::query_as::<_, AlertRow>(&format!(
        "SELECT {ALERT_COLUMNS} FROM alerts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Mark an alert resolved. Resolving twice keeps the first `resolved_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no alert has this id.
pub async fn resolve_alert(pool: &PgPool, id: i64) -> Result<AlertRow, DbError> {
    let row = sqlx::query_as::<_, AlertRow>(&format!(
        "UPDATE alerts \
         SET is_resolved = true, resolved_at = COALESCE(resolved_at, NOW()) \
         WHERE id = $1 \
         RETURNING {ALERT_COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn active_alert_count(pool: &PgPool) -> Result<i64, DbError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM alerts WHERE is_resolved = false")
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Unresolved critical alerts, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_critical_alerts(pool: &PgPool, limit: i64) -> Result<Vec<AlertRow>, DbError> {
    let rows = sqlx::query_as::<_, AlertRow>(&format!(
        "SELECT {ALERT_COLUMNS} FROM alerts \
         WHERE severity = 'critical' AND is_resolved = false \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Mentions behind unresolved alerts, optionally for one entity. Each
/// mention appears once, ordered by its earliest alert.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_unresolved_alert_mentions(
    pool: &PgPool,
    entity_id: Option<i64>,
) -> Result<Vec<MentionRow>, DbError> {
    let rows = sqlx::query_as::<_, MentionRow>(&format!(
        "SELECT {MENTION_COLUMNS} FROM mentions \
         JOIN ( \
             SELECT mention_id, MIN(id) AS first_alert \
             FROM alerts \
             WHERE is_resolved = false AND ($1::BIGINT IS NULL OR entity_id = $1) \
             GROUP BY mention_id \
         ) a ON a.mention_id = mentions.id \
         ORDER BY a.first_alert"
    ))
    .bind(entity_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

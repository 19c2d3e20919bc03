//! Database operations for the `mentions` table, including transactional
//! ingestion of a mention with its alert.

use chrono::{DateTime, Utc};
use repwatch_core::{AlertDraft, NewMention, Reason, ScoredMention, Sentiment, SourceType};
use serde::Serialize;
use sqlx::{Connection, PgConnection, PgPool};

use crate::alerts::{AlertRow, ALERT_COLUMNS};
use crate::{parse_column, DbError};

pub(crate) const MENTION_COLUMNS: &str = "id, entity_id, content, source, source_url, author, \
     sentiment, sentiment_score, reason, reason_detail, language, published_at, collected_at";

/// A row from the `mentions` table. Enum columns are stored as text.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MentionRow {
    pub id: i64,
    pub entity_id: i64,
    pub content: String,
    pub source: String,
    pub source_url: Option<String>,
    pub author: Option<String>,
    pub sentiment: String,
    pub sentiment_score: f64,
    pub reason: Option<String>,
    pub reason_detail: Option<String>,
    pub language: String,
    pub published_at: DateTime<Utc>,
    pub collected_at: DateTime<Utc>,
}

impl MentionRow {
    /// Convert to the domain type used by the aggregation functions.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] if an enum column holds an unknown value.
    pub fn to_scored(&self) -> Result<ScoredMention, DbError> {
        Ok(ScoredMention {
            text: self.content.clone(),
            entity_id: self.entity_id,
            source: parse_column::<SourceType>("source", &self.source)?,
            sentiment: parse_column::<Sentiment>("sentiment", &self.sentiment)?,
            sentiment_score: self.sentiment_score,
            reason: self
                .reason
                .as_deref()
                .map(|r| parse_column::<Reason>("reason", r))
                .transpose()?,
            reason_detail: self.reason_detail.clone(),
            published_at: self.published_at,
        })
    }
}

/// Filters for [`list_mentions`]. Results are newest first.
#[derive(Debug, Clone)]
pub struct MentionFilter {
    pub entity_id: Option<i64>,
    pub source: Option<SourceType>,
    pub sentiment: Option<Sentiment>,
    pub reason: Option<Reason>,
    pub skip: i64,
    pub limit: i64,
}

impl Default for MentionFilter {
    fn default() -> Self {
        Self {
            entity_id: None,
            source: None,
            sentiment: None,
            reason: None,
            skip: 0,
            limit: 100,
        }
    }
}

/// A stored mention plus the alert created with it, if any.
#[derive(Debug, Clone, Serialize)]
pub struct IngestedMention {
    pub mention: MentionRow,
    pub alert: Option<AlertRow>,
}

/// Mention volume per entity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopEntityRow {
    pub entity_id: i64,
    pub entity_name: String,
    pub mention_count: i64,
}

/// Persist a scored mention and its alert in one transaction.
///
/// The alert is inserted inside a savepoint: if that insert fails the
/// savepoint is rolled back, the failure is logged, and the mention is still
/// committed. A failed mention insert rolls back everything.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the mention insert or the commit fails.
pub async fn ingest_mention(
    pool: &PgPool,
    mention: &NewMention,
    alert: Option<&AlertDraft>,
) -> Result<IngestedMention, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, MentionRow>(&format!(
        "INSERT INTO mentions (entity_id, content, source, source_url, author, sentiment, \
                               sentiment_score, reason, reason_detail, language, published_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {MENTION_COLUMNS}"
    ))
    .bind(mention.entity_id)
    .bind(&mention.content)
    .bind(mention.source.as_str())
    .bind(&mention.source_url)
    .bind(&mention.author)
    .bind(mention.sentiment.as_str())
    .bind(mention.sentiment_score)
    .bind(mention.reason.map(Reason::as_str))
    .bind(&mention.reason_detail)
    .bind(&mention.language)
    .bind(mention.published_at)
    .fetch_one(&mut *tx)
    .await?;

    let alert_row = match alert {
        Some(draft) => match insert_alert(&mut tx, &row, draft).await {
            Ok(alert_row) => {
                tracing::info!(
                    mention_id = row.id,
                    alert_id = alert_row.id,
                    severity = %draft.severity,
                    "alert created"
                );
                Some(alert_row)
            }
            Err(e) => {
                tracing::error!(
                    mention_id = row.id,
                    severity = %draft.severity,
                    error = %e,
                    "failed to create alert; mention kept"
                );
                None
            }
        },
        None => None,
    };

    tx.commit().await?;

    Ok(IngestedMention {
        mention: row,
        alert: alert_row,
    })
}

async fn insert_alert(
    conn: &mut PgConnection,
    mention: &MentionRow,
    draft: &AlertDraft,
) -> Result<AlertRow, sqlx::Error> {
    let mut savepoint = conn.begin().await?;

    let inserted = sqlx::query_as::<_, AlertRow>(&format!(
        "INSERT INTO alerts (mention_id, entity_id, severity, message) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {ALERT_COLUMNS}"
    ))
    .bind(mention.id)
    .bind(mention.entity_id)
    .bind(draft.severity.as_str())
    .bind(&draft.message)
    .fetch_one(&mut *savepoint)
    .await;

    match inserted {
        Ok(row) => {
            savepoint.commit().await?;
            Ok(row)
        }
        Err(e) => {
            savepoint.rollback().await?;
            Err(e)
        }
    }
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_mentions(pool: &PgPool, filter: &MentionFilter) -> Result<Vec<MentionRow>, DbError> {
    let rows = sqlx::query_as::<_, MentionRow>(&format!(
        "SELECT {MENTION_COLUMNS} FROM mentions \
         WHERE ($1::BIGINT IS NULL OR entity_id = $1) \
           AND ($2::TEXT IS NULL OR source = $2) \
           AND ($3::TEXT IS NULL OR sentiment = $3) \
           AND ($4::TEXT IS NULL OR reason = $4) \
         ORDER BY published_at DESC, id DESC \
         OFFSET $5 LIMIT $6"
    ))
    .bind(filter.entity_id)
    .bind(filter.source.map(SourceType::as_str))
    .bind(filter.sentiment.map(Sentiment::as_str))
    .bind(filter.reason.map(Reason::as_str))
    .bind(filter.skip.max(0))
    .bind(filter.limit.max(0))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_mention(pool: &PgPool, id: i64) -> Result<Option<MentionRow>, DbError> {
    let row = sqlx::query_as::<_, MentionRow>(&format!(
        "SELECT {MENTION_COLUMNS} FROM mentions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Whether a mention with this source URL was already stored for the entity.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn mention_exists(
    pool: &PgPool,
    entity_id: i64,
    source: SourceType,
    source_url: &str,
) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS ( \
             SELECT 1 FROM mentions \
             WHERE entity_id = $1 AND source = $2 AND source_url = $3 \
         )",
    )
    .bind(entity_id)
    .bind(source.as_str())
    .bind(source_url)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// All mentions of an entity, optionally only those published at or after
/// `since`. Newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_mentions_for_entity(
    pool: &PgPool,
    entity_id: i64,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<MentionRow>, DbError> {
    let rows = sqlx::query_as::<_, MentionRow>(&format!(
        "SELECT {MENTION_COLUMNS} FROM mentions \
         WHERE entity_id = $1 \
           AND ($2::TIMESTAMPTZ IS NULL OR published_at >= $2) \
         ORDER BY published_at DESC, id DESC"
    ))
    .bind(entity_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Load mentions as domain values, for one entity or all of them.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// if a stored enum value is unknown.
pub async fn scored_mentions(
    pool: &PgPool,
    entity_id: Option<i64>,
) -> Result<Vec<ScoredMention>, DbError> {
    let rows = sqlx::query_as::<_, MentionRow>(&format!(
        "SELECT {MENTION_COLUMNS} FROM mentions \
         WHERE ($1::BIGINT IS NULL OR entity_id = $1) \
         ORDER BY published_at DESC, id DESC"
    ))
    .bind(entity_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(MentionRow::to_scored).collect()
}

/// Most recent mentions published at or after `since`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn recent_mentions(
    pool: &PgPool,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<MentionRow>, DbError> {
    let rows = sqlx::query_as::<_, MentionRow>(&format!(
        "SELECT {MENTION_COLUMNS} FROM mentions \
         WHERE published_at >= $1 \
         ORDER BY published_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(since)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_mentions(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM mentions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Active entities with the most mentions, busiest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn top_entities_by_mentions(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<TopEntityRow>, DbError> {
    let rows = sqlx::query_as::<_, TopEntityRow>(
        "SELECT e.id AS entity_id, e.name AS entity_name, COUNT(m.id) AS mention_count \
         FROM entities e \
         JOIN mentions m ON m.entity_id = e.id \
         WHERE e.is_active \
         GROUP BY e.id, e.name \
         ORDER BY mention_count DESC, e.name \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> MentionRow {
        MentionRow {
            id: 1,
            entity_id: 3,
            content: "Battery died".to_string(),
            source: "reddit".to_string(),
            source_url: None,
            author: None,
            sentiment: "negative".to_string(),
            sentiment_score: -0.4,
            reason: Some("battery".to_string()),
            reason_detail: Some("Battery or charging issue".to_string()),
            language: "en".to_string(),
            published_at: Utc::now(),
            collected_at: Utc::now(),
        }
    }

    #[test]
    fn row_converts_to_scored_mention() {
        let scored = row().to_scored().unwrap();
        assert_eq!(scored.source, SourceType::Reddit);
        assert_eq!(scored.sentiment, Sentiment::Negative);
        assert_eq!(scored.reason, Some(Reason::Battery));
        assert_eq!(scored.entity_id, 3);
    }

    #[test]
    fn unknown_reason_is_an_invalid_row() {
        let mut bad = row();
        bad.reason = Some("weather".to_string());
        assert!(matches!(
            bad.to_scored(),
            Err(DbError::InvalidRow { column: "reason", .. })
        ));
    }

    #[test]
    fn default_filter_pages_from_start() {
        let filter = MentionFilter::default();
        assert_eq!(filter.skip, 0);
        assert_eq!(filter.limit, 100);
        assert!(filter.entity_id.is_none());
    }
}

use repwatch_core::EntityConfig;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Upsert entities from the seed file, matching existing rows by
/// case-insensitive name.
///
/// Returns the number of entities processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_entities(pool: &PgPool, entities: &[EntityConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for entity in entities {
        sqlx::query(
            "INSERT INTO entities (public_id, name, keywords, description, is_active) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (lower(name)) DO UPDATE SET \
                 keywords = EXCLUDED.keywords, \
                 description = EXCLUDED.description, \
                 is_active = EXCLUDED.is_active, \
                 updated_at = NOW()",
        )
        .bind(Uuid::new_v4())
        .bind(entity.name.trim())
        .bind(&entity.keywords)
        .bind(&entity.description)
        .bind(entity.is_active)
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    tracing::info!(count, "seeded entities");
    Ok(count)
}

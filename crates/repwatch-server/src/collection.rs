//! Collection runs: fetch mentions for entities, score them and store them.
//!
//! Shared by the trigger endpoint and the cron job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use repwatch_db::{DbError, EntityRow};
use repwatch_sentiment::Collector;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::api::AppState;

/// Counters for one collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub entities: usize,
    pub collected: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub alerts: usize,
    pub failed: usize,
}

impl CollectionSummary {
    fn merge(mut self, other: Self) -> Self {
        self.entities += other.entities;
        self.collected += other.collected;
        self.stored += other.stored;
        self.duplicates += other.duplicates;
        self.alerts += other.alerts;
        self.failed += other.failed;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionStatus {
    pub running: bool,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_summary: Option<CollectionSummary>,
    pub last_error: Option<String>,
}

/// Shared view of the current or last collection run.
#[derive(Debug, Clone, Default)]
pub struct CollectionTracker {
    inner: Arc<Mutex<CollectionStatus>>,
}

impl CollectionTracker {
    /// Mark a run as started. Returns `false` if one is already running.
    pub async fn try_start(&self) -> bool {
        let mut status = self.inner.lock().await;
        if status.running {
            return false;
        }
        status.running = true;
        status.last_started_at = Some(Utc::now());
        true
    }

    pub async fn finish(&self, result: &Result<CollectionSummary, DbError>) {
        let mut status = self.inner.lock().await;
        status.running = false;
        status.last_finished_at = Some(Utc::now());
        match result {
            Ok(summary) => {
                status.last_summary = Some(*summary);
                status.last_error = None;
            }
            Err(e) => status.last_error = Some(e.to_string()),
        }
    }

    pub async fn snapshot(&self) -> CollectionStatus {
        self.inner.lock().await.clone()
    }
}

/// Start a run unless one is in progress, then record its outcome.
/// Returns `None` when skipped.
pub async fn run_tracked(
    state: &AppState,
    entity_id: Option<i64>,
    force: bool,
) -> Option<Result<CollectionSummary, DbError>> {
    if !state.collection.try_start().await {
        tracing::info!("collection already running; skipping");
        return None;
    }
    let result = run_collection(state, entity_id, force).await;
    state.collection.finish(&result).await;
    Some(result)
}

/// Collect for one entity, or for every active entity when `entity_id` is
/// `None`, with at most `max_concurrent_entities` in flight.
///
/// # Errors
///
/// Returns [`DbError`] if the entity list cannot be loaded. Per-entity
/// failures are logged and counted, not returned.
pub async fn run_collection(
    state: &AppState,
    entity_id: Option<i64>,
    force: bool,
) -> Result<CollectionSummary, DbError> {
    let Some(collector) = state.collector.clone() else {
        tracing::info!("collection skipped: no mention source configured");
        return Ok(CollectionSummary::default());
    };

    let entities = match entity_id {
        Some(id) => repwatch_db::get_entity(&state.pool, id)
            .await?
            .into_iter()
            .collect(),
        None => repwatch_db::list_active_entities(&state.pool).await?,
    };

    tracing::info!(count = entities.len(), force, "collection: starting");

    let summary = stream::iter(entities)
        .map(|entity| {
            let collector = Arc::clone(&collector);
            async move { collect_entity(state, &collector, &entity, force).await }
        })
        .buffer_unordered(state.max_concurrent_entities.max(1))
        .fold(CollectionSummary::default(), |acc, s| async move { acc.merge(s) })
        .await;

    tracing::info!(
        entities = summary.entities,
        collected = summary.collected,
        stored = summary.stored,
        duplicates = summary.duplicates,
        alerts = summary.alerts,
        failed = summary.failed,
        "collection: complete"
    );
    Ok(summary)
}

async fn collect_entity(
    state: &AppState,
    collector: &Collector,
    entity: &EntityRow,
    force: bool,
) -> CollectionSummary {
    let collected = collector
        .collect_for_entity(&entity.name, &entity.keywords, force)
        .await;
    let mut summary = CollectionSummary {
        entities: 1,
        collected: collected.len(),
        ..CollectionSummary::default()
    };

    for item in collected {
        if let Some(url) = item.source_url.as_deref() {
            match repwatch_db::mention_exists(&state.pool, entity.id, item.source, url).await {
                Ok(true) => {
                    summary.duplicates += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(entity = entity.id, error = %e, "duplicate check failed");
                    summary.failed += 1;
                    continue;
                }
            }
        }

        let prepared = state
            .pipeline
            .prepare(item.into_input(entity.id), Utc::now())
            .await;
        match repwatch_db::ingest_mention(&state.pool, &prepared.mention, prepared.alert.as_ref())
            .await
        {
            Ok(ingested) => {
                summary.stored += 1;
                if ingested.alert.is_some() {
                    summary.alerts += 1;
                }
            }
            Err(e) => {
                tracing::error!(entity = entity.id, error = %e, "failed to store mention");
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        entity = entity.id,
        name = %entity.name,
        collected = summary.collected,
        stored = summary.stored,
        "collection: entity done"
    );
    summary
}

//! One-shot mention collection from the command line.
//!
//! Entities are processed one at a time; per-entity failures are logged and
//! the run continues.

use chrono::Utc;
use repwatch_core::AppConfig;
use repwatch_db::EntityRow;
use repwatch_sentiment::{Collector, CollectorConfig, MentionPipeline, SentimentConfig};

pub(crate) async fn run_collect(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    entity_id: Option<i64>,
    force: bool,
) -> anyhow::Result<()> {
    let collector_config = CollectorConfig::from_app_config(config);
    if !collector_config.any_source_enabled() {
        println!("no mention source configured; set NEWSAPI_KEY, TWITTER_BEARER_TOKEN or Reddit credentials");
        return Ok(());
    }
    let collector = Collector::new(collector_config)?;
    let pipeline = MentionPipeline::from_config(&SentimentConfig::from_app_config(config))?;

    let entities = match entity_id {
        Some(id) => {
            let row = repwatch_db::get_entity(pool, id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("entity {id} not found"))?;
            vec![row]
        }
        None => repwatch_db::list_active_entities(pool).await?,
    };

    let mut stored = 0usize;
    let mut alerts = 0usize;
    for entity in &entities {
        let (s, a) = collect_entity(pool, &collector, &pipeline, entity, force).await;
        stored += s;
        alerts += a;
    }

    println!(
        "collected for {} entities: {stored} mentions stored, {alerts} alerts",
        entities.len()
    );
    Ok(())
}

async fn collect_entity(
    pool: &sqlx::PgPool,
    collector: &Collector,
    pipeline: &MentionPipeline,
    entity: &EntityRow,
    force: bool,
) -> (usize, usize) {
    let collected = collector
        .collect_for_entity(&entity.name, &entity.keywords, force)
        .await;
    let mut stored = 0;
    let mut alerts = 0;

    for item in collected {
        if let Some(url) = item.source_url.as_deref() {
            match repwatch_db::mention_exists(pool, entity.id, item.source, url).await {
                Ok(false) => {}
                Ok(true) => continue,
                Err(e) => {
                    tracing::error!(entity = entity.id, error = %e, "duplicate check failed");
                    continue;
                }
            }
        }

        let prepared = pipeline.prepare(item.into_input(entity.id), Utc::now()).await;
        match repwatch_db::ingest_mention(pool, &prepared.mention, prepared.alert.as_ref()).await {
            Ok(ingested) => {
                stored += 1;
                alerts += usize::from(ingested.alert.is_some());
            }
            Err(e) => tracing::error!(entity = entity.id, error = %e, "failed to store mention"),
        }
    }

    println!("{}: {stored} new mentions", entity.name);
    (stored, alerts)
}

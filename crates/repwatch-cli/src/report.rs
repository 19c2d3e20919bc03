//! Read-only reports: reputation table and alert listing.

use chrono::Utc;
use repwatch_db::{AlertFilter, AlertRow};
use repwatch_sentiment::reputation::{compute_reputation, ReputationScore};

pub(crate) async fn run_report(pool: &sqlx::PgPool, entity: Option<&str>) -> anyhow::Result<()> {
    let entities = match entity {
        Some(name) => {
            let row = repwatch_db::get_entity_by_name(pool, name)
                .await?
                .ok_or_else(|| anyhow::anyhow!("entity '{name}' not found"))?;
            vec![row]
        }
        None => repwatch_db::list_active_entities(pool).await?,
    };

    if entities.is_empty() {
        println!("no active entities; run `repwatch-cli db seed` first");
        return Ok(());
    }

    let now = Utc::now();
    let mut scores = Vec::with_capacity(entities.len());
    for entity in entities {
        let mentions = repwatch_db::scored_mentions(pool, Some(entity.id)).await?;
        scores.push(compute_reputation(
            Some(entity.id),
            Some(entity.name),
            &mentions,
            now,
        ));
    }

    println!("{}", report_header());
    for score in &scores {
        println!("{}", report_line(score));
    }
    Ok(())
}

fn report_header() -> String {
    format!(
        "{:<24} {:>8} {:>7} {:>7} {:>7} {:>7}  {}",
        "entity", "mentions", "score", "pos%", "neu%", "neg%", "trend"
    )
}

fn report_line(score: &ReputationScore) -> String {
    let dist = &score.sentiment_distribution;
    format!(
        "{:<24} {:>8} {:>7.2} {:>7.2} {:>7.2} {:>7.2}  {}",
        score.entity_name.as_deref().unwrap_or("-"),
        score.total_mentions,
        score.reputation_score,
        dist.positive,
        dist.neutral,
        dist.negative,
        score.trend,
    )
}

pub(crate) async fn run_alert_list(pool: &sqlx::PgPool, all: bool) -> anyhow::Result<()> {
    let filter = AlertFilter {
        resolved: if all { None } else { Some(false) },
        ..AlertFilter::default()
    };
    let alerts = repwatch_db::list_alerts(pool, &filter).await?;
    if alerts.is_empty() {
        println!("no alerts");
        return Ok(());
    }
    for alert in &alerts {
        println!("{}", alert_line(alert));
    }
    Ok(())
}

fn alert_line(alert: &AlertRow) -> String {
    let state = if alert.is_resolved { "resolved" } else { "open" };
    format!(
        "#{:<6} {:<8} {:<8} entity={:<4} mention={:<6} {}  {}",
        alert.id,
        alert.severity,
        state,
        alert.entity_id,
        alert.mention_id,
        alert.created_at.format("%Y-%m-%d %H:%M"),
        alert.message,
    )
}

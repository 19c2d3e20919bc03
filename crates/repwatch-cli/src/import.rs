//! Bulk import of mentions from JSON Lines files.
//!
//! Each non-blank line is one mention. Lines carrying a star `rating` take
//! their sentiment from the rating; the rest are scored from their text.
//! Unparseable lines are reported and skipped.

use std::path::Path;

use chrono::{DateTime, Utc};
use repwatch_core::{AppConfig, Reason, SourceType};
use repwatch_sentiment::{MentionInput, MentionPipeline, SentimentConfig};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ImportRecord {
    pub content: String,
    #[serde(default)]
    pub source: Option<SourceType>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reason: Option<Reason>,
    #[serde(default)]
    pub reason_detail: Option<String>,
}

impl ImportRecord {
    pub(crate) fn into_input(self, entity_id: i64) -> (MentionInput, Option<f64>) {
        let input = MentionInput {
            entity_id,
            content: self.content,
            source: self.source.unwrap_or(SourceType::Web),
            source_url: self.source_url,
            author: self.author,
            published_at: self.published_at,
            reason: self.reason,
            reason_detail: self.reason_detail,
            language: None,
        };
        (input, self.rating)
    }
}

/// Parse one line. Returns `Ok(None)` for blank lines.
///
/// # Errors
///
/// Returns an error if the line is not a valid record or its content is
/// blank.
pub(crate) fn parse_line(line: &str) -> anyhow::Result<Option<ImportRecord>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let record: ImportRecord = serde_json::from_str(trimmed)?;
    if record.content.trim().is_empty() {
        anyhow::bail!("content is empty");
    }
    Ok(Some(record))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ImportSummary {
    stored: usize,
    alerts: usize,
    skipped: usize,
    failed: usize,
}

pub(crate) async fn run_import(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    file: &Path,
    entity_name: &str,
) -> anyhow::Result<()> {
    let entity = repwatch_db::get_entity_by_name(pool, entity_name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("entity '{entity_name}' not found"))?;
    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
    let pipeline = MentionPipeline::from_config(&SentimentConfig::from_app_config(config))?;

    let mut summary = ImportSummary::default();
    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let record = match parse_line(line) {
            Ok(Some(record)) => record,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "skipping invalid import line");
                summary.skipped += 1;
                continue;
            }
        };

        let (input, rating) = record.into_input(entity.id);
        let now = Utc::now();
        let prepared = match rating {
            Some(rating) => pipeline.prepare_rated(input, rating, now),
            None => pipeline.prepare(input, now).await,
        };

        match repwatch_db::ingest_mention(pool, &prepared.mention, prepared.alert.as_ref()).await {
            Ok(ingested) => {
                summary.stored += 1;
                if ingested.alert.is_some() {
                    summary.alerts += 1;
                }
            }
            Err(e) => {
                tracing::error!(line = line_no, error = %e, "failed to store mention");
                summary.failed += 1;
            }
        }
    }

    println!(
        "imported {} mentions for '{}' ({} alerts, {} skipped, {} failed)",
        summary.stored, entity.name, summary.alerts, summary.skipped, summary.failed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn minimal_record_defaults_to_web() {
        let record = parse_line(r#"{"content": "Livraison rapide"}"#)
            .unwrap()
            .unwrap();
        let (input, rating) = record.into_input(9);
        assert_eq!(input.entity_id, 9);
        assert_eq!(input.source, SourceType::Web);
        assert!(rating.is_none());
        assert!(input.published_at.is_none());
    }

    #[test]
    fn full_record_keeps_metadata() {
        let line = r#"{"content": "Écran rayé", "source": "news", "author": "jo",
            "source_url": "https://shop.example/r/1", "published_at": "2024-05-01T10:00:00Z",
            "rating": 1.5, "reason": "build_quality", "reason_detail": "Scratched screen"}"#;
        let record = parse_line(&line.replace('\n', " ")).unwrap().unwrap();
        assert_eq!(record.reason, Some(Reason::BuildQuality));
        let (input, rating) = record.into_input(1);
        assert_eq!(rating, Some(1.5));
        assert_eq!(input.author.as_deref(), Some("jo"));
        assert_eq!(input.reason_detail.as_deref(), Some("Scratched screen"));
    }

    #[test]
    fn unknown_source_or_blank_content_is_an_error() {
        assert!(parse_line(r#"{"content": "x", "source": "myspace"}"#).is_err());
        assert!(parse_line(r#"{"content": "  "}"#).is_err());
        assert!(parse_line("not json").is_err());
    }
}

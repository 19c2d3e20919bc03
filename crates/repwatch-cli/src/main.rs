mod collect;
mod import;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use repwatch_sentiment::{MentionInput, MentionPipeline, SentimentAnalyzer};
use repwatch_core::SourceType;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "repwatch-cli")]
#[command(about = "Reputation monitoring command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Score a text with the local scorer and show the resulting alert
    Analyze {
        text: String,
        #[arg(long, default_value = "fr")]
        language: String,
    },
    /// Import mentions from a JSON Lines file
    Import {
        file: PathBuf,
        /// Name of the entity the mentions belong to
        #[arg(long)]
        entity: String,
    },
    /// Print reputation scores
    Report {
        /// Restrict the report to one entity (by name)
        #[arg(long)]
        entity: Option<String>,
    },
    /// List or resolve alerts
    Alerts {
        #[command(subcommand)]
        command: AlertCommands,
    },
    /// Collect mentions from the configured sources
    Collect {
        /// Restrict collection to one entity (by id)
        #[arg(long)]
        entity: Option<i64>,
        /// Ignore the recency window of the news search
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
    /// Upsert entities from the entities file
    Seed,
}

#[derive(Debug, Subcommand)]
enum AlertCommands {
    List {
        /// Include resolved alerts
        #[arg(long)]
        all: bool,
    },
    Resolve { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("repwatch-cli: no command given; see --help");
        return Ok(());
    };

    // Offline: needs neither configuration nor a database.
    if let Commands::Analyze { text, language } = &command {
        run_analyze(text, language).await;
        return Ok(());
    }

    let config = repwatch_core::load_app_config()?;
    let pool_config = repwatch_db::PoolConfig::from_app_config(&config);
    let pool = repwatch_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                repwatch_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = repwatch_db::run_migrations(&pool).await?;
                println!("migrations applied: {applied}");
            }
            DbCommands::Seed => {
                let file = repwatch_core::load_entities(&config.entities_path)?;
                let seeded = repwatch_db::seed_entities(&pool, &file.entities).await?;
                println!("entities seeded: {seeded}");
            }
        },
        Commands::Import { file, entity } => {
            import::run_import(&pool, &config, &file, &entity).await?;
        }
        Commands::Report { entity } => report::run_report(&pool, entity.as_deref()).await?,
        Commands::Alerts { command } => match command {
            AlertCommands::List { all } => report::run_alert_list(&pool, all).await?,
            AlertCommands::Resolve { id } => {
                let alert = repwatch_db::resolve_alert(&pool, id).await?;
                println!("alert {} resolved at {:?}", alert.id, alert.resolved_at);
            }
        },
        Commands::Collect { entity, force } => {
            collect::run_collect(&pool, &config, entity, force).await?;
        }
        Commands::Analyze { .. } => {}
    }

    Ok(())
}

async fn run_analyze(text: &str, language: &str) {
    let pipeline = MentionPipeline::new(SentimentAnalyzer::local(), language);
    let prepared = pipeline
        .prepare(
            MentionInput::new(0, text, SourceType::Web),
            chrono::Utc::now(),
        )
        .await;
    let mention = &prepared.mention;

    println!("sentiment: {}", mention.sentiment);
    println!("score:     {:.2}", mention.sentiment_score);
    if let Some(reason) = mention.reason {
        println!(
            "reason:    {reason} ({})",
            mention.reason_detail.as_deref().unwrap_or("")
        );
    }
    match &prepared.alert {
        Some(alert) => println!("alert:     {} - {}", alert.severity, alert.message),
        None => println!("alert:     none"),
    }
}

#[cfg(test)]
mod tests;

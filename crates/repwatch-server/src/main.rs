mod api;
mod collection;
mod middleware;
mod scheduler;

use std::sync::Arc;

use repwatch_sentiment::{Collector, CollectorConfig, MentionPipeline, SentimentConfig};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    collection::CollectionTracker,
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(repwatch_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = repwatch_db::PoolConfig::from_app_config(&config);
    let pool = repwatch_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = repwatch_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations up to date");

    let pipeline = MentionPipeline::from_config(&SentimentConfig::from_app_config(&config))?;
    let collector_config = CollectorConfig::from_app_config(&config);
    let collector = if collector_config.any_source_enabled() {
        Some(Arc::new(Collector::new(collector_config)?))
    } else {
        tracing::info!("no mention source configured; collection disabled");
        None
    };

    let state = AppState {
        pool,
        pipeline: Arc::new(pipeline),
        collector,
        collection: CollectionTracker::default(),
        max_concurrent_entities: config.collector_max_concurrent_entities,
    };

    let _scheduler = scheduler::build_scheduler(state.clone(), &config.collection_cron).await?;

    let auth = AuthState::from_config(&config)?;
    let app = build_app(state, auth, default_rate_limit_state());

    tracing::info!(addr = %config.bind_addr, env = %config.env, "repwatch-server listening");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

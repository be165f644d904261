mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(gapintel_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = gapintel_db::PoolConfig::from_app_config(&config);
    let pool = gapintel_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = gapintel_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations up to date");

    let state = AppState::from_config(pool.clone(), Arc::clone(&config))?;
    let _scheduler =
        scheduler::build_scheduler(pool, Arc::clone(&config), state.worker.clone()).await?;

    let auth = AuthState::from_env(
        matches!(config.env, gapintel_core::Environment::Development),
        config.api_key_hash_salt.as_deref(),
    )?;
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "gapintel-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

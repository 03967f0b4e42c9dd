use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskflow_api::{config::Config, db, routes, services::seed, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    if config.seed_on_startup {
        seed::init_database(&pool).await;
    }

    let state = AppState {
        db: pool,
        config: config.clone(),
    };
    let app = routes::build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("TaskFlow API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Create the schema and insert the default project and categories.
//!
//! Usage: init-db [--database-url URL]
//!   --database-url URL : SQLite URL (default: DATABASE_URL or sqlite://taskflow.db)

use clap::Parser;
use tracing::info;

use taskflow_api::{config::Config, db, services::seed};

#[derive(Parser)]
#[command(name = "init-db", about = "Create the TaskFlow schema and seed default data")]
struct Args {
    /// Database URL, overrides DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let database_url = args.database_url.unwrap_or(config.database_url);

    let pool = db::create_pool(&database_url, 1).await?;
    db::run_migrations(&pool).await?;
    info!("Schema ready at {}", database_url);

    match seed::seed_defaults(&pool).await? {
        seed::SeedOutcome::Seeded { projects, categories } => {
            info!("Inserted {} project(s) and {} categories", projects, categories)
        }
        seed::SeedOutcome::Skipped => info!("Existing data found, nothing to seed"),
    }

    pool.close().await;
    Ok(())
}

//! Database migration commands.
//!
//! Migration files live in `crates/gateway/migrations/` and are embedded
//! at compile time; the gateway binary never migrates on startup, this
//! command is the only apply path.
//!
//! # Environment Variables
//!
//! - `GATEWAY_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to generic `DATABASE_URL`)

use sqlx::PgPool;
use sqlx::migrate::Migrator;

static MIGRATOR: Migrator = sqlx::migrate!("../gateway/migrations");

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending gateway migrations.
pub async fn apply() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running gateway migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Gateway migrations complete");
    Ok(())
}

/// Report which migrations the gateway knows about without applying them.
pub async fn status() -> Result<(), MigrationError> {
    let pool = connect().await?;

    let applied: Vec<(i64,)> =
        sqlx::query_as("SELECT version FROM _sqlx_migrations ORDER BY version")
            .fetch_all(&pool)
            .await
            .unwrap_or_default();
    let applied: std::collections::HashSet<i64> = applied.into_iter().map(|(v,)| v).collect();

    for migration in MIGRATOR.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            "{state}"
        );
    }

    Ok(())
}

async fn connect() -> Result<PgPool, MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("GATEWAY_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("GATEWAY_DATABASE_URL"))?;

    tracing::info!("Connecting to gateway database...");
    Ok(PgPool::connect(&database_url).await?)
}

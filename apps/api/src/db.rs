use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `evaluations` table if it does not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS evaluations (
            id              UUID PRIMARY KEY,
            evaluated_at    TIMESTAMPTZ NOT NULL,
            candidate_name  TEXT NOT NULL,
            resume_file     TEXT NOT NULL,
            jd_file         TEXT NOT NULL,
            final_score     DOUBLE PRECISION NOT NULL,
            hard_score      DOUBLE PRECISION NOT NULL,
            soft_score      DOUBLE PRECISION NOT NULL,
            verdict         TEXT NOT NULL,
            missing_skills  JSONB NOT NULL,
            feedback        TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create evaluations table")?;

    info!("Evaluation schema ready");
    Ok(())
}

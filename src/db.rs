use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Schema of the `mortgages` table. Idempotent; applied at startup.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS mortgages (
    id BIGSERIAL PRIMARY KEY,
    credit_score INTEGER NOT NULL,
    loan_amount DOUBLE PRECISION NOT NULL,
    property_value DOUBLE PRECISION NOT NULL,
    annual_income DOUBLE PRECISION NOT NULL,
    debt_amount DOUBLE PRECISION NOT NULL,
    loan_type TEXT NOT NULL CHECK (loan_type IN ('fixed', 'adjustable')),
    property_type TEXT NOT NULL CHECK (property_type IN ('single_family', 'condo')),
    risk_score INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        let db = Self { pool };
        db.ensure_schema().await?;

        Ok(db)
    }

    /// Creates the `mortgages` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        tracing::debug!("Schema check complete");
        Ok(())
    }
}

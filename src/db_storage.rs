use crate::errors::{AppError, ResultExt};
use crate::models::Mortgage;
use crate::rating::MortgageApplication;
use sqlx::PgPool;

const MORTGAGE_COLUMNS: &str = "id, credit_score, loan_amount, property_value, annual_income, \
     debt_amount, loan_type, property_type, risk_score, created_at";

/// Database storage for mortgages and their computed risk scores
#[derive(Clone)]
pub struct MortgageStorage {
    pool: PgPool,
}

impl MortgageStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a scored mortgage, returning the stored row
    pub async fn insert(
        &self,
        application: &MortgageApplication,
        risk_score: i32,
    ) -> Result<Mortgage, AppError> {
        let query = format!(
            r#"
            INSERT INTO mortgages (
                credit_score, loan_amount, property_value, annual_income,
                debt_amount, loan_type, property_type, risk_score
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            MORTGAGE_COLUMNS
        );

        sqlx::query_as::<_, Mortgage>(&query)
            .bind(application.credit_score)
            .bind(application.loan_amount)
            .bind(application.property_value)
            .bind(application.annual_income)
            .bind(application.debt_amount)
            .bind(application.loan_type.as_str())
            .bind(application.property_type.as_str())
            .bind(risk_score)
            .fetch_one(&self.pool)
            .await
            .context("Failed to insert mortgage")
    }

    /// All stored mortgages, oldest first
    pub async fn list(&self) -> Result<Vec<Mortgage>, AppError> {
        let query = format!("SELECT {} FROM mortgages ORDER BY id", MORTGAGE_COLUMNS);

        sqlx::query_as::<_, Mortgage>(&query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list mortgages")
    }

    pub async fn find(&self, id: i64) -> Result<Option<Mortgage>, AppError> {
        let query = format!("SELECT {} FROM mortgages WHERE id = $1", MORTGAGE_COLUMNS);

        sqlx::query_as::<_, Mortgage>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to load mortgage {}", id))
    }

    /// Overwrite every scoring field of a mortgage. Returns `None` when no row
    /// has the given id.
    pub async fn update(
        &self,
        id: i64,
        application: &MortgageApplication,
        risk_score: i32,
    ) -> Result<Option<Mortgage>, AppError> {
        let query = format!(
            r#"
            UPDATE mortgages SET
                credit_score = $2,
                loan_amount = $3,
                property_value = $4,
                annual_income = $5,
                debt_amount = $6,
                loan_type = $7,
                property_type = $8,
                risk_score = $9
            WHERE id = $1
            RETURNING {}
            "#,
            MORTGAGE_COLUMNS
        );

        sqlx::query_as::<_, Mortgage>(&query)
            .bind(id)
            .bind(application.credit_score)
            .bind(application.loan_amount)
            .bind(application.property_value)
            .bind(application.annual_income)
            .bind(application.debt_amount)
            .bind(application.loan_type.as_str())
            .bind(application.property_type.as_str())
            .bind(risk_score)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to update mortgage {}", id))
    }

    /// Only rewrites the stored score; used when recomputing scores in bulk.
    pub async fn update_risk_score(&self, id: i64, risk_score: i32) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE mortgages SET risk_score = $2 WHERE id = $1")
            .bind(id)
            .bind(risk_score)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update risk score of mortgage {}", id))?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns `false` when no row had the given id.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM mortgages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete mortgage {}", id))?;

        Ok(result.rows_affected() > 0)
    }
}

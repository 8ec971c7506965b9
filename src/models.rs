use crate::errors::AppError;
use crate::rating::{LoanType, MortgageApplication, PoolSummary, PropertyType, RatingBand};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// ============ Database Models ============

/// A stored mortgage. Only the integer risk score is persisted; the rating
/// band is derived from it on every read.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Mortgage {
    /// Auto-increment identifier.
    pub id: i64,
    pub credit_score: i32,
    pub loan_amount: f64,
    pub property_value: f64,
    pub annual_income: f64,
    pub debt_amount: f64,
    /// Canonical loan type (`fixed` or `adjustable`).
    pub loan_type: String,
    /// Canonical property type (`single_family` or `condo`).
    pub property_type: String,
    pub risk_score: i32,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
}

impl Mortgage {
    /// Rebuilds the scoring input from the stored columns.
    pub fn application(&self) -> Result<MortgageApplication, AppError> {
        let loan_type: LoanType = self.loan_type.parse().map_err(|e| {
            AppError::InternalError(format!("mortgage {}: {}", self.id, e))
        })?;
        let property_type: PropertyType = self.property_type.parse().map_err(|e| {
            AppError::InternalError(format!("mortgage {}: {}", self.id, e))
        })?;

        Ok(MortgageApplication {
            credit_score: self.credit_score,
            loan_amount: self.loan_amount,
            property_value: self.property_value,
            annual_income: self.annual_income,
            debt_amount: self.debt_amount,
            loan_type,
            property_type,
        })
    }

    pub fn rating(&self) -> RatingBand {
        RatingBand::from_score(self.risk_score)
    }
}

// ============ API Models ============

/// Mortgage as returned by the read endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MortgageResponse {
    pub id: i64,
    pub credit_score: i32,
    pub loan_amount: f64,
    pub property_value: f64,
    pub annual_income: f64,
    pub debt_amount: f64,
    pub loan_type: String,
    pub property_type: String,
    pub risk_score: i32,
    pub rating: RatingBand,
    pub created_at: DateTime<Utc>,
}

impl From<Mortgage> for MortgageResponse {
    fn from(m: Mortgage) -> Self {
        let rating = m.rating();
        Self {
            id: m.id,
            credit_score: m.credit_score,
            loan_amount: m.loan_amount,
            property_value: m.property_value,
            annual_income: m.annual_income,
            debt_amount: m.debt_amount,
            loan_type: m.loan_type,
            property_type: m.property_type,
            risk_score: m.risk_score,
            rating,
            created_at: m.created_at,
        }
    }
}

/// Mortgage create/update request body. Documentation only: handlers read the
/// body as raw JSON and validate it field by field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MortgageRequest {
    /// Between 300 and 850.
    #[schema(example = 720)]
    pub credit_score: i32,
    #[schema(example = 160000.0)]
    pub loan_amount: f64,
    #[schema(example = 200000.0)]
    pub property_value: f64,
    #[schema(example = 100000.0)]
    pub annual_income: f64,
    #[schema(example = 20000.0)]
    pub debt_amount: f64,
    pub loan_type: LoanType,
    pub property_type: PropertyType,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateMortgageResponse {
    pub message: String,
    pub id: i64,
    pub risk_score: i32,
    pub rating: RatingBand,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateMortgageResponse {
    pub message: String,
    pub risk_score: i32,
    pub rating: RatingBand,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Pool rating over every stored mortgage.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RmbsRatingResponse {
    /// `AAA`, `BBB`, `C`, or `N/A` for an empty pool.
    #[schema(value_type = String, example = "AAA")]
    pub rating: crate::rating::PoolRating,
    pub mortgage_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_credit_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<PoolSummary> for RmbsRatingResponse {
    fn from(summary: PoolSummary) -> Self {
        let message = (summary.mortgage_count == 0).then(|| "No mortgages available".to_string());
        Self {
            rating: summary.rating,
            mortgage_count: summary.mortgage_count,
            total_score: summary.total_score,
            average_credit_score: summary.average_credit_score,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

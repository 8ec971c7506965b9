//! Mortgage and RMBS pool risk rating.
//!
//! Every function here is pure: scoring is a sum of threshold adjustments over a
//! single [`MortgageApplication`], and a pool is rated by summing the individual
//! scores and nudging the total by the pool's mean credit score.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Credit score at or above which a borrower lowers the risk score.
pub const PRIME_CREDIT_SCORE: i32 = 700;
/// Credit score below which a borrower raises the risk score.
pub const SUBPRIME_CREDIT_SCORE: i32 = 650;

/// Interest structure of the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Fixed,
    /// Also parsed from `variable`.
    Adjustable,
}

impl LoanType {
    /// Canonical spelling, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Fixed => "fixed",
            LoanType::Adjustable => "adjustable",
        }
    }
}

impl FromStr for LoanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(LoanType::Fixed),
            "adjustable" | "variable" => Ok(LoanType::Adjustable),
            other => Err(format!(
                "unknown loan type '{}' (expected 'fixed' or 'adjustable')",
                other
            )),
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of property securing the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// Also parsed from `house`.
    SingleFamily,
    Condo,
}

impl PropertyType {
    /// Canonical spelling, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::SingleFamily => "single_family",
            PropertyType::Condo => "condo",
        }
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_family" | "house" => Ok(PropertyType::SingleFamily),
            "condo" => Ok(PropertyType::Condo),
            other => Err(format!(
                "unknown property type '{}' (expected 'single_family' or 'condo')",
                other
            )),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The financial attributes of one mortgage that feed the risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MortgageApplication {
    pub credit_score: i32,
    pub loan_amount: f64,
    pub property_value: f64,
    pub annual_income: f64,
    pub debt_amount: f64,
    pub loan_type: LoanType,
    pub property_type: PropertyType,
}

impl MortgageApplication {
    /// Loan-to-value ratio.
    pub fn ltv(&self) -> Result<f64, RatingError> {
        ratio(self.loan_amount, self.property_value, "property_value")
    }

    /// Debt-to-income ratio.
    pub fn dti(&self) -> Result<f64, RatingError> {
        ratio(self.debt_amount, self.annual_income, "annual_income")
    }
}

fn ratio(numerator: f64, denominator: f64, field: &'static str) -> Result<f64, RatingError> {
    if denominator == 0.0 {
        return Err(RatingError::InvalidDenominator { field });
    }
    let value = numerator / denominator;
    if !value.is_finite() {
        return Err(RatingError::InvalidDenominator { field });
    }
    Ok(value)
}

/// Failure to score a mortgage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// A ratio denominator was zero, or the ratio was not a finite number.
    InvalidDenominator { field: &'static str },
}

impl RatingError {
    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RatingError::InvalidDenominator { .. } => "invalid-denominator",
        }
    }
}

impl fmt::Display for RatingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingError::InvalidDenominator { field } => {
                write!(f, "cannot compute ratio: {} must be a non-zero amount", field)
            }
        }
    }
}

impl std::error::Error for RatingError {}

/// Discrete rating band, best (`AAA`) to worst (`C`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum RatingBand {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "BBB")]
    Bbb,
    #[serde(rename = "C")]
    C,
}

impl RatingBand {
    /// Maps a risk score onto a band: `..=2` is AAA, `3..=5` is BBB, `6..` is C.
    pub fn from_score(score: i32) -> Self {
        match score {
            i32::MIN..=2 => RatingBand::Aaa,
            3..=5 => RatingBand::Bbb,
            _ => RatingBand::C,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingBand::Aaa => "AAA",
            RatingBand::Bbb => "BBB",
            RatingBand::C => "C",
        }
    }
}

impl fmt::Display for RatingBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating of a pool of mortgages. An empty pool has no rating and is
/// rendered as `"N/A"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolRating {
    Rated(RatingBand),
    NotAvailable,
}

const NOT_AVAILABLE: &str = "N/A";

impl PoolRating {
    pub fn band(&self) -> Option<RatingBand> {
        match self {
            PoolRating::Rated(band) => Some(*band),
            PoolRating::NotAvailable => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PoolRating::Rated(band) => band.as_str(),
            PoolRating::NotAvailable => NOT_AVAILABLE,
        }
    }
}

impl fmt::Display for PoolRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PoolRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PoolRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        match value.as_str() {
            NOT_AVAILABLE => Ok(PoolRating::NotAvailable),
            "AAA" => Ok(PoolRating::Rated(RatingBand::Aaa)),
            "BBB" => Ok(PoolRating::Rated(RatingBand::Bbb)),
            "C" => Ok(PoolRating::Rated(RatingBand::C)),
            other => Err(de::Error::custom(format!("unknown pool rating '{}'", other))),
        }
    }
}

/// Computes the integer risk score of one mortgage. Higher is riskier; the
/// result lies in `-2..=7`.
pub fn risk_score(mortgage: &MortgageApplication) -> Result<i32, RatingError> {
    let mut score = 0;

    let ltv = mortgage.ltv()?;
    if ltv > 0.9 {
        score += 2;
    } else if ltv > 0.8 {
        score += 1;
    }

    let dti = mortgage.dti()?;
    if dti > 0.5 {
        score += 2;
    } else if dti > 0.4 {
        score += 1;
    }

    score += credit_adjustment(f64::from(mortgage.credit_score));

    score += match mortgage.loan_type {
        LoanType::Fixed => -1,
        LoanType::Adjustable => 1,
    };

    if mortgage.property_type == PropertyType::Condo {
        score += 1;
    }

    Ok(score)
}

/// -1 for prime credit, +1 for subprime, 0 in between. Takes a real so the
/// pool's mean credit score goes through the same thresholds.
fn credit_adjustment(credit_score: f64) -> i32 {
    if credit_score >= f64::from(PRIME_CREDIT_SCORE) {
        -1
    } else if credit_score < f64::from(SUBPRIME_CREDIT_SCORE) {
        1
    } else {
        0
    }
}

/// Aggregate figures behind a pool rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolSummary {
    pub rating: PoolRating,
    pub mortgage_count: usize,
    /// Sum of individual scores after the mean credit score adjustment.
    pub total_score: Option<i64>,
    pub average_credit_score: Option<f64>,
}

/// Scores every mortgage in the pool and rates the pool as a whole.
///
/// The first mortgage that cannot be scored aborts the computation.
pub fn summarize_pool(pool: &[MortgageApplication]) -> Result<PoolSummary, RatingError> {
    if pool.is_empty() {
        return Ok(PoolSummary {
            rating: PoolRating::NotAvailable,
            mortgage_count: 0,
            total_score: None,
            average_credit_score: None,
        });
    }

    let mut total: i64 = 0;
    for mortgage in pool {
        total += i64::from(risk_score(mortgage)?);
    }

    let credit_sum: i64 = pool.iter().map(|m| i64::from(m.credit_score)).sum();
    let average_credit_score = credit_sum as f64 / pool.len() as f64;
    total += i64::from(credit_adjustment(average_credit_score));

    let band = RatingBand::from_score(total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32);

    Ok(PoolSummary {
        rating: PoolRating::Rated(band),
        mortgage_count: pool.len(),
        total_score: Some(total),
        average_credit_score: Some(average_credit_score),
    })
}

/// Rates a pool of mortgages; an empty pool yields [`PoolRating::NotAvailable`].
pub fn rmbs_rating(pool: &[MortgageApplication]) -> Result<PoolRating, RatingError> {
    summarize_pool(pool).map(|summary| summary.rating)
}

//! Validation of raw JSON mortgage payloads.
//!
//! Request bodies are taken as untyped JSON so that every problem can be
//! reported as a structured [`ValidationError`] instead of a generic
//! deserialization failure.

use crate::rating::{LoanType, MortgageApplication, PropertyType};
use serde_json::{Map, Value};
use std::fmt;

/// Fields every mortgage payload must carry.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "credit_score",
    "loan_amount",
    "property_value",
    "annual_income",
    "debt_amount",
    "loan_type",
    "property_type",
];

pub const MIN_CREDIT_SCORE: i64 = 300;
pub const MAX_CREDIT_SCORE: i64 = 850;

/// A mortgage payload that cannot be turned into a [`MortgageApplication`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The body is not a JSON object.
    InvalidBody,
    /// One or more required fields are absent or null.
    MissingFields(Vec<&'static str>),
    /// A field is present but has the wrong type or an out-of-range value.
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidBody => "invalid-body",
            ValidationError::MissingFields(_) => "missing-field",
            ValidationError::InvalidField { .. } => "invalid-field",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBody => write!(f, "Request body must be a JSON object"),
            ValidationError::MissingFields(_) => write!(f, "All fields are required"),
            ValidationError::InvalidField { field, reason } => write!(f, "{}: {}", field, reason),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates a mortgage payload and converts it into a typed application.
///
/// Checks run in order: object shape, presence of every required field,
/// then per-field type and range. Only the first invalid field is reported.
pub fn validate_application(body: &Value) -> Result<MortgageApplication, ValidationError> {
    let object = body.as_object().ok_or(ValidationError::InvalidBody)?;

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| object.get(*field).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let credit_score = credit_score(object)?;
    let loan_amount = amount(object, "loan_amount", Bound::Positive)?;
    let property_value = amount(object, "property_value", Bound::Positive)?;
    let annual_income = amount(object, "annual_income", Bound::Positive)?;
    let debt_amount = amount(object, "debt_amount", Bound::NonNegative)?;

    let loan_type = text(object, "loan_type")?
        .parse::<LoanType>()
        .map_err(|reason| invalid("loan_type", reason))?;
    let property_type = text(object, "property_type")?
        .parse::<PropertyType>()
        .map_err(|reason| invalid("property_type", reason))?;

    Ok(MortgageApplication {
        credit_score,
        loan_amount,
        property_value,
        annual_income,
        debt_amount,
        loan_type,
        property_type,
    })
}

enum Bound {
    Positive,
    NonNegative,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn credit_score(object: &Map<String, Value>) -> Result<i32, ValidationError> {
    let field = "credit_score";
    let value = object[field]
        .as_i64()
        .ok_or_else(|| invalid(field, "must be an integer"))?;

    if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&value) {
        return Err(invalid(
            field,
            format!(
                "must be between {} and {}",
                MIN_CREDIT_SCORE, MAX_CREDIT_SCORE
            ),
        ));
    }

    // Range check above keeps this lossless.
    Ok(value as i32)
}

fn amount(
    object: &Map<String, Value>,
    field: &'static str,
    bound: Bound,
) -> Result<f64, ValidationError> {
    let value = object[field]
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(field, "must be a number"))?;

    match bound {
        Bound::Positive if value <= 0.0 => Err(invalid(field, "must be positive")),
        Bound::NonNegative if value < 0.0 => Err(invalid(field, "cannot be negative")),
        _ => Ok(value),
    }
}

fn text<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, ValidationError> {
    object[field]
        .as_str()
        .ok_or_else(|| invalid(field, "must be a string"))
}

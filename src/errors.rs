use crate::rating::RatingError;
use crate::validation::ValidationError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Database-related errors.
    DatabaseError(sqlx::Error),
    /// Resource not found error.
    NotFound(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Request body exceeded the configured size limit.
    PayloadTooLarge(String),
    /// Mortgage payload failed validation.
    Validation(ValidationError),
    /// A mortgage could not be scored.
    Rating(RatingError),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Validation(e) => write!(f, "Validation error: {}", e),
            AppError::Rating(e) => write!(f, "Rating error: {}", e),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// HTTP status the error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            // Only stored rows reach the scorer unvalidated.
            AppError::Rating(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::WithContext { source, .. } => source.status(),
        }
    }
}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and JSON body, logging
    /// server-side failures.
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                json!({ "error": "Database error" })
            }
            AppError::NotFound(msg) | AppError::PayloadTooLarge(msg) => json!({ "error": msg }),
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                json!({ "error": msg })
            }
            AppError::Validation(e) => {
                tracing::warn!("Rejected mortgage payload: {}", e);
                match &e {
                    ValidationError::MissingFields(fields) => json!({
                        "error": e.to_string(),
                        "code": e.kind(),
                        "fields": fields,
                    }),
                    _ => json!({ "error": e.to_string(), "code": e.kind() }),
                }
            }
            AppError::Rating(e) => {
                tracing::error!("Rating error: {}", e);
                json!({ "error": "Failed to compute risk score", "code": e.kind() })
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "error": "Internal server error" })
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                // Delegate to underlying error's response
                return source.into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<RatingError> for AppError {
    fn from(err: RatingError) -> Self {
        AppError::Rating(err)
    }
}

/// Malformed JSON, a non-JSON content type and unreadable bodies all become
/// JSON error responses instead of axum's plain-text rejections.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge(rejection.body_text()),
            _ => AppError::BadRequest(rejection.body_text()),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: f(),
        })
    }
}

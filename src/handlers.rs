use crate::config::Config;
use crate::db_storage::MortgageStorage;
use crate::errors::AppError;
use crate::models::*;
use crate::rating::{risk_score, summarize_pool, MortgageApplication, RatingBand};
use crate::validation::validate_application;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    pub fn storage(&self) -> MortgageStorage {
        MortgageStorage::new(self.db.clone())
    }
}

/// Validates a payload and computes its score and band.
fn score_payload(body: &Value) -> Result<(MortgageApplication, i32, RatingBand), AppError> {
    let application = validate_application(body)?;
    let score = risk_score(&application)?;
    Ok((application, score, RatingBand::from_score(score)))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// POST /add_mortgage
///
/// Validates the payload, scores it and stores the mortgage with its score.
#[utoipa::path(
    post,
    path = "/add_mortgage",
    request_body = MortgageRequest,
    responses(
        (status = 201, description = "Mortgage stored", body = CreateMortgageResponse),
        (status = 400, description = "Missing or invalid fields"),
    )
)]
pub async fn add_mortgage(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateMortgageResponse>), AppError> {
    let Json(body) = body?;
    let (application, score, rating) = score_payload(&body)?;

    let mortgage = state.storage().insert(&application, score).await?;

    tracing::info!(
        "New mortgage added with ID: {}, Risk Score: {}, Rating: {}",
        mortgage.id,
        score,
        rating
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateMortgageResponse {
            message: "Mortgage added successfully".to_string(),
            id: mortgage.id,
            risk_score: score,
            rating,
        }),
    ))
}

/// GET /mortgages
///
/// Lists every stored mortgage with its band re-derived from the stored score.
#[utoipa::path(
    get,
    path = "/mortgages",
    responses((status = 200, description = "All stored mortgages", body = [MortgageResponse]))
)]
pub async fn get_mortgages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MortgageResponse>>, AppError> {
    let mortgages = state.storage().list().await?;

    tracing::info!("Retrieved {} mortgages", mortgages.len());

    Ok(Json(
        mortgages.into_iter().map(MortgageResponse::from).collect(),
    ))
}

/// GET /mortgages/:id
#[utoipa::path(
    get,
    path = "/mortgages/{id}",
    params(("id" = i64, Path, description = "Mortgage id")),
    responses(
        (status = 200, description = "The mortgage", body = MortgageResponse),
        (status = 404, description = "Mortgage not found"),
    )
)]
pub async fn get_mortgage(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MortgageResponse>, AppError> {
    let Path(id) = id?;
    let mortgage = state.storage().find(id).await?.ok_or_else(|| {
        tracing::warn!("Mortgage ID {} not found", id);
        AppError::NotFound("Mortgage not found".to_string())
    })?;

    Ok(Json(mortgage.into()))
}

/// PUT /update_mortgage/:id
///
/// Replaces every field of a mortgage and recomputes its score.
#[utoipa::path(
    put,
    path = "/update_mortgage/{id}",
    params(("id" = i64, Path, description = "Mortgage id")),
    request_body = MortgageRequest,
    responses(
        (status = 200, description = "Mortgage updated", body = UpdateMortgageResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Mortgage not found"),
    )
)]
pub async fn update_mortgage(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UpdateMortgageResponse>, AppError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let (application, score, rating) = score_payload(&body).map_err(|e| {
        tracing::error!("Invalid update request for mortgage ID: {}", id);
        e
    })?;

    let Some(mortgage) = state.storage().update(id, &application, score).await? else {
        tracing::warn!("Mortgage ID {} not found", id);
        return Err(AppError::NotFound("Mortgage not found".to_string()));
    };

    tracing::info!(
        "Updated mortgage ID: {}, New Risk Score: {}, Rating: {}",
        mortgage.id,
        score,
        rating
    );

    Ok(Json(UpdateMortgageResponse {
        message: "Mortgage updated successfully".to_string(),
        risk_score: score,
        rating,
    }))
}

/// DELETE /delete_mortgage/:id
#[utoipa::path(
    delete,
    path = "/delete_mortgage/{id}",
    params(("id" = i64, Path, description = "Mortgage id")),
    responses(
        (status = 200, description = "Mortgage deleted", body = MessageResponse),
        (status = 404, description = "Mortgage not found"),
    )
)]
pub async fn delete_mortgage(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = id?;
    if !state.storage().delete(id).await? {
        tracing::warn!("Mortgage ID {} not found", id);
        return Err(AppError::NotFound("Mortgage not found".to_string()));
    }

    tracing::info!("Deleted mortgage ID: {}", id);

    Ok(Json(MessageResponse {
        message: "Mortgage deleted successfully".to_string(),
    }))
}

/// GET /get_rmbs_rating
///
/// Re-scores every stored mortgage and rates them as a single pool. Nothing
/// is cached; each call reads and scores the whole table.
#[utoipa::path(
    get,
    path = "/get_rmbs_rating",
    responses((status = 200, description = "Pool rating, N/A when empty", body = RmbsRatingResponse))
)]
pub async fn get_rmbs_rating(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RmbsRatingResponse>, AppError> {
    let mortgages = state.storage().list().await?;

    let pool = mortgages
        .iter()
        .map(Mortgage::application)
        .collect::<Result<Vec<_>, _>>()?;

    let summary = summarize_pool(&pool)?;

    match summary.rating.band() {
        Some(band) => tracing::info!(
            "Calculated RMBS rating: {} ({} mortgages)",
            band,
            summary.mortgage_count
        ),
        None => tracing::info!("No mortgages available for RMBS rating calculation"),
    }

    Ok(Json(summary.into()))
}

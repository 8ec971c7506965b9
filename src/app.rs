use crate::handlers::{self, AppState};
use crate::models::*;
use crate::rating::{LoanType, PropertyType, RatingBand};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "RMBS Rating API", description = "Mortgage storage with risk scoring and pool rating"),
    paths(
        handlers::health,
        handlers::add_mortgage,
        handlers::get_mortgages,
        handlers::get_mortgage,
        handlers::update_mortgage,
        handlers::delete_mortgage,
        handlers::get_rmbs_rating,
    ),
    components(schemas(
        HealthResponse,
        MortgageRequest,
        MortgageResponse,
        CreateMortgageResponse,
        UpdateMortgageResponse,
        MessageResponse,
        RmbsRatingResponse,
        LoanType,
        PropertyType,
        RatingBand,
    ))
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
async fn serve_openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Serves the Swagger UI HTML page, configured to load the document served
/// by `serve_openapi_spec`.
async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>RMBS Rating API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Builds the HTTP application: routes, body limit, optional per-IP rate
/// limiting, request tracing and permissive CORS.
///
/// The rate limiter keys on client IP, so a server built with a limit must
/// be served with connect info (`into_make_service_with_connect_info`).
pub fn build_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let max_body_bytes = state.config.max_body_bytes;
    let rate_limit = state.config.rate_limit;

    let mortgage_routes = Router::new()
        .route("/add_mortgage", post(handlers::add_mortgage))
        .route("/mortgages", get(handlers::get_mortgages))
        .route("/mortgages/:id", get(handlers::get_mortgage))
        .route("/update_mortgage/:id", put(handlers::update_mortgage))
        .route("/delete_mortgage/:id", delete(handlers::delete_mortgage))
        .route("/get_rmbs_rating", get(handlers::get_rmbs_rating))
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.json", get(serve_openapi_spec))
        .layer(RequestBodyLimitLayer::new(max_body_bytes));

    let mortgage_routes = match rate_limit {
        Some(limit) => {
            // The builder takes the replenish interval, not a rate
            let replenish_ms = (1000 / limit.per_second).max(1);
            let governor_conf = Arc::new(
                GovernorConfigBuilder::default()
                    .per_millisecond(replenish_ms)
                    .burst_size(limit.burst_size)
                    .key_extractor(SmartIpKeyExtractor)
                    .finish()
                    .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?,
            );
            mortgage_routes.layer(ServiceBuilder::new().layer(GovernorLayer {
                config: governor_conf,
            }))
        }
        None => mortgage_routes,
    };

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(mortgage_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Ok(app)
}

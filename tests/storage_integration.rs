use std::env;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use rmbs_rating_api::api::app::build_router;
use rmbs_rating_api::api::handlers::AppState;
use rmbs_rating_api::config::Config;
use rmbs_rating_api::data::db::Database;
use rmbs_rating_api::data::db_storage::MortgageStorage;
use rmbs_rating_api::rating::{risk_score, LoanType, MortgageApplication, PropertyType, RatingBand};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_database_url() -> anyhow::Result<String> {
    env::var("TEST_DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL to run this test"))
}

async fn read_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Integration round trip for mortgage storage.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn mortgage_crud_round_trip() -> anyhow::Result<()> {
    let db_url = test_database_url()?;

    let db = Database::new(&db_url, 2).await?;
    let storage = MortgageStorage::new(db.pool.clone());

    let application = MortgageApplication {
        credit_score: 750,
        loan_amount: 160_000.0,
        property_value: 200_000.0,
        annual_income: 100_000.0,
        debt_amount: 20_000.0,
        loan_type: LoanType::Fixed,
        property_type: PropertyType::SingleFamily,
    };
    let score = risk_score(&application)?;

    let stored = storage.insert(&application, score).await?;
    assert!(stored.id > 0);
    assert_eq!(stored.risk_score, -2);
    assert_eq!(stored.loan_type, "fixed");
    assert_eq!(stored.rating(), RatingBand::Aaa);

    let found = storage.find(stored.id).await?.expect("inserted row");
    assert_eq!(found.application()?, application);

    let riskier = MortgageApplication {
        credit_score: 600,
        loan_type: LoanType::Adjustable,
        property_type: PropertyType::Condo,
        ..application
    };
    let new_score = risk_score(&riskier)?;
    let updated = storage
        .update(stored.id, &riskier, new_score)
        .await?
        .expect("row to update");
    assert_eq!(updated.risk_score, new_score);
    assert_eq!(updated.property_type, "condo");
    assert_eq!(updated.created_at, stored.created_at);

    assert!(storage.list().await?.iter().any(|m| m.id == stored.id));

    assert!(storage.delete(stored.id).await?);
    assert!(!storage.delete(stored.id).await?);
    assert!(storage.find(stored.id).await?.is_none());
    assert!(storage.update(stored.id, &riskier, new_score).await?.is_none());

    Ok(())
}

/// Full request path through the router: create, list, then rate the pool.
#[tokio::test]
#[ignore]
async fn router_add_list_and_rate() -> anyhow::Result<()> {
    let db_url = test_database_url()?;
    let db = Database::new(&db_url, 2).await?;
    let config = Config {
        database_url: db_url,
        host: "127.0.0.1".parse()?,
        port: 5000,
        db_max_connections: 2,
        log_level: "debug".to_string(),
        log_file: None,
        rate_limit: None,
        max_body_bytes: 64 * 1024,
    };
    let state = Arc::new(AppState {
        db: db.pool.clone(),
        config,
    });
    let app = build_router(state)?;

    let payload = json!({
        "credit_score": 680,
        "loan_amount": 180000,
        "property_value": 200000,
        "annual_income": 100000,
        "debt_amount": 50000,
        "loan_type": "variable",
        "property_type": "house"
    });
    let response = app
        .clone()
        .oneshot(
            Request::post("/add_mortgage")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await?;
    assert_eq!(created["message"], "Mortgage added successfully");
    assert_eq!(created["risk_score"], 3);
    assert_eq!(created["rating"], "BBB");
    let id = created["id"].as_i64().expect("numeric id");

    let response = app
        .clone()
        .oneshot(Request::get("/mortgages").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = read_json(response).await?;
    let row = listed
        .as_array()
        .expect("array of mortgages")
        .iter()
        .find(|m| m["id"] == id)
        .expect("created mortgage listed");
    assert_eq!(row["loan_type"], "adjustable");
    assert_eq!(row["property_type"], "single_family");
    assert_eq!(row["rating"], "BBB");

    let response = app
        .clone()
        .oneshot(Request::get("/get_rmbs_rating").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let rating = read_json(response).await?;
    assert!(rating["mortgage_count"].as_u64().unwrap_or(0) >= 1);
    assert!(["AAA", "BBB", "C"].contains(&rating["rating"].as_str().unwrap_or("N/A")));
    assert!(rating["total_score"].is_i64());
    assert!(rating["average_credit_score"].is_number());
    assert!(rating.get("message").is_none());

    let response = app
        .oneshot(
            Request::delete(format!("/delete_mortgage/{}", id)).body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

//! RMBS Rating API Library
//!
//! Risk scoring for individual mortgages and for pools of mortgages (RMBS),
//! plus the HTTP service that stores mortgages with their scores.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Scoring, validation and shared models/errors.
//! - `data`: Data access layer.
//! - `app`: Router assembly and OpenAPI document.
//! - `config`: Configuration management.
//! - `db`: Database connection pool and schema.
//! - `db_storage`: Mortgage storage operations.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Database and API models.
//! - `rating`: Mortgage risk score and pool rating.
//! - `telemetry`: Logging setup.
//! - `validation`: Mortgage payload validation.

pub mod api;
pub mod core;
pub mod data;

pub mod app;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod rating;
pub mod telemetry;
pub mod validation;

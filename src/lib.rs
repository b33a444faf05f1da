//! Cafe Booking Library
//!
//! Table reservations for cafes: inventory of bar and simple tables, a
//! locking booking transaction that never hands the same table out twice
//! for one date, and the HTTP surface in front of it.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod migrator;
pub mod queries;
pub mod services;

use axum::{
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::{InventoryService, ReservationService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub inventory_service: InventoryService,
    pub reservation_service: ReservationService,
}

impl AppState {
    /// Wires services on top of an existing pool.
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let inventory_service = InventoryService::new(db.clone());
        let reservation_service = ReservationService::new(db.clone(), config.lock_timeout());
        Self {
            db,
            config,
            inventory_service,
            reservation_service,
        }
    }
}

// Common response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<axum::Json<ApiResponse<T>>, errors::ServiceError>;

/// Routes mounted under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    let cafes = Router::new()
        .route(
            "/cafes",
            get(handlers::cafes::list_cafes).post(handlers::cafes::create_cafe),
        )
        .route(
            "/cafes/:id",
            get(handlers::cafes::get_cafe)
                .put(handlers::cafes::update_cafe)
                .delete(handlers::cafes::delete_cafe),
        )
        .route(
            "/cafes/:id/tables",
            get(handlers::cafes::list_tables).post(handlers::cafes::add_table),
        )
        .route(
            "/cafes/:id/availability",
            get(handlers::cafes::get_availability),
        )
        .route(
            "/menu-sets",
            get(handlers::cafes::list_menu_sets).post(handlers::cafes::create_menu_set),
        );

    let reservations = Router::new()
        .route(
            "/reservations",
            get(handlers::reservations::list_reservations)
                .post(handlers::reservations::book_table),
        )
        .route(
            "/reservations/:id",
            get(handlers::reservations::get_reservation),
        )
        .route(
            "/reservations/:id/cancel",
            post(handlers::reservations::cancel_reservation),
        )
        .route(
            "/reservations/:id/payment-status",
            put(handlers::reservations::update_payment_status),
        );

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(cafes)
        .merge(reservations)
}

/// Full application router: versioned API plus the Prometheus endpoint.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .route("/metrics", get(metrics::metrics_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn success_response_carries_timestamp() {
        let response = ApiResponse::success("ok");

        assert!(response.success);
        let meta = response.meta.expect("metadata expected");
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn error_response_has_no_data() {
        let response = ApiResponse::<()>::error("Not enough free tables.".into());

        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.message.as_deref(), Some("Not enough free tables."));
    }
}

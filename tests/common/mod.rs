#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use cafe_booking::{
    commands::reservations::BookTableCommand,
    config::AppConfig,
    db::{self, DbConfig},
    entities::{cafe, cafe_table, menu_set, TableKind},
    services::inventory::{AddTableRequest, CreateCafeRequest, CreateMenuSetRequest},
    AppState,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
///
/// The pool holds exactly one connection: the in-memory database lives in
/// that connection, and SQLite has no row locks, so a single connection is
/// what serialises concurrent booking transactions here.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.db_acquire_timeout_secs = 60;
        cfg.db_idle_timeout_secs = 3_600;

        Self::with_config(cfg).await
    }

    /// Application against a real server, e.g. Postgres, with a pool wide
    /// enough that bookings genuinely race for row locks.
    pub async fn with_database_url(url: &str, max_connections: u32) -> Self {
        let mut cfg = AppConfig::new(
            url.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = max_connections;
        cfg.db_min_connections = 1;
        cfg.db_acquire_timeout_secs = 30;

        Self::with_config(cfg).await
    }

    async fn with_config(cfg: AppConfig) -> Self {
        let mut db_cfg = DbConfig::from(&cfg);
        db_cfg.sqlx_logging = false;

        let pool = db::establish_connection_with_config(&db_cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = cafe_booking::app_router(state.clone());

        Self { router, state }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    pub async fn create_cafe(&self, name: &str) -> cafe::Model {
        self.state
            .inventory_service
            .create_cafe(CreateCafeRequest {
                name: name.to_string(),
                address: "12 Harbour Street".to_string(),
                number: "+15550100".to_string(),
            })
            .await
            .expect("create cafe")
    }

    pub async fn add_table(
        &self,
        cafe_id: Uuid,
        name: &str,
        kind: TableKind,
        capacity: i32,
    ) -> cafe_table::Model {
        self.state
            .inventory_service
            .add_table(
                cafe_id,
                AddTableRequest {
                    name: name.to_string(),
                    kind,
                    capacity,
                },
            )
            .await
            .expect("add table")
    }

    pub async fn create_menu_set(&self, name: &str) -> menu_set::Model {
        self.state
            .inventory_service
            .create_menu_set(CreateMenuSetRequest {
                name: name.to_string(),
                description: None,
            })
            .await
            .expect("create menu set")
    }

    /// Number of rows currently in `table`.
    pub async fn count(&self, table: &str) -> i64 {
        let row = self
            .db()
            .query_one(Statement::from_string(
                self.db().get_database_backend(),
                format!("SELECT COUNT(*) AS n FROM {}", table),
            ))
            .await
            .expect("count query")
            .expect("count row");
        row.try_get::<i64>("", "n").expect("count column")
    }

    pub async fn execute_sql(&self, sql: &str) {
        self.db()
            .execute_unprepared(sql)
            .await
            .unwrap_or_else(|e| panic!("failed to execute `{}`: {}", sql, e));
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn booking(cafe_id: Uuid, set_id: Uuid, date: NaiveDate, party_size: i32) -> BookTableCommand {
    BookTableCommand {
        cafe_id,
        date,
        name: "Guest".to_string(),
        number: "+15550199".to_string(),
        set_id,
        party_size,
        lock_timeout: Some(Duration::from_secs(5)),
    }
}

/// Collects a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body is json")
}

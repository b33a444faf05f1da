use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};
use tracing::error;

lazy_static! {
    // Booking metrics
    pub static ref BOOKINGS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cafe_bookings_total",
        "Total number of successful bookings by allocation path",
        &["path"]
    )
    .expect("metric can be created");

    pub static ref BOOKING_FAILURES: IntCounterVec = register_int_counter_vec!(
        "cafe_booking_failures_total",
        "Total number of booking attempts that did not produce a reservation",
        &["reason"]
    )
    .expect("metric can be created");

    pub static ref CANCELLATIONS_TOTAL: IntCounter = register_int_counter!(
        "cafe_cancellations_total",
        "Total number of cancelled reservations"
    )
    .expect("metric can be created");

    // Database metrics
    pub static ref DB_TRANSACTION_DURATION: Histogram = register_histogram!(
        "cafe_db_transaction_duration_seconds",
        "Booking transaction latencies in seconds"
    )
    .expect("metric can be created");

    pub static ref DB_TRANSACTIONS_ROLLED_BACK: IntCounter = register_int_counter!(
        "cafe_db_transactions_rolled_back_total",
        "Total number of booking transactions that were rolled back"
    )
    .expect("metric can be created");
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// `GET /metrics`
pub async fn metrics_handler() -> Response {
    match gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    commands::reservations::{BookTableCommand, BookingOutcome},
    entities::reservation,
    errors::ServiceError,
    handlers::AppState,
    services::{
        allocation::{AllocationPath, PlannedSeat},
        reservations::{ReservationDetails, ReservationFilter, UpdatePaymentStatusRequest},
    },
    ApiResponse, ApiResult,
};

pub const NO_AVAILABILITY_MESSAGE: &str = "Not enough free tables.";

/// Body of a successful booking.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub reservation_id: Uuid,
    pub path: AllocationPath,
    pub tables: Vec<PlannedSeat>,
    /// Every reservation of the cafe after this booking.
    pub bookings: Vec<reservation::Model>,
}

/// `POST /reservations`
///
/// 201 with the new reservation, 409 when no tables fit, 400 on bad input.
pub async fn book_table(
    State(state): State<AppState>,
    payload: Result<Json<BookTableCommand>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let Json(command) = payload?;
    let cafe_id = command.cafe_id;

    match state.reservation_service.book_table(command).await? {
        BookingOutcome::Booked(booked) => {
            // The booking is committed; a failed listing must not read as a retryable error.
            let bookings = match state
                .reservation_service
                .list_reservations(ReservationFilter {
                    cafe_id: Some(cafe_id),
                    ..Default::default()
                })
                .await
            {
                Ok(bookings) => bookings,
                Err(e) => {
                    warn!(
                        reservation_id = %booked.reservation_id,
                        error = %e,
                        "Booked, but listing the cafe's reservations failed"
                    );
                    Vec::new()
                }
            };

            let body = BookingResponse {
                reservation_id: booked.reservation_id,
                path: booked.path,
                tables: booked.tables,
                bookings,
            };
            Ok((StatusCode::CREATED, Json(ApiResponse::success(body))).into_response())
        }
        BookingOutcome::NoAvailability => Ok((
            StatusCode::CONFLICT,
            Json(ApiResponse::<()>::error(NO_AVAILABILITY_MESSAGE.to_string())),
        )
            .into_response()),
    }
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Query(filter): Query<ReservationFilter>,
) -> ApiResult<Vec<reservation::Model>> {
    let reservations = state.reservation_service.list_reservations(filter).await?;
    Ok(Json(ApiResponse::success(reservations)))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ReservationDetails> {
    let details = state.reservation_service.get_reservation(id).await?;
    Ok(Json(ApiResponse::success(details)))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<reservation::Model> {
    let cancelled = state.reservation_service.cancel_reservation(id).await?;
    Ok(Json(ApiResponse::success(cancelled)))
}

pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdatePaymentStatusRequest>, JsonRejection>,
) -> ApiResult<reservation::Model> {
    let Json(payload) = payload?;
    let updated = state
        .reservation_service
        .update_payment_status(id, payload)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

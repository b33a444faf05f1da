//! Reservation Service
//!
//! Entry point for booking, cancelling and inspecting table reservations.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::commands::reservations::{BookTableCommand, BookingOutcome, CancelReservationCommand};
use crate::commands::Command;
use crate::entities::{
    order_set::{self, Entity as OrderSet},
    reservation::{self, Entity as Reservation},
    table_assignment::{self, Entity as TableAssignment},
    ReservationStatus,
};
use crate::errors::ServiceError;
use crate::queries::{
    availability_queries::{AvailabilityReport, GetAvailabilityQuery},
    Query,
};

/// A reservation with the tables it holds and the set it ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDetails {
    #[serde(flatten)]
    pub reservation: reservation::Model,
    pub tables: Vec<table_assignment::Model>,
    pub order_sets: Vec<order_set::Model>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationFilter {
    pub cafe_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePaymentStatusRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Payment status must be between 1 and 50 characters"
    ))]
    pub payment_status: String,
}

#[derive(Clone)]
pub struct ReservationService {
    db_pool: Arc<DatabaseConnection>,
    lock_timeout: Option<Duration>,
}

impl ReservationService {
    pub fn new(db_pool: Arc<DatabaseConnection>, lock_timeout: Option<Duration>) -> Self {
        Self {
            db_pool,
            lock_timeout,
        }
    }

    /// Books tables for a party in one locked transaction.
    #[instrument(skip(self, command), fields(cafe_id = %command.cafe_id))]
    pub async fn book_table(
        &self,
        command: BookTableCommand,
    ) -> Result<BookingOutcome, ServiceError> {
        command
            .with_lock_timeout(self.lock_timeout)
            .execute(self.db_pool.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn cancel_reservation(&self, id: Uuid) -> Result<reservation::Model, ServiceError> {
        CancelReservationCommand { reservation_id: id }
            .execute(self.db_pool.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_reservation(&self, id: Uuid) -> Result<ReservationDetails, ServiceError> {
        let db = &*self.db_pool;

        let reservation = Reservation::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Reservation {} not found", id)))?;

        let tables = TableAssignment::find()
            .filter(table_assignment::Column::ReservationId.eq(id))
            .all(db)
            .await?;

        let order_sets = OrderSet::find()
            .filter(order_set::Column::ReservationId.eq(id))
            .all(db)
            .await?;

        Ok(ReservationDetails {
            reservation,
            tables,
            order_sets,
        })
    }

    /// Reservations matching `filter`, oldest date first.
    #[instrument(skip(self))]
    pub async fn list_reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<reservation::Model>, ServiceError> {
        let mut query = Reservation::find();

        if let Some(cafe_id) = filter.cafe_id {
            query = query.filter(reservation::Column::CafeId.eq(cafe_id));
        }
        if let Some(date) = filter.date {
            query = query.filter(reservation::Column::Date.eq(date));
        }
        if let Some(status) = filter.status {
            query = query.filter(reservation::Column::Status.eq(status.as_str()));
        }

        let reservations = query
            .order_by_asc(reservation::Column::Date)
            .order_by_asc(reservation::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;

        Ok(reservations)
    }

    /// Records a payment status reported by the payment flow.
    #[instrument(skip(self, request))]
    pub async fn update_payment_status(
        &self,
        id: Uuid,
        request: UpdatePaymentStatusRequest,
    ) -> Result<reservation::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let existing = Reservation::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Reservation {} not found", id)))?;

        let mut active: reservation::ActiveModel = existing.into();
        active.payment_status = Set(Some(request.payment_status.clone()));
        let updated = active.update(db).await?;

        info!(reservation_id = %id, payment_status = %request.payment_status, "Payment status updated");
        Ok(updated)
    }

    /// Free tables of a cafe for a date.
    pub async fn availability(
        &self,
        cafe_id: Uuid,
        date: NaiveDate,
    ) -> Result<AvailabilityReport, ServiceError> {
        GetAvailabilityQuery { cafe_id, date }
            .execute(&self.db_pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_length_is_bounded() {
        let ok = UpdatePaymentStatusRequest {
            payment_status: "paid".into(),
        };
        assert!(ok.validate().is_ok());

        let empty = UpdatePaymentStatusRequest {
            payment_status: String::new(),
        };
        assert!(empty.validate().is_err());

        let long = UpdatePaymentStatusRequest {
            payment_status: "x".repeat(51),
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn filter_deserializes_from_query_shape() {
        let filter: ReservationFilter = serde_json::from_value(serde_json::json!({
            "date": "2024-05-01",
            "status": "cancelled"
        }))
        .unwrap();

        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(filter.status, Some(ReservationStatus::Cancelled));
        assert!(filter.cafe_id.is_none());
    }
}

use crate::{
    commands::Command,
    db::{BookingTransaction, DbPool},
    entities::{
        reservation::{self, Entity as Reservation},
        ReservationStatus,
    },
    errors::ServiceError,
    metrics::CANCELLATIONS_TOTAL,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Moves a reservation from `booked` to `cancelled`. Its assignments stay in
/// place as history but no longer count against availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelReservationCommand {
    pub reservation_id: Uuid,
}

#[async_trait::async_trait]
impl Command for CancelReservationCommand {
    type Result = reservation::Model;

    #[instrument(skip(self, db_pool), fields(reservation_id = %self.reservation_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        let txn = BookingTransaction::begin(&db_pool).await?;

        let existing = txn
            .lock_rows_for_update::<Reservation>(
                Condition::all().add(reservation::Column::Id.eq(self.reservation_id)),
            )
            .await?
            .into_iter()
            .next();

        let existing = match existing {
            Some(r) => r,
            None => {
                txn.rollback().await?;
                return Err(ServiceError::NotFound(format!(
                    "Reservation {} not found",
                    self.reservation_id
                )));
            }
        };

        if !existing.is_active() {
            txn.rollback().await?;
            warn!("Reservation is already {}", existing.status);
            return Err(ServiceError::InvalidOperation(format!(
                "Reservation {} is already {}",
                self.reservation_id, existing.status
            )));
        }

        let mut active: reservation::ActiveModel = existing.into();
        active.status = Set(ReservationStatus::Cancelled.as_str().to_string());
        let updated = active.update(txn.conn()).await?;

        txn.commit().await?;

        CANCELLATIONS_TOTAL.inc();
        info!(cafe_id = %updated.cafe_id, date = %updated.date, "Reservation cancelled");

        Ok(updated)
    }
}

use crate::{
    commands::Command,
    db::{BookingTransaction, DbPool},
    entities::{
        cafe::Entity as Cafe,
        cafe_table::{self, Entity as CafeTable},
        menu_set::Entity as MenuSet,
        order_set, reservation, table_assignment, ReservationStatus, TableKind,
    },
    errors::ServiceError,
    metrics::{BOOKINGS_TOTAL, BOOKING_FAILURES},
    queries::availability_queries::available_tables,
    services::allocation::{allocate, Allocation, AllocationPath, CandidateTable, Plan, PlannedSeat},
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Request to seat `party_size` guests at `cafe_id` on `date`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BookTableCommand {
    pub cafe_id: Uuid,
    pub date: NaiveDate,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 15,
        message = "Number must be between 1 and 15 characters"
    ))]
    pub number: String,
    pub set_id: Uuid,
    #[validate(range(min = 1, max = 100, message = "Party size must be between 1 and 100"))]
    pub party_size: i32,
    /// How long to wait for table locks before giving up.
    #[serde(skip)]
    pub lock_timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedReservation {
    pub reservation_id: Uuid,
    pub path: AllocationPath,
    pub tables: Vec<PlannedSeat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(BookedReservation),
    /// Valid request but the free tables cannot seat the party.
    NoAvailability,
}

#[async_trait::async_trait]
impl Command for BookTableCommand {
    type Result = BookingOutcome;

    #[instrument(skip(self, db_pool), fields(cafe_id = %self.cafe_id, date = %self.date, party_size = self.party_size))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            BOOKING_FAILURES.with_label_values(&["validation_error"]).inc();
            warn!("Invalid booking request: {}", e);
            ServiceError::from(e)
        })?;

        let txn = BookingTransaction::begin_with_lock_timeout(&db_pool, self.lock_timeout).await?;

        let plan = match self.plan_under_lock(&txn).await {
            Ok(Allocation::Planned(plan)) => plan,
            Ok(Allocation::NoFit) => {
                txn.rollback().await?;
                BOOKING_FAILURES.with_label_values(&["no_availability"]).inc();
                info!("No free tables for party");
                return Ok(BookingOutcome::NoAvailability);
            }
            Err(e) => {
                self.abort(txn, &e).await;
                return Err(e);
            }
        };

        let reservation_id = match self.persist(&txn, &plan).await {
            Ok(id) => id,
            Err(e) => {
                self.abort(txn, &e).await;
                return Err(e);
            }
        };

        txn.commit().await.map_err(|e| {
            BOOKING_FAILURES.with_label_values(&["database_error"]).inc();
            e
        })?;

        BOOKINGS_TOTAL.with_label_values(&[plan.path.as_str()]).inc();
        info!(
            reservation_id = %reservation_id,
            path = %plan.path,
            tables = plan.len(),
            "Table booked"
        );

        Ok(BookingOutcome::Booked(BookedReservation {
            reservation_id,
            path: plan.path,
            tables: plan.seats,
        }))
    }
}

impl BookTableCommand {
    pub fn with_lock_timeout(mut self, lock_timeout: Option<Duration>) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Locks the candidate tables, reads what is still free and decides.
    async fn plan_under_lock(&self, txn: &BookingTransaction) -> Result<Allocation, ServiceError> {
        let conn = txn.conn();

        if Cafe::find_by_id(self.cafe_id).one(conn).await?.is_none() {
            return Err(ServiceError::InvalidRequest(format!(
                "cafe {} does not exist",
                self.cafe_id
            )));
        }
        if MenuSet::find_by_id(self.set_id).one(conn).await?.is_none() {
            return Err(ServiceError::InvalidRequest(format!(
                "menu set {} does not exist",
                self.set_id
            )));
        }

        // Bar tables before simple tables, each in pk order.
        let bar_tables = if self.party_size == 1 {
            txn.lock_rows_for_update::<CafeTable>(self.tables_of(TableKind::Bar))
                .await?;
            available_tables(conn, self.cafe_id, self.date, TableKind::Bar).await?
        } else {
            Vec::new()
        };
        txn.lock_rows_for_update::<CafeTable>(self.tables_of(TableKind::Simple))
            .await?;
        let simple_tables = available_tables(conn, self.cafe_id, self.date, TableKind::Simple).await?;

        let bar: Vec<CandidateTable> = bar_tables.iter().map(CandidateTable::from).collect();
        let simple: Vec<CandidateTable> = simple_tables.iter().map(CandidateTable::from).collect();

        Ok(allocate(self.party_size, &bar, &simple))
    }

    fn tables_of(&self, kind: TableKind) -> Condition {
        Condition::all()
            .add(cafe_table::Column::CafeId.eq(self.cafe_id))
            .add(cafe_table::Column::Kind.eq(kind.as_str()))
    }

    /// Writes the reservation, one assignment per planned table and the order.
    async fn persist(&self, txn: &BookingTransaction, plan: &Plan) -> Result<Uuid, ServiceError> {
        let conn = txn.conn();

        let reservation = reservation::ActiveModel {
            cafe_id: Set(self.cafe_id),
            date: Set(self.date),
            name: Set(self.name.clone()),
            number: Set(self.number.clone()),
            status: Set(ReservationStatus::Booked.as_str().to_string()),
            payment_status: Set(None),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        for seat in &plan.seats {
            table_assignment::ActiveModel {
                id: Set(Uuid::new_v4()),
                reservation_id: Set(reservation.id),
                table_id: Set(seat.table_id),
                quantity: Set(seat.quantity),
            }
            .insert(conn)
            .await?;
        }

        order_set::ActiveModel {
            id: Set(Uuid::new_v4()),
            reservation_id: Set(reservation.id),
            set_id: Set(self.set_id),
            quantity: Set(self.party_size),
        }
        .insert(conn)
        .await?;

        Ok(reservation.id)
    }

    async fn abort(&self, txn: BookingTransaction, cause: &ServiceError) {
        let reason = match cause {
            ServiceError::InvalidRequest(_) => "invalid_request",
            ServiceError::DatabaseError(_) => "database_error",
            _ => "other",
        };
        BOOKING_FAILURES.with_label_values(&[reason]).inc();

        let transaction_id = txn.id();
        if let Err(e) = txn.rollback().await {
            error!(%transaction_id, error = %e, "Rollback after failed booking also failed");
        }
        if cause.is_retryable() {
            error!(%transaction_id, error = %cause, "Booking transaction aborted");
        } else {
            warn!(%transaction_id, error = %cause, "Booking rejected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> BookTableCommand {
        BookTableCommand {
            cafe_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            name: "Alice".into(),
            number: "+15550100".into(),
            set_id: Uuid::new_v4(),
            party_size: 2,
            lock_timeout: None,
        }
    }

    #[test]
    fn accepts_well_formed_request() {
        assert!(command().validate().is_ok());
    }

    #[test]
    fn rejects_empty_party() {
        let mut cmd = command();
        cmd.party_size = 0;
        let errors = cmd.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("party_size"));
    }

    #[test]
    fn rejects_blank_name_and_long_number() {
        let mut cmd = command();
        cmd.name = String::new();
        cmd.number = "1".repeat(16);
        let errors = cmd.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("number"));
    }

    #[test]
    fn validation_errors_map_to_invalid_request() {
        let mut cmd = command();
        cmd.party_size = 101;
        let err = ServiceError::from(cmd.validate().unwrap_err());
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }

    #[test]
    fn lock_timeout_is_not_deserialized() {
        let json = serde_json::json!({
            "cafe_id": Uuid::new_v4(),
            "date": "2024-03-08",
            "name": "Bob",
            "number": "123",
            "set_id": Uuid::new_v4(),
            "party_size": 3,
            "lock_timeout": { "secs": 1, "nanos": 0 }
        });
        let cmd: BookTableCommand = serde_json::from_value(json).unwrap();
        assert_eq!(cmd.lock_timeout, None);
    }
}

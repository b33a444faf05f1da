/*!
 * Booking transaction
 *
 * A thin handle over a sea-orm `DatabaseTransaction` exposing begin,
 * row locking, commit and rollback. Everything a booking reads or writes
 * goes through `conn()` so it observes the locked snapshot.
 */

use crate::errors::ServiceError;
use crate::metrics::{DB_TRANSACTIONS_ROLLED_BACK, DB_TRANSACTION_DURATION};
use sea_orm::{
    Condition, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, EntityName,
    EntityTrait, Iterable, PrimaryKeyToColumn, QueryFilter, QueryOrder, QuerySelect, Select,
    TransactionTrait,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

pub struct BookingTransaction {
    id: Uuid,
    txn: DatabaseTransaction,
    started: Instant,
}

impl BookingTransaction {
    /// Opens a new transaction on the pool.
    pub async fn begin(db: &DatabaseConnection) -> Result<Self, ServiceError> {
        Self::begin_with_lock_timeout(db, None).await
    }

    /// Opens a transaction whose row-lock waits give up after `lock_timeout`.
    /// The timeout is applied with `SET LOCAL` and therefore only on Postgres.
    pub async fn begin_with_lock_timeout(
        db: &DatabaseConnection,
        lock_timeout: Option<Duration>,
    ) -> Result<Self, ServiceError> {
        let id = Uuid::new_v4();
        let started = Instant::now();
        let txn = db.begin().await?;

        debug!(transaction_id = %id, "Starting booking transaction");

        if let Some(timeout) = lock_timeout {
            if txn.get_database_backend() == DbBackend::Postgres {
                txn.execute_unprepared(&format!(
                    "SET LOCAL lock_timeout = '{}ms'",
                    timeout.as_millis()
                ))
                .await?;
            }
        }

        Ok(Self { id, txn, started })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Connection to run statements inside this transaction.
    pub fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Locks the rows matching `condition` until commit or rollback.
    ///
    /// Rows are always locked in primary-key order so that two transactions
    /// locking overlapping sets cannot wait on each other in a cycle.
    pub async fn lock_rows_for_update<E>(
        &self,
        condition: Condition,
    ) -> Result<Vec<E::Model>, ServiceError>
    where
        E: EntityTrait,
    {
        let rows = locking_select::<E>(condition).all(&self.txn).await?;
        debug!(
            transaction_id = %self.id,
            entity = %E::default().table_name(),
            locked = rows.len(),
            "Locked rows for update"
        );
        Ok(rows)
    }

    pub async fn commit(self) -> Result<(), ServiceError> {
        let Self { id, txn, started } = self;
        match txn.commit().await {
            Ok(()) => {
                let elapsed = started.elapsed();
                DB_TRANSACTION_DURATION.observe(elapsed.as_secs_f64());
                debug!(transaction_id = %id, "Transaction committed in {:?}", elapsed);
                Ok(())
            }
            Err(e) => {
                DB_TRANSACTIONS_ROLLED_BACK.inc();
                warn!(transaction_id = %id, error = %e, "Commit failed after {:?}", started.elapsed());
                Err(ServiceError::DatabaseError(e))
            }
        }
    }

    pub async fn rollback(self) -> Result<(), ServiceError> {
        let Self { id, txn, started } = self;
        DB_TRANSACTIONS_ROLLED_BACK.inc();
        txn.rollback().await?;
        debug!(transaction_id = %id, "Transaction rolled back after {:?}", started.elapsed());
        Ok(())
    }
}

/// `SELECT ... WHERE condition ORDER BY pk FOR UPDATE`.
pub(crate) fn locking_select<E>(condition: Condition) -> Select<E>
where
    E: EntityTrait,
{
    let mut select = E::find().filter(condition);
    for key in E::PrimaryKey::iter() {
        select = select.order_by_asc(key.into_column());
    }
    select.lock_exclusive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{cafe_table, reservation, TableKind};
    use sea_orm::{ColumnTrait, QueryTrait};

    #[test]
    fn table_lock_is_for_update_in_primary_key_order() {
        let condition = Condition::all()
            .add(cafe_table::Column::CafeId.eq(Uuid::new_v4()))
            .add(cafe_table::Column::Kind.eq(TableKind::Bar.as_str()));

        let sql = locking_select::<cafe_table::Entity>(condition)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"WHERE "cafe_tables"."cafe_id" = "#), "{}", sql);
        assert!(sql.contains(r#"ORDER BY "cafe_tables"."id" ASC"#), "{}", sql);
        assert!(sql.ends_with("FOR UPDATE"), "{}", sql);
    }

    #[test]
    fn reservation_lock_is_for_update() {
        let condition = Condition::all().add(reservation::Column::Id.eq(Uuid::new_v4()));

        let sql = locking_select::<reservation::Entity>(condition)
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"ORDER BY "reservations"."id" ASC"#), "{}", sql);
        assert!(sql.ends_with("FOR UPDATE"), "{}", sql);
    }
}

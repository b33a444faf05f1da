use crate::{
    entities::{
        cafe::Entity as Cafe,
        cafe_table::{self, Entity as CafeTable, Model as CafeTableModel},
        reservation, table_assignment, ReservationStatus, TableKind,
    },
    errors::ServiceError,
    queries::Query,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    sea_query::{Expr, Query as SqlQuery, SelectStatement},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

/// Ids of tables held by a booked reservation of `cafe_id` on `date`.
fn booked_table_ids(cafe_id: Uuid, date: NaiveDate) -> SelectStatement {
    SqlQuery::select()
        .column((table_assignment::Entity, table_assignment::Column::TableId))
        .from(table_assignment::Entity)
        .inner_join(
            reservation::Entity,
            Expr::col((reservation::Entity, reservation::Column::Id))
                .equals((table_assignment::Entity, table_assignment::Column::ReservationId)),
        )
        .and_where(Expr::col((reservation::Entity, reservation::Column::CafeId)).eq(cafe_id))
        .and_where(Expr::col((reservation::Entity, reservation::Column::Date)).eq(date))
        .and_where(
            Expr::col((reservation::Entity, reservation::Column::Status))
                .eq(ReservationStatus::Booked.as_str()),
        )
        .to_owned()
}

/// Tables of `kind` in `cafe_id` without an active claim on `date`.
///
/// Simple tables come back by ascending capacity, the order the merge path
/// walks them in. Ties and bar tables are ordered by name then id so the
/// same snapshot always yields the same plan.
///
/// Inside a booking this must be called on the transaction connection after
/// the candidate rows have been locked.
pub async fn available_tables<C>(
    conn: &C,
    cafe_id: Uuid,
    date: NaiveDate,
    kind: TableKind,
) -> Result<Vec<CafeTableModel>, ServiceError>
where
    C: ConnectionTrait,
{
    let mut select = CafeTable::find()
        .filter(cafe_table::Column::CafeId.eq(cafe_id))
        .filter(cafe_table::Column::Kind.eq(kind.as_str()))
        .filter(cafe_table::Column::Id.not_in_subquery(booked_table_ids(cafe_id, date)));

    if kind == TableKind::Simple {
        select = select.order_by_asc(cafe_table::Column::Capacity);
    }

    let tables = select
        .order_by_asc(cafe_table::Column::Name)
        .order_by_asc(cafe_table::Column::Id)
        .all(conn)
        .await?;

    Ok(tables)
}

/// Free tables of one cafe for one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub cafe_id: Uuid,
    pub date: NaiveDate,
    pub bar_tables: Vec<CafeTableModel>,
    pub simple_tables: Vec<CafeTableModel>,
    pub free_seats: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetAvailabilityQuery {
    pub cafe_id: Uuid,
    pub date: NaiveDate,
}

#[async_trait]
impl Query for GetAvailabilityQuery {
    type Result = AvailabilityReport;

    #[instrument(skip(self, db_pool), fields(cafe_id = %self.cafe_id, date = %self.date))]
    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        Cafe::find_by_id(self.cafe_id)
            .one(db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cafe {} not found", self.cafe_id)))?;

        let bar_tables = available_tables(db_pool, self.cafe_id, self.date, TableKind::Bar).await?;
        let simple_tables =
            available_tables(db_pool, self.cafe_id, self.date, TableKind::Simple).await?;

        let free_seats = bar_tables
            .iter()
            .chain(simple_tables.iter())
            .map(|t| i64::from(t.capacity.max(0)))
            .sum();

        Ok(AvailabilityReport {
            cafe_id: self.cafe_id,
            date: self.date,
            bar_tables,
            simple_tables,
            free_seats,
        })
    }
}

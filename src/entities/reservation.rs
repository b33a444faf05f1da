use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{entity::prelude::*, ActiveValue, Set};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status for table reservations.
///
/// The only transition is `Booked -> Cancelled`; re-booking creates a new row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Booked,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Booked => "booked",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "booked" => Some(ReservationStatus::Booked),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cafe_id: Uuid,
    pub date: NaiveDate,
    pub name: String,
    pub number: String,
    pub status: String, // Storing as string in DB, see ReservationStatus
    pub payment_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_active(&self) -> bool {
        ReservationStatus::from_str(&self.status) == Some(ReservationStatus::Booked)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cafe::Entity",
        from = "Column::CafeId",
        to = "super::cafe::Column::Id",
        on_delete = "Cascade"
    )]
    Cafe,
    #[sea_orm(has_many = "super::table_assignment::Entity")]
    TableAssignments,
    #[sea_orm(has_many = "super::order_set::Entity")]
    OrderSets,
}

impl Related<super::cafe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cafe.def()
    }
}

impl Related<super::table_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TableAssignments.def()
    }
}

impl Related<super::order_set::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderSets.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);

            // Generate UUID if not set
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
        }

        active_model.updated_at = Set(Some(now));

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_status_conversion() {
        assert_eq!(ReservationStatus::Booked.as_str(), "booked");
        assert_eq!(ReservationStatus::Cancelled.as_str(), "cancelled");
        assert_eq!(
            ReservationStatus::from_str("cancelled"),
            Some(ReservationStatus::Cancelled)
        );
        assert_eq!(ReservationStatus::from_str("paid"), None);
    }
}

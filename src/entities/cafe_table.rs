use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{entity::prelude::*, ActiveValue, Set};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Matching rule of a physical table.
///
/// Bar tables are only ever handed out whole to single guests. Simple tables
/// seat up to their capacity and can be merged for larger parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Bar,
    Simple,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Bar => "bar",
            TableKind::Simple => "simple",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bar" => Some(TableKind::Bar),
            "simple" => Some(TableKind::Simple),
            _ => None,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cafe_tables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cafe_id: Uuid,
    pub name: String,
    pub kind: String, // "bar" | "simple", see TableKind
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Parsed table kind. Unknown values are treated as simple tables.
    pub fn table_kind(&self) -> TableKind {
        TableKind::from_str(&self.kind).unwrap_or(TableKind::Simple)
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
    Assignments,
}

impl Related<super::cafe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cafe.def()
    }
}

impl Related<super::table_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            active_model.created_at = Set(Utc::now());
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
        }

        Ok(active_model)
    }
}

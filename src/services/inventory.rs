use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    cafe::{self, Entity as Cafe},
    cafe_table::{self, Entity as CafeTable},
    menu_set::{self, Entity as MenuSet},
    TableKind,
};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCafeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub address: String,
    #[validate(length(min = 1, max = 15))]
    pub number: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCafeRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 15))]
    pub number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddTableRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub kind: TableKind,
    #[validate(range(min = 1, max = 100, message = "Capacity must be between 1 and 100"))]
    pub capacity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMenuSetRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Administration of cafes, their tables and the menu sets guests can order.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DatabaseConnection>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request))]
    pub async fn create_cafe(&self, request: CreateCafeRequest) -> Result<cafe::Model, ServiceError> {
        request.validate()?;

        let created = cafe::ActiveModel {
            name: Set(request.name),
            address: Set(request.address),
            number: Set(request.number),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(cafe_id = %created.id, "Cafe created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update_cafe(
        &self,
        id: Uuid,
        request: UpdateCafeRequest,
    ) -> Result<cafe::Model, ServiceError> {
        request.validate()?;

        let mut active: cafe::ActiveModel = self.get_cafe(id).await?.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(address) = request.address {
            active.address = Set(address);
        }
        if let Some(number) = request.number {
            active.number = Set(number);
        }

        Ok(active.update(&*self.db_pool).await?)
    }

    /// Deletes a cafe together with its tables and reservations.
    #[instrument(skip(self))]
    pub async fn delete_cafe(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get_cafe(id).await?;
        existing.delete(&*self.db_pool).await?;
        info!(cafe_id = %id, "Cafe deleted");
        Ok(())
    }

    pub async fn list_cafes(&self) -> Result<Vec<cafe::Model>, ServiceError> {
        Ok(Cafe::find()
            .order_by_asc(cafe::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    pub async fn get_cafe(&self, id: Uuid) -> Result<cafe::Model, ServiceError> {
        Cafe::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cafe {} not found", id)))
    }

    #[instrument(skip(self, request))]
    pub async fn add_table(
        &self,
        cafe_id: Uuid,
        request: AddTableRequest,
    ) -> Result<cafe_table::Model, ServiceError> {
        request.validate()?;
        self.get_cafe(cafe_id).await?;

        let table = cafe_table::ActiveModel {
            cafe_id: Set(cafe_id),
            name: Set(request.name),
            kind: Set(request.kind.as_str().to_string()),
            capacity: Set(request.capacity),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(cafe_id = %cafe_id, table_id = %table.id, kind = %request.kind, "Table added");
        Ok(table)
    }

    pub async fn list_tables(&self, cafe_id: Uuid) -> Result<Vec<cafe_table::Model>, ServiceError> {
        self.get_cafe(cafe_id).await?;

        Ok(CafeTable::find()
            .filter(cafe_table::Column::CafeId.eq(cafe_id))
            .order_by_asc(cafe_table::Column::Kind)
            .order_by_asc(cafe_table::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }

    #[instrument(skip(self, request))]
    pub async fn create_menu_set(
        &self,
        request: CreateMenuSetRequest,
    ) -> Result<menu_set::Model, ServiceError> {
        request.validate()?;

        Ok(menu_set::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&*self.db_pool)
        .await?)
    }

    pub async fn list_menu_sets(&self) -> Result<Vec<menu_set::Model>, ServiceError> {
        Ok(MenuSet::find()
            .order_by_asc(menu_set::Column::Name)
            .all(&*self.db_pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_capacity_must_be_positive() {
        let request = AddTableRequest {
            name: "Window".into(),
            kind: TableKind::Simple,
            capacity: 0,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("capacity"));
    }

    #[test]
    fn cafe_number_is_limited_to_fifteen_chars() {
        let request = CreateCafeRequest {
            name: "Corner".into(),
            address: "1 Main St".into(),
            number: "+1 555 0100 0000 0".into(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateCafeRequest::default().validate().is_ok());
    }

    #[test]
    fn table_kind_deserializes_lowercase() {
        let request: AddTableRequest = serde_json::from_value(serde_json::json!({
            "name": "Bar 1",
            "kind": "bar",
            "capacity": 1
        }))
        .unwrap();
        assert_eq!(request.kind, TableKind::Bar);
    }
}

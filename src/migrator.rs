use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20231105_000001_create_cafes_table::Migration),
            Box::new(m20231105_000002_create_cafe_tables_table::Migration),
            Box::new(m20231105_000003_create_menu_sets_table::Migration),
            Box::new(m20231105_000004_create_reservations_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20231105_000001_create_cafes_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20231105_000001_create_cafes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Cafes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Cafes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Cafes::Name).string_len(100).not_null())
                        .col(ColumnDef::new(Cafes::Address).string_len(200).not_null())
                        .col(ColumnDef::new(Cafes::Number).string_len(15).not_null())
                        .col(
                            ColumnDef::new(Cafes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Cafes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Cafes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Cafes {
        Table,
        Id,
        Name,
        Address,
        Number,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20231105_000002_create_cafe_tables_table {

    use super::m20231105_000001_create_cafes_table::Cafes;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20231105_000002_create_cafe_tables_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CafeTables::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CafeTables::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CafeTables::CafeId).uuid().not_null())
                        .col(ColumnDef::new(CafeTables::Name).string_len(100).not_null())
                        .col(
                            ColumnDef::new(CafeTables::Kind)
                                .string_len(20)
                                .not_null()
                                .default("simple"),
                        )
                        .col(ColumnDef::new(CafeTables::Capacity).integer().not_null())
                        .col(
                            ColumnDef::new(CafeTables::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_cafe_tables_cafe_id")
                                .from(CafeTables::Table, CafeTables::CafeId)
                                .to(Cafes::Table, Cafes::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cafe_tables_cafe_kind")
                        .table(CafeTables::Table)
                        .col(CafeTables::CafeId)
                        .col(CafeTables::Kind)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CafeTables::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum CafeTables {
        Table,
        Id,
        CafeId,
        Name,
        Kind,
        Capacity,
        CreatedAt,
    }
}

mod m20231105_000003_create_menu_sets_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20231105_000003_create_menu_sets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MenuSets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(MenuSets::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(MenuSets::Name).string_len(100).not_null())
                        .col(ColumnDef::new(MenuSets::Description).text().null())
                        .col(
                            ColumnDef::new(MenuSets::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MenuSets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum MenuSets {
        Table,
        Id,
        Name,
        Description,
        CreatedAt,
    }
}

mod m20231105_000004_create_reservations_tables {

    use super::m20231105_000001_create_cafes_table::Cafes;
    use super::m20231105_000002_create_cafe_tables_table::CafeTables;
    use super::m20231105_000003_create_menu_sets_table::MenuSets;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20231105_000004_create_reservations_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reservations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Reservations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Reservations::CafeId).uuid().not_null())
                        .col(ColumnDef::new(Reservations::Date).date().not_null())
                        .col(ColumnDef::new(Reservations::Name).string_len(100).not_null())
                        .col(ColumnDef::new(Reservations::Number).string_len(15).not_null())
                        .col(
                            ColumnDef::new(Reservations::Status)
                                .string_len(20)
                                .not_null()
                                .default("booked"),
                        )
                        .col(
                            ColumnDef::new(Reservations::PaymentStatus)
                                .string_len(50)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Reservations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Reservations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reservations_cafe_id")
                                .from(Reservations::Table, Reservations::CafeId)
                                .to(Cafes::Table, Cafes::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reservations_cafe_date_status")
                        .table(Reservations::Table)
                        .col(Reservations::CafeId)
                        .col(Reservations::Date)
                        .col(Reservations::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TableAssignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TableAssignments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TableAssignments::ReservationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TableAssignments::TableId).uuid().not_null())
                        .col(
                            ColumnDef::new(TableAssignments::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_table_assignments_reservation_id")
                                .from(TableAssignments::Table, TableAssignments::ReservationId)
                                .to(Reservations::Table, Reservations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_table_assignments_table_id")
                                .from(TableAssignments::Table, TableAssignments::TableId)
                                .to(CafeTables::Table, CafeTables::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_table_assignments_table_id")
                        .table(TableAssignments::Table)
                        .col(TableAssignments::TableId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_table_assignments_reservation_id")
                        .table(TableAssignments::Table)
                        .col(TableAssignments::ReservationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderSets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderSets::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(OrderSets::ReservationId).uuid().not_null())
                        .col(ColumnDef::new(OrderSets::SetId).uuid().not_null())
                        .col(ColumnDef::new(OrderSets::Quantity).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_sets_reservation_id")
                                .from(OrderSets::Table, OrderSets::ReservationId)
                                .to(Reservations::Table, Reservations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_sets_set_id")
                                .from(OrderSets::Table, OrderSets::SetId)
                                .to(MenuSets::Table, MenuSets::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderSets::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TableAssignments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Reservations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Reservations {
        Table,
        Id,
        CafeId,
        Date,
        Name,
        Number,
        Status,
        PaymentStatus,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum TableAssignments {
        Table,
        Id,
        ReservationId,
        TableId,
        Quantity,
    }

    #[derive(DeriveIden)]
    enum OrderSets {
        Table,
        Id,
        ReservationId,
        SetId,
        Quantity,
    }
}

//! Database migrations for the POS service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_tenancy::Migration),
            Box::new(m20250301_000002_create_catalog::Migration),
            Box::new(m20250301_000003_create_documents::Migration),
            Box::new(m20250301_000004_create_stock_opname::Migration),
        ]
    }
}

fn uuid_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn money_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).decimal_len(16, 2).not_null().to_owned()
}

fn timestamp_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

mod m20250301_000001_create_tenancy {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_tenancy"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tenants::Table)
                        .if_not_exists()
                        .col(uuid_col(Tenants::Id).primary_key())
                        .col(ColumnDef::new(Tenants::Name).string().not_null())
                        .col(timestamp_col(Tenants::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Stores::Table)
                        .if_not_exists()
                        .col(uuid_col(Stores::Id).primary_key())
                        .col(uuid_col(Stores::TenantId))
                        .col(ColumnDef::new(Stores::Name).string().not_null())
                        .col(ColumnDef::new(Stores::Address).string())
                        .col(timestamp_col(Stores::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stores_tenant")
                                .from(Stores::Table, Stores::TenantId)
                                .to(Tenants::Table, Tenants::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stores_tenant_id")
                        .table(Stores::Table)
                        .col(Stores::TenantId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SystemConfig::Table)
                        .if_not_exists()
                        .col(uuid_col(SystemConfig::TenantId))
                        .col(ColumnDef::new(SystemConfig::Key).string().not_null())
                        .col(ColumnDef::new(SystemConfig::Value).json().not_null())
                        .col(timestamp_col(SystemConfig::UpdatedAt))
                        .primary_key(
                            Index::create()
                                .col(SystemConfig::TenantId)
                                .col(SystemConfig::Key),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_system_config_tenant")
                                .from(SystemConfig::Table, SystemConfig::TenantId)
                                .to(Tenants::Table, Tenants::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AuditLog::Table)
                        .if_not_exists()
                        .col(uuid_col(AuditLog::Id).primary_key())
                        .col(uuid_col(AuditLog::TenantId))
                        .col(ColumnDef::new(AuditLog::StoreId).uuid())
                        .col(ColumnDef::new(AuditLog::Actor).string())
                        .col(ColumnDef::new(AuditLog::Action).string().not_null())
                        .col(ColumnDef::new(AuditLog::Entity).string().not_null())
                        .col(uuid_col(AuditLog::EntityId))
                        .col(ColumnDef::new(AuditLog::Detail).json().not_null())
                        .col(timestamp_col(AuditLog::At))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_audit_log_tenant_at")
                        .table(AuditLog::Table)
                        .col(AuditLog::TenantId)
                        .col(AuditLog::At)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AuditLog::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SystemConfig::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Stores::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tenants::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000002_create_catalog {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_catalog"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductGroups::Table)
                        .if_not_exists()
                        .col(uuid_col(ProductGroups::Id).primary_key())
                        .col(uuid_col(ProductGroups::TenantId))
                        .col(ColumnDef::new(ProductGroups::Kind).string().not_null())
                        .col(ColumnDef::new(ProductGroups::Name).string().not_null())
                        .col(timestamp_col(ProductGroups::CreatedAt))
                        .col(timestamp_col(ProductGroups::UpdatedAt))
                        .col(ColumnDef::new(ProductGroups::DeletedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_groups_tenant")
                                .from(ProductGroups::Table, ProductGroups::TenantId)
                                .to(Tenants::Table, Tenants::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_product_groups_tenant_kind")
                        .table(ProductGroups::Table)
                        .col(ProductGroups::TenantId)
                        .col(ProductGroups::Kind)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(uuid_col(Products::Id).primary_key())
                        .col(uuid_col(Products::TenantId))
                        .col(ColumnDef::new(Products::StoreId).uuid())
                        .col(ColumnDef::new(Products::Sku).string().not_null())
                        .col(ColumnDef::new(Products::Barcode).string())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::CategoryId).uuid())
                        .col(ColumnDef::new(Products::BrandId).uuid())
                        .col(ColumnDef::new(Products::Unit).string().not_null())
                        .col(money_col(Products::CostPrice))
                        .col(money_col(Products::SellPrice))
                        .col(
                            ColumnDef::new(Products::OpeningStock)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::MinStock)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(timestamp_col(Products::CreatedAt))
                        .col(timestamp_col(Products::UpdatedAt))
                        .col(ColumnDef::new(Products::DeletedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_tenant")
                                .from(Products::Table, Products::TenantId)
                                .to(Tenants::Table, Tenants::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_store")
                                .from(Products::Table, Products::StoreId)
                                .to(Stores::Table, Stores::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_category")
                                .from(Products::Table, Products::CategoryId)
                                .to(ProductGroups::Table, ProductGroups::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_products_brand")
                                .from(Products::Table, Products::BrandId)
                                .to(ProductGroups::Table, ProductGroups::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            // SKUs are only unique among live products, enforced by the service
            manager
                .create_index(
                    Index::create()
                        .name("idx_products_tenant_sku")
                        .table(Products::Table)
                        .col(Products::TenantId)
                        .col(Products::Sku)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Parties::Table)
                        .if_not_exists()
                        .col(uuid_col(Parties::Id).primary_key())
                        .col(uuid_col(Parties::TenantId))
                        .col(ColumnDef::new(Parties::Kind).string().not_null())
                        .col(ColumnDef::new(Parties::Name).string().not_null())
                        .col(ColumnDef::new(Parties::Phone).string())
                        .col(ColumnDef::new(Parties::Email).string())
                        .col(ColumnDef::new(Parties::Address).string())
                        .col(timestamp_col(Parties::CreatedAt))
                        .col(timestamp_col(Parties::UpdatedAt))
                        .col(ColumnDef::new(Parties::DeletedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parties_tenant")
                                .from(Parties::Table, Parties::TenantId)
                                .to(Tenants::Table, Tenants::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_parties_tenant_kind")
                        .table(Parties::Table)
                        .col(Parties::TenantId)
                        .col(Parties::Kind)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Promos::Table)
                        .if_not_exists()
                        .col(uuid_col(Promos::Id).primary_key())
                        .col(uuid_col(Promos::TenantId))
                        .col(ColumnDef::new(Promos::Code).string().not_null())
                        .col(ColumnDef::new(Promos::Name).string().not_null())
                        .col(
                            ColumnDef::new(Promos::PercentOff)
                                .decimal_len(5, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Promos::MaxDiscount).decimal_len(16, 2))
                        .col(money_col(Promos::MinPurchase))
                        .col(timestamp_col(Promos::StartsAt))
                        .col(ColumnDef::new(Promos::EndsAt).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(Promos::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(timestamp_col(Promos::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_promos_tenant")
                                .from(Promos::Table, Promos::TenantId)
                                .to(Tenants::Table, Tenants::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("uq_promos_tenant_code")
                        .table(Promos::Table)
                        .col(Promos::TenantId)
                        .col(Promos::Code)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Promos::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Parties::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductGroups::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000003_create_documents {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_documents"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(uuid_col(Sales::Id).primary_key())
                        .col(uuid_col(Sales::TenantId))
                        .col(uuid_col(Sales::StoreId))
                        .col(ColumnDef::new(Sales::Number).string().not_null())
                        .col(ColumnDef::new(Sales::CustomerId).uuid())
                        .col(ColumnDef::new(Sales::PromoId).uuid())
                        .col(money_col(Sales::Subtotal))
                        .col(money_col(Sales::PromoDiscount))
                        .col(money_col(Sales::Tax))
                        .col(money_col(Sales::Total))
                        .col(money_col(Sales::Paid))
                        .col(money_col(Sales::Change))
                        .col(ColumnDef::new(Sales::PaymentMethod).string().not_null())
                        .col(ColumnDef::new(Sales::Status).string().not_null())
                        .col(ColumnDef::new(Sales::Note).string())
                        .col(ColumnDef::new(Sales::Actor).string())
                        .col(timestamp_col(Sales::OccurredAt))
                        .col(ColumnDef::new(Sales::VoidedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sales_store")
                                .from(Sales::Table, Sales::StoreId)
                                .to(Stores::Table, Stores::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("uq_sales_tenant_number")
                        .table(Sales::Table)
                        .col(Sales::TenantId)
                        .col(Sales::Number)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_store_occurred_at")
                        .table(Sales::Table)
                        .col(Sales::StoreId)
                        .col(Sales::OccurredAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SaleItems::Table)
                        .if_not_exists()
                        .col(uuid_col(SaleItems::Id).primary_key())
                        .col(uuid_col(SaleItems::SaleId))
                        .col(ColumnDef::new(SaleItems::Position).integer().not_null())
                        .col(uuid_col(SaleItems::ProductId))
                        .col(ColumnDef::new(SaleItems::Quantity).big_integer().not_null())
                        .col(money_col(SaleItems::UnitPrice))
                        .col(money_col(SaleItems::Discount))
                        .col(money_col(SaleItems::Subtotal))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sale_items_sale")
                                .from(SaleItems::Table, SaleItems::SaleId)
                                .to(Sales::Table, Sales::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sale_items_product")
                                .from(SaleItems::Table, SaleItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Purchases::Table)
                        .if_not_exists()
                        .col(uuid_col(Purchases::Id).primary_key())
                        .col(uuid_col(Purchases::TenantId))
                        .col(uuid_col(Purchases::StoreId))
                        .col(ColumnDef::new(Purchases::Number).string().not_null())
                        .col(uuid_col(Purchases::SupplierId))
                        .col(money_col(Purchases::Total))
                        .col(ColumnDef::new(Purchases::Status).string().not_null())
                        .col(ColumnDef::new(Purchases::Note).string())
                        .col(ColumnDef::new(Purchases::Actor).string())
                        .col(timestamp_col(Purchases::OccurredAt))
                        .col(ColumnDef::new(Purchases::VoidedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchases_store")
                                .from(Purchases::Table, Purchases::StoreId)
                                .to(Stores::Table, Stores::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchases_supplier")
                                .from(Purchases::Table, Purchases::SupplierId)
                                .to(Parties::Table, Parties::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("uq_purchases_tenant_number")
                        .table(Purchases::Table)
                        .col(Purchases::TenantId)
                        .col(Purchases::Number)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseItems::Table)
                        .if_not_exists()
                        .col(uuid_col(PurchaseItems::Id).primary_key())
                        .col(uuid_col(PurchaseItems::PurchaseId))
                        .col(ColumnDef::new(PurchaseItems::Position).integer().not_null())
                        .col(uuid_col(PurchaseItems::ProductId))
                        .col(
                            ColumnDef::new(PurchaseItems::Quantity)
                                .big_integer()
                                .not_null(),
                        )
                        .col(money_col(PurchaseItems::UnitCost))
                        .col(money_col(PurchaseItems::Subtotal))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_items_purchase")
                                .from(PurchaseItems::Table, PurchaseItems::PurchaseId)
                                .to(Purchases::Table, Purchases::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_items_product")
                                .from(PurchaseItems::Table, PurchaseItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Returns::Table)
                        .if_not_exists()
                        .col(uuid_col(Returns::Id).primary_key())
                        .col(uuid_col(Returns::TenantId))
                        .col(uuid_col(Returns::StoreId))
                        .col(ColumnDef::new(Returns::Kind).string().not_null())
                        .col(uuid_col(Returns::SourceId))
                        .col(ColumnDef::new(Returns::Number).string().not_null())
                        .col(money_col(Returns::Total))
                        .col(ColumnDef::new(Returns::Reason).string())
                        .col(ColumnDef::new(Returns::Actor).string())
                        .col(timestamp_col(Returns::OccurredAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_returns_store")
                                .from(Returns::Table, Returns::StoreId)
                                .to(Stores::Table, Stores::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_returns_source_id")
                        .table(Returns::Table)
                        .col(Returns::SourceId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("uq_returns_tenant_number")
                        .table(Returns::Table)
                        .col(Returns::TenantId)
                        .col(Returns::Number)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReturnItems::Table)
                        .if_not_exists()
                        .col(uuid_col(ReturnItems::Id).primary_key())
                        .col(uuid_col(ReturnItems::ReturnId))
                        .col(ColumnDef::new(ReturnItems::Position).integer().not_null())
                        .col(uuid_col(ReturnItems::ProductId))
                        .col(ColumnDef::new(ReturnItems::Quantity).big_integer().not_null())
                        .col(money_col(ReturnItems::UnitAmount))
                        .col(money_col(ReturnItems::Subtotal))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_return_items_return")
                                .from(ReturnItems::Table, ReturnItems::ReturnId)
                                .to(Returns::Table, Returns::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_return_items_product")
                                .from(ReturnItems::Table, ReturnItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReturnItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Returns::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Purchases::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SaleItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await
        }
    }
}

mod m20250301_000004_create_stock_opname {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_stock_opname"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockOpnames::Table)
                        .if_not_exists()
                        .col(uuid_col(StockOpnames::Id).primary_key())
                        .col(uuid_col(StockOpnames::TenantId))
                        .col(uuid_col(StockOpnames::StoreId))
                        .col(ColumnDef::new(StockOpnames::Number).string().not_null())
                        .col(ColumnDef::new(StockOpnames::Status).string().not_null())
                        .col(ColumnDef::new(StockOpnames::Note).string())
                        .col(ColumnDef::new(StockOpnames::Actor).string())
                        .col(timestamp_col(StockOpnames::CreatedAt))
                        .col(ColumnDef::new(StockOpnames::CountedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_opnames_store")
                                .from(StockOpnames::Table, StockOpnames::StoreId)
                                .to(Stores::Table, Stores::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_opnames_store_status")
                        .table(StockOpnames::Table)
                        .col(StockOpnames::StoreId)
                        .col(StockOpnames::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockOpnameItems::Table)
                        .if_not_exists()
                        .col(uuid_col(StockOpnameItems::OpnameId))
                        .col(uuid_col(StockOpnameItems::ProductId))
                        .col(
                            ColumnDef::new(StockOpnameItems::Position)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockOpnameItems::Counted)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockOpnameItems::System).big_integer())
                        .col(ColumnDef::new(StockOpnameItems::Difference).big_integer())
                        .primary_key(
                            Index::create()
                                .col(StockOpnameItems::OpnameId)
                                .col(StockOpnameItems::ProductId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_opname_items_opname")
                                .from(StockOpnameItems::Table, StockOpnameItems::OpnameId)
                                .to(StockOpnames::Table, StockOpnames::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_opname_items_product")
                                .from(StockOpnameItems::Table, StockOpnameItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockOpnameItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockOpnames::Table).to_owned())
                .await
        }
    }
}

#[derive(DeriveIden)]
enum Tenants {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Stores {
    Table,
    Id,
    TenantId,
    Name,
    Address,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SystemConfig {
    Table,
    TenantId,
    Key,
    Value,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AuditLog {
    Table,
    Id,
    TenantId,
    StoreId,
    Actor,
    Action,
    Entity,
    EntityId,
    Detail,
    At,
}

#[derive(DeriveIden)]
enum ProductGroups {
    Table,
    Id,
    TenantId,
    Kind,
    Name,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    TenantId,
    StoreId,
    Sku,
    Barcode,
    Name,
    CategoryId,
    BrandId,
    Unit,
    CostPrice,
    SellPrice,
    OpeningStock,
    MinStock,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Parties {
    Table,
    Id,
    TenantId,
    Kind,
    Name,
    Phone,
    Email,
    Address,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Promos {
    Table,
    Id,
    TenantId,
    Code,
    Name,
    PercentOff,
    MaxDiscount,
    MinPurchase,
    StartsAt,
    EndsAt,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Sales {
    Table,
    Id,
    TenantId,
    StoreId,
    Number,
    CustomerId,
    PromoId,
    Subtotal,
    PromoDiscount,
    Tax,
    Total,
    Paid,
    Change,
    PaymentMethod,
    Status,
    Note,
    Actor,
    OccurredAt,
    VoidedAt,
}

#[derive(DeriveIden)]
enum SaleItems {
    Table,
    Id,
    SaleId,
    Position,
    ProductId,
    Quantity,
    UnitPrice,
    Discount,
    Subtotal,
}

#[derive(DeriveIden)]
enum Purchases {
    Table,
    Id,
    TenantId,
    StoreId,
    Number,
    SupplierId,
    Total,
    Status,
    Note,
    Actor,
    OccurredAt,
    VoidedAt,
}

#[derive(DeriveIden)]
enum PurchaseItems {
    Table,
    Id,
    PurchaseId,
    Position,
    ProductId,
    Quantity,
    UnitCost,
    Subtotal,
}

#[derive(DeriveIden)]
enum Returns {
    Table,
    Id,
    TenantId,
    StoreId,
    Kind,
    SourceId,
    Number,
    Total,
    Reason,
    Actor,
    OccurredAt,
}

#[derive(DeriveIden)]
enum ReturnItems {
    Table,
    Id,
    ReturnId,
    Position,
    ProductId,
    Quantity,
    UnitAmount,
    Subtotal,
}

#[derive(DeriveIden)]
enum StockOpnames {
    Table,
    Id,
    TenantId,
    StoreId,
    Number,
    Status,
    Note,
    Actor,
    CreatedAt,
    CountedAt,
}

#[derive(DeriveIden)]
enum StockOpnameItems {
    Table,
    OpnameId,
    ProductId,
    Position,
    Counted,
    System,
    Difference,
}

//! SeaORM entities for database tables
//!
//! Enum-valued columns are stored as their lowercase string form and parsed
//! back in `mapper`. Money columns are `NUMERIC(16, 2)`.

pub mod tenant {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "tenants")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::store::Entity")]
        Stores,
    }

    impl Related<super::store::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Stores.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod store {
    use sea_orm::entity::prelude::*;

    /// Physical shop of a tenant
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "stores")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub name: String,
        pub address: Option<String>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::tenant::Entity",
            from = "Column::TenantId",
            to = "super::tenant::Column::Id"
        )]
        Tenant,
    }

    impl Related<super::tenant::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Tenant.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod product_group {
    use sea_orm::entity::prelude::*;

    /// Categories and brands, distinguished by `kind`
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "product_groups")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub kind: String,
        pub name: String,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod product {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        /// Home store; NULL means every store
        pub store_id: Option<Uuid>,
        pub sku: String,
        pub barcode: Option<String>,
        pub name: String,
        pub category_id: Option<Uuid>,
        pub brand_id: Option<Uuid>,
        pub unit: String,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub cost_price: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub sell_price: Decimal,
        pub opening_stock: i64,
        pub min_stock: i64,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod party {
    use sea_orm::entity::prelude::*;

    /// Customers and suppliers, distinguished by `kind`
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "parties")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub kind: String,
        pub name: String,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub address: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod promo {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "promos")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub code: String,
        pub name: String,
        #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
        pub percent_off: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))", nullable)]
        pub max_discount: Option<Decimal>,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub min_purchase: Decimal,
        pub starts_at: DateTimeUtc,
        pub ends_at: Option<DateTimeUtc>,
        pub active: bool,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod sale {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "sales")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub store_id: Uuid,
        pub number: String,
        pub customer_id: Option<Uuid>,
        pub promo_id: Option<Uuid>,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub subtotal: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub promo_discount: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub tax: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub total: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub paid: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub change: Decimal,
        pub payment_method: String,
        pub status: String,
        pub note: Option<String>,
        pub actor: Option<String>,
        pub occurred_at: DateTimeUtc,
        pub voided_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::sale_item::Entity")]
        Items,
    }

    impl Related<super::sale_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Items.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod sale_item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "sale_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub sale_id: Uuid,
        /// Line order within the sale
        pub position: i32,
        pub product_id: Uuid,
        pub quantity: i64,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub unit_price: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub discount: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub subtotal: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::sale::Entity",
            from = "Column::SaleId",
            to = "super::sale::Column::Id"
        )]
        Sale,
    }

    impl Related<super::sale::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Sale.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod purchase {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "purchases")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub store_id: Uuid,
        pub number: String,
        pub supplier_id: Uuid,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub total: Decimal,
        pub status: String,
        pub note: Option<String>,
        pub actor: Option<String>,
        pub occurred_at: DateTimeUtc,
        pub voided_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::purchase_item::Entity")]
        Items,
    }

    impl Related<super::purchase_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Items.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod purchase_item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "purchase_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub purchase_id: Uuid,
        pub position: i32,
        pub product_id: Uuid,
        pub quantity: i64,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub unit_cost: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub subtotal: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::purchase::Entity",
            from = "Column::PurchaseId",
            to = "super::purchase::Column::Id"
        )]
        Purchase,
    }

    impl Related<super::purchase::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Purchase.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod return_doc {
    use sea_orm::entity::prelude::*;

    /// Sales and purchase returns, distinguished by `kind`
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "returns")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub store_id: Uuid,
        pub kind: String,
        /// Sale or purchase being reversed
        pub source_id: Uuid,
        pub number: String,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub total: Decimal,
        pub reason: Option<String>,
        pub actor: Option<String>,
        pub occurred_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::return_item::Entity")]
        Items,
    }

    impl Related<super::return_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Items.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod return_item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "return_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub return_id: Uuid,
        pub position: i32,
        pub product_id: Uuid,
        pub quantity: i64,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub unit_amount: Decimal,
        #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
        pub subtotal: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::return_doc::Entity",
            from = "Column::ReturnId",
            to = "super::return_doc::Column::Id"
        )]
        Return,
    }

    impl Related<super::return_doc::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Return.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod stock_opname {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "stock_opnames")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub store_id: Uuid,
        pub number: String,
        pub status: String,
        pub note: Option<String>,
        pub actor: Option<String>,
        pub created_at: DateTimeUtc,
        pub counted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::stock_opname_item::Entity")]
        Items,
    }

    impl Related<super::stock_opname_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Items.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod stock_opname_item {
    use sea_orm::entity::prelude::*;

    /// One counted product; a product appears at most once per opname
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "stock_opname_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub opname_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub product_id: Uuid,
        pub position: i32,
        pub counted: i64,
        pub system: Option<i64>,
        pub difference: Option<i64>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::stock_opname::Entity",
            from = "Column::OpnameId",
            to = "super::stock_opname::Column::Id"
        )]
        Opname,
    }

    impl Related<super::stock_opname::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Opname.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod audit_log {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "audit_log")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub store_id: Option<Uuid>,
        pub actor: Option<String>,
        pub action: String,
        pub entity: String,
        pub entity_id: Uuid,
        pub detail: Json,
        pub at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod system_config {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "system_config")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub tenant_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub key: String,
        pub value: Json,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

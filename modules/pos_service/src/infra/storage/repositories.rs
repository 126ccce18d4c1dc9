//! SeaORM repository implementations

use crate::contract::model::*;
use crate::domain::repository::{
    AuditRepository, CatalogRepository, ConfigRepository, LedgerRepository, PartyRepository,
    PromoRepository, TenantRepository,
};
use crate::domain::service::Repositories;
use crate::domain::stock::{LedgerProduct, StockLedger};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, LoaderTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::entity;
use super::mapper;

/// All repositories over one connection
pub fn repositories(db: Arc<DatabaseConnection>) -> Repositories {
    Repositories {
        tenants: Arc::new(SeaOrmTenantRepository::new(db.clone())),
        catalog: Arc::new(SeaOrmCatalogRepository::new(db.clone())),
        parties: Arc::new(SeaOrmPartyRepository::new(db.clone())),
        promos: Arc::new(SeaOrmPromoRepository::new(db.clone())),
        ledger: Arc::new(SeaOrmLedgerRepository::new(db.clone())),
        audit: Arc::new(SeaOrmAuditRepository::new(db.clone())),
        config: Arc::new(SeaOrmConfigRepository::new(db)),
    }
}

/// Largest LIMIT every backend accepts (SQLite integers are signed)
const MAX_LIMIT: u64 = i64::MAX as u64;

/// Apply offset pagination; `Page::all()` emits neither LIMIT nor OFFSET
///
/// SQLite rejects an OFFSET without a LIMIT, so an offset always comes with one.
fn paginate<E: EntityTrait>(query: Select<E>, page: Page) -> Select<E> {
    let limit = page.limit.min(MAX_LIMIT);
    match (limit, page.offset) {
        (MAX_LIMIT, 0) => query,
        (limit, 0) => query.limit(limit),
        (limit, offset) => query.limit(limit).offset(offset),
    }
}

/// Case-insensitive substring match on a text column
fn contains_ci<C: ColumnTrait>(column: C, needle: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", needle.to_lowercase()))
}

/// Half-open `[start of day, start of next day)` in UTC
fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

// ===== Tenants =====

pub struct SeaOrmTenantRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTenantRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TenantRepository for SeaOrmTenantRepository {
    async fn create_tenant(&self, tenant: &Tenant) -> Result<Tenant> {
        let active: entity::tenant::ActiveModel = tenant.into();
        Ok(active.insert(&*self.db).await?.into())
    }

    async fn find_tenant(&self, id: Uuid) -> Result<Option<Tenant>> {
        let result = entity::tenant::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn create_store(&self, store: &Store) -> Result<Store> {
        let active: entity::store::ActiveModel = store.into();
        Ok(active.insert(&*self.db).await?.into())
    }

    async fn find_store(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Store>> {
        let result = entity::store::Entity::find_by_id(id)
            .filter(entity::store::Column::TenantId.eq(tenant_id))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_stores(&self, tenant_id: Uuid) -> Result<Vec<Store>> {
        let results = entity::store::Entity::find()
            .filter(entity::store::Column::TenantId.eq(tenant_id))
            .order_by_asc(entity::store::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }
}

// ===== Catalog =====

pub struct SeaOrmCatalogRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn save_product(&self, product: &Product) -> Result<Product> {
        let existing = entity::product::Entity::find_by_id(product.id)
            .one(&*self.db)
            .await?;

        let active: entity::product::ActiveModel = product.into();
        let saved = if existing.is_some() {
            active.update(&*self.db).await?
        } else {
            active.insert(&*self.db).await?
        };
        Ok(saved.into())
    }

    async fn find_product(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Product>> {
        let result = entity::product::Entity::find_by_id(id)
            .filter(entity::product::Column::TenantId.eq(tenant_id))
            .filter(entity::product::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn find_product_by_sku(&self, tenant_id: Uuid, sku: &str) -> Result<Option<Product>> {
        let result = entity::product::Entity::find()
            .filter(entity::product::Column::TenantId.eq(tenant_id))
            .filter(entity::product::Column::Sku.eq(sku))
            .filter(entity::product::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_products(
        &self,
        tenant_id: Uuid,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Vec<Product>> {
        use entity::product::Column;

        let mut query = entity::product::Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::DeletedAt.is_null());

        if let Some(search) = &filter.search {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(Column::Name, search))
                    .add(contains_ci(Column::Sku, search))
                    .add(contains_ci(Column::Barcode, search)),
            );
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(Column::CategoryId.eq(category_id));
        }
        if let Some(brand_id) = filter.brand_id {
            query = query.filter(Column::BrandId.eq(brand_id));
        }
        if let Some(store_id) = filter.store_id {
            query = query.filter(
                Condition::any()
                    .add(Column::StoreId.is_null())
                    .add(Column::StoreId.eq(store_id)),
            );
        }

        let results = paginate(query.order_by_asc(Column::Sku), page)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn count_products_in_group(&self, tenant_id: Uuid, group_id: Uuid) -> Result<u64> {
        use entity::product::Column;

        let count = entity::product::Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::DeletedAt.is_null())
            .filter(
                Condition::any()
                    .add(Column::CategoryId.eq(group_id))
                    .add(Column::BrandId.eq(group_id)),
            )
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn save_group(&self, group: &ProductGroup) -> Result<ProductGroup> {
        let existing = entity::product_group::Entity::find_by_id(group.id)
            .one(&*self.db)
            .await?;

        let active: entity::product_group::ActiveModel = group.into();
        let saved = if existing.is_some() {
            active.update(&*self.db).await?
        } else {
            active.insert(&*self.db).await?
        };
        saved.try_into()
    }

    async fn find_group(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<ProductGroup>> {
        let result = entity::product_group::Entity::find_by_id(id)
            .filter(entity::product_group::Column::TenantId.eq(tenant_id))
            .filter(entity::product_group::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;
        result.map(TryInto::try_into).transpose()
    }

    async fn list_groups(&self, tenant_id: Uuid, kind: GroupKind) -> Result<Vec<ProductGroup>> {
        use entity::product_group::Column;

        let results = entity::product_group::Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Kind.eq(kind.as_str()))
            .filter(Column::DeletedAt.is_null())
            .order_by_asc(Column::Name)
            .all(&*self.db)
            .await?;
        results.into_iter().map(TryInto::try_into).collect()
    }
}

// ===== Parties =====

pub struct SeaOrmPartyRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmPartyRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PartyRepository for SeaOrmPartyRepository {
    async fn save_party(&self, party: &Party) -> Result<Party> {
        let existing = entity::party::Entity::find_by_id(party.id)
            .one(&*self.db)
            .await?;

        let active: entity::party::ActiveModel = party.into();
        let saved = if existing.is_some() {
            active.update(&*self.db).await?
        } else {
            active.insert(&*self.db).await?
        };
        saved.try_into()
    }

    async fn find_party(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Party>> {
        let result = entity::party::Entity::find_by_id(id)
            .filter(entity::party::Column::TenantId.eq(tenant_id))
            .filter(entity::party::Column::DeletedAt.is_null())
            .one(&*self.db)
            .await?;
        result.map(TryInto::try_into).transpose()
    }

    async fn list_parties(
        &self,
        tenant_id: Uuid,
        kind: PartyKind,
        search: Option<&str>,
        page: Page,
    ) -> Result<Vec<Party>> {
        use entity::party::Column;

        let mut query = entity::party::Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Kind.eq(kind.as_str()))
            .filter(Column::DeletedAt.is_null());
        if let Some(search) = search {
            query = query.filter(contains_ci(Column::Name, search));
        }

        let results = paginate(query.order_by_asc(Column::Name), page)
            .all(&*self.db)
            .await?;
        results.into_iter().map(TryInto::try_into).collect()
    }
}

// ===== Promos =====

pub struct SeaOrmPromoRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmPromoRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PromoRepository for SeaOrmPromoRepository {
    async fn save_promo(&self, promo: &Promo) -> Result<Promo> {
        let existing = entity::promo::Entity::find_by_id(promo.id)
            .one(&*self.db)
            .await?;

        let active: entity::promo::ActiveModel = promo.into();
        let saved = if existing.is_some() {
            active.update(&*self.db).await?
        } else {
            active.insert(&*self.db).await?
        };
        Ok(saved.into())
    }

    async fn find_promo_by_code(&self, tenant_id: Uuid, code: &str) -> Result<Option<Promo>> {
        let result = entity::promo::Entity::find()
            .filter(entity::promo::Column::TenantId.eq(tenant_id))
            .filter(entity::promo::Column::Code.eq(code))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_promos(&self, tenant_id: Uuid) -> Result<Vec<Promo>> {
        let results = entity::promo::Entity::find()
            .filter(entity::promo::Column::TenantId.eq(tenant_id))
            .order_by_desc(entity::promo::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }
}

// ===== Ledger =====

pub struct SeaOrmLedgerRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmLedgerRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn load_sales(&self, query: Select<entity::sale::Entity>) -> Result<Vec<Sale>> {
        let headers = query.all(&*self.db).await?;
        let items = headers
            .load_many(entity::sale_item::Entity, &*self.db)
            .await?;
        headers
            .into_iter()
            .zip(items)
            .map(|(header, items)| mapper::sale_from_rows(header, items))
            .collect()
    }

    async fn load_purchases(
        &self,
        query: Select<entity::purchase::Entity>,
    ) -> Result<Vec<Purchase>> {
        let headers = query.all(&*self.db).await?;
        let items = headers
            .load_many(entity::purchase_item::Entity, &*self.db)
            .await?;
        headers
            .into_iter()
            .zip(items)
            .map(|(header, items)| mapper::purchase_from_rows(header, items))
            .collect()
    }

    async fn load_returns(
        &self,
        query: Select<entity::return_doc::Entity>,
    ) -> Result<Vec<ReturnDoc>> {
        let headers = query.all(&*self.db).await?;
        let items = headers
            .load_many(entity::return_item::Entity, &*self.db)
            .await?;
        headers
            .into_iter()
            .zip(items)
            .map(|(header, items)| mapper::return_from_rows(header, items))
            .collect()
    }

    async fn load_opnames(
        &self,
        query: Select<entity::stock_opname::Entity>,
    ) -> Result<Vec<StockOpname>> {
        let headers = query.all(&*self.db).await?;
        let items = headers
            .load_many(entity::stock_opname_item::Entity, &*self.db)
            .await?;
        headers
            .into_iter()
            .zip(items)
            .map(|(header, items)| mapper::opname_from_rows(header, items))
            .collect()
    }
}

#[async_trait]
impl LedgerRepository for SeaOrmLedgerRepository {
    async fn count_documents(
        &self,
        tenant_id: Uuid,
        kind: DocumentKind,
        day: NaiveDate,
    ) -> Result<u64> {
        let (start, end) = day_bounds(day);
        let count = match kind {
            DocumentKind::Sale => {
                use entity::sale::Column;
                entity::sale::Entity::find()
                    .filter(Column::TenantId.eq(tenant_id))
                    .filter(Column::OccurredAt.gte(start))
                    .filter(Column::OccurredAt.lt(end))
                    .count(&*self.db)
                    .await?
            }
            DocumentKind::Purchase => {
                use entity::purchase::Column;
                entity::purchase::Entity::find()
                    .filter(Column::TenantId.eq(tenant_id))
                    .filter(Column::OccurredAt.gte(start))
                    .filter(Column::OccurredAt.lt(end))
                    .count(&*self.db)
                    .await?
            }
            DocumentKind::SalesReturn | DocumentKind::PurchaseReturn => {
                use entity::return_doc::Column;
                let return_kind = if kind == DocumentKind::SalesReturn {
                    ReturnKind::Sales
                } else {
                    ReturnKind::Purchase
                };
                entity::return_doc::Entity::find()
                    .filter(Column::TenantId.eq(tenant_id))
                    .filter(Column::Kind.eq(return_kind.as_str()))
                    .filter(Column::OccurredAt.gte(start))
                    .filter(Column::OccurredAt.lt(end))
                    .count(&*self.db)
                    .await?
            }
            DocumentKind::StockOpname => {
                use entity::stock_opname::Column;
                entity::stock_opname::Entity::find()
                    .filter(Column::TenantId.eq(tenant_id))
                    .filter(Column::CreatedAt.gte(start))
                    .filter(Column::CreatedAt.lt(end))
                    .count(&*self.db)
                    .await?
            }
        };
        Ok(count)
    }

    // ===== Sales =====

    async fn insert_sale(&self, sale: &Sale) -> Result<Sale> {
        let (header, items) = mapper::sale_to_rows(sale);
        let txn = self.db.begin().await?;
        header.insert(&txn).await?;
        if !items.is_empty() {
            entity::sale_item::Entity::insert_many(items).exec(&txn).await?;
        }
        txn.commit().await?;
        Ok(sale.clone())
    }

    async fn find_sale(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Sale>> {
        let query = entity::sale::Entity::find_by_id(id)
            .filter(entity::sale::Column::TenantId.eq(tenant_id));
        Ok(self.load_sales(query).await?.into_iter().next())
    }

    async fn list_sales(
        &self,
        tenant_id: Uuid,
        filter: &DocumentFilter,
        page: Page,
    ) -> Result<Vec<Sale>> {
        use entity::sale::Column;

        let mut query = entity::sale::Entity::find().filter(Column::TenantId.eq(tenant_id));
        if let Some(store_id) = filter.store_id {
            query = query.filter(Column::StoreId.eq(store_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::OccurredAt.lt(to));
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        let query = paginate(
            query
                .order_by_desc(Column::OccurredAt)
                .order_by_desc(Column::Number),
            page,
        );
        self.load_sales(query).await
    }

    async fn set_sale_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: DocumentStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        use entity::sale::Column;

        let voided_at = (status == DocumentStatus::Voided).then_some(at);
        entity::sale::Entity::update_many()
            .col_expr(Column::Status, Expr::value(status.as_str()))
            .col_expr(Column::VoidedAt, Expr::value(voided_at))
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Id.eq(id))
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    // ===== Purchases =====

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<Purchase> {
        let (header, items) = mapper::purchase_to_rows(purchase);
        let txn = self.db.begin().await?;
        header.insert(&txn).await?;
        if !items.is_empty() {
            entity::purchase_item::Entity::insert_many(items)
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(purchase.clone())
    }

    async fn find_purchase(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Purchase>> {
        let query = entity::purchase::Entity::find_by_id(id)
            .filter(entity::purchase::Column::TenantId.eq(tenant_id));
        Ok(self.load_purchases(query).await?.into_iter().next())
    }

    async fn list_purchases(
        &self,
        tenant_id: Uuid,
        filter: &DocumentFilter,
        page: Page,
    ) -> Result<Vec<Purchase>> {
        use entity::purchase::Column;

        let mut query =
            entity::purchase::Entity::find().filter(Column::TenantId.eq(tenant_id));
        if let Some(store_id) = filter.store_id {
            query = query.filter(Column::StoreId.eq(store_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::OccurredAt.lt(to));
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        let query = paginate(
            query
                .order_by_desc(Column::OccurredAt)
                .order_by_desc(Column::Number),
            page,
        );
        self.load_purchases(query).await
    }

    async fn set_purchase_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: DocumentStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        use entity::purchase::Column;

        let voided_at = (status == DocumentStatus::Voided).then_some(at);
        entity::purchase::Entity::update_many()
            .col_expr(Column::Status, Expr::value(status.as_str()))
            .col_expr(Column::VoidedAt, Expr::value(voided_at))
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::Id.eq(id))
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    // ===== Returns =====

    async fn insert_return(&self, doc: &ReturnDoc) -> Result<ReturnDoc> {
        let (header, items) = mapper::return_to_rows(doc);
        let txn = self.db.begin().await?;
        header.insert(&txn).await?;
        if !items.is_empty() {
            entity::return_item::Entity::insert_many(items)
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(doc.clone())
    }

    async fn find_return(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<ReturnDoc>> {
        let query = entity::return_doc::Entity::find_by_id(id)
            .filter(entity::return_doc::Column::TenantId.eq(tenant_id));
        Ok(self.load_returns(query).await?.into_iter().next())
    }

    async fn list_returns_for(&self, tenant_id: Uuid, source_id: Uuid) -> Result<Vec<ReturnDoc>> {
        use entity::return_doc::Column;

        let query = entity::return_doc::Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::SourceId.eq(source_id))
            .order_by_asc(Column::OccurredAt);
        self.load_returns(query).await
    }

    async fn list_returns(
        &self,
        tenant_id: Uuid,
        filter: &DocumentFilter,
    ) -> Result<Vec<ReturnDoc>> {
        use entity::return_doc::Column;

        let mut query = entity::return_doc::Entity::find().filter(Column::TenantId.eq(tenant_id));
        if let Some(store_id) = filter.store_id {
            query = query.filter(Column::StoreId.eq(store_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(Column::OccurredAt.lt(to));
        }
        self.load_returns(query.order_by_asc(Column::OccurredAt))
            .await
    }

    // ===== Stock opname =====

    async fn insert_opname(&self, opname: &StockOpname) -> Result<StockOpname> {
        let (header, items) = mapper::opname_to_rows(opname);
        let txn = self.db.begin().await?;
        header.insert(&txn).await?;
        if !items.is_empty() {
            entity::stock_opname_item::Entity::insert_many(items)
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(opname.clone())
    }

    async fn update_opname(&self, opname: &StockOpname) -> Result<StockOpname> {
        let (header, items) = mapper::opname_to_rows(opname);
        let txn = self.db.begin().await?;
        header.update(&txn).await?;
        entity::stock_opname_item::Entity::delete_many()
            .filter(entity::stock_opname_item::Column::OpnameId.eq(opname.id))
            .exec(&txn)
            .await?;
        if !items.is_empty() {
            entity::stock_opname_item::Entity::insert_many(items)
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        Ok(opname.clone())
    }

    async fn find_opname(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<StockOpname>> {
        let query = entity::stock_opname::Entity::find_by_id(id)
            .filter(entity::stock_opname::Column::TenantId.eq(tenant_id));
        Ok(self.load_opnames(query).await?.into_iter().next())
    }

    async fn list_opnames(&self, tenant_id: Uuid, store_id: Uuid) -> Result<Vec<StockOpname>> {
        use entity::stock_opname::Column;

        let query = entity::stock_opname::Entity::find()
            .filter(Column::TenantId.eq(tenant_id))
            .filter(Column::StoreId.eq(store_id))
            .order_by_desc(Column::CreatedAt);
        self.load_opnames(query).await
    }

    // ===== Stock =====

    async fn load_stock_ledger(&self, tenant_id: Uuid, store_id: Uuid) -> Result<StockLedger> {
        let completed = DocumentStatus::Completed.as_str();

        let products = entity::product::Entity::find()
            .filter(entity::product::Column::TenantId.eq(tenant_id))
            .filter(entity::product::Column::DeletedAt.is_null())
            .filter(
                Condition::any()
                    .add(entity::product::Column::StoreId.is_null())
                    .add(entity::product::Column::StoreId.eq(store_id)),
            )
            .order_by_asc(entity::product::Column::Sku)
            .all(&*self.db)
            .await?;

        let sales = self
            .load_sales(
                entity::sale::Entity::find()
                    .filter(entity::sale::Column::TenantId.eq(tenant_id))
                    .filter(entity::sale::Column::StoreId.eq(store_id))
                    .filter(entity::sale::Column::Status.eq(completed)),
            )
            .await?;
        let purchases = self
            .load_purchases(
                entity::purchase::Entity::find()
                    .filter(entity::purchase::Column::TenantId.eq(tenant_id))
                    .filter(entity::purchase::Column::StoreId.eq(store_id))
                    .filter(entity::purchase::Column::Status.eq(completed)),
            )
            .await?;
        let returns = self
            .load_returns(
                entity::return_doc::Entity::find()
                    .filter(entity::return_doc::Column::TenantId.eq(tenant_id))
                    .filter(entity::return_doc::Column::StoreId.eq(store_id)),
            )
            .await?;
        let opnames = self
            .load_opnames(
                entity::stock_opname::Entity::find()
                    .filter(entity::stock_opname::Column::TenantId.eq(tenant_id))
                    .filter(entity::stock_opname::Column::StoreId.eq(store_id))
                    .filter(
                        entity::stock_opname::Column::Status.eq(OpnameStatus::Finalized.as_str()),
                    ),
            )
            .await?;

        let products = products
            .into_iter()
            .map(|p| LedgerProduct {
                product_id: p.id,
                home_store_id: p.store_id,
                opening_stock: p.opening_stock,
            })
            .collect();
        Ok(StockLedger::assemble(
            store_id, products, &sales, &purchases, &returns, &opnames,
        ))
    }
}

// ===== Audit =====

pub struct SeaOrmAuditRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAuditRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditRepository for SeaOrmAuditRepository {
    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        let active: entity::audit_log::ActiveModel = entry.into();
        entity::audit_log::Entity::insert(active)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn list(&self, tenant_id: Uuid, limit: u64) -> Result<Vec<AuditEntry>> {
        let results = entity::audit_log::Entity::find()
            .filter(entity::audit_log::Column::TenantId.eq(tenant_id))
            .order_by_desc(entity::audit_log::Column::At)
            .limit(limit)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }
}

// ===== System config =====

pub struct SeaOrmConfigRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmConfigRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConfigRepository for SeaOrmConfigRepository {
    async fn get(&self, tenant_id: Uuid, key: &str) -> Result<Option<ConfigEntry>> {
        let result = entity::system_config::Entity::find_by_id((tenant_id, key.to_string()))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn upsert(&self, entry: &ConfigEntry) -> Result<ConfigEntry> {
        let existing = entity::system_config::Entity::find_by_id((entry.tenant_id, entry.key.clone()))
            .one(&*self.db)
            .await?;

        let active: entity::system_config::ActiveModel = entry.into();
        let saved = if existing.is_some() {
            active.update(&*self.db).await?
        } else {
            active.insert(&*self.db).await?
        };
        Ok(saved.into())
    }

    async fn list(&self, tenant_id: Uuid) -> Result<Vec<ConfigEntry>> {
        let results = entity::system_config::Entity::find()
            .filter(entity::system_config::Column::TenantId.eq(tenant_id))
            .order_by_asc(entity::system_config::Column::Key)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, tenant_id: Uuid, key: &str) -> Result<bool> {
        let result = entity::system_config::Entity::delete_many()
            .filter(entity::system_config::Column::TenantId.eq(tenant_id))
            .filter(entity::system_config::Column::Key.eq(key))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

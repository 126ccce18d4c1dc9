//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs. Every read takes
//! the tenant id and must never return rows of another tenant; reads skip
//! soft-deleted rows unless stated otherwise.

use super::stock::StockLedger;
use crate::contract::model::*;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Tenants and their stores
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn create_tenant(&self, tenant: &Tenant) -> Result<Tenant>;

    async fn find_tenant(&self, id: Uuid) -> Result<Option<Tenant>>;

    async fn create_store(&self, store: &Store) -> Result<Store>;

    async fn find_store(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Store>>;

    async fn list_stores(&self, tenant_id: Uuid) -> Result<Vec<Store>>;
}

/// Products, categories and brands
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Insert or replace a product by id
    async fn save_product(&self, product: &Product) -> Result<Product>;

    async fn find_product(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Product>>;

    async fn find_product_by_sku(&self, tenant_id: Uuid, sku: &str) -> Result<Option<Product>>;

    /// Live products matching the filter, ordered by sku
    async fn list_products(
        &self,
        tenant_id: Uuid,
        filter: &ProductFilter,
        page: Page,
    ) -> Result<Vec<Product>>;

    /// Number of live products referencing a group
    async fn count_products_in_group(&self, tenant_id: Uuid, group_id: Uuid) -> Result<u64>;

    /// Insert or replace a category/brand by id
    async fn save_group(&self, group: &ProductGroup) -> Result<ProductGroup>;

    async fn find_group(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<ProductGroup>>;

    /// Live groups of one kind, ordered by name
    async fn list_groups(&self, tenant_id: Uuid, kind: GroupKind) -> Result<Vec<ProductGroup>>;
}

/// Customers and suppliers
#[async_trait]
pub trait PartyRepository: Send + Sync {
    async fn save_party(&self, party: &Party) -> Result<Party>;

    async fn find_party(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Party>>;

    /// Live parties of one kind, name contains `search` (case-insensitive), ordered by name
    async fn list_parties(
        &self,
        tenant_id: Uuid,
        kind: PartyKind,
        search: Option<&str>,
        page: Page,
    ) -> Result<Vec<Party>>;
}

#[async_trait]
pub trait PromoRepository: Send + Sync {
    async fn save_promo(&self, promo: &Promo) -> Result<Promo>;

    /// Lookup by normalized (upper-case) code
    async fn find_promo_by_code(&self, tenant_id: Uuid, code: &str) -> Result<Option<Promo>>;

    /// All promos, newest first
    async fn list_promos(&self, tenant_id: Uuid) -> Result<Vec<Promo>>;
}

/// Sales, purchases, returns and stock opnames
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Number of documents of a kind created by the tenant on a UTC day
    async fn count_documents(
        &self,
        tenant_id: Uuid,
        kind: DocumentKind,
        day: NaiveDate,
    ) -> Result<u64>;

    // ===== Sales =====

    async fn insert_sale(&self, sale: &Sale) -> Result<Sale>;

    async fn find_sale(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Sale>>;

    /// Newest first
    async fn list_sales(
        &self,
        tenant_id: Uuid,
        filter: &DocumentFilter,
        page: Page,
    ) -> Result<Vec<Sale>>;

    async fn set_sale_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: DocumentStatus,
        at: DateTime<Utc>,
    ) -> Result<()>;

    // ===== Purchases =====

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<Purchase>;

    async fn find_purchase(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Purchase>>;

    /// Newest first
    async fn list_purchases(
        &self,
        tenant_id: Uuid,
        filter: &DocumentFilter,
        page: Page,
    ) -> Result<Vec<Purchase>>;

    async fn set_purchase_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: DocumentStatus,
        at: DateTime<Utc>,
    ) -> Result<()>;

    // ===== Returns =====

    async fn insert_return(&self, doc: &ReturnDoc) -> Result<ReturnDoc>;

    async fn find_return(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<ReturnDoc>>;

    /// Returns reversing one sale or purchase, oldest first
    async fn list_returns_for(&self, tenant_id: Uuid, source_id: Uuid) -> Result<Vec<ReturnDoc>>;

    /// Returns of a store within a period, oldest first
    async fn list_returns(
        &self,
        tenant_id: Uuid,
        filter: &DocumentFilter,
    ) -> Result<Vec<ReturnDoc>>;

    // ===== Stock opname =====

    async fn insert_opname(&self, opname: &StockOpname) -> Result<StockOpname>;

    /// Replace status, counted_at and lines of an existing opname
    async fn update_opname(&self, opname: &StockOpname) -> Result<StockOpname>;

    async fn find_opname(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<StockOpname>>;

    /// Newest first
    async fn list_opnames(&self, tenant_id: Uuid, store_id: Uuid) -> Result<Vec<StockOpname>>;

    // ===== Stock =====

    /// Everything needed to derive the stock of one store
    async fn load_stock_ledger(&self, tenant_id: Uuid, store_id: Uuid) -> Result<StockLedger>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<()>;

    /// Newest first
    async fn list(&self, tenant_id: Uuid, limit: u64) -> Result<Vec<AuditEntry>>;
}

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn get(&self, tenant_id: Uuid, key: &str) -> Result<Option<ConfigEntry>>;

    async fn upsert(&self, entry: &ConfigEntry) -> Result<ConfigEntry>;

    /// Ordered by key
    async fn list(&self, tenant_id: Uuid) -> Result<Vec<ConfigEntry>>;

    /// Returns whether a row was removed
    async fn delete(&self, tenant_id: Uuid, key: &str) -> Result<bool>;
}

//! Native client trait for inter-module communication
//!
//! Other modules (reporting, sync agents) use this to query the catalog and
//! stock or to record sales without going through HTTP.

use super::error::PosError;
use super::model::{
    ChangeTable, LowStockItem, NewSale, Product, ProductFilter, Sale, StockLevel, TenantScope,
};
use crate::domain::realtime::Subscription;
use async_trait::async_trait;
use uuid::Uuid;

/// POS service API for in-process callers
#[async_trait]
pub trait PosApi: Send + Sync {
    // ===== Catalog =====

    async fn get_product(&self, scope: &TenantScope, id: Uuid) -> Result<Product, PosError>;

    async fn list_products(
        &self,
        scope: &TenantScope,
        filter: ProductFilter,
    ) -> Result<Vec<Product>, PosError>;

    // ===== Stock =====

    /// Derived stock of every product available in the store
    async fn stock_levels(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
    ) -> Result<Vec<StockLevel>, PosError>;

    async fn low_stock(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
    ) -> Result<Vec<LowStockItem>, PosError>;

    // ===== Sales =====

    async fn create_sale(&self, scope: &TenantScope, sale: NewSale) -> Result<Sale, PosError>;

    async fn get_sale(&self, scope: &TenantScope, id: Uuid) -> Result<Sale, PosError>;

    // ===== Realtime =====

    /// Subscribe to coalesced change notices for one table of the scope's tenant
    fn subscribe(&self, scope: &TenantScope, table: ChangeTable) -> Subscription;
}

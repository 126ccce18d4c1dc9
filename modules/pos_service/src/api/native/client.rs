//! Native client implementation - wraps domain service for in-process calls

use crate::contract::model::{
    ChangeTable, LowStockItem, NewSale, Product, ProductFilter, Sale, StockLevel, TenantScope,
};
use crate::contract::{PosApi, PosError};
use crate::domain::realtime::{ChannelManager, Subscription};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Native client that calls the domain service directly
///
/// Used for in-process communication without HTTP overhead. Product
/// listings are paged with the service's default page size.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
    channels: ChannelManager,
}

impl NativeClient {
    pub fn new(service: Arc<Service>, channels: ChannelManager) -> Self {
        Self { service, channels }
    }
}

#[async_trait]
impl PosApi for NativeClient {
    async fn get_product(&self, scope: &TenantScope, id: Uuid) -> Result<Product, PosError> {
        self.service.get_product(scope, id).await
    }

    async fn list_products(
        &self,
        scope: &TenantScope,
        filter: ProductFilter,
    ) -> Result<Vec<Product>, PosError> {
        let page = self.service.page(None, None);
        self.service.list_products(scope, filter, page).await
    }

    async fn stock_levels(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
    ) -> Result<Vec<StockLevel>, PosError> {
        self.service.stock_levels(scope, store_id).await
    }

    async fn low_stock(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
    ) -> Result<Vec<LowStockItem>, PosError> {
        self.service.low_stock(scope, store_id).await
    }

    async fn create_sale(&self, scope: &TenantScope, sale: NewSale) -> Result<Sale, PosError> {
        self.service.create_sale(scope, sale).await
    }

    async fn get_sale(&self, scope: &TenantScope, id: Uuid) -> Result<Sale, PosError> {
        self.service.get_sale(scope, id).await
    }

    fn subscribe(&self, scope: &TenantScope, table: ChangeTable) -> Subscription {
        self.channels.subscribe(scope.tenant_id, table)
    }
}

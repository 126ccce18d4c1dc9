//! Derived stock queries

use super::{internal, Service};
use crate::contract::model::{LowStockItem, Page, ProductFilter, StockLevel, TenantScope};
use crate::contract::PosError;
use crate::domain::stock::compute_levels;
use chrono::{DateTime, Utc};
use uuid::Uuid;

impl Service {
    /// Stock of every live product available in the store
    pub async fn stock_levels(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
    ) -> Result<Vec<StockLevel>, PosError> {
        self.require_store(scope, store_id).await?;
        let levels = self.current_levels(scope.tenant_id, store_id).await?;
        Ok(levels.as_ref().clone())
    }

    /// Stock as it was at `at`, computed from the ledger without caching
    pub async fn stock_levels_at(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Vec<StockLevel>, PosError> {
        self.require_store(scope, store_id).await?;
        let ledger = self
            .repos
            .ledger
            .load_stock_ledger(scope.tenant_id, store_id)
            .await
            .map_err(internal("load stock ledger"))?;
        Ok(compute_levels(&ledger, Some(at)))
    }

    pub async fn stock_level(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
        product_id: Uuid,
    ) -> Result<StockLevel, PosError> {
        self.require_store(scope, store_id).await?;
        self.require_product_in_store(scope.tenant_id, product_id, store_id)
            .await?;
        let levels = self.current_levels(scope.tenant_id, store_id).await?;
        levels
            .iter()
            .find(|level| level.product_id == product_id)
            .copied()
            .ok_or_else(|| PosError::not_found("stock level", product_id))
    }

    /// Products at or below their reorder threshold, lowest stock first
    pub async fn low_stock(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
    ) -> Result<Vec<LowStockItem>, PosError> {
        self.require_store(scope, store_id).await?;
        let levels = self.current_levels(scope.tenant_id, store_id).await?;
        let filter = ProductFilter {
            store_id: Some(store_id),
            ..ProductFilter::default()
        };
        let products = self
            .repos
            .catalog
            .list_products(scope.tenant_id, &filter, Page::all())
            .await
            .map_err(internal("list products"))?;

        let mut items: Vec<LowStockItem> = products
            .into_iter()
            .filter_map(|product| {
                let on_hand = Self::on_hand(&levels, product.id);
                (on_hand <= product.min_stock).then(|| LowStockItem {
                    product_id: product.id,
                    sku: product.sku,
                    name: product.name,
                    on_hand,
                    min_stock: product.min_stock,
                })
            })
            .collect();
        items.sort_by(|a, b| a.on_hand.cmp(&b.on_hand).then_with(|| a.sku.cmp(&b.sku)));
        Ok(items)
    }
}

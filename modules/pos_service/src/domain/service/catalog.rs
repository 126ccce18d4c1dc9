//! Products, categories and brands

use super::{internal, Service};
use crate::contract::model::{
    ChangeKind, ChangeTable, GroupKind, NewProduct, Page, Product, ProductFilter, ProductGroup,
    ProductPatch, TenantScope,
};
use crate::contract::PosError;
use crate::domain::events::ChangeEvent;
use crate::domain::pricing::ensure_amount;
use crate::domain::validation::{require_name, validate_sku};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

impl Service {
    // ===== Products =====

    pub async fn create_product(
        &self,
        scope: &TenantScope,
        input: NewProduct,
    ) -> Result<Product, PosError> {
        let sku = input.sku.trim().to_string();
        validate_sku(&sku)?;
        let name = require_name("product name", &input.name)?;
        let unit = require_name("unit", &input.unit)?;
        validate_prices(input.cost_price, input.sell_price)?;
        if input.opening_stock < 0 {
            return Err(PosError::validation("opening stock cannot be negative"));
        }
        if input.min_stock < 0 {
            return Err(PosError::validation("minimum stock cannot be negative"));
        }
        if let Some(store_id) = input.store_id {
            self.require_store(scope, store_id).await?;
        }
        self.require_group(scope.tenant_id, input.category_id, GroupKind::Category)
            .await?;
        self.require_group(scope.tenant_id, input.brand_id, GroupKind::Brand)
            .await?;
        self.ensure_sku_free(scope.tenant_id, &sku).await?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            store_id: input.store_id,
            sku,
            barcode: normalize_optional(input.barcode),
            name,
            category_id: input.category_id,
            brand_id: input.brand_id,
            unit,
            cost_price: input.cost_price,
            sell_price: input.sell_price,
            opening_stock: input.opening_stock,
            min_stock: input.min_stock,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let saved = self
            .repos
            .catalog
            .save_product(&product)
            .await
            .map_err(internal("save product"))?;

        self.evict_stock(scope.tenant_id, saved.store_id);
        self.publish(product_event(&saved, ChangeKind::Insert)).await;
        self.audit(
            scope,
            saved.store_id,
            "product.create",
            "products",
            saved.id,
            json!({ "sku": saved.sku }),
        )
        .await;

        tracing::info!(tenant_id = %scope.tenant_id, product_id = %saved.id, sku = %saved.sku, "product created");
        Ok(saved)
    }

    pub async fn get_product(&self, scope: &TenantScope, id: Uuid) -> Result<Product, PosError> {
        self.require_product(scope.tenant_id, id).await
    }

    /// Live products ordered by sku; a store-pinned scope only sees its store
    pub async fn list_products(
        &self,
        scope: &TenantScope,
        mut filter: ProductFilter,
        page: Page,
    ) -> Result<Vec<Product>, PosError> {
        filter.store_id = self.effective_store(scope, filter.store_id)?;
        filter.search = filter
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        self.repos
            .catalog
            .list_products(scope.tenant_id, &filter, page)
            .await
            .map_err(internal("list products"))
    }

    pub async fn update_product(
        &self,
        scope: &TenantScope,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<Product, PosError> {
        let mut product = self.require_product(scope.tenant_id, id).await?;
        if let Some(store_id) = product.store_id {
            self.ensure_store_scope(scope, store_id)?;
        }

        if let Some(name) = patch.name {
            product.name = require_name("product name", &name)?;
        }
        if let Some(unit) = patch.unit {
            product.unit = require_name("unit", &unit)?;
        }
        if let Some(barcode) = patch.barcode {
            product.barcode = normalize_optional(Some(barcode));
        }
        if let Some(category_id) = patch.category_id {
            self.require_group(scope.tenant_id, Some(category_id), GroupKind::Category)
                .await?;
            product.category_id = Some(category_id);
        }
        if let Some(brand_id) = patch.brand_id {
            self.require_group(scope.tenant_id, Some(brand_id), GroupKind::Brand)
                .await?;
            product.brand_id = Some(brand_id);
        }
        product.cost_price = patch.cost_price.unwrap_or(product.cost_price);
        product.sell_price = patch.sell_price.unwrap_or(product.sell_price);
        validate_prices(product.cost_price, product.sell_price)?;
        if let Some(min_stock) = patch.min_stock {
            if min_stock < 0 {
                return Err(PosError::validation("minimum stock cannot be negative"));
            }
            product.min_stock = min_stock;
        }
        product.updated_at = Utc::now();

        let saved = self
            .repos
            .catalog
            .save_product(&product)
            .await
            .map_err(internal("save product"))?;

        self.publish(product_event(&saved, ChangeKind::Update)).await;
        self.audit(
            scope,
            saved.store_id,
            "product.update",
            "products",
            saved.id,
            json!({ "sku": saved.sku }),
        )
        .await;
        Ok(saved)
    }

    /// Soft delete; the product disappears from listings and stock
    pub async fn delete_product(&self, scope: &TenantScope, id: Uuid) -> Result<(), PosError> {
        let mut product = self.require_product(scope.tenant_id, id).await?;
        if let Some(store_id) = product.store_id {
            self.ensure_store_scope(scope, store_id)?;
        }

        let now = Utc::now();
        product.deleted_at = Some(now);
        product.updated_at = now;
        self.repos
            .catalog
            .save_product(&product)
            .await
            .map_err(internal("delete product"))?;

        self.evict_stock(scope.tenant_id, product.store_id);
        self.publish(product_event(&product, ChangeKind::Delete)).await;
        self.audit(
            scope,
            product.store_id,
            "product.delete",
            "products",
            product.id,
            json!({ "sku": product.sku }),
        )
        .await;
        Ok(())
    }

    // ===== Categories and brands =====

    pub async fn create_group(
        &self,
        scope: &TenantScope,
        kind: GroupKind,
        name: &str,
    ) -> Result<ProductGroup, PosError> {
        let name = require_name(&format!("{} name", kind), name)?;
        self.ensure_group_name_free(scope.tenant_id, kind, &name, None)
            .await?;

        let now = Utc::now();
        let group = ProductGroup {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            kind,
            name,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let saved = self
            .repos
            .catalog
            .save_group(&group)
            .await
            .map_err(internal("save group"))?;

        self.publish(ChangeEvent::new(
            ChangeTable::ProductGroups,
            ChangeKind::Insert,
            scope.tenant_id,
            saved.id,
        ))
        .await;
        self.audit(
            scope,
            None,
            &format!("{}.create", kind),
            "product_groups",
            saved.id,
            json!({ "name": saved.name }),
        )
        .await;
        Ok(saved)
    }

    /// Live groups of one kind, ordered by name
    pub async fn list_groups(
        &self,
        scope: &TenantScope,
        kind: GroupKind,
    ) -> Result<Vec<ProductGroup>, PosError> {
        self.repos
            .catalog
            .list_groups(scope.tenant_id, kind)
            .await
            .map_err(internal("list groups"))
    }

    pub async fn rename_group(
        &self,
        scope: &TenantScope,
        id: Uuid,
        name: &str,
    ) -> Result<ProductGroup, PosError> {
        let mut group = self.find_live_group(scope.tenant_id, id).await?;
        let name = require_name(&format!("{} name", group.kind), name)?;
        self.ensure_group_name_free(scope.tenant_id, group.kind, &name, Some(id))
            .await?;

        group.name = name;
        group.updated_at = Utc::now();
        let saved = self
            .repos
            .catalog
            .save_group(&group)
            .await
            .map_err(internal("save group"))?;

        self.publish(ChangeEvent::new(
            ChangeTable::ProductGroups,
            ChangeKind::Update,
            scope.tenant_id,
            saved.id,
        ))
        .await;
        self.audit(
            scope,
            None,
            &format!("{}.rename", saved.kind),
            "product_groups",
            saved.id,
            json!({ "name": saved.name }),
        )
        .await;
        Ok(saved)
    }

    /// Soft delete; refused while live products still reference the group
    pub async fn delete_group(&self, scope: &TenantScope, id: Uuid) -> Result<(), PosError> {
        let mut group = self.find_live_group(scope.tenant_id, id).await?;
        let in_use = self
            .repos
            .catalog
            .count_products_in_group(scope.tenant_id, id)
            .await
            .map_err(internal("count products in group"))?;
        if in_use > 0 {
            return Err(PosError::conflict(format!(
                "{} '{}' is used by {} product(s)",
                group.kind, group.name, in_use
            )));
        }

        let now = Utc::now();
        group.deleted_at = Some(now);
        group.updated_at = now;
        self.repos
            .catalog
            .save_group(&group)
            .await
            .map_err(internal("delete group"))?;

        self.publish(ChangeEvent::new(
            ChangeTable::ProductGroups,
            ChangeKind::Delete,
            scope.tenant_id,
            id,
        ))
        .await;
        self.audit(
            scope,
            None,
            &format!("{}.delete", group.kind),
            "product_groups",
            id,
            json!({ "name": group.name }),
        )
        .await;
        Ok(())
    }

    // ===== Helpers =====

    async fn find_live_group(&self, tenant_id: Uuid, id: Uuid) -> Result<ProductGroup, PosError> {
        self.repos
            .catalog
            .find_group(tenant_id, id)
            .await
            .map_err(internal("find group"))?
            .filter(|g| g.deleted_at.is_none())
            .ok_or_else(|| PosError::not_found("product group", id))
    }

    /// A referenced group must be live and of the expected kind
    async fn require_group(
        &self,
        tenant_id: Uuid,
        id: Option<Uuid>,
        kind: GroupKind,
    ) -> Result<(), PosError> {
        let Some(id) = id else {
            return Ok(());
        };
        match self.find_live_group(tenant_id, id).await {
            Ok(group) if group.kind == kind => Ok(()),
            Ok(_) | Err(PosError::NotFound { .. }) => Err(PosError::not_found(kind.as_str(), id)),
            Err(e) => Err(e),
        }
    }

    async fn ensure_group_name_free(
        &self,
        tenant_id: Uuid,
        kind: GroupKind,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<(), PosError> {
        let groups = self
            .repos
            .catalog
            .list_groups(tenant_id, kind)
            .await
            .map_err(internal("list groups"))?;
        let taken = groups
            .iter()
            .any(|g| Some(g.id) != except && g.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(PosError::conflict(format!("{} '{}' already exists", kind, name)));
        }
        Ok(())
    }

    async fn ensure_sku_free(&self, tenant_id: Uuid, sku: &str) -> Result<(), PosError> {
        let existing = self
            .repos
            .catalog
            .find_product_by_sku(tenant_id, sku)
            .await
            .map_err(internal("find product by sku"))?;
        match existing {
            Some(p) if p.deleted_at.is_none() => Err(PosError::conflict(
                format!("sku '{}' is already used by product {}", sku, p.id),
            )),
            _ => Ok(()),
        }
    }
}

fn validate_prices(cost_price: Decimal, sell_price: Decimal) -> Result<(), PosError> {
    ensure_amount("cost price", cost_price)?;
    ensure_amount("sell price", sell_price)?;
    Ok(())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn product_event(product: &Product, kind: ChangeKind) -> ChangeEvent {
    ChangeEvent::new(ChangeTable::Products, kind, product.tenant_id, product.id)
        .in_store(product.store_id)
        .with_products([product.id])
}

//! Goods received from suppliers

use super::{internal, sum_quantities, Service};
use crate::contract::model::{
    ChangeKind, ChangeTable, DocumentFilter, DocumentKind, DocumentStatus, NewPurchase, Page,
    PartyKind, Purchase, PurchaseLine, TenantScope,
};
use crate::contract::PosError;
use crate::domain::events::ChangeEvent;
use crate::domain::pricing::{ensure_amount, line_amount, sum_amounts};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

impl Service {
    pub async fn create_purchase(
        &self,
        scope: &TenantScope,
        input: NewPurchase,
    ) -> Result<Purchase, PosError> {
        let store = self.require_store(scope, input.store_id).await?;
        self.require_party(scope, input.supplier_id, PartyKind::Supplier)
            .await?;
        if input.lines.is_empty() {
            return Err(PosError::validation("a purchase needs at least one line"));
        }

        let mut lines = Vec::with_capacity(input.lines.len());
        let mut products = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            if line.quantity <= 0 {
                return Err(PosError::validation(format!(
                    "quantity for product {} must be positive",
                    line.product_id
                )));
            }
            ensure_amount(&format!("unit cost for product {}", line.product_id), line.unit_cost)?;
            let subtotal = line_amount(
                &format!("line amount for product {}", line.product_id),
                line.unit_cost,
                line.quantity,
            )?;
            let product = self
                .require_product_in_store(scope.tenant_id, line.product_id, store.id)
                .await?;
            lines.push(PurchaseLine {
                id: Uuid::new_v4(),
                product_id: product.id,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
                subtotal,
            });
            products.push(product);
        }

        let total = sum_amounts("purchase total", lines.iter().map(|l| l.subtotal))?;
        let now = Utc::now();
        let purchase = Purchase {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            store_id: store.id,
            number: self
                .next_number(scope.tenant_id, DocumentKind::Purchase, now)
                .await?,
            supplier_id: input.supplier_id,
            total,
            lines,
            status: DocumentStatus::Completed,
            note: input.note.filter(|n| !n.trim().is_empty()),
            actor: scope.actor.clone(),
            occurred_at: now,
            voided_at: None,
        };

        let saved = self
            .repos
            .ledger
            .insert_purchase(&purchase)
            .await
            .map_err(internal("insert purchase"))?;

        if self.config.update_cost_on_purchase {
            // Later lines of the same product win.
            for (mut product, line) in products.into_iter().zip(&saved.lines) {
                if product.cost_price == line.unit_cost {
                    continue;
                }
                product.cost_price = line.unit_cost;
                product.updated_at = now;
                match self.repos.catalog.save_product(&product).await {
                    Ok(_) => {
                        self.publish(
                            ChangeEvent::new(
                                ChangeTable::Products,
                                ChangeKind::Update,
                                scope.tenant_id,
                                product.id,
                            )
                            .in_store(product.store_id)
                            .with_products([product.id]),
                        )
                        .await
                    }
                    Err(e) => tracing::warn!(
                        product_id = %product.id,
                        error = %e,
                        "failed to update cost price from purchase"
                    ),
                }
            }
        }

        self.evict_stock(scope.tenant_id, Some(saved.store_id));
        self.publish(ChangeEvent::purchase(&saved, ChangeKind::Insert))
            .await;
        self.audit(
            scope,
            Some(saved.store_id),
            "purchase.create",
            "purchases",
            saved.id,
            json!({ "number": saved.number, "total": saved.total.to_string() }),
        )
        .await;

        tracing::info!(
            tenant_id = %scope.tenant_id,
            store_id = %saved.store_id,
            number = %saved.number,
            "purchase recorded"
        );
        Ok(saved)
    }

    /// Void a completed purchase that has no returns
    ///
    /// Unless negative stock is allowed, the goods must still be on hand.
    pub async fn void_purchase(
        &self,
        scope: &TenantScope,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Purchase, PosError> {
        let store_id = self.get_purchase(scope, id).await?.store_id;
        let _store_lock = self.store_locks.lock(scope.tenant_id, store_id).await;
        let mut purchase = self.get_purchase(scope, id).await?;
        if purchase.status == DocumentStatus::Voided {
            return Err(PosError::conflict(format!(
                "purchase {} is already voided",
                purchase.number
            )));
        }
        let returns = self
            .repos
            .ledger
            .list_returns_for(scope.tenant_id, id)
            .await
            .map_err(internal("list returns"))?;
        if !returns.is_empty() {
            return Err(PosError::conflict(format!(
                "purchase {} has {} return(s) and cannot be voided",
                purchase.number,
                returns.len()
            )));
        }

        let quantities = sum_quantities(purchase.lines.iter().map(|l| (l.product_id, l.quantity)));
        self.ensure_stock_covers(scope.tenant_id, purchase.store_id, &quantities)
            .await?;

        let now = Utc::now();
        self.repos
            .ledger
            .set_purchase_status(scope.tenant_id, id, DocumentStatus::Voided, now)
            .await
            .map_err(internal("void purchase"))?;
        purchase.status = DocumentStatus::Voided;
        purchase.voided_at = Some(now);

        self.evict_stock(scope.tenant_id, Some(purchase.store_id));
        self.publish(ChangeEvent::purchase(&purchase, ChangeKind::Update))
            .await;
        self.audit(
            scope,
            Some(purchase.store_id),
            "purchase.void",
            "purchases",
            purchase.id,
            json!({ "number": purchase.number, "reason": reason }),
        )
        .await;
        Ok(purchase)
    }

    pub async fn get_purchase(&self, scope: &TenantScope, id: Uuid) -> Result<Purchase, PosError> {
        let purchase = self
            .repos
            .ledger
            .find_purchase(scope.tenant_id, id)
            .await
            .map_err(internal("find purchase"))?
            .ok_or_else(|| PosError::not_found("purchase", id))?;
        self.ensure_store_scope(scope, purchase.store_id)?;
        Ok(purchase)
    }

    /// Newest first
    pub async fn list_purchases(
        &self,
        scope: &TenantScope,
        mut filter: DocumentFilter,
        page: Page,
    ) -> Result<Vec<Purchase>, PosError> {
        filter.store_id = self.effective_store(scope, filter.store_id)?;
        self.repos
            .ledger
            .list_purchases(scope.tenant_id, &filter, page)
            .await
            .map_err(internal("list purchases"))
    }
}

//! Point-of-sale checkout

use super::{internal, sum_quantities, Service};
use crate::contract::model::{
    ChangeKind, DocumentFilter, DocumentKind, DocumentStatus, NewSale, Page, PartyKind,
    ReturnKind, Sale, SaleLine, SalesSummary, TenantScope,
};
use crate::contract::PosError;
use crate::domain::events::ChangeEvent;
use crate::domain::pricing::{change_due, ensure_amount, price_line, sale_totals, sum_amounts};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

impl Service {
    /// Record a completed sale
    ///
    /// Validates scope, lines, customer and promo, prices the basket, checks
    /// payment and (unless negative stock is allowed) on-hand stock, then
    /// persists the sale under a fresh `INV` number.
    pub async fn create_sale(&self, scope: &TenantScope, input: NewSale) -> Result<Sale, PosError> {
        let store = self.require_store(scope, input.store_id).await?;
        if input.lines.is_empty() {
            return Err(PosError::validation("a sale needs at least one line"));
        }
        ensure_amount("paid amount", input.paid)?;
        if let Some(customer_id) = input.customer_id {
            self.require_party(scope, customer_id, PartyKind::Customer)
                .await?;
        }

        let now = Utc::now();
        let mut priced = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let product = self
                .require_product_in_store(scope.tenant_id, line.product_id, store.id)
                .await?;
            let unit_price = line.unit_price.unwrap_or(product.sell_price);
            priced.push(price_line(product.id, line.quantity, unit_price, line.discount)?);
        }

        let promo = match input.promo_code.as_deref() {
            Some(code) => {
                let promo = self.get_promo(scope, code).await?;
                if !promo.is_redeemable_at(now) {
                    return Err(PosError::validation(format!(
                        "promo '{}' is not active",
                        promo.code
                    )));
                }
                let subtotal = sum_amounts("sale subtotal", priced.iter().map(|l| l.subtotal))?;
                if subtotal < promo.min_purchase {
                    return Err(PosError::validation(format!(
                        "promo '{}' requires a minimum purchase of {}",
                        promo.code, promo.min_purchase
                    )));
                }
                Some(promo)
            }
            None => None,
        };

        let totals = sale_totals(&priced, promo.as_ref(), self.config.tax_rate_percent)?;
        let change = change_due(totals.total, input.paid)?;

        // Held until the sale is stored and the cached stock evicted
        let _store_lock = self.store_locks.lock(scope.tenant_id, store.id).await;
        let quantities = sum_quantities(priced.iter().map(|l| (l.product_id, l.quantity)));
        self.ensure_stock_covers(scope.tenant_id, store.id, &quantities)
            .await?;

        let sale = Sale {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            store_id: store.id,
            number: self
                .next_number(scope.tenant_id, DocumentKind::Sale, now)
                .await?,
            customer_id: input.customer_id,
            promo_id: promo.as_ref().map(|p| p.id),
            lines: priced
                .into_iter()
                .map(|l| SaleLine {
                    id: Uuid::new_v4(),
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    discount: l.discount,
                    subtotal: l.subtotal,
                })
                .collect(),
            subtotal: totals.subtotal,
            promo_discount: totals.promo_discount,
            tax: totals.tax,
            total: totals.total,
            paid: input.paid,
            change,
            payment_method: input.payment_method,
            status: DocumentStatus::Completed,
            note: input.note.filter(|n| !n.trim().is_empty()),
            actor: scope.actor.clone(),
            occurred_at: now,
            voided_at: None,
        };

        let saved = self
            .repos
            .ledger
            .insert_sale(&sale)
            .await
            .map_err(internal("insert sale"))?;

        self.evict_stock(scope.tenant_id, Some(saved.store_id));
        self.publish(ChangeEvent::sale(&saved, ChangeKind::Insert))
            .await;
        self.audit(
            scope,
            Some(saved.store_id),
            "sale.create",
            "sales",
            saved.id,
            json!({
                "number": saved.number,
                "total": saved.total.to_string(),
                "payment_method": saved.payment_method.as_str(),
            }),
        )
        .await;

        tracing::info!(
            tenant_id = %scope.tenant_id,
            store_id = %saved.store_id,
            number = %saved.number,
            total = %saved.total,
            "sale recorded"
        );
        Ok(saved)
    }

    /// Void a completed sale that has no returns
    pub async fn void_sale(
        &self,
        scope: &TenantScope,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Sale, PosError> {
        let store_id = self.get_sale(scope, id).await?.store_id;
        let _store_lock = self.store_locks.lock(scope.tenant_id, store_id).await;
        let mut sale = self.get_sale(scope, id).await?;
        if sale.status == DocumentStatus::Voided {
            return Err(PosError::conflict(format!("sale {} is already voided", sale.number)));
        }
        let returns = self
            .repos
            .ledger
            .list_returns_for(scope.tenant_id, id)
            .await
            .map_err(internal("list returns"))?;
        if !returns.is_empty() {
            return Err(PosError::conflict(format!(
                "sale {} has {} return(s) and cannot be voided",
                sale.number,
                returns.len()
            )));
        }

        let now = Utc::now();
        self.repos
            .ledger
            .set_sale_status(scope.tenant_id, id, DocumentStatus::Voided, now)
            .await
            .map_err(internal("void sale"))?;
        sale.status = DocumentStatus::Voided;
        sale.voided_at = Some(now);

        self.evict_stock(scope.tenant_id, Some(sale.store_id));
        self.publish(ChangeEvent::sale(&sale, ChangeKind::Update))
            .await;
        self.audit(
            scope,
            Some(sale.store_id),
            "sale.void",
            "sales",
            sale.id,
            json!({ "number": sale.number, "reason": reason }),
        )
        .await;

        tracing::info!(tenant_id = %scope.tenant_id, number = %sale.number, "sale voided");
        Ok(sale)
    }

    pub async fn get_sale(&self, scope: &TenantScope, id: Uuid) -> Result<Sale, PosError> {
        let sale = self
            .repos
            .ledger
            .find_sale(scope.tenant_id, id)
            .await
            .map_err(internal("find sale"))?
            .ok_or_else(|| PosError::not_found("sale", id))?;
        self.ensure_store_scope(scope, sale.store_id)?;
        Ok(sale)
    }

    /// Newest first
    pub async fn list_sales(
        &self,
        scope: &TenantScope,
        mut filter: DocumentFilter,
        page: Page,
    ) -> Result<Vec<Sale>, PosError> {
        filter.store_id = self.effective_store(scope, filter.store_id)?;
        self.repos
            .ledger
            .list_sales(scope.tenant_id, &filter, page)
            .await
            .map_err(internal("list sales"))
    }

    /// Dashboard totals of a store over `[from, to)`
    pub async fn sales_summary(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<SalesSummary, PosError> {
        self.require_store(scope, store_id).await?;
        if from >= to {
            return Err(PosError::validation("summary period must end after it starts"));
        }

        let filter = DocumentFilter {
            store_id: Some(store_id),
            from: Some(from),
            to: Some(to),
            status: None,
        };
        let sales = self
            .repos
            .ledger
            .list_sales(scope.tenant_id, &filter, Page::all())
            .await
            .map_err(internal("list sales"))?;
        let returns = self
            .repos
            .ledger
            .list_returns(scope.tenant_id, &filter)
            .await
            .map_err(internal("list returns"))?;

        let mut summary = SalesSummary {
            store_id,
            from,
            to,
            completed: 0,
            voided: 0,
            gross: Decimal::ZERO,
            promo_discounts: Decimal::ZERO,
            tax: Decimal::ZERO,
            net: Decimal::ZERO,
            returns: 0,
            returns_total: Decimal::ZERO,
        };
        for sale in &sales {
            match sale.status {
                DocumentStatus::Completed => {
                    summary.completed += 1;
                    summary.gross += sale.subtotal;
                    summary.promo_discounts += sale.promo_discount;
                    summary.tax += sale.tax;
                    summary.net += sale.total;
                }
                DocumentStatus::Voided => summary.voided += 1,
            }
        }
        for doc in returns.iter().filter(|r| r.kind == ReturnKind::Sales) {
            summary.returns += 1;
            summary.returns_total += doc.total;
        }
        Ok(summary)
    }
}


//! Sales and purchase returns

use super::{internal, sum_quantities, Service};
use crate::contract::model::{
    DocumentKind, DocumentStatus, NewReturnLine, ReturnDoc, ReturnKind, ReturnLine, TenantScope,
};
use crate::contract::PosError;
use crate::domain::events::ChangeEvent;
use crate::domain::pricing::{line_amount, sum_amounts, unit_refund};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// One line of the source document, priced per unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceLine {
    product_id: Uuid,
    quantity: i64,
    unit_amount: Decimal,
}

/// Source document reduced to what a return needs
struct ReturnSource {
    kind: ReturnKind,
    id: Uuid,
    store_id: Uuid,
    number: String,
    status: DocumentStatus,
    lines: Vec<SourceLine>,
}

impl Service {
    /// Customer brings goods of a completed sale back
    pub async fn create_sales_return(
        &self,
        scope: &TenantScope,
        sale_id: Uuid,
        lines: Vec<NewReturnLine>,
        reason: Option<String>,
    ) -> Result<ReturnDoc, PosError> {
        let store_id = self.get_sale(scope, sale_id).await?.store_id;
        let _store_lock = self.store_locks.lock(scope.tenant_id, store_id).await;
        let sale = self.get_sale(scope, sale_id).await?;
        let source = ReturnSource {
            kind: ReturnKind::Sales,
            id: sale.id,
            store_id: sale.store_id,
            number: sale.number,
            status: sale.status,
            lines: sale
                .lines
                .iter()
                .map(|l| SourceLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_amount: unit_refund(l.subtotal, l.quantity),
                })
                .collect(),
        };
        self.create_return(scope, source, lines, reason).await
    }

    /// Goods of a completed purchase go back to the supplier
    pub async fn create_purchase_return(
        &self,
        scope: &TenantScope,
        purchase_id: Uuid,
        lines: Vec<NewReturnLine>,
        reason: Option<String>,
    ) -> Result<ReturnDoc, PosError> {
        let store_id = self.get_purchase(scope, purchase_id).await?.store_id;
        let _store_lock = self.store_locks.lock(scope.tenant_id, store_id).await;
        let purchase = self.get_purchase(scope, purchase_id).await?;
        let source = ReturnSource {
            kind: ReturnKind::Purchase,
            id: purchase.id,
            store_id: purchase.store_id,
            number: purchase.number,
            status: purchase.status,
            lines: purchase
                .lines
                .iter()
                .map(|l| SourceLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_amount: l.unit_cost,
                })
                .collect(),
        };
        self.create_return(scope, source, lines, reason).await
    }

    pub async fn get_return(&self, scope: &TenantScope, id: Uuid) -> Result<ReturnDoc, PosError> {
        let doc = self
            .repos
            .ledger
            .find_return(scope.tenant_id, id)
            .await
            .map_err(internal("find return"))?
            .ok_or_else(|| PosError::not_found("return", id))?;
        self.ensure_store_scope(scope, doc.store_id)?;
        Ok(doc)
    }

    /// Returns reversing one sale or purchase, oldest first
    pub async fn list_returns_for(
        &self,
        scope: &TenantScope,
        source_id: Uuid,
    ) -> Result<Vec<ReturnDoc>, PosError> {
        let docs = self
            .repos
            .ledger
            .list_returns_for(scope.tenant_id, source_id)
            .await
            .map_err(internal("list returns"))?;
        Ok(docs
            .into_iter()
            .filter(|d| scope.allows_store(d.store_id))
            .collect())
    }

    async fn create_return(
        &self,
        scope: &TenantScope,
        source: ReturnSource,
        lines: Vec<NewReturnLine>,
        reason: Option<String>,
    ) -> Result<ReturnDoc, PosError> {
        if source.status != DocumentStatus::Completed {
            return Err(PosError::conflict(format!(
                "{} is {} and cannot be returned",
                source.number, source.status
            )));
        }
        if lines.is_empty() {
            return Err(PosError::validation("a return needs at least one line"));
        }

        if let Some(line) = lines.iter().find(|l| l.quantity <= 0) {
            return Err(PosError::validation(format!(
                "quantity for product {} must be positive",
                line.product_id
            )));
        }

        let previous = self
            .repos
            .ledger
            .list_returns_for(scope.tenant_id, source.id)
            .await
            .map_err(internal("list returns"))?;
        let mut already: HashMap<Uuid, i64> = HashMap::new();
        for line in previous.iter().flat_map(|d| &d.lines) {
            *already.entry(line.product_id).or_default() += line.quantity;
        }

        let requested = sum_quantities(lines.iter().map(|l| (l.product_id, l.quantity)));
        for &(product_id, quantity) in &requested {
            let sold: i64 = source
                .lines
                .iter()
                .filter(|l| l.product_id == product_id)
                .map(|l| l.quantity)
                .sum();
            if sold == 0 {
                return Err(PosError::validation(format!(
                    "product {} is not on {}",
                    product_id, source.number
                )));
            }
            let returned = already.get(&product_id).copied().unwrap_or(0);
            if returned + quantity > sold {
                return Err(PosError::validation(format!(
                    "cannot return {} of product {}: {} of {} already returned",
                    quantity, product_id, returned, sold
                )));
            }
        }

        if source.kind == ReturnKind::Purchase {
            self.ensure_stock_covers(scope.tenant_id, source.store_id, &requested)
                .await?;
        }

        let mut remaining = remaining_by_product(&source.lines, &already);
        let mut return_lines: Vec<ReturnLine> = Vec::with_capacity(lines.len());
        for line in &lines {
            let queue = remaining.entry(line.product_id).or_default();
            for (quantity, unit_amount) in take_oldest(queue, line.quantity) {
                return_lines.push(ReturnLine {
                    id: Uuid::new_v4(),
                    product_id: line.product_id,
                    quantity,
                    unit_amount,
                    subtotal: line_amount("return line amount", unit_amount, quantity)?,
                });
            }
        }
        let total = sum_amounts("return total", return_lines.iter().map(|l| l.subtotal))?;

        let now = Utc::now();
        let document_kind = match source.kind {
            ReturnKind::Sales => DocumentKind::SalesReturn,
            ReturnKind::Purchase => DocumentKind::PurchaseReturn,
        };
        let doc = ReturnDoc {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            store_id: source.store_id,
            kind: source.kind,
            source_id: source.id,
            number: self
                .next_number(scope.tenant_id, document_kind, now)
                .await?,
            total,
            lines: return_lines,
            reason: reason.filter(|r| !r.trim().is_empty()),
            actor: scope.actor.clone(),
            occurred_at: now,
        };

        let saved = self
            .repos
            .ledger
            .insert_return(&doc)
            .await
            .map_err(internal("insert return"))?;

        self.evict_stock(scope.tenant_id, Some(saved.store_id));
        self.publish(ChangeEvent::return_doc(&saved)).await;
        self.audit(
            scope,
            Some(saved.store_id),
            &format!("{}_return.create", saved.kind),
            "returns",
            saved.id,
            json!({
                "number": saved.number,
                "source": source.number,
                "total": saved.total.to_string(),
            }),
        )
        .await;

        tracing::info!(
            tenant_id = %scope.tenant_id,
            number = %saved.number,
            source = %source.number,
            "return recorded"
        );
        Ok(saved)
    }
}

/// Unreturned `(quantity, unit_amount)` slices per product, source order
///
/// Earlier returns are taken to have consumed the oldest lines first.
fn remaining_by_product(
    lines: &[SourceLine],
    already: &HashMap<Uuid, i64>,
) -> HashMap<Uuid, VecDeque<(i64, Decimal)>> {
    let mut consumed = already.clone();
    let mut remaining: HashMap<Uuid, VecDeque<(i64, Decimal)>> = HashMap::new();
    for line in lines {
        let used = consumed.entry(line.product_id).or_default();
        let taken = (*used).min(line.quantity);
        *used -= taken;
        if line.quantity > taken {
            remaining
                .entry(line.product_id)
                .or_default()
                .push_back((line.quantity - taken, line.unit_amount));
        }
    }
    remaining
}

/// Take `quantity` from the front of `queue`, merging equal unit amounts
fn take_oldest(queue: &mut VecDeque<(i64, Decimal)>, mut quantity: i64) -> Vec<(i64, Decimal)> {
    let mut taken: Vec<(i64, Decimal)> = Vec::new();
    while quantity > 0 {
        let Some(front) = queue.front_mut() else {
            break;
        };
        let portion = front.0.min(quantity);
        let unit_amount = front.1;
        front.0 -= portion;
        if front.0 == 0 {
            queue.pop_front();
        }
        quantity -= portion;
        match taken.last_mut() {
            Some(last) if last.1 == unit_amount => last.0 += portion,
            _ => taken.push((portion, unit_amount)),
        }
    }
    taken
}

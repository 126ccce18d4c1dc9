//! Stock opname: physical counts that become the stock baseline

use super::{internal, Service};
use crate::contract::model::{
    ChangeKind, DocumentKind, OpnameCount, OpnameLine, OpnameStatus, StockOpname, TenantScope,
};
use crate::contract::PosError;
use crate::domain::events::ChangeEvent;
use crate::domain::stock::compute_levels;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

impl Service {
    /// Open an empty draft count for a store
    pub async fn create_opname(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
        note: Option<String>,
    ) -> Result<StockOpname, PosError> {
        let store = self.require_store(scope, store_id).await?;
        let now = Utc::now();
        let opname = StockOpname {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            store_id: store.id,
            number: self
                .next_number(scope.tenant_id, DocumentKind::StockOpname, now)
                .await?,
            status: OpnameStatus::Draft,
            note: note.filter(|n| !n.trim().is_empty()),
            actor: scope.actor.clone(),
            lines: Vec::new(),
            created_at: now,
            counted_at: None,
        };

        let saved = self
            .repos
            .ledger
            .insert_opname(&opname)
            .await
            .map_err(internal("insert opname"))?;

        self.publish(ChangeEvent::opname(&saved, ChangeKind::Insert))
            .await;
        self.audit(
            scope,
            Some(saved.store_id),
            "opname.create",
            "stock_opnames",
            saved.id,
            json!({ "number": saved.number }),
        )
        .await;
        Ok(saved)
    }

    /// Add or replace counted quantities on a draft
    pub async fn record_counts(
        &self,
        scope: &TenantScope,
        id: Uuid,
        counts: Vec<OpnameCount>,
    ) -> Result<StockOpname, PosError> {
        let mut opname = self.get_opname(scope, id).await?;
        ensure_draft(&opname)?;
        if counts.is_empty() {
            return Err(PosError::validation("no counts given"));
        }

        for count in &counts {
            if count.counted < 0 {
                return Err(PosError::validation(format!(
                    "counted quantity for product {} cannot be negative",
                    count.product_id
                )));
            }
            self.require_product_in_store(scope.tenant_id, count.product_id, opname.store_id)
                .await?;
        }

        for count in counts {
            match opname
                .lines
                .iter_mut()
                .find(|l| l.product_id == count.product_id)
            {
                Some(line) => line.counted = count.counted,
                None => opname.lines.push(OpnameLine {
                    product_id: count.product_id,
                    counted: count.counted,
                    system: None,
                    difference: None,
                }),
            }
        }

        let saved = self
            .repos
            .ledger
            .update_opname(&opname)
            .await
            .map_err(internal("update opname"))?;

        self.publish(ChangeEvent::opname(&saved, ChangeKind::Update))
            .await;
        Ok(saved)
    }

    /// Freeze a draft: fill system quantities and make its counts the baseline
    pub async fn finalize_opname(&self, scope: &TenantScope, id: Uuid) -> Result<StockOpname, PosError> {
        let mut opname = self.get_opname(scope, id).await?;
        ensure_draft(&opname)?;
        if opname.lines.is_empty() {
            return Err(PosError::validation(format!(
                "opname {} has no counted lines",
                opname.number
            )));
        }

        let now = Utc::now();
        let ledger = self
            .repos
            .ledger
            .load_stock_ledger(scope.tenant_id, opname.store_id)
            .await
            .map_err(internal("load stock ledger"))?;
        let system: HashMap<Uuid, i64> = compute_levels(&ledger, Some(now))
            .into_iter()
            .map(|level| (level.product_id, level.on_hand))
            .collect();

        for line in &mut opname.lines {
            let on_hand = system.get(&line.product_id).copied().unwrap_or(0);
            line.system = Some(on_hand);
            line.difference = Some(line.counted - on_hand);
        }
        opname.status = OpnameStatus::Finalized;
        opname.counted_at = Some(now);

        let saved = self
            .repos
            .ledger
            .update_opname(&opname)
            .await
            .map_err(internal("finalize opname"))?;

        self.evict_stock(scope.tenant_id, Some(saved.store_id));
        self.publish(ChangeEvent::opname(&saved, ChangeKind::Update))
            .await;
        let net_difference: i64 = saved.lines.iter().filter_map(|l| l.difference).sum();
        self.audit(
            scope,
            Some(saved.store_id),
            "opname.finalize",
            "stock_opnames",
            saved.id,
            json!({
                "number": saved.number,
                "lines": saved.lines.len(),
                "net_difference": net_difference,
            }),
        )
        .await;

        tracing::info!(
            tenant_id = %scope.tenant_id,
            number = %saved.number,
            lines = saved.lines.len(),
            net_difference,
            "stock opname finalized"
        );
        Ok(saved)
    }

    pub async fn get_opname(&self, scope: &TenantScope, id: Uuid) -> Result<StockOpname, PosError> {
        let opname = self
            .repos
            .ledger
            .find_opname(scope.tenant_id, id)
            .await
            .map_err(internal("find opname"))?
            .ok_or_else(|| PosError::not_found("stock opname", id))?;
        self.ensure_store_scope(scope, opname.store_id)?;
        Ok(opname)
    }

    /// Newest first
    pub async fn list_opnames(
        &self,
        scope: &TenantScope,
        store_id: Uuid,
    ) -> Result<Vec<StockOpname>, PosError> {
        self.require_store(scope, store_id).await?;
        self.repos
            .ledger
            .list_opnames(scope.tenant_id, store_id)
            .await
            .map_err(internal("list opnames"))
    }
}

fn ensure_draft(opname: &StockOpname) -> Result<(), PosError> {
    if opname.status != OpnameStatus::Draft {
        return Err(PosError::conflict(format!(
            "opname {} is {}",
            opname.number, opname.status
        )));
    }
    Ok(())
}

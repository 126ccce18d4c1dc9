//! Domain service - business logic orchestration
//!
//! Operations are grouped by area in the submodules; each adds an
//! `impl Service` block. Every write follows the same tail: persist, evict
//! derived stock of the touched stores, publish a change event, append an
//! audit entry. Publish and audit failures are logged and never fail the
//! write.

mod admin;
mod catalog;
mod opname;
mod parties;
mod purchasing;
mod returns;
mod sales;
mod stock;

use super::events::{ChangeEvent, ChangePublisher};
use super::repository::{
    AuditRepository, CatalogRepository, ConfigRepository, LedgerRepository, PartyRepository,
    PromoRepository, TenantRepository,
};
use super::stock::{compute_levels, StockCache, StoreLocks};
use crate::config::Config;
use crate::contract::model::{
    AuditEntry, DocumentKind, Page, Product, StockLevel, Store, TenantScope,
};
use crate::contract::PosError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Storage ports used by the service
#[derive(Clone)]
pub struct Repositories {
    pub tenants: Arc<dyn TenantRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
    pub parties: Arc<dyn PartyRepository>,
    pub promos: Arc<dyn PromoRepository>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub config: Arc<dyn ConfigRepository>,
}

/// Domain service for the POS module
pub struct Service {
    repos: Repositories,
    publisher: Arc<dyn ChangePublisher>,
    config: Config,
    stock_cache: StockCache,
    store_locks: StoreLocks,
}

impl Service {
    /// Create a new service instance
    pub fn new(repos: Repositories, publisher: Arc<dyn ChangePublisher>, config: Config) -> Self {
        Self {
            repos,
            publisher,
            config,
            stock_cache: StockCache::new(),
            store_locks: StoreLocks::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Page from optional request parameters, clamped by configuration
    pub fn page(&self, limit: Option<u64>, offset: Option<u64>) -> Page {
        Page::new(self.config.page_limit(limit), offset.unwrap_or(0))
    }

    /// Number of stores whose stock snapshot is currently cached
    pub fn cached_stock_snapshots(&self) -> usize {
        self.stock_cache.cached_len()
    }

    // ===== Shared helpers =====

    /// Fail with `Forbidden` when the scope is pinned to another store
    fn ensure_store_scope(&self, scope: &TenantScope, store_id: Uuid) -> Result<(), PosError> {
        if scope.allows_store(store_id) {
            Ok(())
        } else {
            Err(forbidden_store(store_id))
        }
    }

    /// Resolve the scope's store filter against a requested one
    fn effective_store(
        &self,
        scope: &TenantScope,
        requested: Option<Uuid>,
    ) -> Result<Option<Uuid>, PosError> {
        match (scope.store_id, requested) {
            (Some(pinned), Some(store_id)) if pinned != store_id => Err(forbidden_store(store_id)),
            (Some(pinned), _) => Ok(Some(pinned)),
            (None, requested) => Ok(requested),
        }
    }

    /// Store of the scope's tenant, permitted by the scope
    async fn require_store(&self, scope: &TenantScope, store_id: Uuid) -> Result<Store, PosError> {
        self.ensure_store_scope(scope, store_id)?;
        self.repos
            .tenants
            .find_store(scope.tenant_id, store_id)
            .await
            .map_err(internal("find store"))?
            .ok_or_else(|| PosError::not_found("store", store_id))
    }

    async fn require_product(&self, tenant_id: Uuid, id: Uuid) -> Result<Product, PosError> {
        self.repos
            .catalog
            .find_product(tenant_id, id)
            .await
            .map_err(internal("find product"))?
            .filter(|p| p.deleted_at.is_none())
            .ok_or_else(|| PosError::not_found("product", id))
    }

    /// Live product that can move in or out of `store_id`
    async fn require_product_in_store(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        store_id: Uuid,
    ) -> Result<Product, PosError> {
        let product = self.require_product(tenant_id, id).await?;
        if !product.available_in(store_id) {
            return Err(PosError::validation(format!(
                "product {} is not sold in store {}",
                product.sku, store_id
            )));
        }
        Ok(product)
    }

    /// Next `<PREFIX>-<YYYYMMDD>-<NNNN>` number for the tenant
    async fn next_number(
        &self,
        tenant_id: Uuid,
        kind: DocumentKind,
        at: DateTime<Utc>,
    ) -> Result<String, PosError> {
        let day = at.date_naive();
        let issued = self
            .repos
            .ledger
            .count_documents(tenant_id, kind, day)
            .await
            .map_err(internal("count documents"))?;
        Ok(format_number(kind, at, issued + 1))
    }

    /// Current stock of a store, served from cache when possible
    async fn current_levels(
        &self,
        tenant_id: Uuid,
        store_id: Uuid,
    ) -> Result<Arc<Vec<StockLevel>>, PosError> {
        let generation = match self.stock_cache.lookup(tenant_id, store_id) {
            Ok(snapshot) => return Ok(snapshot),
            Err(generation) => generation,
        };

        let ledger = self
            .repos
            .ledger
            .load_stock_ledger(tenant_id, store_id)
            .await
            .map_err(internal("load stock ledger"))?;
        let snapshot = Arc::new(compute_levels(&ledger, None));

        if !self
            .stock_cache
            .store(tenant_id, store_id, generation, snapshot.clone())
        {
            tracing::debug!(%tenant_id, %store_id, "stock changed while computing, snapshot not cached");
        }
        Ok(snapshot)
    }

    /// On-hand quantity of one product, 0 when the store does not list it
    fn on_hand(levels: &[StockLevel], product_id: Uuid) -> i64 {
        levels
            .iter()
            .find(|level| level.product_id == product_id)
            .map_or(0, |level| level.on_hand)
    }

    /// Fail with `InsufficientStock` when removing `quantities` would go negative
    async fn ensure_stock_covers(
        &self,
        tenant_id: Uuid,
        store_id: Uuid,
        quantities: &[(Uuid, i64)],
    ) -> Result<(), PosError> {
        if self.config.allow_negative_stock {
            return Ok(());
        }
        let levels = self.current_levels(tenant_id, store_id).await?;
        for &(product_id, requested) in quantities {
            let available = Self::on_hand(&levels, product_id);
            if requested > available {
                return Err(PosError::InsufficientStock {
                    product_id,
                    available,
                    requested,
                });
            }
        }
        Ok(())
    }

    fn evict_stock(&self, tenant_id: Uuid, store_id: Option<Uuid>) {
        match store_id {
            Some(store_id) => self.stock_cache.evict(tenant_id, store_id),
            None => self.stock_cache.evict_tenant(tenant_id),
        }
    }

    async fn publish(&self, event: ChangeEvent) {
        let table = event.table;
        if let Err(e) = self.publisher.publish(event).await {
            tracing::warn!(%table, error = %e, "failed to publish change event");
        }
    }

    async fn audit(
        &self,
        scope: &TenantScope,
        store_id: Option<Uuid>,
        action: &str,
        entity: &str,
        entity_id: Uuid,
        detail: serde_json::Value,
    ) {
        if !self.config.audit_enabled {
            return;
        }
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            tenant_id: scope.tenant_id,
            store_id,
            actor: scope.actor.clone(),
            action: action.to_string(),
            entity: entity.to_string(),
            entity_id,
            detail,
            at: Utc::now(),
        };
        if let Err(e) = self.repos.audit.append(&entry).await {
            tracing::warn!(action, %entity_id, error = %e, "failed to append audit entry");
        }
    }
}

/// Log a storage failure and hide it behind `PosError::Internal`
fn internal(context: &'static str) -> impl Fn(anyhow::Error) -> PosError {
    move |e| {
        tracing::error!(error = ?e, "{} failed", context);
        PosError::Internal
    }
}

fn forbidden_store(store_id: Uuid) -> PosError {
    PosError::Forbidden {
        reason: format!("scope does not cover store {}", store_id),
    }
}

/// Sum quantities per product, keeping first occurrence order
fn sum_quantities(lines: impl IntoIterator<Item = (Uuid, i64)>) -> Vec<(Uuid, i64)> {
    let mut totals: Vec<(Uuid, i64)> = Vec::new();
    for (product_id, quantity) in lines {
        match totals.iter_mut().find(|(id, _)| *id == product_id) {
            Some((_, total)) => *total += quantity,
            None => totals.push((product_id, quantity)),
        }
    }
    totals
}

fn format_number(kind: DocumentKind, at: DateTime<Utc>, sequence: u64) -> String {
    format!("{}-{}-{:04}", kind.prefix(), at.format("%Y%m%d"), sequence)
}

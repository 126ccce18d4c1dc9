//! Derived stock aggregation
//!
//! Stock is never stored. For each product in a store it is folded from the
//! store's ledger: a baseline (opening stock or the latest finalized physical
//! count) plus every completed movement after that baseline.

use crate::contract::model::{
    BaselineSource, OpnameStatus, Purchase, ReturnDoc, ReturnKind, Sale, StockLevel, StockOpname,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    Purchase,
    Sale,
    SalesReturn,
    PurchaseReturn,
}

/// One line of a completed document, reduced to what stock needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMovement {
    pub product_id: Uuid,
    pub kind: MovementKind,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// One line of a finalized stock opname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRecord {
    pub opname_id: Uuid,
    pub product_id: Uuid,
    pub counted: i64,
    pub counted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerProduct {
    pub product_id: Uuid,
    pub home_store_id: Option<Uuid>,
    pub opening_stock: i64,
}

/// Everything needed to derive the stock of one store
///
/// Repositories fill this with live products available in the store,
/// movements of completed non-deleted documents of the store and lines of
/// the store's finalized opnames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockLedger {
    pub store_id: Uuid,
    pub products: Vec<LedgerProduct>,
    pub movements: Vec<StockMovement>,
    pub counts: Vec<CountRecord>,
}

impl StockLedger {
    /// Flatten loaded documents into a ledger. Document status is not
    /// checked here; callers pass completed sales and purchases only.
    /// Opnames that are not finalized are skipped.
    pub fn assemble(
        store_id: Uuid,
        products: Vec<LedgerProduct>,
        sales: &[Sale],
        purchases: &[Purchase],
        returns: &[ReturnDoc],
        opnames: &[StockOpname],
    ) -> Self {
        let mut movements = Vec::new();
        for sale in sales {
            movements.extend(sale.lines.iter().map(|l| StockMovement {
                product_id: l.product_id,
                kind: MovementKind::Sale,
                quantity: l.quantity,
                occurred_at: sale.occurred_at,
            }));
        }
        for purchase in purchases {
            movements.extend(purchase.lines.iter().map(|l| StockMovement {
                product_id: l.product_id,
                kind: MovementKind::Purchase,
                quantity: l.quantity,
                occurred_at: purchase.occurred_at,
            }));
        }
        for doc in returns {
            let kind = match doc.kind {
                ReturnKind::Sales => MovementKind::SalesReturn,
                ReturnKind::Purchase => MovementKind::PurchaseReturn,
            };
            movements.extend(doc.lines.iter().map(|l| StockMovement {
                product_id: l.product_id,
                kind,
                quantity: l.quantity,
                occurred_at: doc.occurred_at,
            }));
        }

        let mut counts = Vec::new();
        for opname in opnames.iter().filter(|o| o.status == OpnameStatus::Finalized) {
            let Some(counted_at) = opname.counted_at else {
                continue;
            };
            counts.extend(opname.lines.iter().map(|l| CountRecord {
                opname_id: opname.id,
                product_id: l.product_id,
                counted: l.counted,
                counted_at,
            }));
        }

        Self {
            store_id,
            products,
            movements,
            counts,
        }
    }
}

/// Fold the ledger into one level per listed product, in product order.
///
/// With `at`, movements and counts after that instant are ignored.
/// Movements of products not listed are skipped.
pub fn compute_levels(ledger: &StockLedger, at: Option<DateTime<Utc>>) -> Vec<StockLevel> {
    let visible = |ts: DateTime<Utc>| at.map_or(true, |limit| ts <= limit);

    let mut latest_counts: HashMap<Uuid, &CountRecord> = HashMap::new();
    for count in ledger.counts.iter().filter(|c| visible(c.counted_at)) {
        latest_counts
            .entry(count.product_id)
            .and_modify(|current| {
                if count.counted_at > current.counted_at {
                    *current = count;
                }
            })
            .or_insert(count);
    }

    let mut levels: Vec<StockLevel> = ledger
        .products
        .iter()
        .map(|product| {
            let (baseline, baseline_source) = match latest_counts.get(&product.product_id) {
                Some(count) => (
                    count.counted,
                    BaselineSource::Opname {
                        opname_id: count.opname_id,
                        counted_at: count.counted_at,
                    },
                ),
                None if product.home_store_id == Some(ledger.store_id) => {
                    (product.opening_stock, BaselineSource::Opening)
                }
                None => (0, BaselineSource::Opening),
            };
            StockLevel {
                product_id: product.product_id,
                store_id: ledger.store_id,
                baseline,
                baseline_source,
                purchased: 0,
                sold: 0,
                sales_returned: 0,
                purchase_returned: 0,
                on_hand: baseline,
            }
        })
        .collect();

    let index: HashMap<Uuid, usize> = levels
        .iter()
        .enumerate()
        .map(|(i, level)| (level.product_id, i))
        .collect();

    for movement in ledger.movements.iter().filter(|m| visible(m.occurred_at)) {
        let Some(&i) = index.get(&movement.product_id) else {
            continue;
        };
        let level = &mut levels[i];
        if let BaselineSource::Opname { counted_at, .. } = level.baseline_source {
            // The count already reflects everything up to and including counted_at.
            if movement.occurred_at <= counted_at {
                continue;
            }
        }
        match movement.kind {
            MovementKind::Purchase => level.purchased += movement.quantity,
            MovementKind::Sale => level.sold += movement.quantity,
            MovementKind::SalesReturn => level.sales_returned += movement.quantity,
            MovementKind::PurchaseReturn => level.purchase_returned += movement.quantity,
        }
    }

    for level in &mut levels {
        level.on_hand = level.baseline + level.purchased - level.sold + level.sales_returned
            - level.purchase_returned;
    }
    levels
}

type CacheKey = (Uuid, Uuid);

#[derive(Default)]
struct CacheSlot {
    generation: u64,
    snapshot: Option<Arc<Vec<StockLevel>>>,
}

/// Memoized stock snapshots per (tenant, store)
///
/// Each slot carries a generation bumped on eviction. A reader records the
/// generation before loading the ledger and may only store its snapshot if
/// no eviction happened in between, so a slow computation can never
/// resurrect data older than a concurrent write.
#[derive(Default)]
pub struct StockCache {
    slots: DashMap<CacheKey, CacheSlot>,
}

impl StockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached snapshot, or the generation to pass to [`StockCache::store`]
    pub fn lookup(&self, tenant_id: Uuid, store_id: Uuid) -> Result<Arc<Vec<StockLevel>>, u64> {
        let slot = self.slots.entry((tenant_id, store_id)).or_default();
        match &slot.snapshot {
            Some(snapshot) => Ok(snapshot.clone()),
            None => Err(slot.generation),
        }
    }

    /// Store a snapshot computed since `generation` was observed
    pub fn store(
        &self,
        tenant_id: Uuid,
        store_id: Uuid,
        generation: u64,
        snapshot: Arc<Vec<StockLevel>>,
    ) -> bool {
        let mut slot = self.slots.entry((tenant_id, store_id)).or_default();
        if slot.generation != generation {
            return false;
        }
        slot.snapshot = Some(snapshot);
        true
    }

    pub fn evict(&self, tenant_id: Uuid, store_id: Uuid) {
        let mut slot = self.slots.entry((tenant_id, store_id)).or_default();
        slot.generation += 1;
        slot.snapshot = None;
    }

    /// Evict every store of a tenant (catalog-wide changes)
    pub fn evict_tenant(&self, tenant_id: Uuid) {
        for mut slot in self.slots.iter_mut() {
            if slot.key().0 == tenant_id {
                slot.generation += 1;
                slot.snapshot = None;
            }
        }
    }

    /// Number of stores with a live snapshot
    pub fn cached_len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.snapshot.is_some()).count()
    }
}

/// Per-store locks held from a stock check through the write it guards
///
/// Two checkouts of the last unit must not both pass the on-hand check, so
/// stock-consuming writes of one (tenant, store) run one at a time.
#[derive(Default)]
pub struct StoreLocks {
    locks: DashMap<CacheKey, Arc<Mutex<()>>>,
}

impl StoreLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, tenant_id: Uuid, store_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry((tenant_id, store_id)).or_default().clone();
        lock.lock_owned().await
    }
}

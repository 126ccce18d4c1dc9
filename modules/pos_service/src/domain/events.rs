/// Row-change events emitted by the domain service
///
/// Every successful write produces one `ChangeEvent` describing the table,
/// the kind of change and the stores/products it touched. Publishers decide
/// where events go: the realtime publisher fans them out to subscribed
/// channels, the no-op publisher drops them.
use crate::contract::model::{
    ChangeKind, ChangeTable, Purchase, ReturnDoc, Sale, StockOpname,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One row-level change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
    pub tenant_id: Uuid,
    pub store_id: Option<Uuid>,
    /// Primary key of the changed row (document id for documents)
    pub record_id: Uuid,
    /// Products whose derived stock may have moved
    pub product_ids: Vec<Uuid>,
    pub occurred_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(table: ChangeTable, kind: ChangeKind, tenant_id: Uuid, record_id: Uuid) -> Self {
        Self {
            table,
            kind,
            tenant_id,
            store_id: None,
            record_id,
            product_ids: Vec::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn in_store(mut self, store_id: Option<Uuid>) -> Self {
        self.store_id = store_id;
        self
    }

    /// Attach product ids, keeping first occurrence order
    pub fn with_products(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        for id in ids {
            if !self.product_ids.contains(&id) {
                self.product_ids.push(id);
            }
        }
        self
    }

    pub fn sale(sale: &Sale, kind: ChangeKind) -> Self {
        Self::new(ChangeTable::Sales, kind, sale.tenant_id, sale.id)
            .in_store(Some(sale.store_id))
            .with_products(sale.lines.iter().map(|l| l.product_id))
    }

    pub fn purchase(purchase: &Purchase, kind: ChangeKind) -> Self {
        Self::new(ChangeTable::Purchases, kind, purchase.tenant_id, purchase.id)
            .in_store(Some(purchase.store_id))
            .with_products(purchase.lines.iter().map(|l| l.product_id))
    }

    pub fn return_doc(doc: &ReturnDoc) -> Self {
        Self::new(ChangeTable::Returns, ChangeKind::Insert, doc.tenant_id, doc.id)
            .in_store(Some(doc.store_id))
            .with_products(doc.lines.iter().map(|l| l.product_id))
    }

    pub fn opname(opname: &StockOpname, kind: ChangeKind) -> Self {
        Self::new(ChangeTable::StockOpnames, kind, opname.tenant_id, opname.id)
            .in_store(Some(opname.store_id))
            .with_products(opname.lines.iter().map(|l| l.product_id))
    }

    /// The `stock_levels` event implied by this change, if any
    pub fn derived_stock(&self) -> Option<ChangeEvent> {
        if !self.table.affects_stock() {
            return None;
        }
        Some(ChangeEvent {
            table: ChangeTable::StockLevels,
            kind: ChangeKind::Update,
            tenant_id: self.tenant_id,
            store_id: self.store_id,
            record_id: self.record_id,
            product_ids: self.product_ids.clone(),
            occurred_at: self.occurred_at,
        })
    }
}

/// Sink for change events
///
/// Implementations must not block: the service awaits `publish` on the
/// request path. Errors are logged by the caller and never fail the write.
#[async_trait::async_trait]
pub trait ChangePublisher: Send + Sync {
    async fn publish(&self, event: ChangeEvent) -> anyhow::Result<()>;
}

/// No-op publisher for testing or when realtime is disabled
pub struct NoOpChangePublisher;

#[async_trait::async_trait]
impl ChangePublisher for NoOpChangePublisher {
    async fn publish(&self, _event: ChangeEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

//! Common test utilities: in-memory storage, a recording publisher and a
//! seeded tenant with two stores
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use pos_service::config::Config;
use pos_service::contract::*;
use pos_service::domain::repository::*;
use pos_service::domain::stock::{LedgerProduct, StockLedger};
use pos_service::domain::{ChangeEvent, ChangePublisher, Repositories, Service};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

pub fn money(value: i64) -> Decimal {
    Decimal::from(value)
}

fn paginate<T>(items: Vec<T>, page: Page) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

fn on_day(at: DateTime<Utc>, day: NaiveDate) -> bool {
    at.date_naive() == day
}

fn in_period(at: DateTime<Utc>, filter: &DocumentFilter) -> bool {
    filter.from.map_or(true, |from| at >= from) && filter.to.map_or(true, |to| at < to)
}

// ===== In-memory storage =====

#[derive(Default)]
struct Tables {
    tenants: HashMap<Uuid, Tenant>,
    stores: HashMap<Uuid, Store>,
    products: HashMap<Uuid, Product>,
    groups: HashMap<Uuid, ProductGroup>,
    parties: HashMap<Uuid, Party>,
    promos: HashMap<Uuid, Promo>,
    sales: HashMap<Uuid, Sale>,
    purchases: HashMap<Uuid, Purchase>,
    returns: HashMap<Uuid, ReturnDoc>,
    opnames: HashMap<Uuid, StockOpname>,
    audit: Vec<AuditEntry>,
    config: HashMap<(Uuid, String), ConfigEntry>,
}

/// All repositories over one set of in-memory tables
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_audit: AtomicBool,
    ledger_loads: std::sync::atomic::AtomicUsize,
    write_delay_ms: std::sync::atomic::AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            tenants: self.clone(),
            catalog: self.clone(),
            parties: self.clone(),
            promos: self.clone(),
            ledger: self.clone(),
            audit: self.clone(),
            config: self.clone(),
        }
    }

    /// Make every audit append fail
    pub fn fail_audit(&self, fail: bool) {
        self.fail_audit.store(fail, Ordering::SeqCst);
    }

    /// Sleep before storing documents, so concurrent writers interleave
    pub fn delay_writes(&self, delay: std::time::Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.write_delay_ms.store(millis, Ordering::SeqCst);
    }

    async fn write_pause(&self) {
        let millis = self.write_delay_ms.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
        }
    }

    /// How often a stock ledger was loaded (cache misses)
    pub fn ledger_loads(&self) -> usize {
        self.ledger_loads.load(Ordering::SeqCst)
    }

    pub fn audit_len(&self) -> usize {
        self.tables.read().audit.len()
    }

    pub fn raw_product(&self, id: Uuid) -> Option<Product> {
        self.tables.read().products.get(&id).cloned()
    }
}

#[async_trait]
impl TenantRepository for MemoryStore {
    async fn create_tenant(&self, tenant: &Tenant) -> anyhow::Result<Tenant> {
        self.tables.write().tenants.insert(tenant.id, tenant.clone());
        Ok(tenant.clone())
    }

    async fn find_tenant(&self, id: Uuid) -> anyhow::Result<Option<Tenant>> {
        Ok(self.tables.read().tenants.get(&id).cloned())
    }

    async fn create_store(&self, store: &Store) -> anyhow::Result<Store> {
        self.tables.write().stores.insert(store.id, store.clone());
        Ok(store.clone())
    }

    async fn find_store(&self, tenant_id: Uuid, id: Uuid) -> anyhow::Result<Option<Store>> {
        Ok(self
            .tables
            .read()
            .stores
            .get(&id)
            .filter(|s| s.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_stores(&self, tenant_id: Uuid) -> anyhow::Result<Vec<Store>> {
        let mut stores: Vec<Store> = self
            .tables
            .read()
            .stores
            .values()
            .filter(|s| s.tenant_id == tenant_id)
            .cloned()
            .collect();
        stores.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stores)
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn save_product(&self, product: &Product) -> anyhow::Result<Product> {
        self.tables.write().products.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn find_product(&self, tenant_id: Uuid, id: Uuid) -> anyhow::Result<Option<Product>> {
        Ok(self
            .tables
            .read()
            .products
            .get(&id)
            .filter(|p| p.tenant_id == tenant_id && p.deleted_at.is_none())
            .cloned())
    }

    async fn find_product_by_sku(
        &self,
        tenant_id: Uuid,
        sku: &str,
    ) -> anyhow::Result<Option<Product>> {
        Ok(self
            .tables
            .read()
            .products
            .values()
            .find(|p| p.tenant_id == tenant_id && p.deleted_at.is_none() && p.sku == sku)
            .cloned())
    }

    async fn list_products(
        &self,
        tenant_id: Uuid,
        filter: &ProductFilter,
        page: Page,
    ) -> anyhow::Result<Vec<Product>> {
        let search = filter.search.as_ref().map(|s| s.to_lowercase());
        let mut products: Vec<Product> = self
            .tables
            .read()
            .products
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.deleted_at.is_none())
            .filter(|p| {
                search.as_ref().map_or(true, |s| {
                    p.name.to_lowercase().contains(s)
                        || p.sku.to_lowercase().contains(s)
                        || p
                            .barcode
                            .as_ref()
                            .is_some_and(|b| b.to_lowercase().contains(s))
                })
            })
            .filter(|p| filter.category_id.map_or(true, |c| p.category_id == Some(c)))
            .filter(|p| filter.brand_id.map_or(true, |b| p.brand_id == Some(b)))
            .filter(|p| filter.store_id.map_or(true, |s| p.available_in(s)))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(paginate(products, page))
    }

    async fn count_products_in_group(
        &self,
        tenant_id: Uuid,
        group_id: Uuid,
    ) -> anyhow::Result<u64> {
        let count = self
            .tables
            .read()
            .products
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.deleted_at.is_none())
            .filter(|p| p.category_id == Some(group_id) || p.brand_id == Some(group_id))
            .count();
        Ok(count as u64)
    }

    async fn save_group(&self, group: &ProductGroup) -> anyhow::Result<ProductGroup> {
        self.tables.write().groups.insert(group.id, group.clone());
        Ok(group.clone())
    }

    async fn find_group(&self, tenant_id: Uuid, id: Uuid) -> anyhow::Result<Option<ProductGroup>> {
        Ok(self
            .tables
            .read()
            .groups
            .get(&id)
            .filter(|g| g.tenant_id == tenant_id && g.deleted_at.is_none())
            .cloned())
    }

    async fn list_groups(
        &self,
        tenant_id: Uuid,
        kind: GroupKind,
    ) -> anyhow::Result<Vec<ProductGroup>> {
        let mut groups: Vec<ProductGroup> = self
            .tables
            .read()
            .groups
            .values()
            .filter(|g| g.tenant_id == tenant_id && g.kind == kind && g.deleted_at.is_none())
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }
}

#[async_trait]
impl PartyRepository for MemoryStore {
    async fn save_party(&self, party: &Party) -> anyhow::Result<Party> {
        self.tables.write().parties.insert(party.id, party.clone());
        Ok(party.clone())
    }

    async fn find_party(&self, tenant_id: Uuid, id: Uuid) -> anyhow::Result<Option<Party>> {
        Ok(self
            .tables
            .read()
            .parties
            .get(&id)
            .filter(|p| p.tenant_id == tenant_id && p.deleted_at.is_none())
            .cloned())
    }

    async fn list_parties(
        &self,
        tenant_id: Uuid,
        kind: PartyKind,
        search: Option<&str>,
        page: Page,
    ) -> anyhow::Result<Vec<Party>> {
        let search = search.map(str::to_lowercase);
        let mut parties: Vec<Party> = self
            .tables
            .read()
            .parties
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.kind == kind && p.deleted_at.is_none())
            .filter(|p| {
                search
                    .as_ref()
                    .map_or(true, |s| p.name.to_lowercase().contains(s))
            })
            .cloned()
            .collect();
        parties.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(parties, page))
    }
}

#[async_trait]
impl PromoRepository for MemoryStore {
    async fn save_promo(&self, promo: &Promo) -> anyhow::Result<Promo> {
        self.tables.write().promos.insert(promo.id, promo.clone());
        Ok(promo.clone())
    }

    async fn find_promo_by_code(
        &self,
        tenant_id: Uuid,
        code: &str,
    ) -> anyhow::Result<Option<Promo>> {
        Ok(self
            .tables
            .read()
            .promos
            .values()
            .find(|p| p.tenant_id == tenant_id && p.code == code)
            .cloned())
    }

    async fn list_promos(&self, tenant_id: Uuid) -> anyhow::Result<Vec<Promo>> {
        let mut promos: Vec<Promo> = self
            .tables
            .read()
            .promos
            .values()
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .collect();
        promos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(promos)
    }
}

#[async_trait]
impl LedgerRepository for MemoryStore {
    async fn count_documents(
        &self,
        tenant_id: Uuid,
        kind: DocumentKind,
        day: NaiveDate,
    ) -> anyhow::Result<u64> {
        let tables = self.tables.read();
        let count = match kind {
            DocumentKind::Sale => tables
                .sales
                .values()
                .filter(|d| d.tenant_id == tenant_id && on_day(d.occurred_at, day))
                .count(),
            DocumentKind::Purchase => tables
                .purchases
                .values()
                .filter(|d| d.tenant_id == tenant_id && on_day(d.occurred_at, day))
                .count(),
            DocumentKind::SalesReturn | DocumentKind::PurchaseReturn => {
                let return_kind = if kind == DocumentKind::SalesReturn {
                    ReturnKind::Sales
                } else {
                    ReturnKind::Purchase
                };
                tables
                    .returns
                    .values()
                    .filter(|d| {
                        d.tenant_id == tenant_id
                            && d.kind == return_kind
                            && on_day(d.occurred_at, day)
                    })
                    .count()
            }
            DocumentKind::StockOpname => tables
                .opnames
                .values()
                .filter(|d| d.tenant_id == tenant_id && on_day(d.created_at, day))
                .count(),
        };
        Ok(count as u64)
    }

    async fn insert_sale(&self, sale: &Sale) -> anyhow::Result<Sale> {
        self.write_pause().await;
        self.tables.write().sales.insert(sale.id, sale.clone());
        Ok(sale.clone())
    }

    async fn find_sale(&self, tenant_id: Uuid, id: Uuid) -> anyhow::Result<Option<Sale>> {
        Ok(self
            .tables
            .read()
            .sales
            .get(&id)
            .filter(|s| s.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_sales(
        &self,
        tenant_id: Uuid,
        filter: &DocumentFilter,
        page: Page,
    ) -> anyhow::Result<Vec<Sale>> {
        let mut sales: Vec<Sale> = self
            .tables
            .read()
            .sales
            .values()
            .filter(|s| s.tenant_id == tenant_id)
            .filter(|s| filter.store_id.map_or(true, |id| s.store_id == id))
            .filter(|s| filter.status.map_or(true, |st| s.status == st))
            .filter(|s| in_period(s.occurred_at, filter))
            .cloned()
            .collect();
        sales.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.number.cmp(&a.number))
        });
        Ok(paginate(sales, page))
    }

    async fn set_sale_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: DocumentStatus,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut tables = self.tables.write();
        let sale = tables
            .sales
            .get_mut(&id)
            .filter(|s| s.tenant_id == tenant_id)
            .ok_or_else(|| anyhow::anyhow!("sale {} not stored", id))?;
        sale.status = status;
        sale.voided_at = (status == DocumentStatus::Voided).then_some(at);
        Ok(())
    }

    async fn insert_purchase(&self, purchase: &Purchase) -> anyhow::Result<Purchase> {
        self.tables
            .write()
            .purchases
            .insert(purchase.id, purchase.clone());
        Ok(purchase.clone())
    }

    async fn find_purchase(&self, tenant_id: Uuid, id: Uuid) -> anyhow::Result<Option<Purchase>> {
        Ok(self
            .tables
            .read()
            .purchases
            .get(&id)
            .filter(|p| p.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_purchases(
        &self,
        tenant_id: Uuid,
        filter: &DocumentFilter,
        page: Page,
    ) -> anyhow::Result<Vec<Purchase>> {
        let mut purchases: Vec<Purchase> = self
            .tables
            .read()
            .purchases
            .values()
            .filter(|p| p.tenant_id == tenant_id)
            .filter(|p| filter.store_id.map_or(true, |id| p.store_id == id))
            .filter(|p| filter.status.map_or(true, |st| p.status == st))
            .filter(|p| in_period(p.occurred_at, filter))
            .cloned()
            .collect();
        purchases.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| b.number.cmp(&a.number))
        });
        Ok(paginate(purchases, page))
    }

    async fn set_purchase_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        status: DocumentStatus,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut tables = self.tables.write();
        let purchase = tables
            .purchases
            .get_mut(&id)
            .filter(|p| p.tenant_id == tenant_id)
            .ok_or_else(|| anyhow::anyhow!("purchase {} not stored", id))?;
        purchase.status = status;
        purchase.voided_at = (status == DocumentStatus::Voided).then_some(at);
        Ok(())
    }

    async fn insert_return(&self, doc: &ReturnDoc) -> anyhow::Result<ReturnDoc> {
        self.write_pause().await;
        self.tables.write().returns.insert(doc.id, doc.clone());
        Ok(doc.clone())
    }

    async fn find_return(&self, tenant_id: Uuid, id: Uuid) -> anyhow::Result<Option<ReturnDoc>> {
        Ok(self
            .tables
            .read()
            .returns
            .get(&id)
            .filter(|r| r.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_returns_for(
        &self,
        tenant_id: Uuid,
        source_id: Uuid,
    ) -> anyhow::Result<Vec<ReturnDoc>> {
        let mut docs: Vec<ReturnDoc> = self
            .tables
            .read()
            .returns
            .values()
            .filter(|r| r.tenant_id == tenant_id && r.source_id == source_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(docs)
    }

    async fn list_returns(
        &self,
        tenant_id: Uuid,
        filter: &DocumentFilter,
    ) -> anyhow::Result<Vec<ReturnDoc>> {
        let mut docs: Vec<ReturnDoc> = self
            .tables
            .read()
            .returns
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .filter(|r| filter.store_id.map_or(true, |id| r.store_id == id))
            .filter(|r| in_period(r.occurred_at, filter))
            .cloned()
            .collect();
        docs.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(docs)
    }

    async fn insert_opname(&self, opname: &StockOpname) -> anyhow::Result<StockOpname> {
        self.tables.write().opnames.insert(opname.id, opname.clone());
        Ok(opname.clone())
    }

    async fn update_opname(&self, opname: &StockOpname) -> anyhow::Result<StockOpname> {
        self.tables.write().opnames.insert(opname.id, opname.clone());
        Ok(opname.clone())
    }

    async fn find_opname(&self, tenant_id: Uuid, id: Uuid) -> anyhow::Result<Option<StockOpname>> {
        Ok(self
            .tables
            .read()
            .opnames
            .get(&id)
            .filter(|o| o.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_opnames(
        &self,
        tenant_id: Uuid,
        store_id: Uuid,
    ) -> anyhow::Result<Vec<StockOpname>> {
        let mut opnames: Vec<StockOpname> = self
            .tables
            .read()
            .opnames
            .values()
            .filter(|o| o.tenant_id == tenant_id && o.store_id == store_id)
            .cloned()
            .collect();
        opnames.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(opnames)
    }

    async fn load_stock_ledger(
        &self,
        tenant_id: Uuid,
        store_id: Uuid,
    ) -> anyhow::Result<StockLedger> {
        self.ledger_loads.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read();

        let mut products: Vec<&Product> = tables
            .products
            .values()
            .filter(|p| {
                p.tenant_id == tenant_id && p.deleted_at.is_none() && p.available_in(store_id)
            })
            .collect();
        products.sort_by(|a, b| a.sku.cmp(&b.sku));
        let products = products
            .into_iter()
            .map(|p| LedgerProduct {
                product_id: p.id,
                home_store_id: p.store_id,
                opening_stock: p.opening_stock,
            })
            .collect();

        let in_store = |t: Uuid, s: Uuid| t == tenant_id && s == store_id;
        let sales: Vec<Sale> = tables
            .sales
            .values()
            .filter(|d| in_store(d.tenant_id, d.store_id) && d.status == DocumentStatus::Completed)
            .cloned()
            .collect();
        let purchases: Vec<Purchase> = tables
            .purchases
            .values()
            .filter(|d| in_store(d.tenant_id, d.store_id) && d.status == DocumentStatus::Completed)
            .cloned()
            .collect();
        let returns: Vec<ReturnDoc> = tables
            .returns
            .values()
            .filter(|d| in_store(d.tenant_id, d.store_id))
            .cloned()
            .collect();
        let opnames: Vec<StockOpname> = tables
            .opnames
            .values()
            .filter(|d| in_store(d.tenant_id, d.store_id))
            .cloned()
            .collect();

        Ok(StockLedger::assemble(
            store_id, products, &sales, &purchases, &returns, &opnames,
        ))
    }
}

#[async_trait]
impl AuditRepository for MemoryStore {
    async fn append(&self, entry: &AuditEntry) -> anyhow::Result<()> {
        if self.fail_audit.load(Ordering::SeqCst) {
            anyhow::bail!("audit log unavailable");
        }
        self.tables.write().audit.push(entry.clone());
        Ok(())
    }

    async fn list(&self, tenant_id: Uuid, limit: u64) -> anyhow::Result<Vec<AuditEntry>> {
        let mut entries: Vec<AuditEntry> = self
            .tables
            .read()
            .audit
            .iter()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect();
        // Stable sort keeps append order for entries sharing a timestamp
        entries.reverse();
        entries.sort_by(|a, b| b.at.cmp(&a.at));
        entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(entries)
    }
}

#[async_trait]
impl ConfigRepository for MemoryStore {
    async fn get(&self, tenant_id: Uuid, key: &str) -> anyhow::Result<Option<ConfigEntry>> {
        Ok(self
            .tables
            .read()
            .config
            .get(&(tenant_id, key.to_string()))
            .cloned())
    }

    async fn upsert(&self, entry: &ConfigEntry) -> anyhow::Result<ConfigEntry> {
        self.tables
            .write()
            .config
            .insert((entry.tenant_id, entry.key.clone()), entry.clone());
        Ok(entry.clone())
    }

    async fn list(&self, tenant_id: Uuid) -> anyhow::Result<Vec<ConfigEntry>> {
        let mut entries: Vec<ConfigEntry> = self
            .tables
            .read()
            .config
            .values()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    async fn delete(&self, tenant_id: Uuid, key: &str) -> anyhow::Result<bool> {
        Ok(self
            .tables
            .write()
            .config
            .remove(&(tenant_id, key.to_string()))
            .is_some())
    }
}

// ===== Publisher =====

/// Keeps every published event; can be told to fail
#[derive(Default)]
pub struct RecordingPublisher {
    events: RwLock<Vec<ChangeEvent>>,
    fail: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.read().clone()
    }

    pub fn tables(&self) -> Vec<ChangeTable> {
        self.events.read().iter().map(|e| e.table).collect()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl ChangePublisher for RecordingPublisher {
    async fn publish(&self, event: ChangeEvent) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("broker unavailable");
        }
        self.events.write().push(event);
        Ok(())
    }
}

// ===== Fixture =====

/// A tenant with two stores ("Pusat" and "Cabang") over fresh storage
pub struct Fixture {
    pub service: Arc<Service>,
    pub storage: Arc<MemoryStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub tenant: Tenant,
    pub main: Store,
    pub branch: Store,
    /// Tenant-wide scope acting as "owner"
    pub scope: TenantScope,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let storage = MemoryStore::new();
        let publisher = RecordingPublisher::new();
        let service = Arc::new(Service::new(
            storage.repositories(),
            publisher.clone(),
            config,
        ));

        let tenant = service.create_tenant("Toko Makmur").await.unwrap();
        let scope = TenantScope::tenant(tenant.id).with_actor("owner");
        let main = service
            .create_store(&scope, "Pusat", Some("Jl. Merdeka 1".to_string()))
            .await
            .unwrap();
        let branch = service.create_store(&scope, "Cabang", None).await.unwrap();
        publisher.clear();

        Self {
            service,
            storage,
            publisher,
            tenant,
            main,
            branch,
            scope,
        }
    }

    /// Scope pinned to one store, acting as "kasir"
    pub fn cashier(&self, store_id: Uuid) -> TenantScope {
        TenantScope::store(self.tenant.id, store_id).with_actor("kasir")
    }

    pub fn new_product(sku: &str, store_id: Option<Uuid>, opening_stock: i64) -> NewProduct {
        NewProduct {
            store_id,
            sku: sku.to_string(),
            barcode: None,
            name: format!("Produk {}", sku),
            category_id: None,
            brand_id: None,
            unit: "pcs".to_string(),
            cost_price: money(7_000),
            sell_price: money(10_000),
            opening_stock,
            min_stock: 0,
        }
    }

    /// Product homed in the main store
    pub async fn product(&self, sku: &str, opening_stock: i64) -> Product {
        self.service
            .create_product(&self.scope, Self::new_product(sku, Some(self.main.id), opening_stock))
            .await
            .unwrap()
    }

    pub async fn party(&self, kind: PartyKind, name: &str) -> Party {
        self.service
            .create_party(
                &self.scope,
                NewParty {
                    kind,
                    name: name.to_string(),
                    phone: None,
                    email: None,
                    address: None,
                },
            )
            .await
            .unwrap()
    }

    pub fn cash_sale(&self, store_id: Uuid, lines: &[(Uuid, i64)], paid: i64) -> NewSale {
        NewSale {
            store_id,
            customer_id: None,
            promo_code: None,
            lines: lines
                .iter()
                .map(|&(product_id, quantity)| NewSaleLine {
                    product_id,
                    quantity,
                    unit_price: None,
                    discount: Decimal::ZERO,
                })
                .collect(),
            paid: money(paid),
            payment_method: PaymentMethod::Cash,
            note: None,
        }
    }

    pub fn purchase_of(
        &self,
        store_id: Uuid,
        supplier_id: Uuid,
        lines: &[(Uuid, i64, i64)],
    ) -> NewPurchase {
        NewPurchase {
            store_id,
            supplier_id,
            lines: lines
                .iter()
                .map(|&(product_id, quantity, unit_cost)| NewPurchaseLine {
                    product_id,
                    quantity,
                    unit_cost: money(unit_cost),
                })
                .collect(),
            note: None,
        }
    }

    pub async fn on_hand(&self, store_id: Uuid, product_id: Uuid) -> i64 {
        self.service
            .stock_level(&self.scope, store_id, product_id)
            .await
            .unwrap()
            .on_hand
    }
}

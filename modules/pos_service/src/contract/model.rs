//! Contract models for the POS service
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models. REST DTOs live in
//! `api::rest::dto`, storage rows in `infra::storage::entity`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ===== Scoping =====

/// Caller scope applied to every operation, the service-side equivalent of
/// row-level security.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    /// Tenant whose rows are visible
    pub tenant_id: Uuid,
    /// When set, only this store may be read or written
    pub store_id: Option<Uuid>,
    /// User or device recorded on documents and audit entries
    pub actor: Option<String>,
}

impl TenantScope {
    /// Scope covering every store of a tenant
    pub fn tenant(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            store_id: None,
            actor: None,
        }
    }

    /// Scope pinned to a single store
    pub fn store(tenant_id: Uuid, store_id: Uuid) -> Self {
        Self {
            tenant_id,
            store_id: Some(store_id),
            actor: None,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Whether the scope permits touching `store_id`
    pub fn allows_store(&self, store_id: Uuid) -> bool {
        self.store_id.map_or(true, |pinned| pinned == store_id)
    }
}

/// Offset pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Everything, used internally for aggregation
    pub fn all() -> Self {
        Self {
            limit: u64::MAX,
            offset: 0,
        }
    }
}

// ===== Administration =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A physical shop ("toko") of a tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tenant-level key/value configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    pub tenant_id: Uuid,
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Option<Uuid>,
    pub actor: Option<String>,
    /// Dotted action name, e.g. `sale.create`
    pub action: String,
    /// Table the action touched
    pub entity: String,
    pub entity_id: Uuid,
    pub detail: serde_json::Value,
    pub at: DateTime<Utc>,
}

// ===== Catalog =====

/// Discriminates the two product classifiers sharing one table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Category,
    Brand,
}

/// Category or brand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductGroup {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub kind: GroupKind,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Home store; `None` means the product is sold in every store
    pub store_id: Option<Uuid>,
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub unit: String,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
    /// Stock in the home store before any document was recorded
    pub opening_stock: i64,
    /// Reorder threshold used by the low-stock report
    pub min_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether the product can be moved in or out of `store_id`
    pub fn available_in(&self, store_id: Uuid) -> bool {
        self.store_id.map_or(true, |home| home == store_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub store_id: Option<Uuid>,
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub unit: String,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
    pub opening_stock: i64,
    pub min_stock: i64,
}

/// Partial product update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub unit: Option<String>,
    pub cost_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,
    pub min_stock: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of name, sku or barcode
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    /// Products available in this store
    pub store_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartyKind {
    Customer,
    Supplier,
}

/// Customer or supplier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub kind: PartyKind,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParty {
    pub kind: PartyKind,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promo {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// Upper-case redemption code
    pub code: String,
    pub name: String,
    pub percent_off: Decimal,
    pub max_discount: Option<Decimal>,
    pub min_purchase: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Promo {
    /// Whether the promo can be redeemed at `at`
    pub fn is_redeemable_at(&self, at: DateTime<Utc>) -> bool {
        self.active && self.starts_at <= at && self.ends_at.map_or(true, |end| at < end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPromo {
    pub code: String,
    pub name: String,
    pub percent_off: Decimal,
    pub max_discount: Option<Decimal>,
    pub min_purchase: Decimal,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

// ===== Documents =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Qris,
}

/// Status shared by sales and purchases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    Completed,
    Voided,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
    /// Line-level discount in currency
    pub discount: Decimal,
    /// `quantity * unit_price - discount`
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub number: String,
    pub customer_id: Option<Uuid>,
    pub promo_id: Option<Uuid>,
    pub lines: Vec<SaleLine>,
    pub subtotal: Decimal,
    pub promo_discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub paid: Decimal,
    pub change: Decimal,
    pub payment_method: PaymentMethod,
    pub status: DocumentStatus,
    pub note: Option<String>,
    pub actor: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub voided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSaleLine {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Defaults to the product's sell price
    pub unit_price: Option<Decimal>,
    pub discount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    pub store_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub promo_code: Option<String>,
    pub lines: Vec<NewSaleLine>,
    pub paid: Decimal,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub store_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub number: String,
    pub supplier_id: Uuid,
    pub lines: Vec<PurchaseLine>,
    pub total: Decimal,
    pub status: DocumentStatus,
    pub note: Option<String>,
    pub actor: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub voided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPurchaseLine {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPurchase {
    pub store_id: Uuid,
    pub supplier_id: Uuid,
    pub lines: Vec<NewPurchaseLine>,
    pub note: Option<String>,
}

/// Which document a return reverses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    /// Customer brings goods back; stock goes up
    Sales,
    /// Goods sent back to the supplier; stock goes down
    Purchase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_amount: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnDoc {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub kind: ReturnKind,
    /// Sale or purchase being reversed
    pub source_id: Uuid,
    pub number: String,
    pub lines: Vec<ReturnLine>,
    pub total: Decimal,
    pub reason: Option<String>,
    pub actor: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReturnLine {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpnameStatus {
    Draft,
    Finalized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpnameLine {
    pub product_id: Uuid,
    pub counted: i64,
    /// System stock at finalization
    pub system: Option<i64>,
    /// `counted - system`
    pub difference: Option<i64>,
}

/// Physical inventory count of one store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockOpname {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub store_id: Uuid,
    pub number: String,
    pub status: OpnameStatus,
    pub note: Option<String>,
    pub actor: Option<String>,
    pub lines: Vec<OpnameLine>,
    pub created_at: DateTime<Utc>,
    pub counted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpnameCount {
    pub product_id: Uuid,
    pub counted: i64,
}

/// Document families numbered per tenant and day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Sale,
    Purchase,
    SalesReturn,
    PurchaseReturn,
    StockOpname,
}

impl DocumentKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Sale => "INV",
            Self::Purchase => "PO",
            Self::SalesReturn => "RS",
            Self::PurchaseReturn => "RP",
            Self::StockOpname => "SO",
        }
    }
}

// ===== Stock =====

/// Where a stock level's starting quantity comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineSource {
    /// Product opening stock (home store only)
    Opening,
    /// Latest finalized physical count
    Opname {
        opname_id: Uuid,
        counted_at: DateTime<Utc>,
    },
}

/// Derived stock of one product in one store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub baseline: i64,
    pub baseline_source: BaselineSource,
    pub purchased: i64,
    pub sold: i64,
    pub sales_returned: i64,
    pub purchase_returned: i64,
    pub on_hand: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowStockItem {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub on_hand: i64,
    pub min_stock: i64,
}

/// Dashboard totals for one store and period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesSummary {
    pub store_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub completed: u64,
    pub voided: u64,
    pub gross: Decimal,
    pub promo_discounts: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
    pub returns: u64,
    pub returns_total: Decimal,
}

// ===== Realtime =====

/// Tables whose row changes are broadcast on realtime channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeTable {
    Stores,
    Products,
    ProductGroups,
    Parties,
    Promos,
    Sales,
    Purchases,
    Returns,
    StockOpnames,
    Config,
    /// Derived table, emitted whenever a stock-affecting table changes
    StockLevels,
}

impl ChangeTable {
    pub const ALL: [ChangeTable; 11] = [
        Self::Stores,
        Self::Products,
        Self::ProductGroups,
        Self::Parties,
        Self::Promos,
        Self::Sales,
        Self::Purchases,
        Self::Returns,
        Self::StockOpnames,
        Self::Config,
        Self::StockLevels,
    ];

    /// Whether a change in this table can move derived stock
    pub fn affects_stock(self) -> bool {
        matches!(
            self,
            Self::Products | Self::Sales | Self::Purchases | Self::Returns | Self::StockOpnames
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

// ===== String forms =====

/// Error returned when parsing an enum from its wire/storage string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// `as_str`, `Display` and `FromStr` over a fixed set of lowercase names
macro_rules! string_enum {
    ($ty:ident, $label:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(GroupKind, "group kind", {
    Category => "category",
    Brand => "brand",
});

string_enum!(PartyKind, "party kind", {
    Customer => "customer",
    Supplier => "supplier",
});

string_enum!(PaymentMethod, "payment method", {
    Cash => "cash",
    Card => "card",
    Transfer => "transfer",
    Qris => "qris",
});

string_enum!(DocumentStatus, "document status", {
    Completed => "completed",
    Voided => "voided",
});

string_enum!(ReturnKind, "return kind", {
    Sales => "sales",
    Purchase => "purchase",
});

string_enum!(OpnameStatus, "opname status", {
    Draft => "draft",
    Finalized => "finalized",
});

string_enum!(ChangeTable, "table", {
    Stores => "stores",
    Products => "products",
    ProductGroups => "product_groups",
    Parties => "parties",
    Promos => "promos",
    Sales => "sales",
    Purchases => "purchases",
    Returns => "returns",
    StockOpnames => "stock_opnames",
    Config => "config",
    StockLevels => "stock_levels",
});

string_enum!(ChangeKind, "change kind", {
    Insert => "insert",
    Update => "update",
    Delete => "delete",
});

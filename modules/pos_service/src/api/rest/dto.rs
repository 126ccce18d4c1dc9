//! REST DTOs with serde derives for HTTP API
//!
//! Enum-valued fields travel as their lowercase names (`cash`, `voided`,
//! `supplier`, ...). Money is a decimal string.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// List envelope
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> ListResponse<T> {
    pub fn from_models<M>(models: Vec<M>) -> Self
    where
        M: Into<T>,
    {
        let items: Vec<T> = models.into_iter().map(Into::into).collect();
        let total = items.len();
        Self { items, total }
    }
}

// ===== Administration =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TenantDto {
    pub id: Uuid,
    #[schema(example = "Toko Makmur Group")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTenantRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreDto {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateStoreRequest {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfigEntryDto {
    #[schema(example = "receipt.footer")]
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetConfigRequest {
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEntryDto {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[schema(example = "sale.create")]
    pub action: String,
    pub entity: String,
    pub entity_id: Uuid,
    pub detail: serde_json::Value,
    pub at: DateTime<Utc>,
}

// ===== Catalog =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductGroupDto {
    pub id: Uuid,
    #[schema(example = "category")]
    pub kind: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductGroupRequest {
    #[schema(example = "brand")]
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RenameProductGroupRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDto {
    pub id: Uuid,
    /// Home store; absent when sold everywhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<Uuid>,
    #[schema(example = "SKU-0001")]
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<Uuid>,
    #[schema(example = "pcs")]
    pub unit: String,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
    pub opening_stock: i64,
    pub min_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub store_id: Option<Uuid>,
    pub sku: String,
    #[serde(default)]
    pub barcode: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub brand_id: Option<Uuid>,
    pub unit: String,
    pub cost_price: Decimal,
    pub sell_price: Decimal,
    #[serde(default)]
    pub opening_stock: i64,
    #[serde(default)]
    pub min_stock: i64,
}

/// Omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub unit: Option<String>,
    pub cost_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,
    pub min_stock: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PartyDto {
    pub id: Uuid,
    #[schema(example = "customer")]
    pub kind: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePartyRequest {
    #[schema(example = "supplier")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePartyRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromoDto {
    pub id: Uuid,
    #[schema(example = "HEMAT10")]
    pub code: String,
    pub name: String,
    pub percent_off: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Decimal>,
    pub min_purchase: Decimal,
    pub starts_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePromoRequest {
    pub code: String,
    pub name: String,
    pub percent_off: Decimal,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub min_purchase: Decimal,
    /// Defaults to now
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

// ===== Documents =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleLineDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleDto {
    pub id: Uuid,
    pub store_id: Uuid,
    #[schema(example = "INV-20250301-0001")]
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_id: Option<Uuid>,
    pub lines: Vec<SaleLineDto>,
    pub subtotal: Decimal,
    pub promo_discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub paid: Decimal,
    pub change: Decimal,
    #[schema(example = "cash")]
    pub payment_method: String,
    #[schema(example = "completed")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSaleLineRequest {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Defaults to the product's sell price
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub discount: Decimal,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateSaleRequest {
    pub store_id: Uuid,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub promo_code: Option<String>,
    pub lines: Vec<CreateSaleLineRequest>,
    pub paid: Decimal,
    #[schema(example = "qris")]
    pub payment_method: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VoidRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseLineDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseDto {
    pub id: Uuid,
    pub store_id: Uuid,
    #[schema(example = "PO-20250301-0001")]
    pub number: String,
    pub supplier_id: Uuid,
    pub lines: Vec<PurchaseLineDto>,
    pub total: Decimal,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voided_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePurchaseLineRequest {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePurchaseRequest {
    pub store_id: Uuid,
    pub supplier_id: Uuid,
    pub lines: Vec<CreatePurchaseLineRequest>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReturnLineDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_amount: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReturnDto {
    pub id: Uuid,
    pub store_id: Uuid,
    #[schema(example = "sales")]
    pub kind: String,
    pub source_id: Uuid,
    #[schema(example = "RS-20250301-0001")]
    pub number: String,
    pub lines: Vec<ReturnLineDto>,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReturnLineRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReturnRequest {
    pub lines: Vec<CreateReturnLineRequest>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpnameLineDto {
    pub product_id: Uuid,
    pub counted: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockOpnameDto {
    pub id: Uuid,
    pub store_id: Uuid,
    #[schema(example = "SO-20250301-0001")]
    pub number: String,
    #[schema(example = "draft")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub lines: Vec<OpnameLineDto>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOpnameRequest {
    pub store_id: Uuid,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OpnameCountRequest {
    pub product_id: Uuid,
    pub counted: i64,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordCountsRequest {
    pub counts: Vec<OpnameCountRequest>,
}

// ===== Stock and reports =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockLevelDto {
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub baseline: i64,
    /// `opening` or `opname`
    pub baseline_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_opname_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_counted_at: Option<DateTime<Utc>>,
    pub purchased: i64,
    pub sold: i64,
    pub sales_returned: i64,
    pub purchase_returned: i64,
    pub on_hand: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LowStockItemDto {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub on_hand: i64,
    pub min_stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesSummaryDto {
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

/// Payload of an `invalidation` server-sent event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvalidationDto {
    #[schema(example = "realtime:6f1c0c2e-8a55-4f3e-9a7e-1d2f3c4b5a69:stock_levels")]
    pub channel: String,
    pub table: String,
    pub kinds: Vec<String>,
    pub record_ids: Vec<Uuid>,
    pub store_ids: Vec<Uuid>,
    pub product_ids: Vec<Uuid>,
    pub event_count: usize,
    pub first_at: DateTime<Utc>,
    pub last_at: DateTime<Utc>,
    pub resync: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelStatsDto {
    pub channel: String,
    pub table: String,
    pub subscribers: usize,
    pub events_received: u64,
    pub notices_sent: u64,
}

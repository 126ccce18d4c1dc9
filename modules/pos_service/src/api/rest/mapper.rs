//! Conversions between REST DTOs and contract models

use super::dto::*;
use crate::contract::model::*;
use crate::contract::PosError;
use crate::domain::realtime::{ChannelStats, Invalidation};
use std::str::FromStr;

/// Parse a lowercase enum name from a request body or query
pub fn parse_name<T>(field: &str, value: &str) -> Result<T, PosError>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|e: UnknownVariant| PosError::validation(format!("{}: {}", field, e)))
}

// ===== Administration =====

impl From<Tenant> for TenantDto {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            created_at: tenant.created_at,
        }
    }
}

impl From<Store> for StoreDto {
    fn from(store: Store) -> Self {
        Self {
            id: store.id,
            tenant_id: store.tenant_id,
            name: store.name,
            address: store.address,
            created_at: store.created_at,
        }
    }
}

impl From<ConfigEntry> for ConfigEntryDto {
    fn from(entry: ConfigEntry) -> Self {
        Self {
            key: entry.key,
            value: entry.value,
            updated_at: entry.updated_at,
        }
    }
}

impl From<AuditEntry> for AuditEntryDto {
    fn from(entry: AuditEntry) -> Self {
        Self {
            id: entry.id,
            store_id: entry.store_id,
            actor: entry.actor,
            action: entry.action,
            entity: entry.entity,
            entity_id: entry.entity_id,
            detail: entry.detail,
            at: entry.at,
        }
    }
}

// ===== Catalog =====

impl From<ProductGroup> for ProductGroupDto {
    fn from(group: ProductGroup) -> Self {
        Self {
            id: group.id,
            kind: group.kind.to_string(),
            name: group.name,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            store_id: product.store_id,
            sku: product.sku,
            barcode: product.barcode,
            name: product.name,
            category_id: product.category_id,
            brand_id: product.brand_id,
            unit: product.unit,
            cost_price: product.cost_price,
            sell_price: product.sell_price,
            opening_stock: product.opening_stock,
            min_stock: product.min_stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl From<CreateProductRequest> for NewProduct {
    fn from(req: CreateProductRequest) -> Self {
        Self {
            store_id: req.store_id,
            sku: req.sku,
            barcode: req.barcode,
            name: req.name,
            category_id: req.category_id,
            brand_id: req.brand_id,
            unit: req.unit,
            cost_price: req.cost_price,
            sell_price: req.sell_price,
            opening_stock: req.opening_stock,
            min_stock: req.min_stock,
        }
    }
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(req: UpdateProductRequest) -> Self {
        Self {
            name: req.name,
            barcode: req.barcode,
            category_id: req.category_id,
            brand_id: req.brand_id,
            unit: req.unit,
            cost_price: req.cost_price,
            sell_price: req.sell_price,
            min_stock: req.min_stock,
        }
    }
}

impl From<Party> for PartyDto {
    fn from(party: Party) -> Self {
        Self {
            id: party.id,
            kind: party.kind.to_string(),
            name: party.name,
            phone: party.phone,
            email: party.email,
            address: party.address,
            created_at: party.created_at,
            updated_at: party.updated_at,
        }
    }
}

impl TryFrom<CreatePartyRequest> for NewParty {
    type Error = PosError;

    fn try_from(req: CreatePartyRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: parse_name("kind", &req.kind)?,
            name: req.name,
            phone: req.phone,
            email: req.email,
            address: req.address,
        })
    }
}

impl From<UpdatePartyRequest> for PartyPatch {
    fn from(req: UpdatePartyRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            email: req.email,
            address: req.address,
        }
    }
}

impl From<Promo> for PromoDto {
    fn from(promo: Promo) -> Self {
        Self {
            id: promo.id,
            code: promo.code,
            name: promo.name,
            percent_off: promo.percent_off,
            max_discount: promo.max_discount,
            min_purchase: promo.min_purchase,
            starts_at: promo.starts_at,
            ends_at: promo.ends_at,
            active: promo.active,
            created_at: promo.created_at,
        }
    }
}

impl From<CreatePromoRequest> for NewPromo {
    fn from(req: CreatePromoRequest) -> Self {
        Self {
            code: req.code,
            name: req.name,
            percent_off: req.percent_off,
            max_discount: req.max_discount,
            min_purchase: req.min_purchase,
            starts_at: req.starts_at.unwrap_or_else(chrono::Utc::now),
            ends_at: req.ends_at,
        }
    }
}

// ===== Documents =====

impl From<Sale> for SaleDto {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            store_id: sale.store_id,
            number: sale.number,
            customer_id: sale.customer_id,
            promo_id: sale.promo_id,
            lines: sale
                .lines
                .into_iter()
                .map(|line| SaleLineDto {
                    id: line.id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discount: line.discount,
                    subtotal: line.subtotal,
                })
                .collect(),
            subtotal: sale.subtotal,
            promo_discount: sale.promo_discount,
            tax: sale.tax,
            total: sale.total,
            paid: sale.paid,
            change: sale.change,
            payment_method: sale.payment_method.to_string(),
            status: sale.status.to_string(),
            note: sale.note,
            actor: sale.actor,
            occurred_at: sale.occurred_at,
            voided_at: sale.voided_at,
        }
    }
}

impl TryFrom<CreateSaleRequest> for NewSale {
    type Error = PosError;

    fn try_from(req: CreateSaleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            store_id: req.store_id,
            customer_id: req.customer_id,
            promo_code: req.promo_code,
            lines: req
                .lines
                .into_iter()
                .map(|line| NewSaleLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discount: line.discount,
                })
                .collect(),
            paid: req.paid,
            payment_method: parse_name("payment_method", &req.payment_method)?,
            note: req.note,
        })
    }
}

impl From<Purchase> for PurchaseDto {
    fn from(purchase: Purchase) -> Self {
        Self {
            id: purchase.id,
            store_id: purchase.store_id,
            number: purchase.number,
            supplier_id: purchase.supplier_id,
            lines: purchase
                .lines
                .into_iter()
                .map(|line| PurchaseLineDto {
                    id: line.id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_cost: line.unit_cost,
                    subtotal: line.subtotal,
                })
                .collect(),
            total: purchase.total,
            status: purchase.status.to_string(),
            note: purchase.note,
            actor: purchase.actor,
            occurred_at: purchase.occurred_at,
            voided_at: purchase.voided_at,
        }
    }
}

impl From<CreatePurchaseRequest> for NewPurchase {
    fn from(req: CreatePurchaseRequest) -> Self {
        Self {
            store_id: req.store_id,
            supplier_id: req.supplier_id,
            lines: req
                .lines
                .into_iter()
                .map(|line| NewPurchaseLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_cost: line.unit_cost,
                })
                .collect(),
            note: req.note,
        }
    }
}

impl From<ReturnDoc> for ReturnDto {
    fn from(doc: ReturnDoc) -> Self {
        Self {
            id: doc.id,
            store_id: doc.store_id,
            kind: doc.kind.to_string(),
            source_id: doc.source_id,
            number: doc.number,
            lines: doc
                .lines
                .into_iter()
                .map(|line| ReturnLineDto {
                    id: line.id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_amount: line.unit_amount,
                    subtotal: line.subtotal,
                })
                .collect(),
            total: doc.total,
            reason: doc.reason,
            actor: doc.actor,
            occurred_at: doc.occurred_at,
        }
    }
}

impl From<CreateReturnLineRequest> for NewReturnLine {
    fn from(req: CreateReturnLineRequest) -> Self {
        Self {
            product_id: req.product_id,
            quantity: req.quantity,
        }
    }
}

impl From<StockOpname> for StockOpnameDto {
    fn from(opname: StockOpname) -> Self {
        Self {
            id: opname.id,
            store_id: opname.store_id,
            number: opname.number,
            status: opname.status.to_string(),
            note: opname.note,
            actor: opname.actor,
            lines: opname
                .lines
                .into_iter()
                .map(|line| OpnameLineDto {
                    product_id: line.product_id,
                    counted: line.counted,
                    system: line.system,
                    difference: line.difference,
                })
                .collect(),
            created_at: opname.created_at,
            counted_at: opname.counted_at,
        }
    }
}

impl From<OpnameCountRequest> for OpnameCount {
    fn from(req: OpnameCountRequest) -> Self {
        Self {
            product_id: req.product_id,
            counted: req.counted,
        }
    }
}

// ===== Stock and reports =====

impl From<StockLevel> for StockLevelDto {
    fn from(level: StockLevel) -> Self {
        let (source, opname_id, counted_at) = match level.baseline_source {
            BaselineSource::Opening => ("opening", None, None),
            BaselineSource::Opname {
                opname_id,
                counted_at,
            } => ("opname", Some(opname_id), Some(counted_at)),
        };
        Self {
            product_id: level.product_id,
            store_id: level.store_id,
            baseline: level.baseline,
            baseline_source: source.to_string(),
            baseline_opname_id: opname_id,
            baseline_counted_at: counted_at,
            purchased: level.purchased,
            sold: level.sold,
            sales_returned: level.sales_returned,
            purchase_returned: level.purchase_returned,
            on_hand: level.on_hand,
        }
    }
}

impl From<LowStockItem> for LowStockItemDto {
    fn from(item: LowStockItem) -> Self {
        Self {
            product_id: item.product_id,
            sku: item.sku,
            name: item.name,
            on_hand: item.on_hand,
            min_stock: item.min_stock,
        }
    }
}

impl From<SalesSummary> for SalesSummaryDto {
    fn from(summary: SalesSummary) -> Self {
        Self {
            store_id: summary.store_id,
            from: summary.from,
            to: summary.to,
            completed: summary.completed,
            voided: summary.voided,
            gross: summary.gross,
            promo_discounts: summary.promo_discounts,
            tax: summary.tax,
            net: summary.net,
            returns: summary.returns,
            returns_total: summary.returns_total,
        }
    }
}

// ===== Realtime =====

impl From<&Invalidation> for InvalidationDto {
    fn from(notice: &Invalidation) -> Self {
        Self {
            channel: notice.channel.clone(),
            table: notice.table.to_string(),
            kinds: notice.kinds.iter().map(ToString::to_string).collect(),
            record_ids: notice.record_ids.iter().copied().collect(),
            store_ids: notice.store_ids.iter().copied().collect(),
            product_ids: notice.product_ids.iter().copied().collect(),
            event_count: notice.event_count,
            first_at: notice.first_at,
            last_at: notice.last_at,
            resync: notice.resync,
        }
    }
}

impl From<ChannelStats> for ChannelStatsDto {
    fn from(stats: ChannelStats) -> Self {
        Self {
            channel: stats.channel,
            table: stats.table.to_string(),
            subscribers: stats.subscribers,
            events_received: stats.events_received,
            notices_sent: stats.notices_sent,
        }
    }
}

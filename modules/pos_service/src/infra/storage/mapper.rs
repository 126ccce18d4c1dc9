//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models. Rows whose enum
//! columns hold an unknown string fail to map instead of being guessed.

use super::entity;
use crate::contract::model::*;
use anyhow::Result;
use sea_orm::ActiveValue::Set;

// ===== Administration =====

impl From<entity::tenant::Model> for Tenant {
    fn from(entity: entity::tenant::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_at: entity.created_at,
        }
    }
}

impl From<&Tenant> for entity::tenant::ActiveModel {
    fn from(model: &Tenant) -> Self {
        Self {
            id: Set(model.id),
            name: Set(model.name.clone()),
            created_at: Set(model.created_at),
        }
    }
}

impl From<entity::store::Model> for Store {
    fn from(entity: entity::store::Model) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            name: entity.name,
            address: entity.address,
            created_at: entity.created_at,
        }
    }
}

impl From<&Store> for entity::store::ActiveModel {
    fn from(model: &Store) -> Self {
        Self {
            id: Set(model.id),
            tenant_id: Set(model.tenant_id),
            name: Set(model.name.clone()),
            address: Set(model.address.clone()),
            created_at: Set(model.created_at),
        }
    }
}

impl From<entity::system_config::Model> for ConfigEntry {
    fn from(entity: entity::system_config::Model) -> Self {
        Self {
            tenant_id: entity.tenant_id,
            key: entity.key,
            value: entity.value,
            updated_at: entity.updated_at,
        }
    }
}

impl From<&ConfigEntry> for entity::system_config::ActiveModel {
    fn from(model: &ConfigEntry) -> Self {
        Self {
            tenant_id: Set(model.tenant_id),
            key: Set(model.key.clone()),
            value: Set(model.value.clone()),
            updated_at: Set(model.updated_at),
        }
    }
}

impl From<entity::audit_log::Model> for AuditEntry {
    fn from(entity: entity::audit_log::Model) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            store_id: entity.store_id,
            actor: entity.actor,
            action: entity.action,
            entity: entity.entity,
            entity_id: entity.entity_id,
            detail: entity.detail,
            at: entity.at,
        }
    }
}

impl From<&AuditEntry> for entity::audit_log::ActiveModel {
    fn from(model: &AuditEntry) -> Self {
        Self {
            id: Set(model.id),
            tenant_id: Set(model.tenant_id),
            store_id: Set(model.store_id),
            actor: Set(model.actor.clone()),
            action: Set(model.action.clone()),
            entity: Set(model.entity.clone()),
            entity_id: Set(model.entity_id),
            detail: Set(model.detail.clone()),
            at: Set(model.at),
        }
    }
}

// ===== Catalog =====

impl TryFrom<entity::product_group::Model> for ProductGroup {
    type Error = anyhow::Error;

    fn try_from(entity: entity::product_group::Model) -> Result<Self> {
        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            kind: entity.kind.parse()?,
            name: entity.name,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        })
    }
}

impl From<&ProductGroup> for entity::product_group::ActiveModel {
    fn from(model: &ProductGroup) -> Self {
        Self {
            id: Set(model.id),
            tenant_id: Set(model.tenant_id),
            kind: Set(model.kind.as_str().to_string()),
            name: Set(model.name.clone()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
            deleted_at: Set(model.deleted_at),
        }
    }
}

impl From<entity::product::Model> for Product {
    fn from(entity: entity::product::Model) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            store_id: entity.store_id,
            sku: entity.sku,
            barcode: entity.barcode,
            name: entity.name,
            category_id: entity.category_id,
            brand_id: entity.brand_id,
            unit: entity.unit,
            cost_price: entity.cost_price,
            sell_price: entity.sell_price,
            opening_stock: entity.opening_stock,
            min_stock: entity.min_stock,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        }
    }
}

impl From<&Product> for entity::product::ActiveModel {
    fn from(model: &Product) -> Self {
        Self {
            id: Set(model.id),
            tenant_id: Set(model.tenant_id),
            store_id: Set(model.store_id),
            sku: Set(model.sku.clone()),
            barcode: Set(model.barcode.clone()),
            name: Set(model.name.clone()),
            category_id: Set(model.category_id),
            brand_id: Set(model.brand_id),
            unit: Set(model.unit.clone()),
            cost_price: Set(model.cost_price),
            sell_price: Set(model.sell_price),
            opening_stock: Set(model.opening_stock),
            min_stock: Set(model.min_stock),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
            deleted_at: Set(model.deleted_at),
        }
    }
}

impl TryFrom<entity::party::Model> for Party {
    type Error = anyhow::Error;

    fn try_from(entity: entity::party::Model) -> Result<Self> {
        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            kind: entity.kind.parse()?,
            name: entity.name,
            phone: entity.phone,
            email: entity.email,
            address: entity.address,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            deleted_at: entity.deleted_at,
        })
    }
}

impl From<&Party> for entity::party::ActiveModel {
    fn from(model: &Party) -> Self {
        Self {
            id: Set(model.id),
            tenant_id: Set(model.tenant_id),
            kind: Set(model.kind.as_str().to_string()),
            name: Set(model.name.clone()),
            phone: Set(model.phone.clone()),
            email: Set(model.email.clone()),
            address: Set(model.address.clone()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
            deleted_at: Set(model.deleted_at),
        }
    }
}

impl From<entity::promo::Model> for Promo {
    fn from(entity: entity::promo::Model) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            code: entity.code,
            name: entity.name,
            percent_off: entity.percent_off,
            max_discount: entity.max_discount,
            min_purchase: entity.min_purchase,
            starts_at: entity.starts_at,
            ends_at: entity.ends_at,
            active: entity.active,
            created_at: entity.created_at,
        }
    }
}

impl From<&Promo> for entity::promo::ActiveModel {
    fn from(model: &Promo) -> Self {
        Self {
            id: Set(model.id),
            tenant_id: Set(model.tenant_id),
            code: Set(model.code.clone()),
            name: Set(model.name.clone()),
            percent_off: Set(model.percent_off),
            max_discount: Set(model.max_discount),
            min_purchase: Set(model.min_purchase),
            starts_at: Set(model.starts_at),
            ends_at: Set(model.ends_at),
            active: Set(model.active),
            created_at: Set(model.created_at),
        }
    }
}

// ===== Documents =====

pub fn sale_from_rows(
    header: entity::sale::Model,
    mut items: Vec<entity::sale_item::Model>,
) -> Result<Sale> {
    items.sort_by_key(|item| item.position);
    Ok(Sale {
        id: header.id,
        tenant_id: header.tenant_id,
        store_id: header.store_id,
        number: header.number,
        customer_id: header.customer_id,
        promo_id: header.promo_id,
        lines: items
            .into_iter()
            .map(|item| SaleLine {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                discount: item.discount,
                subtotal: item.subtotal,
            })
            .collect(),
        subtotal: header.subtotal,
        promo_discount: header.promo_discount,
        tax: header.tax,
        total: header.total,
        paid: header.paid,
        change: header.change,
        payment_method: header.payment_method.parse()?,
        status: header.status.parse()?,
        note: header.note,
        actor: header.actor,
        occurred_at: header.occurred_at,
        voided_at: header.voided_at,
    })
}

pub fn sale_to_rows(
    sale: &Sale,
) -> (entity::sale::ActiveModel, Vec<entity::sale_item::ActiveModel>) {
    let header = entity::sale::ActiveModel {
        id: Set(sale.id),
        tenant_id: Set(sale.tenant_id),
        store_id: Set(sale.store_id),
        number: Set(sale.number.clone()),
        customer_id: Set(sale.customer_id),
        promo_id: Set(sale.promo_id),
        subtotal: Set(sale.subtotal),
        promo_discount: Set(sale.promo_discount),
        tax: Set(sale.tax),
        total: Set(sale.total),
        paid: Set(sale.paid),
        change: Set(sale.change),
        payment_method: Set(sale.payment_method.as_str().to_string()),
        status: Set(sale.status.as_str().to_string()),
        note: Set(sale.note.clone()),
        actor: Set(sale.actor.clone()),
        occurred_at: Set(sale.occurred_at),
        voided_at: Set(sale.voided_at),
    };
    let items = sale
        .lines
        .iter()
        .zip(0..)
        .map(|(line, position)| entity::sale_item::ActiveModel {
            id: Set(line.id),
            sale_id: Set(sale.id),
            position: Set(position),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            discount: Set(line.discount),
            subtotal: Set(line.subtotal),
        })
        .collect();
    (header, items)
}

pub fn purchase_from_rows(
    header: entity::purchase::Model,
    mut items: Vec<entity::purchase_item::Model>,
) -> Result<Purchase> {
    items.sort_by_key(|item| item.position);
    Ok(Purchase {
        id: header.id,
        tenant_id: header.tenant_id,
        store_id: header.store_id,
        number: header.number,
        supplier_id: header.supplier_id,
        lines: items
            .into_iter()
            .map(|item| PurchaseLine {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_cost: item.unit_cost,
                subtotal: item.subtotal,
            })
            .collect(),
        total: header.total,
        status: header.status.parse()?,
        note: header.note,
        actor: header.actor,
        occurred_at: header.occurred_at,
        voided_at: header.voided_at,
    })
}

pub fn purchase_to_rows(
    purchase: &Purchase,
) -> (
    entity::purchase::ActiveModel,
    Vec<entity::purchase_item::ActiveModel>,
) {
    let header = entity::purchase::ActiveModel {
        id: Set(purchase.id),
        tenant_id: Set(purchase.tenant_id),
        store_id: Set(purchase.store_id),
        number: Set(purchase.number.clone()),
        supplier_id: Set(purchase.supplier_id),
        total: Set(purchase.total),
        status: Set(purchase.status.as_str().to_string()),
        note: Set(purchase.note.clone()),
        actor: Set(purchase.actor.clone()),
        occurred_at: Set(purchase.occurred_at),
        voided_at: Set(purchase.voided_at),
    };
    let items = purchase
        .lines
        .iter()
        .zip(0..)
        .map(|(line, position)| entity::purchase_item::ActiveModel {
            id: Set(line.id),
            purchase_id: Set(purchase.id),
            position: Set(position),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_cost: Set(line.unit_cost),
            subtotal: Set(line.subtotal),
        })
        .collect();
    (header, items)
}

pub fn return_from_rows(
    header: entity::return_doc::Model,
    mut items: Vec<entity::return_item::Model>,
) -> Result<ReturnDoc> {
    items.sort_by_key(|item| item.position);
    Ok(ReturnDoc {
        id: header.id,
        tenant_id: header.tenant_id,
        store_id: header.store_id,
        kind: header.kind.parse()?,
        source_id: header.source_id,
        number: header.number,
        lines: items
            .into_iter()
            .map(|item| ReturnLine {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_amount: item.unit_amount,
                subtotal: item.subtotal,
            })
            .collect(),
        total: header.total,
        reason: header.reason,
        actor: header.actor,
        occurred_at: header.occurred_at,
    })
}

pub fn return_to_rows(
    doc: &ReturnDoc,
) -> (
    entity::return_doc::ActiveModel,
    Vec<entity::return_item::ActiveModel>,
) {
    let header = entity::return_doc::ActiveModel {
        id: Set(doc.id),
        tenant_id: Set(doc.tenant_id),
        store_id: Set(doc.store_id),
        kind: Set(doc.kind.as_str().to_string()),
        source_id: Set(doc.source_id),
        number: Set(doc.number.clone()),
        total: Set(doc.total),
        reason: Set(doc.reason.clone()),
        actor: Set(doc.actor.clone()),
        occurred_at: Set(doc.occurred_at),
    };
    let items = doc
        .lines
        .iter()
        .zip(0..)
        .map(|(line, position)| entity::return_item::ActiveModel {
            id: Set(line.id),
            return_id: Set(doc.id),
            position: Set(position),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_amount: Set(line.unit_amount),
            subtotal: Set(line.subtotal),
        })
        .collect();
    (header, items)
}

pub fn opname_from_rows(
    header: entity::stock_opname::Model,
    mut items: Vec<entity::stock_opname_item::Model>,
) -> Result<StockOpname> {
    items.sort_by_key(|item| item.position);
    Ok(StockOpname {
        id: header.id,
        tenant_id: header.tenant_id,
        store_id: header.store_id,
        number: header.number,
        status: header.status.parse()?,
        note: header.note,
        actor: header.actor,
        lines: items
            .into_iter()
            .map(|item| OpnameLine {
                product_id: item.product_id,
                counted: item.counted,
                system: item.system,
                difference: item.difference,
            })
            .collect(),
        created_at: header.created_at,
        counted_at: header.counted_at,
    })
}

pub fn opname_to_rows(
    opname: &StockOpname,
) -> (
    entity::stock_opname::ActiveModel,
    Vec<entity::stock_opname_item::ActiveModel>,
) {
    let header = entity::stock_opname::ActiveModel {
        id: Set(opname.id),
        tenant_id: Set(opname.tenant_id),
        store_id: Set(opname.store_id),
        number: Set(opname.number.clone()),
        status: Set(opname.status.as_str().to_string()),
        note: Set(opname.note.clone()),
        actor: Set(opname.actor.clone()),
        created_at: Set(opname.created_at),
        counted_at: Set(opname.counted_at),
    };
    let items = opname
        .lines
        .iter()
        .zip(0..)
        .map(|(line, position)| entity::stock_opname_item::ActiveModel {
            opname_id: Set(opname.id),
            product_id: Set(line.product_id),
            position: Set(position),
            counted: Set(line.counted),
            system: Set(line.system),
            difference: Set(line.difference),
        })
        .collect();
    (header, items)
}

//! HTTP request handlers - thin layer that delegates to domain service

use super::dto::*;
use super::error::Problem;
use super::mapper::parse_name;
use super::scope::Scope;
use crate::contract::model::{
    DocumentFilter, DocumentStatus, GroupKind, OpnameCount, PartyKind, ProductFilter,
};
use crate::domain::Service;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

type Svc = Extension<Arc<Service>>;

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

// ===== Tenants and stores =====

/// Tenants are created before any scope exists, so no headers are needed
pub async fn create_tenant(
    Extension(service): Svc,
    Json(req): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<TenantDto>), Problem> {
    let tenant = service.create_tenant(&req.name).await?;
    Ok((StatusCode::CREATED, Json(tenant.into())))
}

pub async fn get_tenant(
    Extension(service): Svc,
    Path(id): Path<Uuid>,
) -> Result<Json<TenantDto>, Problem> {
    let tenant = service.get_tenant(id).await?;
    Ok(Json(tenant.into()))
}

pub async fn create_store(
    Extension(service): Svc,
    Scope(scope): Scope,
    Json(req): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreDto>), Problem> {
    let store = service.create_store(&scope, &req.name, req.address).await?;
    Ok((StatusCode::CREATED, Json(store.into())))
}

pub async fn list_stores(
    Extension(service): Svc,
    Scope(scope): Scope,
) -> Result<Json<ListResponse<StoreDto>>, Problem> {
    let stores = service.list_stores(&scope).await?;
    Ok(Json(ListResponse::from_models(stores)))
}

// ===== System config and audit =====

pub async fn list_config(
    Extension(service): Svc,
    Scope(scope): Scope,
) -> Result<Json<ListResponse<ConfigEntryDto>>, Problem> {
    let entries = service.list_config(&scope).await?;
    Ok(Json(ListResponse::from_models(entries)))
}

pub async fn get_config(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(key): Path<String>,
) -> Result<Json<ConfigEntryDto>, Problem> {
    let entry = service.get_config(&scope, &key).await?;
    Ok(Json(entry.into()))
}

pub async fn set_config(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(key): Path<String>,
    Json(req): Json<SetConfigRequest>,
) -> Result<Json<ConfigEntryDto>, Problem> {
    let entry = service.set_config(&scope, &key, req.value).await?;
    Ok(Json(entry.into()))
}

pub async fn delete_config(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(key): Path<String>,
) -> Result<StatusCode, Problem> {
    service.delete_config(&scope, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_audit(
    Extension(service): Svc,
    Scope(scope): Scope,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ListResponse<AuditEntryDto>>, Problem> {
    let entries = service.list_audit(&scope, query.limit).await?;
    Ok(Json(ListResponse::from_models(entries)))
}

// ===== Products =====

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub async fn list_products(
    Extension(service): Svc,
    Scope(scope): Scope,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ListResponse<ProductDto>>, Problem> {
    let filter = ProductFilter {
        search: query.search,
        category_id: query.category_id,
        brand_id: query.brand_id,
        store_id: query.store_id,
    };
    let page = service.page(query.limit, query.offset);
    let products = service.list_products(&scope, filter, page).await?;
    Ok(Json(ListResponse::from_models(products)))
}

pub async fn create_product(
    Extension(service): Svc,
    Scope(scope): Scope,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductDto>), Problem> {
    let product = service.create_product(&scope, req.into()).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

pub async fn get_product(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDto>, Problem> {
    let product = service.get_product(&scope, id).await?;
    Ok(Json(product.into()))
}

pub async fn update_product(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductDto>, Problem> {
    let product = service.update_product(&scope, id, req.into()).await?;
    Ok(Json(product.into()))
}

pub async fn delete_product(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_product(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Product groups =====

#[derive(Debug, Deserialize)]
pub struct GroupListQuery {
    pub kind: String,
}

pub async fn list_groups(
    Extension(service): Svc,
    Scope(scope): Scope,
    Query(query): Query<GroupListQuery>,
) -> Result<Json<ListResponse<ProductGroupDto>>, Problem> {
    let kind: GroupKind = parse_name("kind", &query.kind)?;
    let groups = service.list_groups(&scope, kind).await?;
    Ok(Json(ListResponse::from_models(groups)))
}

pub async fn create_group(
    Extension(service): Svc,
    Scope(scope): Scope,
    Json(req): Json<CreateProductGroupRequest>,
) -> Result<(StatusCode, Json<ProductGroupDto>), Problem> {
    let kind: GroupKind = parse_name("kind", &req.kind)?;
    let group = service.create_group(&scope, kind, &req.name).await?;
    Ok((StatusCode::CREATED, Json(group.into())))
}

pub async fn rename_group(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameProductGroupRequest>,
) -> Result<Json<ProductGroupDto>, Problem> {
    let group = service.rename_group(&scope, id, &req.name).await?;
    Ok(Json(group.into()))
}

pub async fn delete_group(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_group(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Parties =====

#[derive(Debug, Deserialize)]
pub struct PartyListQuery {
    pub kind: String,
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

pub async fn list_parties(
    Extension(service): Svc,
    Scope(scope): Scope,
    Query(query): Query<PartyListQuery>,
) -> Result<Json<ListResponse<PartyDto>>, Problem> {
    let kind: PartyKind = parse_name("kind", &query.kind)?;
    let page = service.page(query.limit, query.offset);
    let parties = service
        .list_parties(&scope, kind, query.search.as_deref(), page)
        .await?;
    Ok(Json(ListResponse::from_models(parties)))
}

pub async fn create_party(
    Extension(service): Svc,
    Scope(scope): Scope,
    Json(req): Json<CreatePartyRequest>,
) -> Result<(StatusCode, Json<PartyDto>), Problem> {
    let party = service.create_party(&scope, req.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(party.into())))
}

pub async fn get_party(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> Result<Json<PartyDto>, Problem> {
    let party = service.get_party(&scope, id).await?;
    Ok(Json(party.into()))
}

pub async fn update_party(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePartyRequest>,
) -> Result<Json<PartyDto>, Problem> {
    let party = service.update_party(&scope, id, req.into()).await?;
    Ok(Json(party.into()))
}

pub async fn delete_party(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Problem> {
    service.delete_party(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Promos =====

pub async fn list_promos(
    Extension(service): Svc,
    Scope(scope): Scope,
) -> Result<Json<ListResponse<PromoDto>>, Problem> {
    let promos = service.list_promos(&scope).await?;
    Ok(Json(ListResponse::from_models(promos)))
}

pub async fn create_promo(
    Extension(service): Svc,
    Scope(scope): Scope,
    Json(req): Json<CreatePromoRequest>,
) -> Result<(StatusCode, Json<PromoDto>), Problem> {
    let promo = service.create_promo(&scope, req.into()).await?;
    Ok((StatusCode::CREATED, Json(promo.into())))
}

pub async fn get_promo(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(code): Path<String>,
) -> Result<Json<PromoDto>, Problem> {
    let promo = service.get_promo(&scope, &code).await?;
    Ok(Json(promo.into()))
}

pub async fn deactivate_promo(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(code): Path<String>,
) -> Result<Json<PromoDto>, Problem> {
    let promo = service.deactivate_promo(&scope, &code).await?;
    Ok(Json(promo.into()))
}

// ===== Sales =====

#[derive(Debug, Default, Deserialize)]
pub struct DocumentListQuery {
    pub store_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl DocumentListQuery {
    fn filter(&self) -> Result<DocumentFilter, Problem> {
        let status = self
            .status
            .as_deref()
            .map(|s| parse_name::<DocumentStatus>("status", s))
            .transpose()?;
        Ok(DocumentFilter {
            store_id: self.store_id,
            from: self.from,
            to: self.to,
            status,
        })
    }
}

pub async fn list_sales(
    Extension(service): Svc,
    Scope(scope): Scope,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<ListResponse<SaleDto>>, Problem> {
    let filter = query.filter()?;
    let page = service.page(query.limit, query.offset);
    let sales = service.list_sales(&scope, filter, page).await?;
    Ok(Json(ListResponse::from_models(sales)))
}

pub async fn create_sale(
    Extension(service): Svc,
    Scope(scope): Scope,
    Json(req): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleDto>), Problem> {
    let sale = service.create_sale(&scope, req.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(sale.into())))
}

pub async fn get_sale(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleDto>, Problem> {
    let sale = service.get_sale(&scope, id).await?;
    Ok(Json(sale.into()))
}

pub async fn void_sale(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
    Json(req): Json<VoidRequest>,
) -> Result<Json<SaleDto>, Problem> {
    let sale = service.void_sale(&scope, id, req.reason).await?;
    Ok(Json(sale.into()))
}

pub async fn create_sales_return(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateReturnRequest>,
) -> Result<(StatusCode, Json<ReturnDto>), Problem> {
    let lines = req.lines.into_iter().map(Into::into).collect();
    let doc = service
        .create_sales_return(&scope, id, lines, req.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(doc.into())))
}

// ===== Purchases =====

pub async fn list_purchases(
    Extension(service): Svc,
    Scope(scope): Scope,
    Query(query): Query<DocumentListQuery>,
) -> Result<Json<ListResponse<PurchaseDto>>, Problem> {
    let filter = query.filter()?;
    let page = service.page(query.limit, query.offset);
    let purchases = service.list_purchases(&scope, filter, page).await?;
    Ok(Json(ListResponse::from_models(purchases)))
}

pub async fn create_purchase(
    Extension(service): Svc,
    Scope(scope): Scope,
    Json(req): Json<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseDto>), Problem> {
    let purchase = service.create_purchase(&scope, req.into()).await?;
    Ok((StatusCode::CREATED, Json(purchase.into())))
}

pub async fn get_purchase(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseDto>, Problem> {
    let purchase = service.get_purchase(&scope, id).await?;
    Ok(Json(purchase.into()))
}

pub async fn void_purchase(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
    Json(req): Json<VoidRequest>,
) -> Result<Json<PurchaseDto>, Problem> {
    let purchase = service.void_purchase(&scope, id, req.reason).await?;
    Ok(Json(purchase.into()))
}

pub async fn create_purchase_return(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateReturnRequest>,
) -> Result<(StatusCode, Json<ReturnDto>), Problem> {
    let lines = req.lines.into_iter().map(Into::into).collect();
    let doc = service
        .create_purchase_return(&scope, id, lines, req.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(doc.into())))
}

// ===== Returns =====

pub async fn list_returns_for(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(source_id): Path<Uuid>,
) -> Result<Json<ListResponse<ReturnDto>>, Problem> {
    let docs = service.list_returns_for(&scope, source_id).await?;
    Ok(Json(ListResponse::from_models(docs)))
}

pub async fn get_return(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> Result<Json<ReturnDto>, Problem> {
    let doc = service.get_return(&scope, id).await?;
    Ok(Json(doc.into()))
}

// ===== Stock opname =====

#[derive(Debug, Deserialize)]
pub struct OpnameListQuery {
    pub store_id: Uuid,
}

pub async fn list_opnames(
    Extension(service): Svc,
    Scope(scope): Scope,
    Query(query): Query<OpnameListQuery>,
) -> Result<Json<ListResponse<StockOpnameDto>>, Problem> {
    let opnames = service.list_opnames(&scope, query.store_id).await?;
    Ok(Json(ListResponse::from_models(opnames)))
}

pub async fn create_opname(
    Extension(service): Svc,
    Scope(scope): Scope,
    Json(req): Json<CreateOpnameRequest>,
) -> Result<(StatusCode, Json<StockOpnameDto>), Problem> {
    let opname = service.create_opname(&scope, req.store_id, req.note).await?;
    Ok((StatusCode::CREATED, Json(opname.into())))
}

pub async fn get_opname(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> Result<Json<StockOpnameDto>, Problem> {
    let opname = service.get_opname(&scope, id).await?;
    Ok(Json(opname.into()))
}

pub async fn record_counts(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordCountsRequest>,
) -> Result<Json<StockOpnameDto>, Problem> {
    let counts: Vec<OpnameCount> = req.counts.into_iter().map(Into::into).collect();
    let opname = service.record_counts(&scope, id, counts).await?;
    Ok(Json(opname.into()))
}

pub async fn finalize_opname(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(id): Path<Uuid>,
) -> Result<Json<StockOpnameDto>, Problem> {
    let opname = service.finalize_opname(&scope, id).await?;
    Ok(Json(opname.into()))
}

// ===== Stock and reports =====

#[derive(Debug, Default, Deserialize)]
pub struct StockQuery {
    /// Compute stock as of this instant instead of now
    pub at: Option<DateTime<Utc>>,
}

pub async fn stock_levels(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(store_id): Path<Uuid>,
    Query(query): Query<StockQuery>,
) -> Result<Json<ListResponse<StockLevelDto>>, Problem> {
    let levels = match query.at {
        Some(at) => service.stock_levels_at(&scope, store_id, at).await?,
        None => service.stock_levels(&scope, store_id).await?,
    };
    Ok(Json(ListResponse::from_models(levels)))
}

pub async fn stock_level(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path((store_id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<StockLevelDto>, Problem> {
    let level = service.stock_level(&scope, store_id, product_id).await?;
    Ok(Json(level.into()))
}

pub async fn low_stock(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(store_id): Path<Uuid>,
) -> Result<Json<ListResponse<LowStockItemDto>>, Problem> {
    let items = service.low_stock(&scope, store_id).await?;
    Ok(Json(ListResponse::from_models(items)))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

pub async fn sales_summary(
    Extension(service): Svc,
    Scope(scope): Scope,
    Path(store_id): Path<Uuid>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SalesSummaryDto>, Problem> {
    let summary = service
        .sales_summary(&scope, store_id, query.from, query.to)
        .await?;
    Ok(Json(summary.into()))
}

//! Route registration and the OpenAPI document

use super::dto::*;
use super::error::Problem;
use super::{handlers, sse};
use crate::domain::realtime::ChannelManager;
use crate::domain::Service;
use axum::{
    routing::{get, post, put},
    Extension, Json, Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "KasirPro POS API", description = "Multi-store point of sale and inventory"),
    components(schemas(
        Problem,
        TenantDto,
        CreateTenantRequest,
        StoreDto,
        CreateStoreRequest,
        ConfigEntryDto,
        SetConfigRequest,
        AuditEntryDto,
        ProductGroupDto,
        CreateProductGroupRequest,
        RenameProductGroupRequest,
        ProductDto,
        CreateProductRequest,
        UpdateProductRequest,
        PartyDto,
        CreatePartyRequest,
        UpdatePartyRequest,
        PromoDto,
        CreatePromoRequest,
        SaleLineDto,
        SaleDto,
        CreateSaleLineRequest,
        CreateSaleRequest,
        VoidRequest,
        PurchaseLineDto,
        PurchaseDto,
        CreatePurchaseLineRequest,
        CreatePurchaseRequest,
        ReturnLineDto,
        ReturnDto,
        CreateReturnLineRequest,
        CreateReturnRequest,
        OpnameLineDto,
        StockOpnameDto,
        CreateOpnameRequest,
        OpnameCountRequest,
        RecordCountsRequest,
        StockLevelDto,
        LowStockItemDto,
        SalesSummaryDto,
        InvalidationDto,
        ChannelStatsDto,
    ))
)]
pub struct ApiDoc;

/// Register all REST routes
pub fn register_routes(router: Router, service: Arc<Service>, channels: ChannelManager) -> Router {
    router
        // Administration
        .route("/tenants", post(handlers::create_tenant))
        .route("/tenants/{id}", get(handlers::get_tenant))
        .route(
            "/stores",
            get(handlers::list_stores).post(handlers::create_store),
        )
        .route("/config", get(handlers::list_config))
        .route(
            "/config/{key}",
            get(handlers::get_config)
                .put(handlers::set_config)
                .delete(handlers::delete_config),
        )
        .route("/audit", get(handlers::list_audit))
        // Catalog
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::get_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route(
            "/product-groups",
            get(handlers::list_groups).post(handlers::create_group),
        )
        .route(
            "/product-groups/{id}",
            put(handlers::rename_group).delete(handlers::delete_group),
        )
        .route(
            "/parties",
            get(handlers::list_parties).post(handlers::create_party),
        )
        .route(
            "/parties/{id}",
            get(handlers::get_party)
                .patch(handlers::update_party)
                .delete(handlers::delete_party),
        )
        .route(
            "/promos",
            get(handlers::list_promos).post(handlers::create_promo),
        )
        .route("/promos/{code}", get(handlers::get_promo))
        .route("/promos/{code}/deactivate", post(handlers::deactivate_promo))
        // Sales
        .route(
            "/sales",
            get(handlers::list_sales).post(handlers::create_sale),
        )
        .route("/sales/{id}", get(handlers::get_sale))
        .route("/sales/{id}/void", post(handlers::void_sale))
        .route(
            "/sales/{id}/returns",
            get(handlers::list_returns_for).post(handlers::create_sales_return),
        )
        // Purchasing
        .route(
            "/purchases",
            get(handlers::list_purchases).post(handlers::create_purchase),
        )
        .route("/purchases/{id}", get(handlers::get_purchase))
        .route("/purchases/{id}/void", post(handlers::void_purchase))
        .route(
            "/purchases/{id}/returns",
            get(handlers::list_returns_for).post(handlers::create_purchase_return),
        )
        .route("/returns/{id}", get(handlers::get_return))
        // Stock opname
        .route(
            "/stock-opnames",
            get(handlers::list_opnames).post(handlers::create_opname),
        )
        .route("/stock-opnames/{id}", get(handlers::get_opname))
        .route("/stock-opnames/{id}/counts", put(handlers::record_counts))
        .route(
            "/stock-opnames/{id}/finalize",
            post(handlers::finalize_opname),
        )
        // Stock and reports
        .route("/stores/{store_id}/stock", get(handlers::stock_levels))
        .route(
            "/stores/{store_id}/stock/{product_id}",
            get(handlers::stock_level),
        )
        .route("/stores/{store_id}/low-stock", get(handlers::low_stock))
        .route(
            "/stores/{store_id}/sales-summary",
            get(handlers::sales_summary),
        )
        // Realtime
        .route("/realtime/stats", get(sse::channel_stats))
        .route("/realtime/{table}", get(sse::stream_table))
        .route("/openapi.json", get(openapi_json))
        .layer(Extension(service))
        .layer(Extension(channels))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

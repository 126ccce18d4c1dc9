//! Catalog, parties, promos, tenancy scope, system config and audit

mod common;

use chrono::{Duration, Utc};
use common::{money, print_test_header, Fixture};
use pos_service::config::Config;
use pos_service::contract::*;
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
async fn test_sku_unique_among_live_products() {
    print_test_header(
        "test_sku_unique_among_live_products",
        &["A live sku cannot be reused; deleting the product frees it"],
    );
    let fx = Fixture::new().await;
    let product = fx.product("SKU-001", 1).await;

    let err = fx
        .service
        .create_product(&fx.scope, Fixture::new_product("SKU-001", None, 0))
        .await
        .unwrap_err();
    println!("❌ {}", err);
    assert!(matches!(err, PosError::Conflict { .. }));

    let err = fx
        .service
        .create_product(&fx.scope, Fixture::new_product("bad sku!", None, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, PosError::Validation { .. }));

    fx.service.delete_product(&fx.scope, product.id).await.unwrap();
    let err = fx.service.get_product(&fx.scope, product.id).await.unwrap_err();
    assert!(matches!(err, PosError::NotFound { .. }));
    assert!(fx.storage.raw_product(product.id).unwrap().deleted_at.is_some());

    let reused = fx.product("SKU-001", 0).await;
    assert_ne!(reused.id, product.id);
}

#[tokio::test]
async fn test_product_validation_and_update() {
    print_test_header(
        "test_product_validation_and_update",
        &["Negative prices and stock are refused; patches change only given fields"],
    );
    let fx = Fixture::new().await;

    let mut input = Fixture::new_product("NEG-01", None, 0);
    input.sell_price = money(-1);
    assert!(matches!(
        fx.service.create_product(&fx.scope, input).await,
        Err(PosError::Validation { .. })
    ));
    let input = Fixture::new_product("NEG-02", None, -1);
    assert!(matches!(
        fx.service.create_product(&fx.scope, input).await,
        Err(PosError::Validation { .. })
    ));

    let product = fx.product("UPD-01", 3).await;
    let updated = fx
        .service
        .update_product(
            &fx.scope,
            product.id,
            ProductPatch {
                name: Some("  Kopi Bubuk 250g ".to_string()),
                sell_price: Some(money(12_500)),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Kopi Bubuk 250g");
    assert_eq!(updated.sell_price, money(12_500));
    assert_eq!(updated.cost_price, product.cost_price);
    assert_eq!(updated.sku, product.sku);
    assert!(fx.publisher.tables().contains(&ChangeTable::Products));
}

#[tokio::test]
async fn test_groups_cannot_be_deleted_while_in_use() {
    print_test_header(
        "test_groups_cannot_be_deleted_while_in_use",
        &["Group names are unique per kind; referenced groups stay"],
    );
    let fx = Fixture::new().await;
    let drinks = fx
        .service
        .create_group(&fx.scope, GroupKind::Category, "Minuman")
        .await
        .unwrap();
    let brand = fx
        .service
        .create_group(&fx.scope, GroupKind::Brand, "Minuman")
        .await
        .unwrap();

    let err = fx
        .service
        .create_group(&fx.scope, GroupKind::Category, "minuman")
        .await
        .unwrap_err();
    assert!(matches!(err, PosError::Conflict { .. }));

    // A brand id is not a category
    let mut input = Fixture::new_product("TEH-BOTOL", None, 0);
    input.category_id = Some(brand.id);
    assert!(matches!(
        fx.service.create_product(&fx.scope, input).await,
        Err(PosError::NotFound { .. })
    ));

    let mut input = Fixture::new_product("TEH-BOTOL", None, 0);
    input.category_id = Some(drinks.id);
    input.brand_id = Some(brand.id);
    let product = fx.service.create_product(&fx.scope, input).await.unwrap();

    let err = fx.service.delete_group(&fx.scope, drinks.id).await.unwrap_err();
    println!("❌ {}", err);
    assert!(matches!(err, PosError::Conflict { .. }));

    let renamed = fx
        .service
        .rename_group(&fx.scope, drinks.id, "Minuman Dingin")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Minuman Dingin");

    let filter = ProductFilter {
        category_id: Some(drinks.id),
        ..ProductFilter::default()
    };
    let listed = fx
        .service
        .list_products(&fx.scope, filter, Page::new(10, 0))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    fx.service.delete_product(&fx.scope, product.id).await.unwrap();
    fx.service.delete_group(&fx.scope, drinks.id).await.unwrap();
    let categories = fx.service.list_groups(&fx.scope, GroupKind::Category).await.unwrap();
    assert!(categories.is_empty());
    let brands = fx.service.list_groups(&fx.scope, GroupKind::Brand).await.unwrap();
    assert_eq!(brands.len(), 1);
}

#[tokio::test]
async fn test_product_listing_search_and_pages() {
    print_test_header(
        "test_product_listing_search_and_pages",
        &["Listing is ordered by sku, searchable and paged"],
    );
    let fx = Fixture::new().await;
    for sku in ["C-3", "A-1", "B-2"] {
        fx.product(sku, 0).await;
    }
    let mut input = Fixture::new_product("D-4", None, 0);
    input.barcode = Some("8991234567890".to_string());
    fx.service.create_product(&fx.scope, input).await.unwrap();

    let all = fx
        .service
        .list_products(&fx.scope, ProductFilter::default(), Page::new(50, 0))
        .await
        .unwrap();
    let skus: Vec<&str> = all.iter().map(|p| p.sku.as_str()).collect();
    assert_eq!(skus, vec!["A-1", "B-2", "C-3", "D-4"]);

    let page = fx
        .service
        .list_products(&fx.scope, ProductFilter::default(), Page::new(2, 1))
        .await
        .unwrap();
    assert_eq!(page.iter().map(|p| p.sku.as_str()).collect::<Vec<_>>(), vec!["B-2", "C-3"]);

    let by_barcode = ProductFilter {
        search: Some(" 899123 ".to_string()),
        ..ProductFilter::default()
    };
    let found = fx
        .service
        .list_products(&fx.scope, by_barcode, Page::new(50, 0))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].sku, "D-4");
}

#[tokio::test]
async fn test_store_scope_limits_what_a_cashier_sees() {
    print_test_header(
        "test_store_scope_limits_what_a_cashier_sees",
        &[
            "A store-pinned scope lists its own and shared products only",
            "and is refused when it names another store",
        ],
    );
    let fx = Fixture::new().await;
    fx.product("MAIN-01", 0).await;
    fx.service
        .create_product(&fx.scope, Fixture::new_product("BRANCH-01", Some(fx.branch.id), 0))
        .await
        .unwrap();
    fx.service
        .create_product(&fx.scope, Fixture::new_product("SHARED-01", None, 0))
        .await
        .unwrap();

    let cashier = fx.cashier(fx.branch.id);
    let visible = fx
        .service
        .list_products(&cashier, ProductFilter::default(), Page::new(50, 0))
        .await
        .unwrap();
    let skus: Vec<&str> = visible.iter().map(|p| p.sku.as_str()).collect();
    assert_eq!(skus, vec!["BRANCH-01", "SHARED-01"]);

    let other_store = ProductFilter {
        store_id: Some(fx.main.id),
        ..ProductFilter::default()
    };
    assert!(matches!(
        fx.service.list_products(&cashier, other_store, Page::new(50, 0)).await,
        Err(PosError::Forbidden { .. })
    ));
    assert!(matches!(
        fx.service.stock_levels(&cashier, fx.main.id).await,
        Err(PosError::Forbidden { .. })
    ));
    assert!(matches!(
        fx.service.create_store(&cashier, "Cabang 2", None).await,
        Err(PosError::Forbidden { .. })
    ));

    let stores = fx.service.list_stores(&cashier).await.unwrap();
    assert_eq!(stores.len(), 1);
    assert_eq!(stores[0].id, fx.branch.id);
    let stores = fx.service.list_stores(&fx.scope).await.unwrap();
    assert_eq!(
        stores.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
        vec!["Cabang", "Pusat"]
    );
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    print_test_header(
        "test_tenants_are_isolated",
        &["Rows of one tenant are invisible to another"],
    );
    let fx = Fixture::new().await;
    let product = fx.product("ISO-01", 5).await;

    let other = fx.service.create_tenant("Toko Sebelah").await.unwrap();
    let stranger = TenantScope::tenant(other.id);

    assert!(matches!(
        fx.service.get_product(&stranger, product.id).await,
        Err(PosError::NotFound { .. })
    ));
    assert!(matches!(
        fx.service.stock_levels(&stranger, fx.main.id).await,
        Err(PosError::NotFound { .. })
    ));
    let listed = fx
        .service
        .list_products(&stranger, ProductFilter::default(), Page::new(50, 0))
        .await
        .unwrap();
    assert!(listed.is_empty());

    // The same sku is free in another tenant
    fx.service
        .create_product(&stranger, Fixture::new_product("ISO-01", None, 0))
        .await
        .unwrap();

    assert!(matches!(
        fx.service.create_store(&TenantScope::tenant(uuid::Uuid::new_v4()), "Hantu", None).await,
        Err(PosError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_parties_crud_and_search() {
    print_test_header(
        "test_parties_crud_and_search",
        &["Customers and suppliers are kept apart and searchable by name"],
    );
    let fx = Fixture::new().await;
    let budi = fx.party(PartyKind::Customer, "Budi Santoso").await;
    fx.party(PartyKind::Customer, "Ani").await;
    fx.party(PartyKind::Supplier, "PT Budi Jaya").await;

    let found = fx
        .service
        .list_parties(&fx.scope, PartyKind::Customer, Some("budi"), Page::new(50, 0))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, budi.id);

    let bad_email = NewParty {
        kind: PartyKind::Customer,
        name: "Citra".to_string(),
        phone: None,
        email: Some("citra-at-example".to_string()),
        address: None,
    };
    assert!(matches!(
        fx.service.create_party(&fx.scope, bad_email).await,
        Err(PosError::Validation { .. })
    ));

    let updated = fx
        .service
        .update_party(
            &fx.scope,
            budi.id,
            PartyPatch {
                phone: Some("0812-3456-789".to_string()),
                email: Some("budi@example.com".to_string()),
                ..PartyPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("0812-3456-789"));
    assert_eq!(updated.name, "Budi Santoso");

    fx.service.delete_party(&fx.scope, budi.id).await.unwrap();
    assert!(matches!(
        fx.service.get_party(&fx.scope, budi.id).await,
        Err(PosError::NotFound { .. })
    ));
    let customers = fx
        .service
        .list_parties(&fx.scope, PartyKind::Customer, None, Page::new(50, 0))
        .await
        .unwrap();
    assert_eq!(customers.len(), 1);
}

#[tokio::test]
async fn test_promo_codes() {
    print_test_header(
        "test_promo_codes",
        &["Codes are upper-cased and unique; bad percentages and periods are refused"],
    );
    let fx = Fixture::new().await;
    let promo = |code: &str, percent: i64| NewPromo {
        code: code.to_string(),
        name: "Promo".to_string(),
        percent_off: Decimal::from(percent),
        max_discount: None,
        min_purchase: Decimal::ZERO,
        starts_at: Utc::now(),
        ends_at: None,
    };

    let created = fx.service.create_promo(&fx.scope, promo(" merdeka17 ", 17)).await.unwrap();
    assert_eq!(created.code, "MERDEKA17");
    assert!(created.active);

    assert!(matches!(
        fx.service.create_promo(&fx.scope, promo("Merdeka17", 5)).await,
        Err(PosError::Conflict { .. })
    ));
    assert!(matches!(
        fx.service.create_promo(&fx.scope, promo("NOL", 0)).await,
        Err(PosError::Validation { .. })
    ));
    assert!(matches!(
        fx.service.create_promo(&fx.scope, promo("LEBIH", 101)).await,
        Err(PosError::Validation { .. })
    ));
    let mut backwards = promo("MUNDUR", 10);
    backwards.ends_at = Some(backwards.starts_at - Duration::days(1));
    assert!(matches!(
        fx.service.create_promo(&fx.scope, backwards).await,
        Err(PosError::Validation { .. })
    ));

    let fetched = fx.service.get_promo(&fx.scope, "merdeka17").await.unwrap();
    assert_eq!(fetched.id, created.id);

    let off = fx.service.deactivate_promo(&fx.scope, "MERDEKA17").await.unwrap();
    assert!(!off.active);
    let again = fx.service.deactivate_promo(&fx.scope, "MERDEKA17").await.unwrap();
    assert!(!again.active);
    assert_eq!(fx.service.list_promos(&fx.scope).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_system_config_lifecycle() {
    print_test_header(
        "test_system_config_lifecycle",
        &["Config values are per tenant, listed by key and announced on change"],
    );
    let fx = Fixture::new().await;

    fx.service
        .set_config(&fx.scope, "receipt.footer", json!("Terima kasih"))
        .await
        .unwrap();
    fx.service
        .set_config(&fx.scope, "receipt.footer", json!("Sampai jumpa"))
        .await
        .unwrap();
    fx.service
        .set_config(&fx.scope, "printer.width", json!(58))
        .await
        .unwrap();

    let entry = fx.service.get_config(&fx.scope, "receipt.footer").await.unwrap();
    assert_eq!(entry.value, json!("Sampai jumpa"));

    let keys: Vec<String> = fx
        .service
        .list_config(&fx.scope)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.key)
        .collect();
    assert_eq!(keys, vec!["printer.width", "receipt.footer"]);

    let events: Vec<_> = fx
        .publisher
        .events()
        .into_iter()
        .filter(|e| e.table == ChangeTable::Config)
        .collect();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind, ChangeKind::Insert);
    assert_eq!(events[1].kind, ChangeKind::Update);
    assert_eq!(events[0].record_id, events[1].record_id);
    assert_ne!(events[0].record_id, events[2].record_id);

    fx.service.delete_config(&fx.scope, "printer.width").await.unwrap();
    assert!(matches!(
        fx.service.delete_config(&fx.scope, "printer.width").await,
        Err(PosError::NotFound { .. })
    ));
    assert!(matches!(
        fx.service.get_config(&fx.scope, "bad key").await,
        Err(PosError::Validation { .. })
    ));

    let other = fx.service.create_tenant("Lain").await.unwrap();
    assert!(matches!(
        fx.service.get_config(&TenantScope::tenant(other.id), "receipt.footer").await,
        Err(PosError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_audit_trail() {
    print_test_header(
        "test_audit_trail",
        &[
            "Writes are audited newest first with the acting user",
            "a store-pinned view hides other stores' entries",
        ],
    );
    let fx = Fixture::new().await;
    fx.product("AUD-MAIN", 1).await;
    fx.service
        .create_product(&fx.scope, Fixture::new_product("AUD-BRANCH", Some(fx.branch.id), 1))
        .await
        .unwrap();

    let entries = fx.service.list_audit(&fx.scope, None).await.unwrap();
    for entry in &entries {
        println!("📝 {} {} {:?}", entry.action, entry.entity, entry.actor);
    }
    assert_eq!(entries[0].action, "product.create");
    assert_eq!(entries[0].detail["sku"], "AUD-BRANCH");
    assert_eq!(entries[0].actor.as_deref(), Some("owner"));
    assert!(entries.iter().any(|e| e.action == "store.create"));

    let limited = fx.service.list_audit(&fx.scope, Some(1)).await.unwrap();
    assert_eq!(limited.len(), 1);

    let cashier_view = fx
        .service
        .list_audit(&fx.cashier(fx.main.id), None)
        .await
        .unwrap();
    assert!(cashier_view
        .iter()
        .all(|e| e.store_id.map_or(true, |id| id == fx.main.id)));
    assert!(cashier_view.iter().any(|e| e.detail["sku"] == "AUD-MAIN"));
    assert!(!cashier_view.iter().any(|e| e.detail["sku"] == "AUD-BRANCH"));
}

#[tokio::test]
async fn test_audit_can_be_disabled() {
    print_test_header("test_audit_can_be_disabled", &["audit_enabled = false writes nothing"]);
    let config = Config {
        audit_enabled: false,
        ..Config::default()
    };
    let fx = Fixture::with_config(config).await;
    fx.product("NOAUDIT-01", 1).await;
    assert_eq!(fx.storage.audit_len(), 0);
}

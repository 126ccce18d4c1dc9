//! SeaORM storage end to end over an in-memory SQLite database

mod common;

use chrono::{Duration, Utc};
use common::{money, print_test_header};
use pos_service::config::Config;
use pos_service::contract::*;
use pos_service::PosServiceModule;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::json;
use std::sync::Arc;

async fn sqlite_memory() -> DatabaseConnection {
    // One pooled connection keeps every query on the same in-memory database
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    Database::connect(options).await.unwrap()
}

fn product_input(sku: &str, store_id: Option<uuid::Uuid>, opening: i64, min_stock: i64) -> NewProduct {
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
        opening_stock: opening,
        min_stock,
    }
}

fn party_input(kind: PartyKind, name: &str) -> NewParty {
    NewParty {
        kind,
        name: name.to_string(),
        phone: None,
        email: None,
        address: None,
    }
}

fn cash_sale(store_id: uuid::Uuid, product_id: uuid::Uuid, quantity: i64) -> NewSale {
    NewSale {
        store_id,
        customer_id: None,
        promo_code: None,
        lines: vec![NewSaleLine {
            product_id,
            quantity,
            unit_price: None,
            discount: money(0),
        }],
        paid: money(100_000),
        payment_method: PaymentMethod::Cash,
        note: None,
    }
}

#[tokio::test]
async fn test_migrations_run_twice_on_sqlite() {
    print_test_header(
        "test_migrations_run_twice_on_sqlite",
        &["Every migration applies on SQLite and a second run is a no-op"],
    );
    let db = sqlite_memory().await;
    PosServiceModule::migrate(&db).await.unwrap();
    PosServiceModule::migrate(&db).await.unwrap();
    println!("✅ migrations applied");

    let module = PosServiceModule::init(Config::default(), Arc::new(db));
    let tenant = module.service().create_tenant("Toko Migrasi").await.unwrap();
    assert_eq!(tenant.name, "Toko Migrasi");
}

#[tokio::test]
async fn test_store_flow_over_sqlite() {
    print_test_header(
        "test_store_flow_over_sqlite",
        &[
            "Purchase, sale, returns, opname and void through SeaORM repositories",
            "Summary, low stock, paging and config read back from SQLite",
        ],
    );
    let db = sqlite_memory().await;
    PosServiceModule::migrate(&db).await.unwrap();
    let module = PosServiceModule::init(Config::default(), Arc::new(db));
    let service = module.service();

    let tenant = service.create_tenant("Toko Makmur").await.unwrap();
    let scope = TenantScope::tenant(tenant.id).with_actor("owner");
    let main = service
        .create_store(&scope, "Pusat", Some("Jl. Merdeka 1".to_string()))
        .await
        .unwrap();
    let branch = service.create_store(&scope, "Cabang", None).await.unwrap();
    let supplier = service
        .create_party(&scope, party_input(PartyKind::Supplier, "CV Sumber Rejeki"))
        .await
        .unwrap();

    let product = service
        .create_product(&scope, product_input("GULA-1KG", Some(main.id), 10, 10))
        .await
        .unwrap();
    let shared = service
        .create_product(&scope, product_input("AIR-600ML", None, 0, 0))
        .await
        .unwrap();

    let on_hand = |store_id, product_id| {
        let service = service.clone();
        let scope = scope.clone();
        async move {
            service
                .stock_level(&scope, store_id, product_id)
                .await
                .unwrap()
                .on_hand
        }
    };
    assert_eq!(on_hand(main.id, product.id).await, 10);

    // Offset paging without a search hits LIMIT/OFFSET together
    let page = service
        .list_products(&scope, ProductFilter::default(), Page::new(1, 1))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    let found = service
        .list_products(
            &scope,
            ProductFilter {
                search: Some("gula".to_string()),
                ..ProductFilter::default()
            },
            Page::new(10, 0),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, product.id);

    let purchase = service
        .create_purchase(
            &scope,
            NewPurchase {
                store_id: main.id,
                supplier_id: supplier.id,
                lines: vec![NewPurchaseLine {
                    product_id: product.id,
                    quantity: 5,
                    unit_cost: money(7_000),
                }],
                note: None,
            },
        )
        .await
        .unwrap();
    println!("📦 {} total={}", purchase.number, purchase.total);
    assert_eq!(purchase.total, money(35_000));
    assert_eq!(on_hand(main.id, product.id).await, 15);

    let sale = service
        .create_sale(&scope, cash_sale(main.id, product.id, 3))
        .await
        .unwrap();
    println!("🧾 {} total={}", sale.number, sale.total);
    assert!(sale.number.starts_with("INV-"));
    assert!(sale.number.ends_with("-0001"));
    assert_eq!(sale.subtotal, money(30_000));
    assert_eq!(on_hand(main.id, product.id).await, 12);

    let sales_return = service
        .create_sales_return(
            &scope,
            sale.id,
            vec![NewReturnLine {
                product_id: product.id,
                quantity: 1,
            }],
            Some("rusak".to_string()),
        )
        .await
        .unwrap();
    assert!(sales_return.number.starts_with("RS-"));
    assert_eq!(on_hand(main.id, product.id).await, 13);

    let purchase_return = service
        .create_purchase_return(
            &scope,
            purchase.id,
            vec![NewReturnLine {
                product_id: product.id,
                quantity: 2,
            }],
            None,
        )
        .await
        .unwrap();
    assert_eq!(purchase_return.total, money(14_000));
    assert_eq!(on_hand(main.id, product.id).await, 11);

    let opname = service
        .create_opname(&scope, main.id, Some("akhir bulan".to_string()))
        .await
        .unwrap();
    service
        .record_counts(
            &scope,
            opname.id,
            vec![OpnameCount {
                product_id: product.id,
                counted: 9,
            }],
        )
        .await
        .unwrap();
    let finalized = service.finalize_opname(&scope, opname.id).await.unwrap();
    println!("📋 {} lines={:?}", finalized.number, finalized.lines);
    assert_eq!(finalized.status, OpnameStatus::Finalized);
    assert_eq!(finalized.lines[0].system, Some(11));
    assert_eq!(finalized.lines[0].difference, Some(-2));
    assert_eq!(on_hand(main.id, product.id).await, 9);

    let second = service
        .create_sale(&scope, cash_sale(main.id, product.id, 1))
        .await
        .unwrap();
    assert!(second.number.ends_with("-0002"));
    assert_eq!(on_hand(main.id, product.id).await, 8);
    let voided = service
        .void_sale(&scope, second.id, Some("salah input".to_string()))
        .await
        .unwrap();
    assert_eq!(voided.status, DocumentStatus::Voided);
    assert_eq!(on_hand(main.id, product.id).await, 9);

    let now = Utc::now();
    let summary = service
        .sales_summary(&scope, main.id, now - Duration::hours(1), now + Duration::hours(1))
        .await
        .unwrap();
    println!("📊 {:?}", summary);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.voided, 1);
    assert_eq!(summary.gross, money(30_000));
    assert_eq!(summary.returns, 1);
    assert_eq!(summary.returns_total, sales_return.total);

    let low = service.low_stock(&scope, main.id).await.unwrap();
    let gula = low
        .iter()
        .find(|item| item.product_id == product.id)
        .unwrap();
    assert_eq!(gula.on_hand, 9);
    assert_eq!(gula.min_stock, 10);

    assert_eq!(on_hand(branch.id, shared.id).await, 0);

    service
        .set_config(&scope, "receipt.footer", json!("Terima kasih"))
        .await
        .unwrap();
    service
        .set_config(&scope, "receipt.footer", json!("Sampai jumpa"))
        .await
        .unwrap();
    let entry = service.get_config(&scope, "receipt.footer").await.unwrap();
    assert_eq!(entry.value, json!("Sampai jumpa"));
    assert_eq!(service.list_config(&scope).await.unwrap().len(), 1);
    service.delete_config(&scope, "receipt.footer").await.unwrap();
    let err = service
        .get_config(&scope, "receipt.footer")
        .await
        .unwrap_err();
    assert!(matches!(err, PosError::NotFound { .. }), "got {:?}", err);

    let audit = service.list_audit(&scope, Some(100)).await.unwrap();
    println!("📝 {} audit entries", audit.len());
    assert!(!audit.is_empty());
}

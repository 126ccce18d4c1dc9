//! Checkout, voids and the sales summary over in-memory storage

mod common;

use chrono::{Duration, Utc};
use common::{money, print_test_header, Fixture};
use pos_service::config::Config;
use pos_service::contract::*;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_cash_sale_prices_numbers_and_moves_stock() {
    print_test_header(
        "test_cash_sale_prices_numbers_and_moves_stock",
        &[
            "A completed sale computes change, gets an INV number",
            "and lowers on-hand stock of the store",
        ],
    );
    let fx = Fixture::new().await;
    let product = fx.product("KOPI-250", 10).await;

    let sale = fx
        .service
        .create_sale(&fx.cashier(fx.main.id), fx.cash_sale(fx.main.id, &[(product.id, 3)], 50_000))
        .await
        .unwrap();
    println!("🧾 {} total={} change={}", sale.number, sale.total, sale.change);

    assert!(sale.number.starts_with("INV-"));
    assert!(sale.number.ends_with("-0001"));
    assert_eq!(sale.subtotal, money(30_000));
    assert_eq!(sale.total, money(30_000));
    assert_eq!(sale.change, money(20_000));
    assert_eq!(sale.status, DocumentStatus::Completed);
    assert_eq!(sale.actor.as_deref(), Some("kasir"));
    assert_eq!(fx.on_hand(fx.main.id, product.id).await, 7);

    let second = fx
        .service
        .create_sale(&fx.scope, fx.cash_sale(fx.main.id, &[(product.id, 1)], 10_000))
        .await
        .unwrap();
    assert!(second.number.ends_with("-0002"));
    assert_eq!(second.change, Decimal::ZERO);

    assert!(fx.publisher.tables().contains(&ChangeTable::Sales));
    let audit = fx.service.list_audit(&fx.scope, None).await.unwrap();
    assert_eq!(audit.iter().filter(|e| e.action == "sale.create").count(), 2);
}

#[tokio::test]
async fn test_promo_cap_and_tax() {
    print_test_header(
        "test_promo_cap_and_tax",
        &["Promo discount is capped, tax applies to the discounted subtotal"],
    );
    let config = Config {
        tax_rate_percent: Decimal::from(11),
        ..Config::default()
    };
    let fx = Fixture::with_config(config).await;
    let product = fx.product("TEH-01", 20).await;
    fx.service
        .create_promo(
            &fx.scope,
            NewPromo {
                code: "hemat10".to_string(),
                name: "Hemat 10%".to_string(),
                percent_off: Decimal::from(10),
                max_discount: Some(money(2_000)),
                min_purchase: money(20_000),
                starts_at: Utc::now() - Duration::hours(1),
                ends_at: None,
            },
        )
        .await
        .unwrap();

    let mut input = fx.cash_sale(fx.main.id, &[(product.id, 3)], 31_080);
    input.promo_code = Some("HEMAT10".to_string());
    let sale = fx.service.create_sale(&fx.scope, input).await.unwrap();
    println!(
        "🧾 subtotal={} promo={} tax={} total={}",
        sale.subtotal, sale.promo_discount, sale.tax, sale.total
    );

    assert_eq!(sale.subtotal, money(30_000));
    assert_eq!(sale.promo_discount, money(2_000));
    assert_eq!(sale.tax, money(3_080));
    assert_eq!(sale.total, money(31_080));
    assert_eq!(sale.change, Decimal::ZERO);
    assert!(sale.promo_id.is_some());

    // Below the minimum purchase
    let mut small = fx.cash_sale(fx.main.id, &[(product.id, 1)], 20_000);
    small.promo_code = Some("hemat10".to_string());
    let err = fx.service.create_sale(&fx.scope, small).await.unwrap_err();
    assert!(matches!(err, PosError::Validation { .. }), "got {:?}", err);

    // Deactivated promos are refused
    fx.service.deactivate_promo(&fx.scope, "hemat10").await.unwrap();
    let mut late = fx.cash_sale(fx.main.id, &[(product.id, 3)], 50_000);
    late.promo_code = Some("HEMAT10".to_string());
    let err = fx.service.create_sale(&fx.scope, late).await.unwrap_err();
    assert!(matches!(err, PosError::Validation { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_insufficient_stock_and_payment_leave_no_trace() {
    print_test_header(
        "test_insufficient_stock_and_payment_leave_no_trace",
        &["Rejected checkouts store nothing and publish nothing"],
    );
    let fx = Fixture::new().await;
    let product = fx.product("GULA-1KG", 2).await;
    fx.publisher.clear();

    let err = fx
        .service
        .create_sale(&fx.scope, fx.cash_sale(fx.main.id, &[(product.id, 3)], 100_000))
        .await
        .unwrap_err();
    println!("❌ {}", err);
    assert_eq!(
        err,
        PosError::InsufficientStock {
            product_id: product.id,
            available: 2,
            requested: 3,
        }
    );

    // Two lines of the same product are summed before the check
    let err = fx
        .service
        .create_sale(
            &fx.scope,
            fx.cash_sale(fx.main.id, &[(product.id, 1), (product.id, 2)], 100_000),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PosError::InsufficientStock { requested: 3, .. }));

    let err = fx
        .service
        .create_sale(&fx.scope, fx.cash_sale(fx.main.id, &[(product.id, 1)], 5_000))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PosError::InsufficientPayment {
            total: money(10_000),
            paid: money(5_000),
        }
    );

    let sales = fx
        .service
        .list_sales(&fx.scope, DocumentFilter::default(), Page::new(50, 0))
        .await
        .unwrap();
    assert!(sales.is_empty());
    assert!(!fx.publisher.tables().contains(&ChangeTable::Sales));
    assert_eq!(fx.on_hand(fx.main.id, product.id).await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checkouts_cannot_oversell() {
    print_test_header(
        "test_concurrent_checkouts_cannot_oversell",
        &[
            "Eight cashiers race for the last unit while storage is slow",
            "exactly one sale goes through",
        ],
    );
    let fx = Fixture::new().await;
    let product = fx.product("KOPI-LAST", 1).await;
    fx.storage.delay_writes(std::time::Duration::from_millis(20));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let service = fx.service.clone();
        let scope = fx.scope.clone();
        let input = fx.cash_sale(fx.main.id, &[(product.id, 1)], 10_000);
        tasks.push(tokio::spawn(async move {
            service.create_sale(&scope, input).await
        }));
    }

    let mut completed = 0;
    let mut refused = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => completed += 1,
            Err(PosError::InsufficientStock { available: 0, .. }) => refused += 1,
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }
    println!("🛒 completed={} refused={}", completed, refused);

    assert_eq!(completed, 1);
    assert_eq!(refused, 7);
    assert_eq!(fx.on_hand(fx.main.id, product.id).await, 0);
}

#[tokio::test]
async fn test_negative_stock_allowed_by_config() {
    print_test_header(
        "test_negative_stock_allowed_by_config",
        &["allow_negative_stock skips the on-hand check"],
    );
    let config = Config {
        allow_negative_stock: true,
        ..Config::default()
    };
    let fx = Fixture::with_config(config).await;
    let product = fx.product("MIE-01", 1).await;

    fx.service
        .create_sale(&fx.scope, fx.cash_sale(fx.main.id, &[(product.id, 3)], 30_000))
        .await
        .unwrap();
    assert_eq!(fx.on_hand(fx.main.id, product.id).await, -2);
}

#[tokio::test]
async fn test_sale_validation() {
    print_test_header(
        "test_sale_validation",
        &["Empty baskets, bad quantities, foreign stores and wrong parties are rejected"],
    );
    let fx = Fixture::new().await;
    let product = fx.product("SABUN-01", 10).await;
    let supplier = fx.party(PartyKind::Supplier, "PT Sumber").await;

    let empty = fx.cash_sale(fx.main.id, &[], 0);
    assert!(matches!(
        fx.service.create_sale(&fx.scope, empty).await,
        Err(PosError::Validation { .. })
    ));

    let zero = fx.cash_sale(fx.main.id, &[(product.id, 0)], 0);
    assert!(matches!(
        fx.service.create_sale(&fx.scope, zero).await,
        Err(PosError::Validation { .. })
    ));

    // Product is homed in the main store
    let elsewhere = fx.cash_sale(fx.branch.id, &[(product.id, 1)], 10_000);
    assert!(matches!(
        fx.service.create_sale(&fx.scope, elsewhere).await,
        Err(PosError::Validation { .. })
    ));

    // A cashier pinned to the branch cannot sell in the main store
    let pinned = fx.cash_sale(fx.main.id, &[(product.id, 1)], 10_000);
    assert!(matches!(
        fx.service.create_sale(&fx.cashier(fx.branch.id), pinned).await,
        Err(PosError::Forbidden { .. })
    ));

    // A supplier is not a customer
    let mut wrong_party = fx.cash_sale(fx.main.id, &[(product.id, 1)], 10_000);
    wrong_party.customer_id = Some(supplier.id);
    assert!(matches!(
        fx.service.create_sale(&fx.scope, wrong_party).await,
        Err(PosError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected_not_panicking() {
    print_test_header(
        "test_oversized_amounts_are_rejected_not_panicking",
        &["Amounts beyond what storage holds fail validation instead of overflowing"],
    );
    let config = Config {
        allow_negative_stock: true,
        ..Config::default()
    };
    let fx = Fixture::with_config(config).await;
    let product = fx.product("EMAS-1G", 1).await;
    let supplier = fx.party(PartyKind::Supplier, "PT Logam").await;
    let huge = Decimal::from(1_000_000_000_000_000i64);

    let mut sale = fx.cash_sale(fx.main.id, &[(product.id, 1_000_000_000_000_000)], 0);
    sale.lines[0].unit_price = Some(huge);
    sale.paid = huge;
    let err = fx.service.create_sale(&fx.scope, sale).await.unwrap_err();
    println!("❌ {}", err);
    assert!(matches!(err, PosError::Validation { .. }), "got {:?}", err);

    // In range per unit, out of range per line
    let mut sale = fx.cash_sale(fx.main.id, &[(product.id, 1_000_000_000_000_000)], 0);
    sale.lines[0].unit_price = Some(money(10_000));
    let err = fx.service.create_sale(&fx.scope, sale).await.unwrap_err();
    assert!(matches!(err, PosError::Validation { .. }), "got {:?}", err);

    let mut sale = fx.cash_sale(fx.main.id, &[(product.id, 1)], 10_000);
    sale.paid = huge;
    let err = fx.service.create_sale(&fx.scope, sale).await.unwrap_err();
    assert!(matches!(err, PosError::Validation { .. }), "got {:?}", err);

    let mut purchase = fx.purchase_of(fx.main.id, supplier.id, &[(product.id, i64::MAX, 1)]);
    purchase.lines[0].unit_cost = huge;
    let err = fx.service.create_purchase(&fx.scope, purchase).await.unwrap_err();
    assert!(matches!(err, PosError::Validation { .. }), "got {:?}", err);

    let sales = fx
        .service
        .list_sales(&fx.scope, DocumentFilter::default(), Page::new(50, 0))
        .await
        .unwrap();
    assert!(sales.is_empty());
}

#[tokio::test]
async fn test_void_restores_stock_once() {
    print_test_header(
        "test_void_restores_stock_once",
        &["Voiding a sale puts the goods back; a second void is a conflict"],
    );
    let fx = Fixture::new().await;
    let product = fx.product("BERAS-5KG", 10).await;
    let sale = fx
        .service
        .create_sale(&fx.scope, fx.cash_sale(fx.main.id, &[(product.id, 4)], 40_000))
        .await
        .unwrap();
    assert_eq!(fx.on_hand(fx.main.id, product.id).await, 6);

    let voided = fx
        .service
        .void_sale(&fx.scope, sale.id, Some("salah input".to_string()))
        .await
        .unwrap();
    println!("🚫 voided {} at {:?}", voided.number, voided.voided_at);
    assert_eq!(voided.status, DocumentStatus::Voided);
    assert!(voided.voided_at.is_some());
    assert_eq!(fx.on_hand(fx.main.id, product.id).await, 10);

    let stored = fx.service.get_sale(&fx.scope, sale.id).await.unwrap();
    assert_eq!(stored.status, DocumentStatus::Voided);

    let err = fx.service.void_sale(&fx.scope, sale.id, None).await.unwrap_err();
    assert!(matches!(err, PosError::Conflict { .. }));
}

#[tokio::test]
async fn test_void_refused_after_return() {
    print_test_header(
        "test_void_refused_after_return",
        &["A sale with returns cannot be voided"],
    );
    let fx = Fixture::new().await;
    let product = fx.product("SUSU-01", 10).await;
    let sale = fx
        .service
        .create_sale(&fx.scope, fx.cash_sale(fx.main.id, &[(product.id, 2)], 20_000))
        .await
        .unwrap();
    fx.service
        .create_sales_return(
            &fx.scope,
            sale.id,
            vec![NewReturnLine {
                product_id: product.id,
                quantity: 1,
            }],
            None,
        )
        .await
        .unwrap();

    let err = fx.service.void_sale(&fx.scope, sale.id, None).await.unwrap_err();
    assert!(matches!(err, PosError::Conflict { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_sales_summary() {
    print_test_header(
        "test_sales_summary",
        &["Summary counts completed and voided sales and sales returns"],
    );
    let fx = Fixture::new().await;
    let product = fx.product("ROTI-01", 20).await;

    let kept = fx
        .service
        .create_sale(&fx.scope, fx.cash_sale(fx.main.id, &[(product.id, 2)], 20_000))
        .await
        .unwrap();
    let voided = fx
        .service
        .create_sale(&fx.scope, fx.cash_sale(fx.main.id, &[(product.id, 1)], 10_000))
        .await
        .unwrap();
    fx.service.void_sale(&fx.scope, voided.id, None).await.unwrap();
    fx.service
        .create_sales_return(
            &fx.scope,
            kept.id,
            vec![NewReturnLine {
                product_id: product.id,
                quantity: 1,
            }],
            Some("rusak".to_string()),
        )
        .await
        .unwrap();

    let now = Utc::now();
    let summary = fx
        .service
        .sales_summary(&fx.scope, fx.main.id, now - Duration::hours(1), now + Duration::hours(1))
        .await
        .unwrap();
    println!("📊 {:?}", summary);

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.voided, 1);
    assert_eq!(summary.gross, money(20_000));
    assert_eq!(summary.net, money(20_000));
    assert_eq!(summary.returns, 1);
    assert_eq!(summary.returns_total, money(10_000));

    let err = fx
        .service
        .sales_summary(&fx.scope, fx.main.id, now, now)
        .await
        .unwrap_err();
    assert!(matches!(err, PosError::Validation { .. }));
}

#[tokio::test]
async fn test_publish_and_audit_failures_do_not_fail_the_sale() {
    print_test_header(
        "test_publish_and_audit_failures_do_not_fail_the_sale",
        &["The write succeeds even when the broker and the audit log are down"],
    );
    let fx = Fixture::new().await;
    let product = fx.product("KECAP-01", 5).await;
    let audit_before = fx.storage.audit_len();

    fx.publisher.fail(true);
    fx.storage.fail_audit(true);

    let sale = fx
        .service
        .create_sale(&fx.scope, fx.cash_sale(fx.main.id, &[(product.id, 1)], 10_000))
        .await;
    assert!(sale.is_ok());
    assert_eq!(fx.storage.audit_len(), audit_before);
    assert_eq!(fx.on_hand(fx.main.id, product.id).await, 4);
}

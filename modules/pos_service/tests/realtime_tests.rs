//! Realtime invalidation driven by service writes

mod common;

use common::{print_test_header, Fixture, MemoryStore};
use pos_service::config::{Config, RealtimeConfig};
use pos_service::contract::*;
use pos_service::domain::Service;
use pos_service::PosServiceModule;
use std::sync::Arc;
use std::time::Duration;

struct Realtime {
    module: PosServiceModule,
    service: Arc<Service>,
    scope: TenantScope,
    store: Store,
}

async fn setup(debounce_ms: u64, max_wait_ms: u64) -> Realtime {
    let config = Config {
        realtime: RealtimeConfig {
            debounce: Duration::from_millis(debounce_ms),
            max_wait: Duration::from_millis(max_wait_ms),
            channel_capacity: 16,
        },
        ..Config::default()
    };
    let storage = MemoryStore::new();
    let module = PosServiceModule::with_repositories(config, storage.repositories());
    let service = module.service();

    let tenant = service.create_tenant("Toko Realtime").await.unwrap();
    let scope = TenantScope::tenant(tenant.id).with_actor("owner");
    let store = service.create_store(&scope, "Pusat", None).await.unwrap();
    Realtime {
        module,
        service,
        scope,
        store,
    }
}

#[tokio::test(start_paused = true)]
async fn test_sale_invalidates_sales_and_stock_channels() {
    print_test_header(
        "test_sale_invalidates_sales_and_stock_channels",
        &["A sale reaches the sales channel and the derived stock_levels channel"],
    );
    let rt = setup(50, 500).await;
    let product = rt
        .service
        .create_product(&rt.scope, Fixture::new_product("RT-01", Some(rt.store.id), 10))
        .await
        .unwrap();

    let channels = rt.module.channels();
    let mut sales = channels.subscribe(rt.scope.tenant_id, ChangeTable::Sales);
    let mut stock = channels.subscribe(rt.scope.tenant_id, ChangeTable::StockLevels);

    let input = NewSale {
        store_id: rt.store.id,
        customer_id: None,
        promo_code: None,
        lines: vec![NewSaleLine {
            product_id: product.id,
            quantity: 2,
            unit_price: None,
            discount: rust_decimal::Decimal::ZERO,
        }],
        paid: rust_decimal::Decimal::from(20_000),
        payment_method: PaymentMethod::Qris,
        note: None,
    };
    let sale = rt.service.create_sale(&rt.scope, input).await.unwrap();

    let notice = sales.recv().await.expect("sales notice");
    println!("📣 {} events={} records={:?}", notice.channel, notice.event_count, notice.record_ids);
    assert_eq!(notice.table, ChangeTable::Sales);
    assert!(notice.record_ids.contains(&sale.id));
    assert!(notice.kinds.contains(&ChangeKind::Insert));

    let notice = stock.recv().await.expect("stock notice");
    assert_eq!(notice.table, ChangeTable::StockLevels);
    assert!(notice.touches_store(rt.store.id));
    assert!(notice.product_ids.contains(&product.id));
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_writes_becomes_one_notice() {
    print_test_header(
        "test_burst_of_writes_becomes_one_notice",
        &["Writes inside the debounce window are coalesced"],
    );
    let rt = setup(100, 1_000).await;
    let mut products = rt
        .module
        .channels()
        .subscribe(rt.scope.tenant_id, ChangeTable::Products);

    for i in 0..5 {
        rt.service
            .create_product(&rt.scope, Fixture::new_product(&format!("BURST-{}", i), None, 0))
            .await
            .unwrap();
    }

    let notice = products.recv().await.expect("products notice");
    println!("📣 {} events={}", notice.channel, notice.event_count);
    assert_eq!(notice.event_count, 5);
    assert_eq!(notice.record_ids.len(), 5);

    let quiet = tokio::time::timeout(Duration::from_millis(500), products.recv()).await;
    assert!(quiet.is_err(), "no second notice expected");

    let stats = rt.module.channels().stats();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].events_received, 5);
    assert_eq!(stats[0].notices_sent, 1);
}

#[tokio::test(start_paused = true)]
async fn test_max_wait_flushes_a_steady_stream() {
    print_test_header(
        "test_max_wait_flushes_a_steady_stream",
        &["Writes spaced below the debounce still produce a notice within max_wait"],
    );
    let rt = setup(100, 250).await;
    let mut sub = rt
        .module
        .channels()
        .subscribe(rt.scope.tenant_id, ChangeTable::Config);

    for i in 0..8 {
        rt.service
            .set_config(&rt.scope, "display.banner", serde_json::json!(i))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
    }

    let first = sub.recv().await.expect("first notice");
    assert!(first.event_count < 8, "max_wait must cut the burst");
    // Every event reuses the same record id
    assert_eq!(first.record_ids.len(), 1);

    let mut total = first.event_count;
    while total < 8 {
        total += sub.recv().await.expect("next notice").event_count;
    }
    assert_eq!(total, 8);
}

#[tokio::test(start_paused = true)]
async fn test_unwatched_tables_open_no_channels() {
    print_test_header(
        "test_unwatched_tables_open_no_channels",
        &["Writes without subscribers are dropped; dropping a subscription closes its channel"],
    );
    let rt = setup(10, 100).await;
    let channels = rt.module.channels();
    assert_eq!(channels.channel_count(), 0);

    let client = rt.module.client();
    let sub = client.subscribe(&rt.scope, ChangeTable::Promos);
    assert_eq!(sub.channel_name(), format!("realtime:{}:promos", rt.scope.tenant_id));
    assert_eq!(channels.subscriber_count(rt.scope.tenant_id, ChangeTable::Promos), 1);

    rt.service
        .create_product(&rt.scope, Fixture::new_product("QUIET-01", None, 0))
        .await
        .unwrap();
    assert_eq!(channels.channel_count(), 1);

    drop(sub);
    assert_eq!(channels.channel_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_other_tenants_stay_silent() {
    print_test_header(
        "test_other_tenants_stay_silent",
        &["Channels are per tenant"],
    );
    let rt = setup(10, 100).await;
    let other = rt.service.create_tenant("Tetangga").await.unwrap();
    let mut theirs = rt
        .module
        .channels()
        .subscribe(other.id, ChangeTable::Products);

    rt.service
        .create_product(&rt.scope, Fixture::new_product("MINE-01", None, 0))
        .await
        .unwrap();

    let nothing = tokio::time::timeout(Duration::from_millis(500), theirs.recv()).await;
    assert!(nothing.is_err());
}

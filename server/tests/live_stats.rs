//! Live-stats broadcaster integration tests.

use std::sync::Arc;
use std::time::Duration;

use boutique_server::auth::{AuthService, JwtConfig, JwtService, RegisterRequest};
use boutique_server::db::DbService;
use boutique_server::db::models::product::{Audience, Category};
use boutique_server::db::models::{OrderStatus, ProductCreate, SizeStock};
use boutique_server::db::repository::{OrderRepository, ProductRepository};
use boutique_server::services::{
    EventSink, LiveEvent, LogNotifier, StatsBroadcaster, StatsHub, compute_stats,
};
use tempfile::TempDir;

async fn open_db(tmp: &TempDir) -> DbService {
    DbService::new(tmp.path().to_str().unwrap())
        .await
        .expect("Failed to open test database")
}

fn jwt() -> Arc<JwtService> {
    Arc::new(JwtService::new(JwtConfig {
        secret: "integration-test-secret-32-chars-long!!".to_string(),
        client_expiry_hours: 7 * 24,
        admin_expiry_hours: 24,
    }))
}

async fn seed_product(db: &surrealdb::Surreal<surrealdb::engine::local::Db>) -> String {
    let product = ProductRepository::new(db.clone())
        .create(ProductCreate {
            name: "Hoodie".into(),
            description: "x".into(),
            price: 50.0,
            sale_price: None,
            category: Category::Hoodie,
            audience: Audience::Women,
            brand: "Boutique".into(),
            images: None,
            sizes: Some(vec![SizeStock { name: "M".into(), stock: 5 }]),
            colors: None,
            on_sale: None,
            is_new: None,
            popular: None,
        })
        .await
        .unwrap();
    product.id_string()
}

#[tokio::test]
async fn compute_stats_counts_clients_and_confirmed_revenue() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await.db;

    let hub = StatsHub::new();
    let sink: Arc<dyn EventSink> = Arc::new(StatsBroadcaster::new(db.clone(), hub.clone()));
    let auth = AuthService::new(db.clone(), jwt(), Arc::new(LogNotifier), sink.clone());

    // Two clients + one admin: only clients count
    for email in ["a@b.com", "c@d.com"] {
        auth.register(RegisterRequest {
            email: email.into(),
            password: "secret1".into(),
            first_name: "X".into(),
            last_name: "Y".into(),
            phone: None,
            address: None,
        })
        .await
        .unwrap();
    }
    auth.admin_bootstrap(RegisterRequest {
        email: "admin@b.com".into(),
        password: "secret1".into(),
        first_name: "A".into(),
        last_name: "D".into(),
        phone: None,
        address: None,
    })
    .await
    .unwrap();

    seed_product(&db).await;

    let snapshot = compute_stats(&db).await.unwrap();
    assert_eq!(snapshot.total_users, 2);
    assert_eq!(snapshot.total_products, 1);
    assert_eq!(snapshot.total_orders, 0);
    assert_eq!(snapshot.revenue, 0.0);
}

#[tokio::test]
async fn revenue_counts_confirmed_orders_only() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await.db;
    let orders = OrderRepository::new(db.clone());

    // Persist orders directly with various statuses
    use boutique_server::db::models::{
        BillingAddress, Order, OrderItem, PaymentMethod, ShippingAddress,
    };
    use surrealdb::RecordId;

    let shipping = ShippingAddress {
        first_name: "X".into(),
        last_name: "Y".into(),
        street: "s".into(),
        city: "c".into(),
        postal_code: "p".into(),
        country: "t".into(),
        phone: "0".into(),
    };

    for (status, total) in [
        (OrderStatus::Pending, 10.0),
        (OrderStatus::Confirmed, 25.5),
        (OrderStatus::Confirmed, 74.5),
        (OrderStatus::Cancelled, 99.0),
        (OrderStatus::Delivered, 42.0),
    ] {
        orders
            .create(Order {
                id: None,
                user: RecordId::from_table_key("user", "u1"),
                items: vec![OrderItem::Standard {
                    product: RecordId::from_table_key("product", "p1"),
                    name: "Hoodie".into(),
                    quantity: 1,
                    size: "M".into(),
                    color: "black".into(),
                    unit_price: total,
                    line_total: total,
                }],
                shipping_address: shipping.clone(),
                billing_address: BillingAddress::from(&shipping),
                payment_method: PaymentMethod::Card,
                status,
                subtotal: total,
                shipping_fee: 0.0,
                discount: 0.0,
                total,
                tracking_number: None,
                notes: None,
                created_at: shared::util::now_millis(),
                delivered_at: None,
            })
            .await
            .unwrap();
    }

    assert_eq!(orders.revenue_confirmed().await.unwrap(), 100.0);

    let snapshot = compute_stats(&db).await.unwrap();
    assert_eq!(snapshot.total_orders, 5);
    assert_eq!(snapshot.revenue, 100.0);
}

#[tokio::test]
async fn stats_changed_broadcasts_to_subscribers() {
    let tmp = TempDir::new().unwrap();
    let db = open_db(&tmp).await.db;

    let hub = StatsHub::new();
    let broadcaster = StatsBroadcaster::new(db.clone(), hub.clone());
    let mut rx = hub.subscribe();

    seed_product(&db).await;
    broadcaster.stats_changed();

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for stats broadcast")
        .unwrap();

    match event {
        LiveEvent::StatsUpdated(snapshot) => {
            assert_eq!(snapshot.total_products, 1);
        }
        other => panic!("Expected StatsUpdated, got {other:?}"),
    }
}

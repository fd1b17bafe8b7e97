//! Order engine tests
//!
//! Each test runs against its own embedded database in a temp dir.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tempfile::TempDir;

use crate::auth::CurrentUser;
use crate::db::DbService;
use crate::db::models::{
    OrderItem, OrderStatus, PaymentMethod, Product, ProductCreate, Role, ShippingAddress,
    SizeStock, User,
};
use crate::db::models::product::{Audience, Category};
use crate::db::repository::{CartRepository, OrderRepository, ProductRepository, UserRepository, record_id};
use crate::orders::engine::{CreateOrderRequest, CustomOrderRequest, OrderEngine};
use crate::services::{EventSink, LiveEvent, LogNotifier};

struct RecordingSink {
    stats_calls: AtomicUsize,
    events: Mutex<Vec<LiveEvent>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            stats_calls: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
        })
    }

    fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: LiveEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn stats_changed(&self) {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct TestCtx {
    _tmp: TempDir,
    db: Surreal<Db>,
    engine: OrderEngine,
    sink: Arc<RecordingSink>,
}

async fn ctx() -> TestCtx {
    let tmp = TempDir::new().unwrap();
    let service = DbService::new(tmp.path().to_str().unwrap())
        .await
        .expect("Failed to open test database");
    let db = service.db;

    let sink = RecordingSink::new();
    let engine = OrderEngine::new(db.clone(), Arc::new(LogNotifier), sink.clone());

    TestCtx {
        _tmp: tmp,
        db,
        engine,
        sink,
    }
}

async fn seed_user(db: &Surreal<Db>, email: &str) -> User {
    UserRepository::new(db.clone())
        .create(User {
            id: None,
            email: email.to_string(),
            password_hash: Some(shared::util::hash_password("secret1").unwrap()),
            first_name: "Test".into(),
            last_name: "Client".into(),
            phone: Some("+216 11 111 111".into()),
            address: None,
            role: Role::Client,
            is_oauth: false,
            google_id: None,
            facebook_id: None,
            is_active: true,
            last_login: None,
            created_at: shared::util::now_millis(),
        })
        .await
        .expect("Failed to seed user")
}

async fn seed_product(db: &Surreal<Db>, stock_m: i64) -> Product {
    ProductRepository::new(db.clone())
        .create(ProductCreate {
            name: "Classic hoodie".into(),
            description: "A hoodie".into(),
            price: 40.0,
            sale_price: None,
            category: Category::Hoodie,
            audience: Audience::Men,
            brand: "Boutique".into(),
            images: None,
            sizes: Some(vec![
                SizeStock { name: "M".into(), stock: stock_m },
                SizeStock { name: "L".into(), stock: 10 },
            ]),
            colors: None,
            on_sale: None,
            is_new: None,
            popular: None,
        })
        .await
        .expect("Failed to seed product")
}

async fn fill_cart(db: &Surreal<Db>, user: &User, product: &Product, quantity: i64, size: &str) {
    let carts = CartRepository::new(db.clone());
    let user_id = record_id("user", &user.id_string());
    let mut cart = carts.get_or_create(&user_id).await.unwrap();
    cart.add_line(
        product.id.clone().unwrap(),
        quantity,
        size.to_string(),
        "black".to_string(),
        product.effective_price(),
        shared::util::now_millis(),
    );
    carts.save_items(&cart).await.unwrap();
}

fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        first_name: "Test".into(),
        last_name: "Client".into(),
        street: "1 Rue de la Mode".into(),
        city: "Tunis".into(),
        postal_code: "1000".into(),
        country: "Tunisia".into(),
        phone: "+216 11 111 111".into(),
    }
}

fn order_request() -> CreateOrderRequest {
    CreateOrderRequest {
        shipping_address: shipping_address(),
        billing_address: None,
        payment_method: "card".into(),
        notes: None,
    }
}

#[tokio::test]
async fn create_order_freezes_lines_and_computes_totals() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;
    let product = seed_product(&ctx.db, 10).await;
    fill_cart(&ctx.db, &user, &product, 2, "M").await;

    let order = ctx
        .engine
        .create_order(&user.id_string(), order_request())
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 1);
    match &order.items[0] {
        OrderItem::Standard {
            name,
            quantity,
            unit_price,
            line_total,
            ..
        } => {
            assert_eq!(name, "Classic hoodie");
            assert_eq!(*quantity, 2);
            assert_eq!(*unit_price, 40.0);
            assert_eq!(*line_total, 80.0);
        }
        other => panic!("Expected a standard item, got {other:?}"),
    }

    // Subtotal below the 100.0 free threshold -> flat fee applies
    assert_eq!(order.subtotal, 80.0);
    assert_eq!(order.shipping_fee, 5.9);
    assert_eq!(order.total, order.subtotal + order.shipping_fee - order.discount);

    // Billing defaulted from shipping
    assert_eq!(order.billing_address.city, "Tunis");
    assert_eq!(ctx.sink.stats_calls(), 1);
}

#[tokio::test]
async fn create_order_free_shipping_over_threshold() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;
    let product = seed_product(&ctx.db, 10).await;
    fill_cart(&ctx.db, &user, &product, 3, "M").await; // 120.0 >= 100.0

    let order = ctx
        .engine
        .create_order(&user.id_string(), order_request())
        .await
        .unwrap();

    assert_eq!(order.subtotal, 120.0);
    assert_eq!(order.shipping_fee, 0.0);
    assert_eq!(order.total, 120.0);
}

#[tokio::test]
async fn create_order_empty_cart_rejected_without_side_effects() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;

    let err = ctx
        .engine
        .create_order(&user.id_string(), order_request())
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::CartEmpty);

    // No order persisted, no stats broadcast fired
    let orders = OrderRepository::new(ctx.db.clone());
    assert_eq!(orders.count().await.unwrap(), 0);
    assert_eq!(ctx.sink.stats_calls(), 0);
}

#[tokio::test]
async fn create_order_rejects_disabled_payment_method() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;
    let product = seed_product(&ctx.db, 10).await;
    fill_cart(&ctx.db, &user, &product, 1, "M").await;

    let mut req = order_request();
    req.payment_method = "bitcoin".into();

    let err = ctx
        .engine
        .create_order(&user.id_string(), req)
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::PaymentMethodDisabled);
    assert_eq!(ctx.sink.stats_calls(), 0);
}

#[tokio::test]
async fn create_order_decrements_stock_unguarded() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;
    let product = seed_product(&ctx.db, 3).await;
    let products = ProductRepository::new(ctx.db.clone());
    let product_id = product.id_string();

    // First order: 3 x M against stock 3 -> 0
    fill_cart(&ctx.db, &user, &product, 3, "M").await;
    ctx.engine
        .create_order(&user.id_string(), order_request())
        .await
        .unwrap();

    let after_first = products.find_by_id(&product_id).await.unwrap().unwrap();
    assert_eq!(after_first.stock_for("M"), Some(0));
    // Other sizes untouched
    assert_eq!(after_first.stock_for("L"), Some(10));

    // Second identical order is still accepted; the counter goes negative
    let carts = CartRepository::new(ctx.db.clone());
    let user_rid = record_id("user", &user.id_string());
    let mut cart = carts.get_or_create(&user_rid).await.unwrap();
    cart.add_line(
        product.id.clone().unwrap(),
        3,
        "M".into(),
        "black".into(),
        product.effective_price(),
        shared::util::now_millis(),
    );
    carts.save_items(&cart).await.unwrap();

    ctx.engine
        .create_order(&user.id_string(), order_request())
        .await
        .unwrap();

    let after_second = products.find_by_id(&product_id).await.unwrap().unwrap();
    assert_eq!(after_second.stock_for("M"), Some(-3));
}

#[tokio::test]
async fn create_order_clears_cart() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;
    let product = seed_product(&ctx.db, 10).await;
    fill_cart(&ctx.db, &user, &product, 2, "M").await;

    ctx.engine
        .create_order(&user.id_string(), order_request())
        .await
        .unwrap();

    let carts = CartRepository::new(ctx.db.clone());
    let cart = carts
        .find_by_user(&record_id("user", &user.id_string()))
        .await
        .unwrap()
        .unwrap();
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn concurrent_orders_decrement_without_lost_updates() {
    let ctx = ctx().await;
    let alice = seed_user(&ctx.db, "alice@b.com").await;
    let bob = seed_user(&ctx.db, "bob@b.com").await;
    let product = seed_product(&ctx.db, 10).await;

    fill_cart(&ctx.db, &alice, &product, 2, "M").await;
    fill_cart(&ctx.db, &bob, &product, 3, "M").await;

    let (a, b) = tokio::join!(
        ctx.engine.create_order(&alice.id_string(), order_request()),
        ctx.engine.create_order(&bob.id_string(), order_request()),
    );
    a.unwrap();
    b.unwrap();

    let products = ProductRepository::new(ctx.db.clone());
    let after = products
        .find_by_id(&product.id_string())
        .await
        .unwrap()
        .unwrap();
    // Both decrements landed: 10 - 2 - 3
    assert_eq!(after.stock_for("M"), Some(5));
}

#[tokio::test]
async fn custom_order_bypasses_catalog_with_cash_default() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;

    let order = ctx
        .engine
        .create_custom_order(
            &user.id_string(),
            CustomOrderRequest {
                color: "#001f3f".into(),
                color_name: "Navy".into(),
                logo: "data:image/png;base64,xyz".into(),
                logo_position: "chest".into(),
                logo_size: None,
                price: 30.0,
                quantity: 1,
                size: "M".into(),
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_method, PaymentMethod::Cash);
    // 30.0 <= 50.0 -> small flat fee
    assert_eq!(order.shipping_fee, 5.99);
    assert_eq!(order.total, 35.99);

    match &order.items[0] {
        OrderItem::Custom { name, customization, .. } => {
            assert_eq!(name, "Custom hoodie - Navy");
            assert_eq!(customization.logo_size, 80);
            assert_eq!(customization.color_code, "#001f3f");
        }
        other => panic!("Expected a custom item, got {other:?}"),
    }

    // Address defaults from the user's profile with placeholders
    assert_eq!(order.shipping_address.first_name, "Test");
    assert_eq!(order.shipping_address.street, "To be provided");
    assert_eq!(order.shipping_address.phone, "+216 11 111 111");
    assert_eq!(ctx.sink.stats_calls(), 1);
}

#[tokio::test]
async fn custom_order_free_shipping_above_fifty() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;

    let order = ctx
        .engine
        .create_custom_order(
            &user.id_string(),
            CustomOrderRequest {
                color: "#fff".into(),
                color_name: "White".into(),
                logo: "logo.png".into(),
                logo_position: "back".into(),
                logo_size: Some(120),
                price: 30.0,
                quantity: 2, // 60.0 > 50.0
                size: "L".into(),
                notes: Some("rush".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(order.shipping_fee, 0.0);
    assert_eq!(order.total, 60.0);
    assert_eq!(order.notes.as_deref(), Some("rush"));
}

#[tokio::test]
async fn custom_order_validates_required_fields() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;

    let base = CustomOrderRequest {
        color: "#000".into(),
        color_name: "Black".into(),
        logo: "logo.png".into(),
        logo_position: "chest".into(),
        logo_size: None,
        price: 30.0,
        quantity: 1,
        size: "M".into(),
        notes: None,
    };

    let mut missing_logo = base.clone();
    missing_logo.logo = String::new();
    assert!(ctx
        .engine
        .create_custom_order(&user.id_string(), missing_logo)
        .await
        .is_err());

    let mut bad_quantity = base.clone();
    bad_quantity.quantity = 0;
    assert!(ctx
        .engine
        .create_custom_order(&user.id_string(), bad_quantity)
        .await
        .is_err());

    let mut bad_price = base;
    bad_price.price = -1.0;
    assert!(ctx
        .engine
        .create_custom_order(&user.id_string(), bad_price)
        .await
        .is_err());
}

#[tokio::test]
async fn update_status_is_idempotent_and_keeps_total_invariant() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;
    let product = seed_product(&ctx.db, 10).await;
    fill_cart(&ctx.db, &user, &product, 1, "M").await;

    let order = ctx
        .engine
        .create_order(&user.id_string(), order_request())
        .await
        .unwrap();
    let order_id = order.id_string();

    let first = ctx
        .engine
        .update_status(&order_id, "confirmed", None)
        .await
        .unwrap();
    assert_eq!(first.status, OrderStatus::Confirmed);
    assert!(first.delivered_at.is_none());

    // Re-issuing the same transition changes nothing
    let second = ctx
        .engine
        .update_status(&order_id, "confirmed", None)
        .await
        .unwrap();
    assert_eq!(second.status, OrderStatus::Confirmed);
    assert!(second.delivered_at.is_none());

    assert_eq!(
        second.total,
        second.subtotal + second.shipping_fee - second.discount
    );
}

#[tokio::test]
async fn update_status_delivered_stamps_timestamp_once() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;
    let product = seed_product(&ctx.db, 10).await;
    fill_cart(&ctx.db, &user, &product, 1, "M").await;

    let order = ctx
        .engine
        .create_order(&user.id_string(), order_request())
        .await
        .unwrap();
    let order_id = order.id_string();

    let delivered = ctx
        .engine
        .update_status(&order_id, "delivered", Some("TRACK-1".into()))
        .await
        .unwrap();
    let stamp = delivered.delivered_at.expect("delivery timestamp");
    assert_eq!(delivered.tracking_number.as_deref(), Some("TRACK-1"));

    let again = ctx
        .engine
        .update_status(&order_id, "delivered", None)
        .await
        .unwrap();
    assert_eq!(again.delivered_at, Some(stamp));
    // Tracking number survives a write that omits it
    assert_eq!(again.tracking_number.as_deref(), Some("TRACK-1"));
}

#[tokio::test]
async fn update_status_rejects_unknown_value() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;
    let product = seed_product(&ctx.db, 10).await;
    fill_cart(&ctx.db, &user, &product, 1, "M").await;

    let order = ctx
        .engine
        .create_order(&user.id_string(), order_request())
        .await
        .unwrap();

    let err = ctx
        .engine
        .update_status(&order.id_string(), "teleported", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::InvalidOrderStatus);
}

#[tokio::test]
async fn update_status_missing_order_is_not_found() {
    let ctx = ctx().await;
    let err = ctx
        .engine
        .update_status("orders:nope", "confirmed", None)
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn get_for_user_enforces_ownership() {
    let ctx = ctx().await;
    let alice = seed_user(&ctx.db, "alice@b.com").await;
    let bob = seed_user(&ctx.db, "bob@b.com").await;
    let product = seed_product(&ctx.db, 10).await;
    fill_cart(&ctx.db, &alice, &product, 1, "M").await;

    let order = ctx
        .engine
        .create_order(&alice.id_string(), order_request())
        .await
        .unwrap();
    let order_id = order.id_string();

    let owner = CurrentUser {
        id: alice.id_string(),
        email: alice.email.clone(),
        role: Role::Client,
    };
    assert!(ctx.engine.get_for_user(&order_id, &owner).await.is_ok());

    let stranger = CurrentUser {
        id: bob.id_string(),
        email: bob.email.clone(),
        role: Role::Client,
    };
    let err = ctx
        .engine
        .get_for_user(&order_id, &stranger)
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::PermissionDenied);

    let admin = CurrentUser {
        id: "user:admin".into(),
        email: "admin@b.com".into(),
        role: Role::Admin,
    };
    assert!(ctx.engine.get_for_user(&order_id, &admin).await.is_ok());
}

#[tokio::test]
async fn user_stats_counts_revenue_statuses_only() {
    let ctx = ctx().await;
    let user = seed_user(&ctx.db, "a@b.com").await;
    let product = seed_product(&ctx.db, 50).await;

    // Three orders: one confirmed, one delivered, one cancelled
    for status in ["confirmed", "delivered", "cancelled"] {
        fill_cart(&ctx.db, &user, &product, 1, "M").await;
        let order = ctx
            .engine
            .create_order(&user.id_string(), order_request())
            .await
            .unwrap();
        ctx.engine
            .update_status(&order.id_string(), status, None)
            .await
            .unwrap();
    }

    let (orders, count, spend) = ctx.engine.user_stats(&user.id_string()).await.unwrap();
    assert_eq!(orders.len(), 3);
    assert_eq!(count, 3);
    // 40.0 + 5.9 shipping, twice (cancelled excluded)
    assert_eq!(spend, 2.0 * 45.9);
}

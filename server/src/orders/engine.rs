//! Order engine
//!
//! Turns a cart (or a direct custom request) into a persisted order and
//! drives its status lifecycle. All monetary invariants live here:
//! line totals are frozen at creation time and
//! `total = subtotal + shipping_fee - discount` always holds.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use shared::{AppError, AppResult, ErrorCode, Paginated, util};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::CurrentUser;
use crate::db::models::{
    BillingAddress, Customization, Order, OrderItem, OrderStatus, PaymentMethod, PublicUser,
    ShippingAddress,
};
use crate::db::repository::{
    CartRepository, OrderRepository, ProductRepository, SettingsRepository, UserRepository,
    record_id,
};
use crate::services::{EventSink, Notifier};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};

/// Server-side budget for the own-orders listing
const LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cap on the own-orders listing
const LIST_LIMIT: i64 = 50;

/// Custom orders ship free above this subtotal
const CUSTOM_FREE_SHIPPING_ABOVE: f64 = 50.0;

/// Flat shipping fee for custom orders below the threshold
const CUSTOM_SHIPPING_FEE: f64 = 5.99;

/// Default logo size when the customizer omits one
const DEFAULT_LOGO_SIZE: i64 = 80;

/// Standard order creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub billing_address: Option<BillingAddress>,
    pub payment_method: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Custom item order payload (no catalog reference)
#[derive(Debug, Clone, Deserialize)]
pub struct CustomOrderRequest {
    /// Color code (hex)
    pub color: String,
    pub color_name: String,
    /// Logo reference (URL or inline data)
    pub logo: String,
    pub logo_position: String,
    #[serde(default)]
    pub logo_size: Option<i64>,
    pub price: f64,
    pub quantity: i64,
    pub size: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct OrderEngine {
    orders: OrderRepository,
    carts: CartRepository,
    products: ProductRepository,
    users: UserRepository,
    settings: SettingsRepository,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn EventSink>,
}

impl OrderEngine {
    pub fn new(
        db: Surreal<Db>,
        notifier: Arc<dyn Notifier>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            carts: CartRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            settings: SettingsRepository::new(db),
            notifier,
            events,
        }
    }

    /// Convert the user's cart into a pending order
    ///
    /// Side effects after the order committed, in this sequence: per-line
    /// atomic stock decrement, cart cleared, stats broadcast. None of
    /// them can fail the already-created order.
    pub async fn create_order(&self, user_id: &str, req: CreateOrderRequest) -> AppResult<Order> {
        validate_shipping_address(&req.shipping_address)?;
        validate_optional_text(&req.notes, "notes", MAX_NOTE_LEN)?;

        let settings = self.settings.get_or_create().await?;
        let method = PaymentMethod::parse(&req.payment_method)
            .filter(|m| settings.accepts(*m))
            .ok_or_else(|| AppError::new(ErrorCode::PaymentMethodDisabled))?;

        let user = record_id("user", user_id);
        let cart = self
            .carts
            .find_by_user(&user)
            .await?
            .filter(|c| !c.items.is_empty())
            .ok_or_else(|| AppError::new(ErrorCode::CartEmpty))?;

        // Freeze cart lines into order items
        let mut items = Vec::with_capacity(cart.items.len());
        for line in &cart.items {
            let name = self
                .products
                .find_by_id(&line.product.to_string())
                .await?
                .map(|p| p.name)
                .unwrap_or_default();

            items.push(OrderItem::Standard {
                product: line.product.clone(),
                name,
                quantity: line.quantity,
                size: line.size.clone(),
                color: line.color.clone(),
                unit_price: line.unit_price,
                line_total: line.unit_price * line.quantity as f64,
            });
        }

        let subtotal: f64 = items.iter().map(|i| i.line_total()).sum();
        let shipping_fee = settings.shipping_fee_for(subtotal);
        let total = Order::compute_total(subtotal, shipping_fee, 0.0);

        let order = Order {
            id: None,
            user: user.clone(),
            items,
            billing_address: req
                .billing_address
                .unwrap_or_else(|| BillingAddress::from(&req.shipping_address)),
            shipping_address: req.shipping_address,
            payment_method: method,
            status: OrderStatus::Pending,
            subtotal,
            shipping_fee,
            discount: 0.0,
            total,
            tracking_number: None,
            notes: req.notes,
            created_at: util::now_millis(),
            delivered_at: None,
        };

        let created = self.orders.create(order).await?;
        tracing::info!(
            order_id = %created.id_string(),
            user_id = %user_id,
            total = created.total,
            "Order created"
        );

        // Decrement stock per purchased {product, size}. Unguarded on
        // purpose: counters may go negative but always reflect the net
        // effect of concurrent orders.
        for line in &cart.items {
            if let Err(e) = self
                .products
                .decrement_stock(&line.product.to_string(), &line.size, line.quantity)
                .await
            {
                tracing::warn!(
                    product = %line.product,
                    size = %line.size,
                    error = %e,
                    "Stock decrement failed after order creation"
                );
            }
        }

        if let Err(e) = self.carts.clear(&user).await {
            tracing::warn!(user_id = %user_id, error = %e, "Cart clear failed after order creation");
        }

        self.events.stats_changed();

        Ok(created)
    }

    /// Create an order for a single customized item
    ///
    /// Price and quantity come from the caller; the catalog and its
    /// stock counters are bypassed entirely.
    pub async fn create_custom_order(
        &self,
        user_id: &str,
        req: CustomOrderRequest,
    ) -> AppResult<Order> {
        validate_required_text(&req.color, "color", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&req.color_name, "color_name", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&req.logo, "logo", usize::MAX)?;
        validate_required_text(&req.logo_position, "logo_position", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&req.size, "size", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&req.notes, "notes", MAX_NOTE_LEN)?;
        if req.quantity < 1 {
            return Err(AppError::validation("quantity must be at least 1"));
        }
        if !req.price.is_finite() || req.price <= 0.0 {
            return Err(AppError::validation("price must be a positive number"));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

        let line_total = req.price * req.quantity as f64;
        let item = OrderItem::Custom {
            name: format!("Custom hoodie - {}", req.color_name),
            quantity: req.quantity,
            size: req.size,
            color: req.color_name.clone(),
            unit_price: req.price,
            line_total,
            customization: Customization {
                logo: req.logo,
                logo_position: req.logo_position.clone(),
                logo_size: req.logo_size.unwrap_or(DEFAULT_LOGO_SIZE),
                color_code: req.color,
                color_name: req.color_name.clone(),
            },
        };

        let subtotal = line_total;
        let shipping_fee = if subtotal > CUSTOM_FREE_SHIPPING_ABOVE {
            0.0
        } else {
            CUSTOM_SHIPPING_FEE
        };
        let total = Order::compute_total(subtotal, shipping_fee, 0.0);

        // Address defaults to the on-file name/phone, with placeholder
        // location fields pending later completion
        let placeholder = "To be provided".to_string();
        let shipping_address = ShippingAddress {
            first_name: non_empty_or(&user.first_name, "Not specified"),
            last_name: non_empty_or(&user.last_name, "Not specified"),
            street: placeholder.clone(),
            city: placeholder.clone(),
            postal_code: placeholder.clone(),
            country: user
                .address
                .as_ref()
                .map(|a| a.country.clone())
                .filter(|c| !c.is_empty())
                .unwrap_or(placeholder),
            phone: user.phone.clone().unwrap_or_else(|| "Not specified".into()),
        };

        let order = Order {
            id: None,
            user: record_id("user", user_id),
            items: vec![item],
            billing_address: BillingAddress::from(&shipping_address),
            shipping_address,
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::Pending,
            subtotal,
            shipping_fee,
            discount: 0.0,
            total,
            tracking_number: None,
            notes: Some(req.notes.unwrap_or_else(|| {
                format!(
                    "Custom hoodie order - color: {}, logo position: {}",
                    req.color_name, req.logo_position
                )
            })),
            created_at: util::now_millis(),
            delivered_at: None,
        };

        let created = self.orders.create(order).await?;
        tracing::info!(
            order_id = %created.id_string(),
            user_id = %user_id,
            total = created.total,
            "Custom order created"
        );

        self.events.stats_changed();

        Ok(created)
    }

    /// Admin status transition
    ///
    /// The target status only has to be a recognized value; the engine
    /// trusts the admin on ordering. Status, tracking number and
    /// delivery timestamp are replaced in one write.
    pub async fn update_status(
        &self,
        order_id: &str,
        new_status: &str,
        tracking_number: Option<String>,
    ) -> AppResult<Order> {
        let status = OrderStatus::parse(new_status)
            .ok_or_else(|| AppError::new(ErrorCode::InvalidOrderStatus))?;
        validate_optional_text(&tracking_number, "tracking_number", MAX_SHORT_TEXT_LEN)?;

        let existing = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        let delivered_at = if status == OrderStatus::Delivered {
            existing.delivered_at.or_else(|| Some(util::now_millis()))
        } else {
            existing.delivered_at
        };
        let tracking = tracking_number.or(existing.tracking_number);

        let old_status = existing.status;
        let updated = self
            .orders
            .update_status(order_id, status, tracking, delivered_at)
            .await?;

        tracing::info!(
            order_id = %order_id,
            from = old_status.as_str(),
            to = status.as_str(),
            "Order status updated"
        );

        self.events.stats_changed();

        // Best-effort owner notification; failure is logged and swallowed
        let notifier = self.notifier.clone();
        let users = self.users.clone();
        let owner_id = updated.user.to_string();
        let order_copy = updated.clone();
        tokio::spawn(async move {
            let owner = match users.find_by_id(&owner_id).await {
                Ok(Some(user)) => PublicUser::from(user),
                Ok(None) => {
                    tracing::warn!(order = %order_copy.id_string(), "Order owner not found for notification");
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Owner lookup failed for notification");
                    return;
                }
            };
            if let Err(e) = notifier.send_order_status(&owner, &order_copy, status).await {
                tracing::warn!(error = %e, "Order status notification failed");
            }
        });

        Ok(updated)
    }

    /// The caller's own orders, bounded by a server-side time budget
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Order>> {
        let user = record_id("user", user_id);
        match tokio::time::timeout(LIST_TIMEOUT, self.orders.find_by_user(&user, LIST_LIMIT)).await
        {
            Ok(result) => Ok(result?),
            Err(_) => Err(AppError::timeout("Order listing took too long")),
        }
    }

    /// Fetch one order; owners see their own, admins see all
    pub async fn get_for_user(&self, order_id: &str, current: &CurrentUser) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

        if !current.is_admin() && order.user.to_string() != current.id {
            return Err(AppError::forbidden("Access denied"));
        }

        Ok(order)
    }

    /// Admin page over all orders, optionally filtered by status
    pub async fn list_all(
        &self,
        page: u32,
        limit: u32,
        status: Option<&str>,
    ) -> AppResult<Paginated<Order>> {
        let status = match status {
            Some(value) => Some(
                OrderStatus::parse(value)
                    .ok_or_else(|| AppError::new(ErrorCode::InvalidOrderStatus))?,
            ),
            None => None,
        };

        let (orders, total) = self.orders.find_page(page, limit, status).await?;
        Ok(Paginated::new(orders, total, page, limit))
    }

    /// Per-user order statistics: count and lifetime spend
    ///
    /// Spend counts orders that generated revenue: confirmed, shipped
    /// or delivered.
    pub async fn user_stats(&self, user_id: &str) -> AppResult<(Vec<Order>, u64, f64)> {
        let user = record_id("user", user_id);
        let orders = self.orders.find_all_by_user(&user).await?;

        let count = orders.len() as u64;
        let spend: f64 = orders
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    OrderStatus::Confirmed | OrderStatus::Shipped | OrderStatus::Delivered
                )
            })
            .map(|o| o.total)
            .sum();

        Ok((orders, count, spend))
    }
}

fn validate_shipping_address(address: &ShippingAddress) -> AppResult<()> {
    validate_required_text(&address.first_name, "shipping_address.first_name", MAX_NAME_LEN)?;
    validate_required_text(&address.last_name, "shipping_address.last_name", MAX_NAME_LEN)?;
    validate_required_text(&address.street, "shipping_address.street", MAX_ADDRESS_LEN)?;
    validate_required_text(&address.city, "shipping_address.city", MAX_ADDRESS_LEN)?;
    validate_required_text(
        &address.postal_code,
        "shipping_address.postal_code",
        MAX_SHORT_TEXT_LEN,
    )?;
    validate_required_text(&address.country, "shipping_address.country", MAX_ADDRESS_LEN)?;
    validate_required_text(&address.phone, "shipping_address.phone", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

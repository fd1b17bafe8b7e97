//! Order model
//!
//! Orders are an audit trail: created once, mutated only through status
//! transitions, never deleted.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Order ID type
pub type OrderId = RecordId;

/// Order status state machine
///
/// pending → confirmed → preparing → shipped → delivered, with any
/// non-terminal state → cancelled. Transitions are admin-supplied and
/// validated for enum membership only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status value; `None` for unrecognized input
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "preparing" => Some(OrderStatus::Preparing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Paypal,
    Transfer,
    Cash,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "card" => Some(PaymentMethod::Card),
            "paypal" => Some(PaymentMethod::Paypal),
            "transfer" => Some(PaymentMethod::Transfer),
            "cash" => Some(PaymentMethod::Cash),
            _ => None,
        }
    }
}

/// Shipping address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

/// Billing address (defaults to the shipping address when omitted)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingAddress {
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl From<&ShippingAddress> for BillingAddress {
    fn from(shipping: &ShippingAddress) -> Self {
        Self {
            first_name: shipping.first_name.clone(),
            last_name: shipping.last_name.clone(),
            street: shipping.street.clone(),
            city: shipping.city.clone(),
            postal_code: shipping.postal_code.clone(),
            country: shipping.country.clone(),
        }
    }
}

/// Customization payload for customized items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customization {
    /// Logo reference (URL or inline data)
    pub logo: String,
    pub logo_position: String,
    pub logo_size: i64,
    pub color_code: String,
    pub color_name: String,
}

/// Order line item, frozen at order-creation time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OrderItem {
    /// Regular catalog item
    Standard {
        #[serde(with = "serde_helpers::record_id")]
        product: RecordId,
        name: String,
        quantity: i64,
        size: String,
        color: String,
        unit_price: f64,
        line_total: f64,
    },
    /// Customized item: no catalog reference, no stock tracking
    Custom {
        name: String,
        quantity: i64,
        size: String,
        color: String,
        unit_price: f64,
        line_total: f64,
        customization: Customization,
    },
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        match self {
            OrderItem::Standard { line_total, .. } | OrderItem::Custom { line_total, .. } => {
                *line_total
            }
        }
    }

    pub fn quantity(&self) -> i64 {
        match self {
            OrderItem::Standard { quantity, .. } | OrderItem::Custom { quantity, .. } => *quantity,
        }
    }
}

/// Order record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<OrderId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub billing_address: BillingAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub subtotal: f64,
    #[serde(default)]
    pub shipping_fee: f64,
    #[serde(default)]
    pub discount: f64,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<i64>,
}

impl Order {
    /// The total invariant: `total = subtotal + shipping_fee - discount`
    pub fn compute_total(subtotal: f64, shipping_fee: f64, discount: f64) -> f64 {
        subtotal + shipping_fee - discount
    }

    /// Record id in `orders:<key>` form (empty for unsaved records)
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }
}

//! Store settings (global singleton)
//!
//! Exactly one settings document exists, at the fixed record id
//! `settings:store`. The read path auto-creates the default document.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::PaymentMethod;
use super::serde_helpers;

/// Store metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
    pub description: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Shipping fee schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingSettings {
    /// Flat shipping fee applied below the free threshold
    pub flat_fee: f64,
    /// Subtotal at which shipping becomes free
    pub free_threshold: f64,
    /// Whether free shipping is offered at all
    pub free_enabled: bool,
    /// Advertised delivery delay
    pub delay: String,
}

/// Payment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettings {
    /// Methods currently accepted at checkout
    pub enabled_methods: Vec<PaymentMethod>,
}

/// Maintenance switch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maintenance {
    pub active: bool,
    pub message: String,
}

/// Locale / currency options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub currency: String,
    pub locale: String,
    pub maintenance: Maintenance,
}

/// Global settings document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub store: StoreInfo,
    pub shipping: ShippingSettings,
    pub payment: PaymentSettings,
    pub general: GeneralSettings,
    /// Incremented on every update
    pub version: i64,
    pub updated_at: i64,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_by: Option<RecordId>,
}

impl StoreSettings {
    /// Default settings document created on first read
    pub fn default_document(now: i64) -> Self {
        Self {
            id: None,
            store: StoreInfo {
                name: "Boutique".into(),
                description: "Trendy clothing store".into(),
                email: "contact@boutique.example".into(),
                phone: "+216 00 000 000".into(),
                address: "Rue de la Mode, 1000 Tunis".into(),
            },
            shipping: ShippingSettings {
                flat_fee: 5.9,
                free_threshold: 100.0,
                free_enabled: true,
                delay: "3-5 business days".into(),
            },
            payment: PaymentSettings {
                enabled_methods: vec![
                    PaymentMethod::Card,
                    PaymentMethod::Paypal,
                    PaymentMethod::Transfer,
                    PaymentMethod::Cash,
                ],
            },
            general: GeneralSettings {
                currency: "TND".into(),
                locale: "fr".into(),
                maintenance: Maintenance {
                    active: false,
                    message: "Site under maintenance. Come back soon!".into(),
                },
            },
            version: 1,
            updated_at: now,
            updated_by: None,
        }
    }

    /// Whether a payment method is currently accepted
    pub fn accepts(&self, method: PaymentMethod) -> bool {
        self.payment.enabled_methods.contains(&method)
    }

    /// Shipping fee for a given subtotal
    pub fn shipping_fee_for(&self, subtotal: f64) -> f64 {
        if self.shipping.free_enabled && subtotal >= self.shipping.free_threshold {
            0.0
        } else {
            self.shipping.flat_fee
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accepts_all_methods() {
        let settings = StoreSettings::default_document(0);
        assert!(settings.accepts(PaymentMethod::Card));
        assert!(settings.accepts(PaymentMethod::Cash));
    }

    #[test]
    fn test_shipping_fee_threshold() {
        let settings = StoreSettings::default_document(0);
        assert_eq!(settings.shipping_fee_for(99.9), 5.9);
        assert_eq!(settings.shipping_fee_for(100.0), 0.0);
        assert_eq!(settings.shipping_fee_for(250.0), 0.0);
    }

    #[test]
    fn test_shipping_fee_when_free_disabled() {
        let mut settings = StoreSettings::default_document(0);
        settings.shipping.free_enabled = false;
        assert_eq!(settings.shipping_fee_for(500.0), 5.9);
    }
}

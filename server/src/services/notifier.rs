//! Transactional email notifier
//!
//! Every call site treats the outcome as advisory: sends are spawned,
//! logged, and never block or fail the triggering request.

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use std::sync::Arc;

use crate::db::models::{Order, OrderStatus, Product, PublicUser};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a notification attempt - advisory only
pub type NotifyResult = Result<(), BoxError>;

/// Transactional message sender
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Welcome message for a freshly created OAuth account
    async fn send_welcome(&self, user: &PublicUser) -> NotifyResult;

    /// New-product announcement to the client mailing list
    async fn send_new_product(&self, recipients: &[String], product: &Product) -> NotifyResult;

    /// Order status change notification to the order's owner
    async fn send_order_status(
        &self,
        user: &PublicUser,
        order: &Order,
        new_status: OrderStatus,
    ) -> NotifyResult;
}

/// Build a notifier from the environment
///
/// SES is used when `SES_FROM_EMAIL` is configured; otherwise email is
/// disabled and sends are logged only.
pub async fn notifier_from_env(ses_from_email: Option<String>) -> Arc<dyn Notifier> {
    match ses_from_email {
        Some(from) => {
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let ses = SesClient::new(&aws_config);
            tracing::info!(from = %from, "SES notifier configured");
            Arc::new(SesNotifier { ses, from })
        }
        None => {
            tracing::warn!("SES_FROM_EMAIL not set - transactional email disabled");
            Arc::new(LogNotifier)
        }
    }
}

/// AWS SES v2 backed notifier
pub struct SesNotifier {
    ses: SesClient,
    from: String,
}

impl SesNotifier {
    async fn send_plain(&self, to: &str, subject: &str, body_text: String) -> NotifyResult {
        let subject = Content::builder().data(subject).build()?;
        let body = Body::builder()
            .text(Content::builder().data(body_text).build()?)
            .build();
        let message = Message::builder().subject(subject).body(body).build();

        self.ses
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn send_welcome(&self, user: &PublicUser) -> NotifyResult {
        let body = format!(
            "Bienvenue {first} !\n\
             Votre compte est prêt, bon shopping.\n\n\
             Welcome {first}!\n\
             Your account is ready, happy shopping.",
            first = user.first_name
        );
        self.send_plain(&user.email, "Bienvenue / Welcome", body)
            .await?;
        tracing::info!(to = %user.email, "Welcome email sent");
        Ok(())
    }

    async fn send_new_product(&self, recipients: &[String], product: &Product) -> NotifyResult {
        let body = format!(
            "Nouveau produit en boutique : {name} - {price:.2}\n\n\
             New in store: {name} - {price:.2}",
            name = product.name,
            price = product.effective_price()
        );

        let mut failed = 0usize;
        for to in recipients {
            if let Err(e) = self
                .send_plain(to, "Nouveau produit / New product", body.clone())
                .await
            {
                failed += 1;
                tracing::warn!(to = %to, error = %e, "New-product email failed");
            }
        }

        tracing::info!(
            sent = recipients.len() - failed,
            failed,
            product = %product.name,
            "New-product emails dispatched"
        );
        Ok(())
    }

    async fn send_order_status(
        &self,
        user: &PublicUser,
        order: &Order,
        new_status: OrderStatus,
    ) -> NotifyResult {
        let body = format!(
            "Bonjour {first},\n\
             Votre commande {id} est maintenant : {status}.\n\n\
             Hello {first},\n\
             Your order {id} is now: {status}.",
            first = user.first_name,
            id = order.id_string(),
            status = new_status.as_str()
        );
        self.send_plain(&user.email, "Statut de commande / Order status", body)
            .await?;
        tracing::info!(to = %user.email, status = new_status.as_str(), "Order status email sent");
        Ok(())
    }
}

/// Logging-only notifier used when email is not configured
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_welcome(&self, user: &PublicUser) -> NotifyResult {
        tracing::info!(to = %user.email, "Email disabled - skipping welcome message");
        Ok(())
    }

    async fn send_new_product(&self, recipients: &[String], product: &Product) -> NotifyResult {
        tracing::info!(
            recipients = recipients.len(),
            product = %product.name,
            "Email disabled - skipping new-product announcement"
        );
        Ok(())
    }

    async fn send_order_status(
        &self,
        user: &PublicUser,
        order: &Order,
        new_status: OrderStatus,
    ) -> NotifyResult {
        tracing::info!(
            to = %user.email,
            order = %order.id_string(),
            status = new_status.as_str(),
            "Email disabled - skipping order status message"
        );
        Ok(())
    }
}

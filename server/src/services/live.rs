//! Live-stats broadcaster
//!
//! Fan-out of dashboard events to subscribed admin sessions:
//!
//! ```text
//! mutating handler ──► EventSink::stats_changed()
//!                            │ (detached task)
//!                            ▼
//!                     compute_stats(db)
//!                            │
//!                            ▼
//!                        StatsHub ──► broadcast ──► admin WebSocket sessions
//! ```
//!
//! Delivery is best-effort: a lagging or disconnected subscriber never
//! blocks the triggering request.

use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::broadcast;

use crate::db::models::Product;
use crate::db::repository::{OrderRepository, ProductRepository, RepoResult, UserRepository};

/// Broadcast channel capacity - enough to buffer connect-time bursts
const BROADCAST_CAPACITY: usize = 256;

/// Aggregate dashboard counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Client-role users only
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    /// Σ total over confirmed orders, rounded to 2 decimals
    pub revenue: f64,
}

/// Events pushed to the admin channel
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum LiveEvent {
    StatsUpdated(StatsSnapshot),
    ProductAdded { product: Product, actor: String },
    ProductUpdated { product: Product, actor: String },
    ProductDeleted { id: String, actor: String },
}

/// Shared broadcast hub for admin sessions
#[derive(Clone)]
pub struct StatsHub {
    tx: broadcast::Sender<LiveEvent>,
}

impl StatsHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Subscribe an admin session to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }

    /// Publish an event (send errors mean no subscribers - safe to ignore)
    pub fn publish(&self, event: LiveEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StatsHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Sink through which components request broadcasts
///
/// Injected explicitly into the auth service, the order engine and the
/// catalog handlers - there is no ambient global broadcast handle.
pub trait EventSink: Send + Sync {
    /// Push an event to subscribed admin sessions
    fn publish(&self, event: LiveEvent);

    /// Request an asynchronous stats recompute + broadcast
    ///
    /// Fire-and-forget: the recompute runs on a detached task and its
    /// failure is logged, never surfaced.
    fn stats_changed(&self);
}

/// Production sink: recomputes counters from the store and publishes
#[derive(Clone)]
pub struct StatsBroadcaster {
    db: Surreal<Db>,
    hub: StatsHub,
}

impl StatsBroadcaster {
    pub fn new(db: Surreal<Db>, hub: StatsHub) -> Self {
        Self { db, hub }
    }
}

impl EventSink for StatsBroadcaster {
    fn publish(&self, event: LiveEvent) {
        self.hub.publish(event);
    }

    fn stats_changed(&self) {
        let db = self.db.clone();
        let hub = self.hub.clone();
        tokio::spawn(async move {
            match compute_stats(&db).await {
                Ok(snapshot) => hub.publish(LiveEvent::StatsUpdated(snapshot)),
                Err(e) => tracing::warn!(error = %e, "Stats recompute failed"),
            }
        });
    }
}

/// Recompute the dashboard counters in one pass
pub async fn compute_stats(db: &Surreal<Db>) -> RepoResult<StatsSnapshot> {
    let users = UserRepository::new(db.clone());
    let products = ProductRepository::new(db.clone());
    let orders = OrderRepository::new(db.clone());

    let total_users = users.count_clients().await?;
    let total_products = products.count().await?;
    let total_orders = orders.count().await?;
    let revenue = orders.revenue_confirmed().await?;

    Ok(StatsSnapshot {
        total_users,
        total_products,
        total_orders,
        revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(n: u64) -> StatsSnapshot {
        StatsSnapshot {
            total_users: n,
            total_products: 0,
            total_orders: 0,
            revenue: 0.0,
        }
    }

    #[tokio::test]
    async fn subscribe_receives_published_events() {
        let hub = StatsHub::new();
        let mut rx = hub.subscribe();

        hub.publish(LiveEvent::StatsUpdated(snapshot(3)));

        match rx.recv().await.unwrap() {
            LiveEvent::StatsUpdated(s) => assert_eq!(s.total_users, 3),
            other => panic!("Expected StatsUpdated, got {other:?}"),
        }
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let hub = StatsHub::new();
        // No receiver - must not panic or error
        hub.publish(LiveEvent::ProductDeleted {
            id: "product:x".into(),
            actor: "user:admin".into(),
        });
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn multiple_subscribers_all_receive() {
        let hub = StatsHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.publish(LiveEvent::StatsUpdated(snapshot(7)));

        for rx in [&mut a, &mut b] {
            match rx.recv().await.unwrap() {
                LiveEvent::StatsUpdated(s) => assert_eq!(s.total_users, 7),
                other => panic!("Expected StatsUpdated, got {other:?}"),
            }
        }
    }

    #[test]
    fn live_event_wire_format() {
        let event = LiveEvent::StatsUpdated(StatsSnapshot {
            total_users: 2,
            total_products: 5,
            total_orders: 1,
            revenue: 99.9,
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "stats-updated");
        assert_eq!(json["data"]["total_orders"], 1);

        let deleted = LiveEvent::ProductDeleted {
            id: "product:p".into(),
            actor: "user:admin".into(),
        };
        let json = serde_json::to_value(&deleted).unwrap();
        assert_eq!(json["event"], "product-deleted");
        assert_eq!(json["data"]["actor"], "user:admin");
    }
}

//! Order repository

use super::{BaseRepository, CountRow, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{Order, OrderStatus};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const ORDER_TABLE: &str = "orders";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let pure_id = strip_table_prefix(ORDER_TABLE, id);
        let order: Option<Order> = self.base.db().select((ORDER_TABLE, pure_id)).await?;
        Ok(order)
    }

    /// A user's orders, most recent first, capped
    pub async fn find_by_user(&self, user: &RecordId, limit: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM orders WHERE user = $user ORDER BY created_at DESC LIMIT $limit")
            .bind(("user", user.to_string()))
            .bind(("limit", limit))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// All of a user's orders (per-user statistics)
    pub async fn find_all_by_user(&self, user: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM orders WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Admin page of orders, optionally filtered by status
    pub async fn find_page(
        &self,
        page: u32,
        limit: u32,
        status: Option<OrderStatus>,
    ) -> RepoResult<(Vec<Order>, u64)> {
        let start = (page.max(1) - 1) as i64 * limit as i64;

        let (orders, total) = match status {
            Some(status) => {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query(
                        "SELECT * FROM orders WHERE status = $status \
                         ORDER BY created_at DESC LIMIT $limit START $start",
                    )
                    .bind(("status", status))
                    .bind(("limit", limit as i64))
                    .bind(("start", start))
                    .await?
                    .take(0)?;

                let row: Option<CountRow> = self
                    .base
                    .db()
                    .query("SELECT count() FROM orders WHERE status = $status GROUP ALL")
                    .bind(("status", status))
                    .await?
                    .take(0)?;
                (orders, row.map(|r| r.count).unwrap_or(0))
            }
            None => {
                let orders: Vec<Order> = self
                    .base
                    .db()
                    .query(
                        "SELECT * FROM orders \
                         ORDER BY created_at DESC LIMIT $limit START $start",
                    )
                    .bind(("limit", limit as i64))
                    .bind(("start", start))
                    .await?
                    .take(0)?;
                (orders, self.count().await?)
            }
        };

        Ok((orders, total))
    }

    pub async fn count(&self) -> RepoResult<u64> {
        let row: Option<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM orders GROUP ALL")
            .await?
            .take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    /// Replace status, tracking number and delivery timestamp in one
    /// statement - concurrent admin writes serialize wholesale, never
    /// leaving a torn record.
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        tracking_number: Option<String>,
        delivered_at: Option<i64>,
    ) -> RepoResult<Order> {
        let pure_id = strip_table_prefix(ORDER_TABLE, id).to_string();

        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "UPDATE type::thing('orders', $id) SET status = $status, \
                 tracking_number = $tracking, delivered_at = $delivered RETURN AFTER",
            )
            .bind(("id", pure_id))
            .bind(("status", status))
            .bind(("tracking", tracking_number))
            .bind(("delivered", delivered_at))
            .await?
            .take(0)?;

        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
    }

    /// Revenue = Σ total over confirmed orders, rounded to 2 decimals
    pub async fn revenue_confirmed(&self) -> RepoResult<f64> {
        #[derive(serde::Deserialize)]
        struct RevenueRow {
            revenue: f64,
        }

        let row: Option<RevenueRow> = self
            .base
            .db()
            .query(
                "SELECT math::sum(total) AS revenue FROM orders \
                 WHERE status = $status GROUP ALL",
            )
            .bind(("status", OrderStatus::Confirmed))
            .await?
            .take(0)?;

        let revenue = row.map(|r| r.revenue).unwrap_or(0.0);
        Ok((revenue * 100.0).round() / 100.0)
    }

    /// Order counts grouped by status (admin dashboard)
    pub async fn counts_by_status(&self) -> RepoResult<Vec<(OrderStatus, u64)>> {
        #[derive(serde::Deserialize)]
        struct StatusRow {
            status: OrderStatus,
            count: u64,
        }

        let rows: Vec<StatusRow> = self
            .base
            .db()
            .query("SELECT status, count() AS count FROM orders GROUP BY status")
            .await?
            .take(0)?;
        Ok(rows.into_iter().map(|r| (r.status, r.count)).collect())
    }
}
